//! The unit icosahedron: vertex directions, face table, and face adjacency.
//!
//! Faces are wound counter-clockwise when viewed from outside, so for face
//! `[p0, p1, p2]` the cross product `(p1 - p0) x (p2 - p0)` points away from
//! the origin. Barycentric `(0,0)`, `(1,0)` and `(0,1)` map to `p0`, `p1` and
//! `p2` respectively.

use glam::DVec3;

/// Number of icosahedron faces.
pub const FACE_COUNT: usize = 20;

/// Number of icosahedron vertices.
pub const VERTEX_COUNT: usize = 12;

// (1, phi, 0) scaled to unit length.
const A: f64 = 0.525_731_112_119_133_6;
const B: f64 = 0.850_650_808_352_039_9;

/// Unit-length icosahedron vertex directions.
pub const VERTICES: [DVec3; VERTEX_COUNT] = [
    DVec3::new(-A, B, 0.0),
    DVec3::new(A, B, 0.0),
    DVec3::new(-A, -B, 0.0),
    DVec3::new(A, -B, 0.0),
    DVec3::new(0.0, -A, B),
    DVec3::new(0.0, A, B),
    DVec3::new(0.0, -A, -B),
    DVec3::new(0.0, A, -B),
    DVec3::new(B, 0.0, -A),
    DVec3::new(B, 0.0, A),
    DVec3::new(-B, 0.0, -A),
    DVec3::new(-B, 0.0, A),
];

/// Vertex indices of each face, counter-clockwise from outside.
pub const FACES: [[u8; 3]; FACE_COUNT] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// One of the three edges of a face, named by which barycentric
/// coordinate vanishes along it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceEdge {
    /// `V = 0`: from corner 0 to corner 1.
    Base,
    /// `U = 0`: from corner 0 to corner 2.
    Side,
    /// `W = 0`: from corner 1 to corner 2.
    Diagonal,
}

impl FaceEdge {
    /// All three edges, in table order.
    pub const ALL: [FaceEdge; 3] = [FaceEdge::Base, FaceEdge::Side, FaceEdge::Diagonal];

    /// Column of this edge in [`FACE_ADJACENCY`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            FaceEdge::Base => 0,
            FaceEdge::Side => 1,
            FaceEdge::Diagonal => 2,
        }
    }

    /// The two face-corner slots (0, 1 or 2) this edge connects.
    #[must_use]
    pub const fn corner_slots(self) -> (usize, usize) {
        match self {
            FaceEdge::Base => (0, 1),
            FaceEdge::Side => (0, 2),
            FaceEdge::Diagonal => (1, 2),
        }
    }
}

const fn face_has_vertex(face: usize, vertex: u8) -> bool {
    let f = FACES[face];
    f[0] == vertex || f[1] == vertex || f[2] == vertex
}

const fn build_face_adjacency() -> [[u8; 3]; FACE_COUNT] {
    let mut table = [[u8::MAX; 3]; FACE_COUNT];
    let mut face = 0;
    while face < FACE_COUNT {
        let mut edge = 0;
        while edge < 3 {
            let f = FACES[face];
            let (p, q) = match edge {
                0 => (f[0], f[1]),
                1 => (f[0], f[2]),
                _ => (f[1], f[2]),
            };
            let mut other = 0;
            while other < FACE_COUNT {
                if other != face && face_has_vertex(other, p) && face_has_vertex(other, q) {
                    table[face][edge] = other as u8;
                }
                other += 1;
            }
            edge += 1;
        }
        face += 1;
    }
    table
}

/// For each face and each [`FaceEdge`] (by [`FaceEdge::index`]), the face on
/// the other side of that edge.
pub const FACE_ADJACENCY: [[u8; 3]; FACE_COUNT] = build_face_adjacency();

/// Describes the face across one edge and which of its edges is shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceEdgeAdjacency {
    /// The adjacent face.
    pub neighbor_face: u8,
    /// The shared edge, named in the neighbor face's frame.
    pub neighbor_edge: FaceEdge,
}

/// Look up the face across `edge` of `face`.
///
/// # Panics
///
/// Panics if `face >= FACE_COUNT`.
#[must_use]
pub fn face_adjacency(face: u8, edge: FaceEdge) -> FaceEdgeAdjacency {
    let neighbor_face = FACE_ADJACENCY[face as usize][edge.index()];
    let corners = FACES[face as usize];
    let (s0, s1) = edge.corner_slots();
    let (p, q) = (corners[s0], corners[s1]);

    let neighbor = FACES[neighbor_face as usize];
    let neighbor_edge = FaceEdge::ALL
        .into_iter()
        .find(|e| {
            let (n0, n1) = e.corner_slots();
            (neighbor[n0] == p && neighbor[n1] == q) || (neighbor[n0] == q && neighbor[n1] == p)
        })
        .unwrap_or(FaceEdge::Base);

    FaceEdgeAdjacency {
        neighbor_face,
        neighbor_edge,
    }
}

/// The three corner directions of a face, in barycentric slot order.
///
/// # Panics
///
/// Panics if `face >= FACE_COUNT`.
#[inline]
#[must_use]
pub fn face_vertices(face: u8) -> [DVec3; 3] {
    let [i0, i1, i2] = FACES[face as usize];
    [
        VERTICES[i0 as usize],
        VERTICES[i1 as usize],
        VERTICES[i2 as usize],
    ]
}

/// Unit direction through the centroid of a face.
#[must_use]
pub fn face_centroid(face: u8) -> DVec3 {
    let [p0, p1, p2] = face_vertices(face);
    (p0 + p1 + p2).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_are_unit_length() {
        for (i, v) in VERTICES.iter().enumerate() {
            assert!(
                (v.length() - 1.0).abs() < 1e-14,
                "vertex {i} is not unit length: {}",
                v.length()
            );
        }
    }

    #[test]
    fn test_faces_wind_outward() {
        for face in 0..FACE_COUNT as u8 {
            let [p0, p1, p2] = face_vertices(face);
            let normal = (p1 - p0).cross(p2 - p0);
            assert!(
                normal.dot(face_centroid(face)) > 0.0,
                "face {face} is wound inward"
            );
        }
    }

    #[test]
    fn test_every_vertex_touches_five_faces() {
        for vertex in 0..VERTEX_COUNT as u8 {
            let count = FACES.iter().filter(|f| f.contains(&vertex)).count();
            assert_eq!(count, 5, "vertex {vertex} touches {count} faces");
        }
    }

    #[test]
    fn test_every_edge_has_one_neighbor() {
        for (face, row) in FACE_ADJACENCY.iter().enumerate() {
            for &neighbor in row {
                assert!((neighbor as usize) < FACE_COUNT, "face {face} has no neighbor");
                assert_ne!(neighbor as usize, face);
            }
            let mut sorted = *row;
            sorted.sort_unstable();
            assert!(
                sorted[0] != sorted[1] && sorted[1] != sorted[2],
                "face {face} neighbors are not distinct: {row:?}"
            );
        }
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        for face in 0..FACE_COUNT as u8 {
            for edge in FaceEdge::ALL {
                let adj = face_adjacency(face, edge);
                let back = face_adjacency(adj.neighbor_face, adj.neighbor_edge);
                assert_eq!(
                    back.neighbor_face, face,
                    "{face}/{edge:?} -> {}/{:?} does not lead back",
                    adj.neighbor_face, adj.neighbor_edge
                );
                assert_eq!(back.neighbor_edge, edge);
            }
        }
    }

    #[test]
    fn test_shared_edges_are_reversed() {
        // Consistent outward winding means a shared edge is traversed in
        // opposite directions by the two faces.
        for face in 0..FACE_COUNT as u8 {
            for edge in FaceEdge::ALL {
                let adj = face_adjacency(face, edge);
                let here = FACES[face as usize];
                let there = FACES[adj.neighbor_face as usize];
                let (s0, s1) = edge.corner_slots();
                let (p, q) = (here[s0], here[s1]);
                let pos_p = there.iter().position(|&v| v == p).unwrap();
                let pos_q = there.iter().position(|&v| v == q).unwrap();
                let forward_here = s1 == (s0 + 1) % 3;
                let forward_there = pos_q == (pos_p + 1) % 3;
                assert_ne!(
                    forward_here, forward_there,
                    "edge {p}-{q} has the same direction on faces {face} and {}",
                    adj.neighbor_face
                );
            }
        }
    }

    #[test]
    fn test_face_centroids_are_distinct() {
        for a in 0..FACE_COUNT as u8 {
            for b in (a + 1)..FACE_COUNT as u8 {
                assert!(face_centroid(a).dot(face_centroid(b)) < 0.99);
            }
        }
    }
}
