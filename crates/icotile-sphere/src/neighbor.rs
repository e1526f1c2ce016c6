//! Edge neighbours of tiles, within a face and across face edges.
//!
//! A tile edge joins two of its corner grid points. If both lie on the same
//! face edge, the neighbour sits on the adjacent face and is found through
//! [`face_adjacency`]. Otherwise the edge is interior to the face and exactly
//! two grid cells share it: the tile itself and its neighbour.

use crate::icosahedron::{FaceEdge, face_adjacency};
use crate::lattice::LatticePoint;
use crate::{TileId, tiles_per_edge};

impl TileId {
    /// The three tiles sharing an edge with this one, at the same depth.
    ///
    /// Order follows the tile's edges: corners 0-1, 0-2, then 1-2.
    #[must_use]
    pub fn neighbors(&self) -> [TileId; 3] {
        let [c0, c1, c2] = self.corner_grid_points();
        [
            self.neighbor_across(c0, c1),
            self.neighbor_across(c0, c2),
            self.neighbor_across(c1, c2),
        ]
    }

    /// Whether `other` shares an edge with this tile.
    #[must_use]
    pub fn is_adjacent(&self, other: &TileId) -> bool {
        self.depth == other.depth && self.neighbors().contains(other)
    }

    fn neighbor_across(&self, p: (u32, u32), q: (u32, u32)) -> TileId {
        let n = tiles_per_edge(self.depth);
        let segments = u64::from(n);
        let lp = LatticePoint::new(self.face, u64::from(p.0), u64::from(p.1), segments);
        let lq = LatticePoint::new(self.face, u64::from(q.0), u64::from(q.1), segments);

        if let Some(edge) = FaceEdge::ALL
            .into_iter()
            .find(|&e| lp.is_on_edge(e) && lq.is_on_edge(e))
        {
            return self.neighbor_on_adjacent_face(edge, lp, lq);
        }

        let inverted_of_square = |sx: u32, sy: u32| {
            TileId::new(self.face, self.depth, n - 1 - sx, n - 1 - sy)
        };
        let upright = |x: u32, y: u32| TileId::new(self.face, self.depth, x, y);

        let (lo, hi) = if p.0 <= q.0 { (p, q) } else { (q, p) };
        let candidates = if lo.1 == hi.1 {
            // U-aligned edge.
            [upright(lo.0, lo.1), inverted_of_square(lo.0, lo.1 - 1)]
        } else if lo.0 == hi.0 {
            // V-aligned edge.
            let k = lo.1.min(hi.1);
            [upright(lo.0, k), inverted_of_square(lo.0 - 1, k)]
        } else {
            // Anti-diagonal edge from (k, s - k) to (k + 1, s - k - 1).
            let (k, row) = (lo.0, hi.1);
            [upright(k, row), inverted_of_square(k, row)]
        };

        if candidates[0] == *self {
            candidates[1]
        } else {
            candidates[0]
        }
    }

    fn neighbor_on_adjacent_face(&self, edge: FaceEdge, p: LatticePoint, q: LatticePoint) -> TileId {
        let adj = face_adjacency(self.face, edge);
        let (p, q) = match (p.transfer_to(adj.neighbor_face), q.transfer_to(adj.neighbor_face)) {
            (Some(p), Some(q)) => (p, q),
            _ => unreachable!("points on a shared edge exist on both faces"),
        };
        // Along any face edge the two endpoints bound the upright tile at
        // their minimum coordinates.
        TileId::new(
            adj.neighbor_face,
            self.depth,
            p.a.min(q.a) as u32,
            p.b.min(q.b) as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn shared_corner_count(a: &TileId, b: &TileId) -> usize {
        let da = a.corner_directions();
        let db = b.corner_directions();
        da.iter().filter(|p| db.contains(p)).count()
    }

    #[test]
    fn test_face_roots_neighbor_adjacent_faces() {
        for face in 0..crate::FACE_COUNT as u8 {
            let root = TileId::face_root(face);
            let faces: HashSet<u8> = root.neighbors().iter().map(|t| t.face).collect();
            let expected: HashSet<u8> = crate::FACE_ADJACENCY[face as usize].into_iter().collect();
            assert_eq!(faces, expected);
        }
    }

    #[test]
    fn test_neighbors_are_symmetric_and_distinct() {
        for depth in 0..4 {
            for tile in TileId::all_at_depth(depth) {
                let ns = tile.neighbors();
                let unique: HashSet<_> = ns.iter().copied().collect();
                assert_eq!(unique.len(), 3, "{tile} has repeated neighbors {ns:?}");
                for n in ns {
                    assert_ne!(n, tile);
                    assert!(
                        n.neighbors().contains(&tile),
                        "{n} does not list {tile} as a neighbor"
                    );
                }
            }
        }
    }

    #[test]
    fn test_neighbors_share_exactly_one_edge() {
        for depth in 0..4 {
            for tile in TileId::all_at_depth(depth) {
                for n in tile.neighbors() {
                    assert_eq!(
                        shared_corner_count(&tile, &n),
                        2,
                        "{tile} and {n} do not share an edge"
                    );
                }
            }
        }
    }

    #[test]
    fn test_depth_one_example_pair() {
        // (0,0) and (1,0) touch only at a corner; the inverted centre tile is
        // the neighbour across their facing edges.
        let a = TileId::new(0, 1, 0, 0);
        let b = TileId::new(0, 1, 1, 0);
        let centre = TileId::new(0, 1, 1, 1);
        assert!(!a.is_adjacent(&b));
        assert_eq!(shared_corner_count(&a, &b), 1);
        assert!(a.is_adjacent(&centre));
        assert!(b.is_adjacent(&centre));

        let mut around = centre.neighbors().to_vec();
        around.sort();
        assert_eq!(
            around,
            vec![
                TileId::new(0, 1, 0, 0),
                TileId::new(0, 1, 0, 1),
                TileId::new(0, 1, 1, 0)
            ]
        );
    }

    #[test]
    fn test_border_tiles_reach_other_faces() {
        let tile = TileId::new(0, 3, 0, 0);
        let other_faces = tile.neighbors().iter().filter(|n| n.face != 0).count();
        assert_eq!(other_faces, 2);

        let interior = TileId::new(0, 3, 2, 2);
        assert!(interior.neighbors().iter().all(|n| n.face == 0));
    }

    #[test]
    fn test_different_depths_are_not_adjacent() {
        let a = TileId::new(0, 1, 0, 0);
        let b = TileId::new(0, 2, 1, 0);
        assert!(!a.is_adjacent(&b));
    }
}
