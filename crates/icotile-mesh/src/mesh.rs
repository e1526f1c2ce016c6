//! CPU-side tile mesh data.

use glam::DVec3;
use icotile_sphere::{Barycentric, TileId};

/// Triangulated surface of one tile at one lattice resolution.
///
/// Vertices follow the lattice's row-major order, so vertex `k` belongs to
/// the `k`-th coordinate of [`icotile_sphere::tile_vertex_barys`].
#[derive(Clone, Debug, PartialEq)]
pub struct TileMesh {
    /// Tile this mesh covers.
    pub tile: TileId,
    /// Points along each tile edge.
    pub resolution: u32,
    /// Origin of [`positions`](Self::positions) in world space.
    pub center_world: DVec3,
    /// Vertex positions relative to `center_world`.
    pub positions: Vec<DVec3>,
    /// Face barycentric coordinate of each vertex.
    pub barycentrics: Vec<Barycentric>,
    /// Unit sphere direction of each vertex.
    pub directions: Vec<DVec3>,
    /// Unit normal of each vertex.
    pub normals: Vec<DVec3>,
    /// Triangle list, three indices per triangle, outward wound.
    pub indices: Vec<u32>,
}

impl TileMesh {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// World-space position of vertex `index`.
    pub fn world_position(&self, index: usize) -> DVec3 {
        self.center_world + self.positions[index]
    }

    /// Iterate over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}
