//! Icosphere geometry: icosahedron faces, barycentric mapping, tile addressing, and the tile registry.

mod barycentric;
mod icosahedron;
mod lattice;
mod neighbor;
mod projection;
mod tile_id;
mod tile_registry;

pub use barycentric::Barycentric;
pub use icosahedron::{
    FACE_ADJACENCY, FACE_COUNT, FACES, FaceEdge, FaceEdgeAdjacency, VERTEX_COUNT, VERTICES,
    face_adjacency, face_centroid, face_vertices,
};
pub use lattice::{
    LatticePoint, TileVertexBarys, lattice_index, lattice_vertex_count, local_to_global_bary,
    local_to_global_lattice, tile_vertex_barys,
};
pub use projection::{barycentric_from_direction, direction_from_barycentric, face_from_direction};
pub use tile_id::{MAX_DEPTH, TileId, get_corners, is_valid_tile_index, tile_origin, tiles_per_edge};
pub use tile_registry::{DepthTable, PlanetPlacement, TileEntry, TileRegistry};
