//! Tile mesh generation: lattice sampling, height displacement, outward
//! winding, vertex normals, a shared mesh cache, and a background build pool.

mod async_mesh;
mod builder;
mod cache;
mod error;
mod mesh;
mod normals;
mod winding;

pub use async_mesh::{AsyncTileMesher, MeshRequest, MeshedTile};
pub use builder::{CENTER_TOLERANCE, MAX_RESOLUTION, MeshBuilderConfig, TileMeshBuilder};
pub use cache::MeshCache;
pub use error::MeshBuildError;
pub use mesh::TileMesh;
pub use normals::{NormalMode, compute_normals};
pub use winding::{DEGENERATE_EPSILON, enforce_outward_winding, lattice_triangles, triangle_winds_outward};
