//! Mesh build error types.

use icotile_sphere::TileId;

use crate::MAX_RESOLUTION;

/// Errors that can occur when building a tile mesh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshBuildError {
    /// The tile's depth has not been built in the registry.
    #[error("no registry entry for tile {0}")]
    MissingRegistryEntry(TileId),

    /// The requested lattice resolution cannot be meshed.
    #[error("resolution {0} is outside 2..={max}", max = MAX_RESOLUTION)]
    InvalidResolution(u32),
}
