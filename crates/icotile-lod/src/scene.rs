//! The scene collaborator that owns displayable tile instances.

use std::sync::Arc;

use glam::DVec3;
use icotile_mesh::TileMesh;
use icotile_sphere::TileId;

/// Receives tile meshes from the LOD controller.
///
/// The controller calls these from its own thread, once per state change.
pub trait TileScene {
    /// Opaque reference to a spawned tile instance.
    type Handle: Clone;

    /// Create an instance for `tile` placed at `center_world`. Mesh vertices
    /// are relative to that point.
    fn spawn(&mut self, tile: TileId, mesh: Arc<TileMesh>, center_world: DVec3) -> Self::Handle;

    /// Show or hide an instance without destroying it.
    fn set_active(&mut self, handle: &Self::Handle, active: bool);

    /// Destroy an instance. The handle is not used again.
    fn retire(&mut self, handle: Self::Handle);
}
