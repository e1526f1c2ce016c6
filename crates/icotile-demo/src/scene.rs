//! A scene that keeps instance bookkeeping without rendering anything.

use std::collections::HashMap;
use std::sync::Arc;

use glam::DVec3;
use icotile_lod::TileScene;
use icotile_mesh::TileMesh;
use icotile_sphere::TileId;

#[derive(Debug)]
struct Instance {
    tile: TileId,
    mesh: Arc<TileMesh>,
    active: bool,
}

/// Counts instances, vertices and triangles the way a renderer would see them.
#[derive(Debug, Default)]
pub(crate) struct HeadlessScene {
    next_handle: u64,
    instances: HashMap<u64, Instance>,
    pub(crate) spawned_total: usize,
    pub(crate) retired_total: usize,
}

impl HeadlessScene {
    pub(crate) fn live_instances(&self) -> usize {
        self.instances.len()
    }

    pub(crate) fn visible_instances(&self) -> usize {
        self.instances.values().filter(|i| i.active).count()
    }

    /// Vertices and triangles across visible instances.
    pub(crate) fn visible_geometry(&self) -> (usize, usize) {
        self.instances
            .values()
            .filter(|i| i.active)
            .fold((0, 0), |(v, t), i| {
                (v + i.mesh.vertex_count(), t + i.mesh.triangle_count())
            })
    }

    /// Mesh of a visible instance of `tile`, if any.
    pub(crate) fn visible_mesh(&self, tile: &TileId) -> Option<Arc<TileMesh>> {
        self.instances
            .values()
            .find(|i| i.active && i.tile == *tile)
            .map(|i| Arc::clone(&i.mesh))
    }
}

impl TileScene for HeadlessScene {
    type Handle = u64;

    fn spawn(&mut self, tile: TileId, mesh: Arc<TileMesh>, center_world: DVec3) -> u64 {
        debug_assert_eq!(mesh.center_world, center_world);
        self.next_handle += 1;
        self.spawned_total += 1;
        self.instances.insert(
            self.next_handle,
            Instance {
                tile,
                mesh,
                active: true,
            },
        );
        self.next_handle
    }

    fn set_active(&mut self, handle: &u64, active: bool) {
        if let Some(instance) = self.instances.get_mut(handle) {
            instance.active = active;
        }
    }

    fn retire(&mut self, handle: u64) {
        if self.instances.remove(&handle).is_some() {
            self.retired_total += 1;
        }
    }
}
