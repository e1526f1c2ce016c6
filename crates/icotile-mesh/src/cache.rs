//! Shared cache of built tile meshes.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use icotile_sphere::TileId;

use crate::TileMesh;

/// Concurrent map from `(tile, resolution)` to a built mesh.
///
/// Entries live until invalidated or cleared.
#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: DashMap<(TileId, u32), Arc<TileMesh>>,
}

impl MeshCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached mesh for `tile` at `resolution`.
    pub fn get(&self, tile: &TileId, resolution: u32) -> Option<Arc<TileMesh>> {
        self.meshes
            .get(&(*tile, resolution))
            .map(|m| Arc::clone(&m))
    }

    /// Store `mesh` unless an entry already exists, and return the entry
    /// that ends up in the cache.
    pub fn insert_if_absent(&self, mesh: TileMesh) -> Arc<TileMesh> {
        let key = (mesh.tile, mesh.resolution);
        let entry = self.meshes.entry(key).or_insert_with(|| Arc::new(mesh));
        Arc::clone(&entry)
    }

    /// Store `mesh`, keeping an existing entry only if it was built around the
    /// same `center_world`. Returns the entry that ends up in the cache.
    pub fn insert_or_refresh(&self, mesh: TileMesh) -> Arc<TileMesh> {
        match self.meshes.entry((mesh.tile, mesh.resolution)) {
            Entry::Occupied(mut cached) => {
                if cached.get().center_world != mesh.center_world {
                    cached.insert(Arc::new(mesh));
                }
                Arc::clone(cached.get())
            }
            Entry::Vacant(slot) => Arc::clone(&*slot.insert(Arc::new(mesh))),
        }
    }

    /// Whether a mesh is cached for `tile` at `resolution`.
    pub fn contains(&self, tile: &TileId, resolution: u32) -> bool {
        self.meshes.contains_key(&(*tile, resolution))
    }

    /// Drop one entry. Returns whether it existed.
    pub fn invalidate(&self, tile: &TileId, resolution: u32) -> bool {
        self.meshes.remove(&(*tile, resolution)).is_some()
    }

    /// Drop every resolution cached for `tile`. Returns how many were removed.
    pub fn invalidate_tile(&self, tile: &TileId) -> usize {
        let before = self.meshes.len();
        self.meshes.retain(|(t, _), _| t != tile);
        before.saturating_sub(self.meshes.len())
    }

    /// Drop every cached mesh.
    pub fn clear(&self) {
        self.meshes.clear();
    }

    /// Number of cached meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn dummy(tile: TileId, resolution: u32, marker: f64) -> TileMesh {
        TileMesh {
            tile,
            resolution,
            center_world: DVec3::splat(marker),
            positions: Vec::new(),
            barycentrics: Vec::new(),
            directions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    #[test]
    fn test_insert_if_absent_keeps_first() {
        let cache = MeshCache::new();
        let tile = TileId::new(0, 1, 0, 0);
        let first = cache.insert_if_absent(dummy(tile, 8, 1.0));
        let second = cache.insert_if_absent(dummy(tile, 8, 2.0));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.center_world, DVec3::splat(1.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_resolutions_are_separate_keys() {
        let cache = MeshCache::new();
        let tile = TileId::new(2, 0, 0, 0);
        cache.insert_if_absent(dummy(tile, 8, 0.0));
        cache.insert_if_absent(dummy(tile, 16, 0.0));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&tile, 16));
        assert!(!cache.contains(&tile, 4));
    }

    #[test]
    fn test_invalidation() {
        let cache = MeshCache::new();
        let a = TileId::new(1, 1, 1, 0);
        let b = TileId::new(1, 1, 0, 1);
        cache.insert_if_absent(dummy(a, 8, 0.0));
        cache.insert_if_absent(dummy(a, 16, 0.0));
        cache.insert_if_absent(dummy(b, 8, 0.0));

        assert!(cache.invalidate(&b, 8));
        assert!(!cache.invalidate(&b, 8));
        assert_eq!(cache.invalidate_tile(&a), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_inserts_agree() {
        let cache = Arc::new(MeshCache::new());
        let tile = TileId::new(5, 2, 1, 1);
        let results: Vec<Arc<TileMesh>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cache = Arc::clone(&cache);
                    s.spawn(move || cache.insert_if_absent(dummy(tile, 8, i as f64)))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for r in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], r));
        }
    }

    #[test]
    fn test_insert_or_refresh_replaces_moved_mesh() {
        let cache = MeshCache::new();
        let tile = TileId::new(0, 1, 1, 0);
        let first = cache.insert_or_refresh(dummy(tile, 8, 1.0));
        let same = cache.insert_or_refresh(dummy(tile, 8, 1.0));
        assert!(Arc::ptr_eq(&first, &same), "same placement keeps the cached mesh");

        let moved = cache.insert_or_refresh(dummy(tile, 8, 2.0));
        assert_eq!(moved.center_world, DVec3::splat(2.0));
        assert!(Arc::ptr_eq(&moved, &cache.get(&tile, 8).unwrap()));
        assert_eq!(cache.len(), 1);
    }
}
