//! Precomputed per-depth tile tables.
//!
//! The registry is the authority for where a tile sits in world space. Mesh
//! builders express vertices relative to [`TileEntry::center_world`], so the
//! same tile always gets the same origin no matter who builds it.

use std::sync::Arc;

use dashmap::DashMap;
use glam::DVec3;
use tracing::{debug, info};

use crate::{FACE_COUNT, TileId, get_corners, tiles_per_edge};

/// Size and position of the planet a depth table was built for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetPlacement {
    /// Sphere radius in world units.
    pub radius: f64,
    /// World-space planet center.
    pub center: DVec3,
}

/// Precomputed world-space data for one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileEntry {
    /// The tile this entry describes.
    pub tile: TileId,
    /// Unit radial direction through the tile's centroid.
    pub normal: DVec3,
    /// World position of the centroid on the base sphere.
    pub center_world: DVec3,
    /// World positions of the three corners on the base sphere.
    pub corner_world_positions: [DVec3; 3],
    /// Tiles along a face edge at this tile's depth.
    pub tiles_per_edge: u32,
}

impl TileEntry {
    fn compute(tile: TileId, placement: PlanetPlacement) -> Self {
        let normal = tile.center_direction();
        Self {
            tile,
            normal,
            center_world: placement.center + normal * placement.radius,
            corner_world_positions: get_corners(&tile, placement.radius, placement.center),
            tiles_per_edge: tiles_per_edge(tile.depth),
        }
    }
}

/// Every tile entry of one depth.
#[derive(Debug)]
pub struct DepthTable {
    depth: u8,
    placement: PlanetPlacement,
    entries: Vec<TileEntry>,
}

impl DepthTable {
    fn build(depth: u8, placement: PlanetPlacement) -> Self {
        let entries = TileId::all_at_depth(depth)
            .map(|tile| TileEntry::compute(tile, placement))
            .collect();
        Self {
            depth,
            placement,
            entries,
        }
    }

    fn index_of(&self, tile: &TileId) -> Option<usize> {
        if tile.depth != self.depth || tile.face as usize >= FACE_COUNT {
            return None;
        }
        let n = tiles_per_edge(self.depth) as usize;
        let (x, y) = (tile.x as usize, tile.y as usize);
        (x < n && y < n).then(|| tile.face as usize * n * n + y * n + x)
    }

    /// Entry for `tile`, if it belongs to this depth.
    #[must_use]
    pub fn get(&self, tile: &TileId) -> Option<&TileEntry> {
        self.index_of(tile).and_then(|i| self.entries.get(i))
    }

    /// Depth of every entry in the table.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Planet the table was built for.
    #[must_use]
    pub fn placement(&self) -> PlanetPlacement {
        self.placement
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in [`TileId::all_at_depth`] order.
    pub fn iter(&self) -> impl Iterator<Item = &TileEntry> {
        self.entries.iter()
    }
}

/// Thread-safe store of depth tables.
///
/// Several depths can be held at once; each is replaced only when it is
/// rebuilt for a different planet placement.
#[derive(Debug, Default)]
pub struct TileRegistry {
    tables: DashMap<u8, Arc<DepthTable>>,
}

impl TileRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Precompute every tile at `depth` for a planet of `radius` at `center`.
    ///
    /// Calling this again with the same placement returns the existing table.
    ///
    /// # Panics
    ///
    /// Panics if `depth` exceeds [`crate::MAX_DEPTH`].
    pub fn build(&self, depth: u8, radius: f64, center: DVec3) -> Arc<DepthTable> {
        let placement = PlanetPlacement { radius, center };
        if let Some(existing) = self.tables.get(&depth)
            && existing.placement == placement
        {
            debug!("Tile table for depth {depth} already built");
            return Arc::clone(&existing);
        }

        let table = Arc::new(DepthTable::build(depth, placement));
        info!(
            "Built tile table: depth={depth}, tiles={}, radius={radius}",
            table.len()
        );
        self.tables.insert(depth, Arc::clone(&table));
        table
    }

    /// Precomputed entry for `tile`, or `None` if its depth is not built.
    #[must_use]
    pub fn entry(&self, tile: &TileId) -> Option<TileEntry> {
        self.tables
            .get(&tile.depth)
            .and_then(|table| table.get(tile).copied())
    }

    /// Shared handle to the table for `depth`.
    #[must_use]
    pub fn depth_table(&self, depth: u8) -> Option<Arc<DepthTable>> {
        self.tables.get(&depth).map(|t| Arc::clone(&t))
    }

    /// Whether `depth` has been built.
    #[must_use]
    pub fn is_built(&self, depth: u8) -> bool {
        self.tables.contains_key(&depth)
    }

    /// Built depths in ascending order.
    #[must_use]
    pub fn built_depths(&self) -> Vec<u8> {
        let mut depths: Vec<u8> = self.tables.iter().map(|e| *e.key()).collect();
        depths.sort_unstable();
        depths
    }

    /// Placement `depth` was built with.
    #[must_use]
    pub fn planet(&self, depth: u8) -> Option<PlanetPlacement> {
        self.tables.get(&depth).map(|t| t.placement)
    }

    /// Drop the table for `depth`. Returns whether one existed.
    pub fn release(&self, depth: u8) -> bool {
        let removed = self.tables.remove(&depth).is_some();
        if removed {
            debug!("Released tile table for depth {depth}");
        }
        removed
    }

    /// Drop every table.
    pub fn clear(&self) {
        self.tables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction_from_barycentric;

    const RADIUS: f64 = 30.0;

    #[test]
    fn test_entry_missing_before_build() {
        let registry = TileRegistry::new();
        assert!(registry.entry(&TileId::new(0, 1, 0, 0)).is_none());
        assert!(!registry.is_built(1));
        assert!(registry.planet(1).is_none());
    }

    #[test]
    fn test_build_populates_every_tile() {
        let registry = TileRegistry::new();
        let table = registry.build(2, RADIUS, DVec3::ZERO);
        assert_eq!(table.len(), 20 * 16);
        for tile in TileId::all_at_depth(2) {
            let entry = registry.entry(&tile).expect("entry should exist after build");
            assert_eq!(entry.tile, tile);
            assert_eq!(entry.tiles_per_edge, 4);
        }
    }

    #[test]
    fn test_entry_geometry_lies_on_sphere() {
        let center = DVec3::new(100.0, -20.0, 5.0);
        let registry = TileRegistry::new();
        registry.build(3, RADIUS, center);
        for tile in TileId::all_at_depth(3).step_by(7) {
            let entry = registry.entry(&tile).unwrap();
            assert!((entry.normal.length() - 1.0).abs() < 1e-12);
            assert!(((entry.center_world - center).length() - RADIUS).abs() < 1e-9);
            for corner in entry.corner_world_positions {
                assert!(((corner - center).length() - RADIUS).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_center_is_centroid_direction() {
        let registry = TileRegistry::new();
        registry.build(1, RADIUS, DVec3::ZERO);
        let tile = TileId::new(6, 1, 1, 1);
        let entry = registry.entry(&tile).unwrap();
        let expected = direction_from_barycentric(6, tile.centroid()) * RADIUS;
        assert!((entry.center_world - expected).length() < 1e-12);
    }

    #[test]
    fn test_build_is_idempotent() {
        let registry = TileRegistry::new();
        let first = registry.build(2, RADIUS, DVec3::ZERO);
        let second = registry.build(2, RADIUS, DVec3::ZERO);
        assert!(Arc::ptr_eq(&first, &second), "unchanged placement should reuse the table");
    }

    #[test]
    fn test_rebuild_on_placement_change() {
        let registry = TileRegistry::new();
        let tile = TileId::new(4, 2, 1, 1);
        registry.build(2, RADIUS, DVec3::ZERO);
        let before = registry.entry(&tile).unwrap();

        registry.build(2, RADIUS * 2.0, DVec3::ZERO);
        let after = registry.entry(&tile).unwrap();
        assert!((after.center_world - before.center_world * 2.0).length() < 1e-9);
        assert_eq!(registry.planet(2).unwrap().radius, RADIUS * 2.0);
    }

    #[test]
    fn test_builds_are_pure() {
        let a = TileRegistry::new();
        let b = TileRegistry::new();
        a.build(3, RADIUS, DVec3::X);
        b.build(3, RADIUS, DVec3::X);
        for tile in TileId::all_at_depth(3) {
            assert_eq!(a.entry(&tile), b.entry(&tile));
        }
    }

    #[test]
    fn test_multiple_depths_retained() {
        let registry = TileRegistry::new();
        registry.build(0, RADIUS, DVec3::ZERO);
        registry.build(2, RADIUS, DVec3::ZERO);
        registry.build(1, RADIUS, DVec3::ZERO);
        assert_eq!(registry.built_depths(), vec![0, 1, 2]);
        assert!(registry.entry(&TileId::face_root(3)).is_some());
        assert!(registry.entry(&TileId::new(3, 2, 3, 3)).is_some());

        assert!(registry.release(1));
        assert!(!registry.release(1));
        assert_eq!(registry.built_depths(), vec![0, 2]);

        registry.clear();
        assert!(registry.built_depths().is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let registry = Arc::new(TileRegistry::new());
        std::thread::scope(|s| {
            for depth in 0..4u8 {
                let registry = Arc::clone(&registry);
                s.spawn(move || {
                    registry.build(depth, RADIUS, DVec3::ZERO);
                });
            }
        });
        assert_eq!(registry.built_depths(), vec![0, 1, 2, 3]);
    }
}
