//! Tile lifecycle driven by the viewer position.
//!
//! Each tile the controller has touched carries a [`TileState`]:
//!
//! ```text
//! Unbuilt -> Built -> Active <-> Hidden
//!                        \        /
//!                         Retired
//! ```
//!
//! Active tiles are the k-ring around the tile under the viewer. Tiles that
//! drop out of the ring but stay within `hidden_margin` further hops are
//! hidden so they can come back cheaply; everything else is retired.

use std::collections::{HashMap, HashSet};

use glam::DVec3;
use icotile_mesh::{MeshBuildError, TileMeshBuilder};
use icotile_sphere::{MAX_DEPTH, TileId};
use tracing::{debug, info};

use crate::ring::{k_ring, k_ring_layers};
use crate::selector::{DepthSelector, resolution_for_depth, tile_from_direction};
use crate::TileScene;

/// Errors from the LOD controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LodError {
    /// A tile mesh could not be built.
    #[error(transparent)]
    Mesh(#[from] MeshBuildError),

    /// A depth beyond the configured maximum was requested.
    #[error("depth {depth} exceeds the maximum of {max}")]
    DepthOutOfRange {
        /// The requested depth.
        depth: u8,
        /// The configured maximum.
        max: u8,
    },
}

/// Lifecycle state of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileState {
    /// No mesh has been requested.
    Unbuilt,
    /// The mesh exists but no scene instance.
    Built,
    /// Spawned and visible.
    Active,
    /// Spawned but hidden.
    Hidden,
    /// The scene instance was destroyed.
    Retired,
}

/// Controller settings.
#[derive(Clone, Debug, PartialEq)]
pub struct LodConfig {
    /// Planet center in world space.
    pub planet_center: DVec3,
    /// Base sphere radius.
    pub planet_radius: f64,
    /// Distance from the planet center at which the deepest depth is reached.
    pub min_distance: f64,
    /// Distance from the planet center beyond which depth 0 is used.
    pub max_distance: f64,
    /// Deepest depth the controller selects.
    pub max_depth: u8,
    /// Lattice resolution at depth 0; doubles with every depth.
    pub base_resolution: u32,
    /// Edge hops around the facing tile that are kept active.
    pub ring_radius: u32,
    /// Extra hops beyond the ring within which tiles are hidden, not retired.
    pub hidden_margin: u32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            planet_center: DVec3::ZERO,
            planet_radius: 30.0,
            min_distance: 35.0,
            max_distance: 300.0,
            max_depth: 5,
            base_resolution: 8,
            ring_radius: 2,
            hidden_margin: 1,
        }
    }
}

/// What one [`TileLodController::update`] changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LodUpdate {
    /// Depth in use after the update.
    pub depth: u8,
    /// Tile under the viewer.
    pub facing: Option<TileId>,
    /// Tiles given a new scene instance, nearest first.
    pub spawned: Vec<TileId>,
    /// Hidden tiles made visible again.
    pub reactivated: Vec<TileId>,
    /// Tiles hidden this update.
    pub hidden: Vec<TileId>,
    /// Tiles retired this update.
    pub retired: Vec<TileId>,
}

impl LodUpdate {
    /// Whether the update changed nothing.
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
            && self.reactivated.is_empty()
            && self.hidden.is_empty()
            && self.retired.is_empty()
    }
}

struct TileRecord<H> {
    state: TileState,
    handle: Option<H>,
}

/// Keeps the scene populated with tiles around the viewer.
pub struct TileLodController<S: TileScene> {
    config: LodConfig,
    selector: DepthSelector,
    builder: TileMeshBuilder,
    scene: S,
    depth: Option<u8>,
    records: HashMap<TileId, TileRecord<S::Handle>>,
}

impl<S: TileScene> TileLodController<S> {
    /// Create a controller. No depth is selected until the first
    /// [`update`](Self::update) or [`set_depth`](Self::set_depth).
    ///
    /// # Panics
    ///
    /// Panics if `config.max_distance <= config.min_distance`.
    pub fn new(config: LodConfig, builder: TileMeshBuilder, scene: S) -> Self {
        let selector = DepthSelector::new(
            config.min_distance,
            config.max_distance,
            config.max_depth.min(MAX_DEPTH),
        );
        Self {
            config,
            selector,
            builder,
            scene,
            depth: None,
            records: HashMap::new(),
        }
    }

    /// Controller settings.
    pub fn config(&self) -> &LodConfig {
        &self.config
    }

    /// Distance-to-depth mapping used by [`update`](Self::update).
    pub fn selector(&self) -> &DepthSelector {
        &self.selector
    }

    /// The mesh builder tiles are built with.
    pub fn builder(&self) -> &TileMeshBuilder {
        &self.builder
    }

    /// The scene collaborator.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable access to the scene collaborator.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Current depth, if one has been selected.
    pub fn depth(&self) -> Option<u8> {
        self.depth
    }

    /// Lifecycle state of `tile`.
    pub fn state(&self, tile: &TileId) -> TileState {
        self.records
            .get(tile)
            .map_or(TileState::Unbuilt, |r| r.state)
    }

    /// Active tiles, sorted.
    pub fn active_tiles(&self) -> Vec<TileId> {
        self.tiles_in(TileState::Active)
    }

    /// Hidden tiles, sorted.
    pub fn hidden_tiles(&self) -> Vec<TileId> {
        self.tiles_in(TileState::Hidden)
    }

    fn tiles_in(&self, state: TileState) -> Vec<TileId> {
        let mut tiles: Vec<TileId> = self
            .records
            .iter()
            .filter(|(_, r)| r.state == state)
            .map(|(t, _)| *t)
            .collect();
        tiles.sort_unstable();
        tiles
    }

    /// Switch to `depth`, building its registry table if needed.
    ///
    /// Retired records, and built-but-unspawned records of other depths, are
    /// dropped. Tiles at the new depth can be spawned as soon as this returns.
    ///
    /// # Errors
    ///
    /// Returns [`LodError::DepthOutOfRange`] if `depth` exceeds the
    /// configured maximum.
    pub fn set_depth(&mut self, depth: u8) -> Result<(), LodError> {
        let max = self.selector.max_depth();
        if depth > max {
            return Err(LodError::DepthOutOfRange { depth, max });
        }
        if self.depth == Some(depth) {
            return Ok(());
        }

        self.builder.registry().build(
            depth,
            self.config.planet_radius,
            self.config.planet_center,
        );
        self.records.retain(|tile, r| match r.state {
            TileState::Retired => false,
            TileState::Built => tile.depth == depth,
            _ => true,
        });
        info!("LOD depth {:?} -> {depth}", self.depth);
        self.depth = Some(depth);
        Ok(())
    }

    /// Build the mesh for `tile` without spawning it.
    ///
    /// Tiles that already have a scene instance are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`LodError::Mesh`] if the mesh cannot be built.
    pub fn prepare_tile(&mut self, tile: TileId) -> Result<TileState, LodError> {
        let resolution = resolution_for_depth(self.config.base_resolution, tile.depth);
        match self.state(&tile) {
            TileState::Unbuilt | TileState::Retired => {
                self.builder.build(tile, resolution)?;
                self.records.insert(
                    tile,
                    TileRecord {
                        state: TileState::Built,
                        handle: None,
                    },
                );
                Ok(TileState::Built)
            }
            state => Ok(state),
        }
    }

    /// Make `tile` visible, spawning it if needed.
    ///
    /// Returns the existing handle for an active tile and reactivates a
    /// hidden one.
    ///
    /// # Errors
    ///
    /// Returns [`LodError::Mesh`] if the mesh cannot be built, for example
    /// because the tile's depth has no registry table.
    pub fn spawn_tile(&mut self, tile: TileId) -> Result<S::Handle, LodError> {
        if let Some(record) = self.records.get_mut(&tile) {
            match (record.state, &record.handle) {
                (TileState::Active, Some(handle)) => return Ok(handle.clone()),
                (TileState::Hidden, Some(handle)) => {
                    self.scene.set_active(handle, true);
                    record.state = TileState::Active;
                    return Ok(handle.clone());
                }
                _ => {}
            }
        }

        let resolution = resolution_for_depth(self.config.base_resolution, tile.depth);
        let mesh = self.builder.build(tile, resolution)?;
        let center_world = mesh.center_world;
        let handle = self.scene.spawn(tile, mesh, center_world);
        self.records.insert(
            tile,
            TileRecord {
                state: TileState::Active,
                handle: Some(handle.clone()),
            },
        );
        Ok(handle)
    }

    /// Hide an active tile. Returns whether its state changed.
    pub fn hide_tile(&mut self, tile: &TileId) -> bool {
        match self.records.get_mut(tile) {
            Some(record) if record.state == TileState::Active => {
                if let Some(handle) = &record.handle {
                    self.scene.set_active(handle, false);
                }
                record.state = TileState::Hidden;
                true
            }
            _ => false,
        }
    }

    /// Retire a built, active or hidden tile. Returns whether its state changed.
    pub fn retire_tile(&mut self, tile: &TileId) -> bool {
        match self.records.get_mut(tile) {
            Some(record)
                if matches!(
                    record.state,
                    TileState::Built | TileState::Active | TileState::Hidden
                ) =>
            {
                if let Some(handle) = record.handle.take() {
                    self.scene.retire(handle);
                }
                record.state = TileState::Retired;
                true
            }
            _ => false,
        }
    }

    /// Bring the scene in line with a viewer at `viewer`.
    ///
    /// # Errors
    ///
    /// Returns [`LodError::Mesh`] if a tile in the ring cannot be built. Tiles
    /// spawned before the failure stay active.
    pub fn update(&mut self, viewer: DVec3) -> Result<LodUpdate, LodError> {
        let offset = viewer - self.config.planet_center;
        let depth = self.selector.select_depth(offset.length());
        self.set_depth(depth)?;

        let facing = tile_from_direction(offset.normalize_or_zero(), depth);
        let mut report = LodUpdate {
            depth,
            facing: Some(facing),
            ..Default::default()
        };

        let layers = k_ring_layers(facing, self.config.ring_radius);
        let wanted: HashSet<TileId> = layers.iter().flatten().copied().collect();
        for tile in layers.into_iter().flatten() {
            match self.state(&tile) {
                TileState::Active => {}
                TileState::Hidden => {
                    self.spawn_tile(tile)?;
                    report.reactivated.push(tile);
                }
                _ => {
                    self.spawn_tile(tile)?;
                    report.spawned.push(tile);
                }
            }
        }

        let keep = k_ring(facing, self.config.ring_radius + self.config.hidden_margin);
        let mut visible: Vec<(TileId, TileState)> = self
            .records
            .iter()
            .filter(|(t, r)| {
                matches!(r.state, TileState::Active | TileState::Hidden) && !wanted.contains(t)
            })
            .map(|(t, r)| (*t, r.state))
            .collect();
        visible.sort_unstable_by_key(|(t, _)| *t);

        for (tile, state) in visible {
            if keep.contains(&tile) {
                if state == TileState::Active && self.hide_tile(&tile) {
                    report.hidden.push(tile);
                }
            } else if self.retire_tile(&tile) {
                report.retired.push(tile);
            }
        }

        if !report.is_empty() {
            debug!(
                "LOD update at depth {depth}, facing {facing}: +{} ^{} ~{} -{}",
                report.spawned.len(),
                report.reactivated.len(),
                report.hidden.len(),
                report.retired.len()
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use icotile_mesh::{MeshBuilderConfig, MeshCache, TileMesh};
    use icotile_sphere::TileRegistry;
    use icotile_terrain::FlatHeightProvider;

    use super::*;

    #[derive(Default)]
    struct RecordingScene {
        next: u32,
        spawned: Vec<(TileId, u32)>,
        visible: HashMap<u32, bool>,
        retired: Vec<u32>,
    }

    impl TileScene for RecordingScene {
        type Handle = u32;

        fn spawn(&mut self, tile: TileId, mesh: Arc<TileMesh>, center_world: DVec3) -> u32 {
            assert_eq!(mesh.tile, tile);
            assert_eq!(mesh.center_world, center_world);
            self.next += 1;
            self.spawned.push((tile, self.next));
            self.visible.insert(self.next, true);
            self.next
        }

        fn set_active(&mut self, handle: &u32, active: bool) {
            self.visible.insert(*handle, active);
        }

        fn retire(&mut self, handle: u32) {
            self.visible.remove(&handle);
            self.retired.push(handle);
        }
    }

    fn config() -> LodConfig {
        LodConfig {
            base_resolution: 4,
            max_depth: 4,
            ring_radius: 1,
            hidden_margin: 1,
            ..Default::default()
        }
    }

    fn controller() -> TileLodController<RecordingScene> {
        let builder = TileMeshBuilder::new(
            Arc::new(TileRegistry::new()),
            Some(Arc::new(FlatHeightProvider)),
            Arc::new(MeshCache::new()),
            MeshBuilderConfig::default(),
        );
        TileLodController::new(config(), builder, RecordingScene::default())
    }

    #[test]
    fn test_first_update_spawns_ring() {
        let mut lod = controller();
        let update = lod.update(DVec3::new(0.0, 0.0, 1_000.0)).unwrap();
        assert_eq!(update.depth, 0);
        let facing = update.facing.unwrap();
        assert_eq!(update.spawned.len(), 4);
        assert_eq!(update.spawned[0], facing, "facing tile must spawn first");
        assert_eq!(lod.active_tiles().len(), 4);
        assert_eq!(lod.state(&facing), TileState::Active);
    }

    #[test]
    fn test_repeat_update_is_quiet() {
        let mut lod = controller();
        let viewer = DVec3::new(10.0, 40.0, 100.0);
        lod.update(viewer).unwrap();
        let update = lod.update(viewer).unwrap();
        assert!(update.is_empty(), "{update:?}");
    }

    #[test]
    fn test_descent_changes_depth_and_retires_old_tiles() {
        let mut lod = controller();
        let first = lod.update(DVec3::new(0.0, 0.0, 1_000.0)).unwrap();
        let second = lod.update(DVec3::new(0.0, 0.0, 40.0)).unwrap();
        assert_eq!(second.depth, 4);
        for t in &first.spawned {
            assert!(second.retired.contains(t), "{t} left over from depth 0");
        }
        assert!(lod.active_tiles().iter().all(|t| t.depth == 4));
        assert!(lod.builder().registry().is_built(4));
    }

    #[test]
    fn test_moving_viewer_hides_then_reactivates() {
        let mut lod = controller();
        let depth_three = DVec3::new(0.0, 0.0, 60.0);
        let start = lod.update(depth_three).unwrap();
        assert_eq!(start.depth, 3);
        let origin = start.facing.unwrap();

        // Step to a tile two hops away so part of the old ring is hidden.
        let target = origin.neighbors()[0].neighbors()[1];
        let target = if target == origin { origin.neighbors()[0].neighbors()[2] } else { target };
        let viewer = target.center_direction() * 60.0;
        let moved = lod.update(viewer).unwrap();
        assert_eq!(moved.facing, Some(target));
        assert!(!moved.hidden.is_empty(), "{moved:?}");
        for t in &moved.hidden {
            assert_eq!(lod.state(t), TileState::Hidden);
        }

        let back = lod.update(depth_three).unwrap();
        assert!(!back.reactivated.is_empty(), "{back:?}");
        for t in &back.reactivated {
            assert_eq!(lod.state(t), TileState::Active);
        }
    }

    #[test]
    fn test_spawn_tile_is_idempotent() {
        let mut lod = controller();
        lod.set_depth(2).unwrap();
        let tile = TileId::new(5, 2, 1, 2);
        let a = lod.spawn_tile(tile).unwrap();
        let b = lod.spawn_tile(tile).unwrap();
        assert_eq!(a, b);
        assert_eq!(lod.scene().spawned.len(), 1);
    }

    #[test]
    fn test_hide_and_reactivate_keep_handle() {
        let mut lod = controller();
        lod.set_depth(1).unwrap();
        let tile = TileId::new(0, 1, 1, 1);
        let handle = lod.spawn_tile(tile).unwrap();
        assert!(lod.hide_tile(&tile));
        assert!(!lod.hide_tile(&tile));
        assert_eq!(lod.state(&tile), TileState::Hidden);
        assert_eq!(lod.scene().visible[&handle], false);

        assert_eq!(lod.spawn_tile(tile).unwrap(), handle);
        assert_eq!(lod.state(&tile), TileState::Active);
        assert_eq!(lod.scene().visible[&handle], true);
    }

    #[test]
    fn test_retire_then_respawn_gets_new_handle() {
        let mut lod = controller();
        lod.set_depth(1).unwrap();
        let tile = TileId::new(2, 1, 0, 1);
        let first = lod.spawn_tile(tile).unwrap();
        assert!(lod.retire_tile(&tile));
        assert!(!lod.retire_tile(&tile));
        assert_eq!(lod.state(&tile), TileState::Retired);
        assert_eq!(lod.scene().retired, vec![first]);

        let second = lod.spawn_tile(tile).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_set_depth_allows_immediate_spawn() {
        let mut lod = controller();
        let tile = TileId::new(8, 3, 2, 2);
        assert!(matches!(
            lod.spawn_tile(tile),
            Err(LodError::Mesh(MeshBuildError::MissingRegistryEntry(_)))
        ));
        lod.set_depth(3).unwrap();
        assert!(lod.spawn_tile(tile).is_ok());
    }

    #[test]
    fn test_set_depth_rejects_out_of_range() {
        let mut lod = controller();
        assert_eq!(
            lod.set_depth(5),
            Err(LodError::DepthOutOfRange { depth: 5, max: 4 })
        );
        assert_eq!(lod.depth(), None);
    }

    #[test]
    fn test_retired_records_pruned_on_depth_change() {
        let mut lod = controller();
        lod.set_depth(1).unwrap();
        let tile = TileId::new(0, 1, 0, 0);
        lod.spawn_tile(tile).unwrap();
        lod.retire_tile(&tile);
        assert_eq!(lod.state(&tile), TileState::Retired);
        lod.set_depth(2).unwrap();
        assert_eq!(lod.state(&tile), TileState::Unbuilt);
    }

    #[test]
    fn test_prepare_tile_builds_without_spawning() {
        let mut lod = controller();
        lod.set_depth(2).unwrap();
        let tile = TileId::new(1, 2, 0, 0);
        assert_eq!(lod.prepare_tile(tile).unwrap(), TileState::Built);
        assert!(lod.scene().spawned.is_empty());
        assert!(lod.builder().cache().contains(&tile, 16));

        lod.spawn_tile(tile).unwrap();
        assert_eq!(lod.prepare_tile(tile).unwrap(), TileState::Active);
    }

    #[test]
    fn test_built_records_of_old_depths_are_pruned() {
        let mut lod = controller();
        lod.set_depth(1).unwrap();
        let old = TileId::new(2, 1, 1, 0);
        lod.prepare_tile(old).unwrap();

        lod.set_depth(2).unwrap();
        let current = TileId::new(2, 2, 1, 0);
        lod.prepare_tile(current).unwrap();
        assert_eq!(lod.state(&old), TileState::Unbuilt);
        assert_eq!(lod.state(&current), TileState::Built);

        lod.set_depth(2).unwrap();
        assert_eq!(lod.state(&current), TileState::Built, "same depth keeps built tiles");
        lod.set_depth(3).unwrap();
        assert_eq!(lod.state(&current), TileState::Unbuilt);
        assert!(lod.scene().spawned.is_empty());
    }

    #[test]
    fn test_update_depth_follows_selector_thresholds() {
        let mut lod = controller();
        let thresholds = lod.selector().thresholds();
        assert_eq!(thresholds.len(), 4);
        for (i, &t) in thresholds.iter().enumerate() {
            let update = lod.update(DVec3::new(0.0, t - 1e-6, 0.0)).unwrap();
            assert_eq!(update.depth, i as u8 + 1);
            assert_eq!(lod.depth(), Some(i as u8 + 1));
        }
    }

    #[test]
    #[should_panic(expected = "must exceed")]
    fn test_inverted_distance_band_panics() {
        let builder = controller().builder().clone();
        let config = LodConfig {
            min_distance: 100.0,
            max_distance: 50.0,
            ..config()
        };
        let _ = TileLodController::new(config, builder, RecordingScene::default());
    }
}
