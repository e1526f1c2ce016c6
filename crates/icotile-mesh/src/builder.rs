//! Tile mesh construction.
//!
//! For every lattice point the builder takes the face barycentric, turns it
//! into a unit direction, samples the height provider, and places the vertex
//! at `center + direction * (radius + height * height_scale)`. Vertices are
//! stored relative to the registry's `center_world` for the tile.

use std::sync::Arc;

use glam::DVec3;
use icotile_sphere::{
    TileId, TileRegistry, lattice_vertex_count, local_to_global_lattice, tile_vertex_barys,
};
use icotile_terrain::{HeightProvider, resolve_height_provider};
use tracing::{debug, trace, warn};

use crate::normals::{NormalMode, compute_normals};
use crate::winding::{enforce_outward_winding, lattice_triangles};
use crate::{MeshBuildError, MeshCache, TileMesh};

/// Largest supported lattice resolution.
pub const MAX_RESOLUTION: u32 = 1 << 13;

/// Allowed distance between a tile's registry center and a freshly computed
/// centroid, as a fraction of the planet radius.
pub const CENTER_TOLERANCE: f64 = 1e-9;

/// Tunables for [`TileMeshBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBuilderConfig {
    /// Multiplier applied to every provider sample.
    pub height_scale: f64,
    /// How vertex normals are derived.
    pub normal_mode: NormalMode,
}

impl Default for MeshBuilderConfig {
    fn default() -> Self {
        Self {
            height_scale: 1.0,
            normal_mode: NormalMode::Radial,
        }
    }
}

/// Builds and caches tile meshes.
///
/// Planet radius and center come from the registry table of the tile's
/// depth, so every builder sharing a registry agrees on placement.
#[derive(Clone)]
pub struct TileMeshBuilder {
    registry: Arc<TileRegistry>,
    height: Arc<dyn HeightProvider>,
    cache: Arc<MeshCache>,
    config: MeshBuilderConfig,
}

impl TileMeshBuilder {
    /// Create a builder over shared registry and cache.
    ///
    /// Without a height provider the default fBm terrain is used.
    pub fn new(
        registry: Arc<TileRegistry>,
        height: Option<Arc<dyn HeightProvider>>,
        cache: Arc<MeshCache>,
        config: MeshBuilderConfig,
    ) -> Self {
        Self {
            registry,
            height: resolve_height_provider(height),
            cache,
            config,
        }
    }

    /// The registry this builder reads tile placement from.
    pub fn registry(&self) -> &Arc<TileRegistry> {
        &self.registry
    }

    /// The cache built meshes are stored in.
    pub fn cache(&self) -> &Arc<MeshCache> {
        &self.cache
    }

    /// Builder settings.
    pub fn config(&self) -> &MeshBuilderConfig {
        &self.config
    }

    /// Mesh for `tile` at `resolution`, from the cache when available.
    ///
    /// A cached mesh whose `center_world` no longer matches the registry
    /// (its depth was rebuilt for another placement) is regenerated.
    ///
    /// # Errors
    ///
    /// Returns [`MeshBuildError::InvalidResolution`] when `resolution` is
    /// outside `2..=MAX_RESOLUTION`, and
    /// [`MeshBuildError::MissingRegistryEntry`] when the tile's depth has not
    /// been built in the registry.
    pub fn build(&self, tile: TileId, resolution: u32) -> Result<Arc<TileMesh>, MeshBuildError> {
        validate_resolution(resolution)?;
        let entry = self
            .registry
            .entry(&tile)
            .ok_or(MeshBuildError::MissingRegistryEntry(tile))?;
        if let Some(mesh) = self.cache.get(&tile, resolution) {
            if mesh.center_world == entry.center_world {
                trace!("Mesh cache hit for {tile} @ {resolution}");
                return Ok(mesh);
            }
            debug!("Cached mesh for {tile} @ {resolution} predates a registry rebuild");
        }
        let mesh = self.generate(tile, resolution)?;
        Ok(self.cache.insert_or_refresh(mesh))
    }

    /// Build a mesh without consulting or filling the cache.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn generate(&self, tile: TileId, resolution: u32) -> Result<TileMesh, MeshBuildError> {
        validate_resolution(resolution)?;
        let table = self
            .registry
            .depth_table(tile.depth)
            .ok_or(MeshBuildError::MissingRegistryEntry(tile))?;
        let entry = *table
            .get(&tile)
            .ok_or(MeshBuildError::MissingRegistryEntry(tile))?;
        let planet = table.placement();

        let fresh_center = planet.center + tile.center_direction() * planet.radius;
        let deviation = (fresh_center - entry.center_world).length();
        if deviation > CENTER_TOLERANCE * planet.radius {
            warn!(
                "Registry center of {tile} deviates from its centroid by {deviation:.3e}; using registry center"
            );
        }

        let count = lattice_vertex_count(resolution);
        let mut positions = Vec::with_capacity(count);
        let mut barycentrics = Vec::with_capacity(count);
        let mut directions = Vec::with_capacity(count);

        for local in tile_vertex_barys(resolution) {
            let point = local_to_global_lattice(&tile, local, resolution);
            let direction = point.direction();
            let height = self.height.sample(direction, resolution) * self.config.height_scale;
            let world = planet.center + direction * (planet.radius + height);

            positions.push(world - entry.center_world);
            barycentrics.push(point.barycentric());
            directions.push(direction);
        }

        let mut indices = lattice_triangles(resolution);
        let flipped = enforce_outward_winding(&mut indices, &positions, &directions);
        let normals = compute_normals(self.config.normal_mode, &positions, &directions, &indices);

        debug!(
            "Built mesh for {tile} @ {resolution}: {} vertices, {} triangles ({flipped} rewound)",
            positions.len(),
            indices.len() / 3
        );

        Ok(TileMesh {
            tile,
            resolution,
            center_world: entry.center_world,
            positions,
            barycentrics,
            directions,
            normals,
            indices,
        })
    }
}

fn validate_resolution(resolution: u32) -> Result<(), MeshBuildError> {
    if (2..=MAX_RESOLUTION).contains(&resolution) {
        Ok(())
    } else {
        Err(MeshBuildError::InvalidResolution(resolution))
    }
}
