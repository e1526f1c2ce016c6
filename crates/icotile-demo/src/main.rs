//! Headless driver for the icosphere tile pipeline.
//!
//! Flies a viewer from orbit down to the surface, letting the LOD controller
//! spawn, hide and retire tiles, then checks the visible tiles for seams.
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags:
//!
//! ```text
//! cargo run -p icotile-demo -- --max-depth 4 --steps 60 --flat
//! ```

mod audit;
mod flight;
mod scene;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::DVec3;
use icotile_config::{CliArgs, Config, ConfigError, NormalModeSetting, default_config_dir};
use icotile_lod::{
    LodConfig, LodError, TileLodController, depth_from_distance, k_ring, resolution_for_depth,
    tile_from_direction,
};
use icotile_mesh::{
    AsyncTileMesher, MeshBuilderConfig, MeshCache, MeshRequest, NormalMode, TileMeshBuilder,
};
use icotile_sphere::TileRegistry;
use icotile_terrain::{FbmHeightProvider, FbmParams, FlatHeightProvider, HeightProvider};
use tracing::{debug, info, warn};

use crate::audit::audit_seams;
use crate::flight::Flight;
use crate::scene::HeadlessScene;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lod(#[from] LodError),

    #[error("failed to start mesh workers: {0}")]
    Workers(#[source] std::io::Error),

    #[error("{0} tile pairs have gaps along their shared edge")]
    Seams(usize),
}

fn lod_config(config: &Config) -> LodConfig {
    let [x, y, z] = config.planet.center;
    LodConfig {
        planet_center: DVec3::new(x, y, z),
        planet_radius: config.planet.radius,
        min_distance: config.lod.min_distance,
        max_distance: config.lod.max_distance,
        max_depth: config.lod.max_depth,
        base_resolution: config.lod.base_resolution,
        ring_radius: config.lod.ring_radius,
        hidden_margin: config.lod.hidden_margin,
    }
}

fn height_provider(config: &Config) -> Arc<dyn HeightProvider> {
    if config.terrain.flat {
        return Arc::new(FlatHeightProvider);
    }
    Arc::new(FbmHeightProvider::new(FbmParams {
        seed: config.terrain.seed,
        octaves: config.terrain.octaves,
        lacunarity: config.terrain.lacunarity,
        persistence: config.terrain.persistence,
        frequency: config.terrain.frequency,
    }))
}

fn mesh_builder(config: &Config) -> TileMeshBuilder {
    let normal_mode = match config.lod.normal_mode {
        NormalModeSetting::Radial => NormalMode::Radial,
        NormalModeSetting::Recalculated => NormalMode::Recalculated,
    };
    TileMeshBuilder::new(
        Arc::new(TileRegistry::new()),
        Some(height_provider(config)),
        Arc::new(MeshCache::new()),
        MeshBuilderConfig {
            height_scale: config.planet.height_scale,
            normal_mode,
        },
    )
}

/// Mesh the ring around the flight's final position on worker threads so the
/// last frames find their tiles cached.
fn prefetch_landing(
    builder: &TileMeshBuilder,
    lod: &LodConfig,
    landing: DVec3,
) -> Result<(), DemoError> {
    let offset = landing - lod.planet_center;
    let depth = depth_from_distance(
        offset.length(),
        lod.min_distance,
        lod.max_distance,
        lod.max_depth,
    );
    builder
        .registry()
        .build(depth, lod.planet_radius, lod.planet_center);
    let resolution = resolution_for_depth(lod.base_resolution, depth);
    let facing = tile_from_direction(offset.normalize_or_zero(), depth);

    let mut mesher = AsyncTileMesher::with_defaults(builder.clone()).map_err(DemoError::Workers)?;
    let mut submitted = 0;
    for tile in k_ring(facing, lod.ring_radius) {
        match mesher.submit(MeshRequest { tile, resolution }) {
            Ok(()) => submitted += 1,
            Err(rejected) => debug!("Prefetch queue full, skipping {}", rejected.tile),
        }
    }

    let start = Instant::now();
    let mut received = 0;
    let mut total_build_us = 0;
    while received < submitted {
        // Workers send before decrementing, so an idle pool has nothing left in flight.
        let idle = mesher.in_flight_count() == 0;
        for meshed in mesher.drain_results() {
            received += 1;
            total_build_us += meshed.build_time_us;
            if let Err(e) = meshed.result {
                warn!("Prefetch of {} failed: {e}", meshed.request.tile);
            }
        }
        if idle {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    mesher.shutdown();

    info!(
        "Prefetched {received}/{submitted} tiles around {facing} at depth {depth} \
         in {:.1} ms ({} us of worker time)",
        start.elapsed().as_secs_f64() * 1000.0,
        total_build_us
    );
    Ok(())
}

fn run(config: &Config) -> Result<(), DemoError> {
    let lod = lod_config(config);
    let flight = Flight::new(&config.simulation, lod.planet_center);
    let builder = mesh_builder(config);

    if config.simulation.steps > 0 {
        prefetch_landing(&builder, &lod, flight.position(config.simulation.steps - 1))?;
    }

    let mut controller = TileLodController::new(lod, builder, HeadlessScene::default());
    let start = Instant::now();
    for (step, viewer) in flight.positions().enumerate() {
        let update = controller.update(viewer)?;
        if update.is_empty() {
            continue;
        }
        let (vertices, triangles) = controller.scene().visible_geometry();
        info!(
            step,
            depth = update.depth,
            spawned = update.spawned.len(),
            reactivated = update.reactivated.len(),
            hidden = update.hidden.len(),
            retired = update.retired.len(),
            visible = controller.scene().visible_instances(),
            vertices,
            triangles,
            "LOD changed, facing {}",
            update.facing.map_or_else(|| "-".to_string(), |t| t.to_string())
        );
    }

    let scene = controller.scene();
    info!(
        "Flight finished in {:.1} ms: {} spawned, {} retired, {} live, {} cached meshes, depths built {:?}",
        start.elapsed().as_secs_f64() * 1000.0,
        scene.spawned_total,
        scene.retired_total,
        scene.live_instances(),
        controller.builder().cache().len(),
        controller.builder().registry().built_depths()
    );

    if config.debug.seam_audit {
        let meshes: HashMap<_, _> = controller
            .active_tiles()
            .into_iter()
            .filter_map(|tile| scene.visible_mesh(&tile).map(|mesh| (tile, mesh)))
            .collect();
        let tolerance = 1e-9 * config.planet.radius.max(1.0);
        let report = audit_seams(&meshes, tolerance);
        info!(
            "Seam audit: {} pairs checked, max gap {:.3e}",
            report.pairs_checked, report.max_gap
        );
        if !report.mismatched.is_empty() {
            for (a, b) in &report.mismatched {
                warn!("Gap between {a} and {b}");
            }
            return Err(DemoError::Seams(report.mismatched.len()));
        }
    }
    Ok(())
}

fn main() -> Result<(), DemoError> {
    let args = CliArgs::parse();

    let config_dir: PathBuf = match args.config.clone() {
        Some(dir) => dir,
        None => default_config_dir()?,
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    let file_logging = cfg!(debug_assertions) || config.debug.file_logging;
    icotile_log::init_logging(Some(&log_dir), file_logging, Some(&config));

    config.validate()?;
    info!(
        "Planet radius {} at {:?}, depths 0..={}, base resolution {}",
        config.planet.radius, config.planet.center, config.lod.max_depth, config.lod.base_resolution
    );

    run(&config)
}
