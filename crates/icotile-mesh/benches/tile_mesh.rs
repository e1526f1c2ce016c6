use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glam::DVec3;
use icotile_mesh::{MeshBuilderConfig, MeshCache, NormalMode, TileMeshBuilder};
use icotile_sphere::{TileId, TileRegistry};
use icotile_terrain::FbmHeightProvider;

fn builder(normal_mode: NormalMode) -> TileMeshBuilder {
    let registry = Arc::new(TileRegistry::new());
    registry.build(3, 6_371_000.0, DVec3::ZERO);
    TileMeshBuilder::new(
        registry,
        Some(Arc::new(FbmHeightProvider::default())),
        Arc::new(MeshCache::new()),
        MeshBuilderConfig {
            height_scale: 8_000.0,
            normal_mode,
        },
    )
}

fn bench_generate(c: &mut Criterion) {
    let builder = builder(NormalMode::Radial);
    let tile = TileId::new(7, 3, 5, 4);
    let mut group = c.benchmark_group("tile_mesh_generate");
    for resolution in [9u32, 33, 65] {
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &resolution,
            |b, &res| b.iter(|| black_box(builder.generate(tile, res))),
        );
    }
    group.finish();
}

fn bench_recalculated_normals(c: &mut Criterion) {
    let builder = builder(NormalMode::Recalculated);
    let tile = TileId::new(7, 3, 2, 1);
    c.bench_function("tile_mesh_generate_recalculated_33", |b| {
        b.iter(|| black_box(builder.generate(tile, 33)))
    });
}

fn bench_cached_build(c: &mut Criterion) {
    let builder = builder(NormalMode::Radial);
    let tile = TileId::new(0, 3, 0, 0);
    let _ = builder.build(tile, 33);
    c.bench_function("tile_mesh_cache_hit", |b| {
        b.iter(|| black_box(builder.build(tile, 33)))
    });
}

fn bench_registry_build(c: &mut Criterion) {
    c.bench_function("tile_registry_build_depth_4", |b| {
        b.iter(|| {
            let registry = TileRegistry::new();
            black_box(registry.build(4, 1.0, DVec3::ZERO))
        })
    });
}

criterion_group!(
    benches,
    bench_generate,
    bench_recalculated_normals,
    bench_cached_build,
    bench_registry_build
);
criterion_main!(benches);
