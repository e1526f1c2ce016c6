//! Gap check along shared edges of neighbouring tile meshes.

use std::collections::HashMap;
use std::sync::Arc;

use glam::DVec3;
use icotile_mesh::TileMesh;
use icotile_sphere::{TileId, lattice_index};

/// Outcome of [`audit_seams`].
#[derive(Debug, Default)]
pub(crate) struct SeamReport {
    /// Adjacent pairs whose meshes were compared.
    pub(crate) pairs_checked: usize,
    /// Pairs whose shared edge did not line up.
    pub(crate) mismatched: Vec<(TileId, TileId)>,
    /// Largest distance between matched boundary vertices.
    pub(crate) max_gap: f64,
}

fn boundary_positions(mesh: &TileMesh) -> Vec<DVec3> {
    let res = mesh.resolution;
    let last = res - 1;
    let mut out = Vec::with_capacity(3 * last as usize);
    for j in 0..res {
        for i in 0..res - j {
            if i == 0 || j == 0 || i + j == last {
                out.push(mesh.world_position(lattice_index(i, j, res)));
            }
        }
    }
    out
}

/// Compare every adjacent pair in `meshes`.
///
/// Two same-resolution neighbours share one edge of `resolution` vertices.
/// A pair passes when exactly that many boundary vertices of one mesh have a
/// partner on the other within `tolerance`.
pub(crate) fn audit_seams(meshes: &HashMap<TileId, Arc<TileMesh>>, tolerance: f64) -> SeamReport {
    let boundaries: HashMap<TileId, Vec<DVec3>> = meshes
        .iter()
        .map(|(tile, mesh)| (*tile, boundary_positions(mesh)))
        .collect();

    let mut tiles: Vec<TileId> = meshes.keys().copied().collect();
    tiles.sort_unstable();

    let mut report = SeamReport::default();
    for tile in &tiles {
        for neighbor in tile.neighbors() {
            if neighbor <= *tile {
                continue;
            }
            let (Some(a), Some(b)) = (meshes.get(tile), meshes.get(&neighbor)) else {
                continue;
            };
            if a.resolution != b.resolution {
                continue;
            }
            report.pairs_checked += 1;

            let mut matched = 0;
            for p in &boundaries[tile] {
                let nearest = boundaries[&neighbor]
                    .iter()
                    .map(|q| p.distance(*q))
                    .fold(f64::INFINITY, f64::min);
                if nearest <= tolerance {
                    matched += 1;
                    report.max_gap = report.max_gap.max(nearest);
                }
            }
            if matched != a.resolution as usize {
                report.mismatched.push((*tile, neighbor));
            }
        }
    }
    report
}
