//! Tile neighbourhoods by edge hops.

use std::collections::HashSet;

use icotile_sphere::TileId;

/// Tiles within `k` edge hops of `center`, grouped by hop count.
///
/// Layer 0 is `[center]`. Each layer is sorted, so the result is
/// reproducible. Hops cross face edges like any other edge.
pub fn k_ring_layers(center: TileId, k: u32) -> Vec<Vec<TileId>> {
    let mut seen = HashSet::from([center]);
    let mut layers = vec![vec![center]];

    for _ in 0..k {
        let Some(frontier) = layers.last() else {
            break;
        };
        let mut next: Vec<TileId> = frontier
            .iter()
            .flat_map(|t| t.neighbors())
            .filter(|n| seen.insert(*n))
            .collect();
        if next.is_empty() {
            break;
        }
        next.sort_unstable();
        layers.push(next);
    }
    layers
}

/// Every tile within `k` edge hops of `center`, including `center`.
pub fn k_ring(center: TileId, k: u32) -> HashSet<TileId> {
    k_ring_layers(center, k).into_iter().flatten().collect()
}
