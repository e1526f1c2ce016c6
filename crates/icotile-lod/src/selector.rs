//! Distance-based depth selection and viewer-facing tile lookup.

use glam::DVec3;
use icotile_sphere::{
    Barycentric, MAX_DEPTH, TileId, barycentric_from_direction, face_from_direction,
};

/// Subdivision depth for a viewer `distance` from the planet center.
///
/// Threshold `n` is `min_distance + (max_distance - min_distance) / 2^n` for
/// `n` in `1..=max_depth`. The result is the largest `n` whose threshold the
/// distance is strictly below, or 0 if there is none. Depth never decreases
/// as the distance shrinks.
#[must_use]
pub fn depth_from_distance(distance: f64, min_distance: f64, max_distance: f64, max_depth: u8) -> u8 {
    let span = max_distance - min_distance;
    let mut depth = 0;
    let mut divisor = 1.0;
    for n in 1..=max_depth.min(MAX_DEPTH) {
        divisor *= 2.0;
        if distance < min_distance + span / divisor {
            depth = n;
        } else {
            break;
        }
    }
    depth
}

/// Lattice resolution for tiles at `depth`: `base_resolution << depth`.
///
/// Saturates at `u32::MAX`; the mesh builder rejects resolutions it cannot
/// mesh.
#[must_use]
pub fn resolution_for_depth(base_resolution: u32, depth: u8) -> u32 {
    let shifted = u64::from(base_resolution) << depth.min(MAX_DEPTH);
    u32::try_from(shifted).unwrap_or(u32::MAX)
}

/// The tile at `depth` under a unit `direction` from the planet center.
///
/// Degenerate directions resolve to the centroid tile of face 0.
#[must_use]
pub fn tile_from_direction(direction: DVec3, depth: u8) -> TileId {
    let face = face_from_direction(direction);
    let bary = barycentric_from_direction(face, direction)
        .unwrap_or(Barycentric::new(1.0 / 3.0, 1.0 / 3.0));
    TileId::containing(face, depth, bary)
}

/// Selects a depth from the viewer's distance to the planet center.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthSelector {
    min_distance: f64,
    max_distance: f64,
    max_depth: u8,
}

impl DepthSelector {
    /// Create a selector.
    ///
    /// # Panics
    ///
    /// Panics if `max_distance <= min_distance` or `max_depth > MAX_DEPTH`.
    pub fn new(min_distance: f64, max_distance: f64, max_depth: u8) -> Self {
        assert!(
            max_distance > min_distance,
            "max_distance {max_distance} must exceed min_distance {min_distance}"
        );
        assert!(max_depth <= MAX_DEPTH, "max_depth {max_depth} exceeds {MAX_DEPTH}");
        Self {
            min_distance,
            max_distance,
            max_depth,
        }
    }

    /// Depth for `distance`; see [`depth_from_distance`].
    pub fn select_depth(&self, distance: f64) -> u8 {
        depth_from_distance(distance, self.min_distance, self.max_distance, self.max_depth)
    }

    /// Threshold distances for depths `1..=max_depth`, descending.
    pub fn thresholds(&self) -> Vec<f64> {
        let span = self.max_distance - self.min_distance;
        (1..=self.max_depth)
            .map(|n| self.min_distance + span / f64::from(1u32 << n))
            .collect()
    }

    /// Deepest depth this selector returns.
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }
}
