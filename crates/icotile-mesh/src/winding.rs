//! Triangulation of the tile lattice and outward winding enforcement.
//!
//! Upright tiles map the lattice onto the face without changing handedness,
//! but inverted tiles are mirrored, so their lattice triangles come out
//! wound inward. Every triangle is checked against the radial direction
//! instead of trusting the tile orientation.

use glam::DVec3;
use icotile_sphere::lattice_index;

/// Below this ratio of `|normal|` to the product of the two edge lengths a
/// triangle is treated as degenerate and judged on undisplaced directions.
pub const DEGENERATE_EPSILON: f64 = 1e-10;

/// Index list for the triangular lattice of `resolution`.
///
/// Emits `(resolution - 1)^2` triangles in lattice orientation: each cell
/// contributes `(i,j) (i+1,j) (i,j+1)` and, when it exists, the mirrored
/// `(i+1,j) (i+1,j+1) (i,j+1)`.
pub fn lattice_triangles(resolution: u32) -> Vec<u32> {
    if resolution < 2 {
        return Vec::new();
    }
    let cells = (resolution - 1) as usize;
    let mut indices = Vec::with_capacity(cells * cells * 3);
    let idx = |i: u32, j: u32| lattice_index(i, j, resolution) as u32;

    for j in 0..resolution - 1 {
        for i in 0..resolution - 1 - j {
            indices.extend_from_slice(&[idx(i, j), idx(i + 1, j), idx(i, j + 1)]);
            if i + j < resolution - 2 {
                indices.extend_from_slice(&[idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }
    }
    indices
}

/// Whether `v0 v1 v2` is counter-clockwise when seen from `outward`.
pub fn triangle_winds_outward(v0: DVec3, v1: DVec3, v2: DVec3, outward: DVec3) -> bool {
    (v1 - v0).cross(v2 - v0).dot(outward) > 0.0
}

fn is_degenerate(v0: DVec3, v1: DVec3, v2: DVec3) -> bool {
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let scale = e1.length() * e2.length();
    scale == 0.0 || e1.cross(e2).length() <= DEGENERATE_EPSILON * scale
}

/// Reorder triangles in place so each faces away from the planet.
///
/// `positions` are the displaced vertices in any common frame and
/// `directions` the unit sphere directions of the same vertices. Returns the
/// number of triangles that were flipped.
pub fn enforce_outward_winding(indices: &mut [u32], positions: &[DVec3], directions: &[DVec3]) -> usize {
    let mut flipped = 0;
    for tri in indices.chunks_exact_mut(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let outward = directions[a] + directions[b] + directions[c];

        let (p0, p1, p2) = (positions[a], positions[b], positions[c]);
        let outward_facing = if is_degenerate(p0, p1, p2) {
            triangle_winds_outward(directions[a], directions[b], directions[c], outward)
        } else {
            triangle_winds_outward(p0, p1, p2, outward)
        };

        if !outward_facing {
            tri.swap(1, 2);
            flipped += 1;
        }
    }
    flipped
}
