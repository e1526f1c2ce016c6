//! Per-vertex normals.

use glam::DVec3;

/// How vertex normals are derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalMode {
    /// The unit sphere direction of each vertex.
    #[default]
    Radial,
    /// Area-weighted average of the adjacent triangle normals.
    ///
    /// Vertices with no usable triangle fall back to the radial direction.
    Recalculated,
}

/// Compute unit normals for outward-wound `indices`.
pub fn compute_normals(
    mode: NormalMode,
    positions: &[DVec3],
    directions: &[DVec3],
    indices: &[u32],
) -> Vec<DVec3> {
    match mode {
        NormalMode::Radial => directions.to_vec(),
        NormalMode::Recalculated => {
            let mut acc = vec![DVec3::ZERO; positions.len()];
            for tri in indices.chunks_exact(3) {
                let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
                // Unnormalized cross product: its length is twice the area.
                let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
                acc[a] += n;
                acc[b] += n;
                acc[c] += n;
            }
            acc.iter()
                .zip(directions)
                .map(|(n, &d)| n.try_normalize().unwrap_or(d))
                .collect()
        }
    }
}
