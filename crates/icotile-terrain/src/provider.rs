//! The height provider contract.

use std::sync::Arc;

use glam::DVec3;
use tracing::warn;

use crate::FbmHeightProvider;

/// Samples terrain height for a direction on the unit sphere.
///
/// Implementations must be pure: the same direction always yields the same
/// value, and `resolution` must not change the result. Returned values are
/// multiplied by the mesh builder's height scale.
pub trait HeightProvider: Send + Sync {
    /// Height at the unit `direction`.
    ///
    /// `resolution` is the lattice resolution of the requesting mesh and is
    /// informational only.
    fn sample(&self, direction: DVec3, resolution: u32) -> f64;
}

/// A provider that always returns zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatHeightProvider;

impl HeightProvider for FlatHeightProvider {
    fn sample(&self, _direction: DVec3, _resolution: u32) -> f64 {
        0.0
    }
}

/// Use `provider` if given, otherwise fall back to the default fBm field.
pub fn resolve_height_provider(
    provider: Option<Arc<dyn HeightProvider>>,
) -> Arc<dyn HeightProvider> {
    match provider {
        Some(p) => p,
        None => {
            warn!("No height provider configured, falling back to default fBm terrain");
            Arc::new(FbmHeightProvider::default())
        }
    }
}
