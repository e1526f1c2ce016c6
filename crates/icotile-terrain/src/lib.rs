//! Terrain height sampling for icosphere tiles: the provider contract, a
//! simplex fBm provider, and a flat provider.

mod fbm;
mod provider;

pub use fbm::{FbmHeightProvider, FbmParams};
pub use provider::{FlatHeightProvider, HeightProvider, resolve_height_provider};
