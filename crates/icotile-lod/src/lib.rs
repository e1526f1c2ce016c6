//! Level-of-detail management for icosphere tiles: distance-based depth
//! selection, viewer-facing tile lookup, k-ring neighbourhoods, and the tile
//! lifecycle controller.

mod controller;
mod ring;
mod scene;
mod selector;

pub use controller::{LodConfig, LodError, LodUpdate, TileLodController, TileState};
pub use ring::{k_ring, k_ring_layers};
pub use scene::TileScene;
pub use selector::{DepthSelector, depth_from_distance, resolution_for_depth, tile_from_direction};
