//! Configuration for the icosphere tile pipeline.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line. Missing fields fall back to defaults, so older files keep
//! loading as new settings are added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, LodSettings, MAX_REGISTRY_DEPTH, NormalModeSetting, PlanetConfig,
    SimulationConfig, TerrainConfig, default_config_dir,
};
pub use error::ConfigError;
