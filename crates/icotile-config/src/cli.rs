//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "icotile", about = "Icosphere tile LOD pipeline")]
pub struct CliArgs {
    /// Planet radius.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Terrain height multiplier.
    #[arg(long)]
    pub height_scale: Option<f64>,

    /// Terrain noise seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Use a smooth sphere without terrain noise.
    #[arg(long)]
    pub flat: bool,

    /// Deepest subdivision depth.
    #[arg(long)]
    pub max_depth: Option<u8>,

    /// Lattice resolution at depth 0.
    #[arg(long)]
    pub base_resolution: Option<u32>,

    /// Edge hops kept active around the viewer.
    #[arg(long)]
    pub ring_radius: Option<u32>,

    /// Number of simulated frames.
    #[arg(long)]
    pub steps: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(r) = args.radius {
            self.planet.radius = r;
        }
        if let Some(s) = args.height_scale {
            self.planet.height_scale = s;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if args.flat {
            self.terrain.flat = true;
        }
        if let Some(d) = args.max_depth {
            self.lod.max_depth = d;
        }
        if let Some(res) = args.base_resolution {
            self.lod.base_resolution = res;
        }
        if let Some(k) = args.ring_radius {
            self.lod.ring_radius = k;
        }
        if let Some(steps) = args.steps {
            self.simulation.steps = steps;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            radius: Some(6_371.0),
            max_depth: Some(3),
            flat: true,
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.planet.radius, 6_371.0);
        assert_eq!(config.lod.max_depth, 3);
        assert!(config.terrain.flat);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.lod.base_resolution, 8);
        assert_eq!(config.terrain.seed, 0);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_from_args() {
        let args = CliArgs::parse_from(["icotile", "--seed", "7", "--steps", "10", "--flat"]);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.steps, Some(10));
        assert!(args.flat);
        assert!(args.config.is_none());
    }
}
