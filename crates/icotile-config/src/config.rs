//! Configuration structs with defaults, validation and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Deepest depth whose registry table stays in memory comfortably.
///
/// The registry precomputes `20 * 4^depth` entries per depth; depth 8 is
/// about 1.3M entries (under 200 MB), depth 12 would be 335M.
pub const MAX_REGISTRY_DEPTH: u8 = 8;

/// Largest lattice resolution the mesh builder accepts.
const MAX_SUPPORTED_RESOLUTION: u64 = 1 << 13;

/// Platform config directory for the pipeline, e.g. `~/.config/icotile`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("icotile"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Planet placement and surface scale.
    pub planet: PlanetConfig,
    /// Terrain noise settings.
    pub terrain: TerrainConfig,
    /// Level-of-detail settings.
    pub lod: LodSettings,
    /// Viewer fly-down used by the headless demo.
    pub simulation: SimulationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Planet configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    /// Base sphere radius in world units.
    pub radius: f64,
    /// Planet center in world space.
    pub center: [f64; 3],
    /// Multiplier applied to terrain height samples.
    pub height_scale: f64,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius: 30.0,
            center: [0.0, 0.0, 0.0],
            height_scale: 1.0,
        }
    }
}

/// Terrain noise configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Use a perfectly smooth sphere instead of noise.
    pub flat: bool,
    /// Noise seed.
    pub seed: u32,
    /// Number of fBm octaves.
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency of the first octave over the unit sphere.
    pub frequency: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            flat: false,
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 1.5,
        }
    }
}

/// How tile vertex normals are computed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum NormalModeSetting {
    /// Radial direction of each vertex.
    #[default]
    Radial,
    /// Area-weighted triangle normals.
    Recalculated,
}

/// Level-of-detail configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodSettings {
    /// Distance from the planet center at which the deepest depth applies.
    pub min_distance: f64,
    /// Distance from the planet center beyond which depth 0 applies.
    pub max_distance: f64,
    /// Deepest subdivision depth.
    pub max_depth: u8,
    /// Lattice resolution at depth 0; doubles per depth.
    pub base_resolution: u32,
    /// Edge hops around the facing tile that stay active.
    pub ring_radius: u32,
    /// Extra hops within which tiles are hidden rather than retired.
    pub hidden_margin: u32,
    /// Vertex normal mode.
    pub normal_mode: NormalModeSetting,
}

impl Default for LodSettings {
    fn default() -> Self {
        Self {
            min_distance: 35.0,
            max_distance: 300.0,
            max_depth: 5,
            base_resolution: 8,
            ring_radius: 2,
            hidden_margin: 1,
            normal_mode: NormalModeSetting::Radial,
        }
    }
}

/// Scripted viewer path for the headless demo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of simulated frames.
    pub steps: u32,
    /// Starting distance from the planet center.
    pub start_distance: f64,
    /// Final distance from the planet center.
    pub end_distance: f64,
    /// Total orbit swept during the descent, in degrees.
    pub orbit_degrees: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: 120,
            start_distance: 400.0,
            end_distance: 36.0,
            orbit_degrees: 90.0,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Check shared tile edges for gaps after the simulation.
    pub seam_audit: bool,
    /// Write JSON logs next to the config file.
    pub file_logging: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            seam_audit: true,
            file_logging: false,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Re-read the file; returns `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.planet.radius.is_finite() && self.planet.radius > 0.0) {
            return Err(invalid("planet.radius", "must be a positive finite number"));
        }
        if !self.planet.center.iter().all(|c| c.is_finite()) {
            return Err(invalid("planet.center", "components must be finite"));
        }
        if !self.planet.height_scale.is_finite() {
            return Err(invalid("planet.height_scale", "must be finite"));
        }
        if self.lod.max_distance <= self.lod.min_distance {
            return Err(invalid(
                "lod.max_distance",
                format!(
                    "{} must exceed lod.min_distance {}",
                    self.lod.max_distance, self.lod.min_distance
                ),
            ));
        }
        if self.lod.max_depth > MAX_REGISTRY_DEPTH {
            let tiles = 20u64 << (2 * u32::from(self.lod.max_depth.min(31)));
            return Err(invalid(
                "lod.max_depth",
                format!(
                    "{} exceeds {MAX_REGISTRY_DEPTH}; the tile registry would precompute \
                     {tiles} entries for that depth",
                    self.lod.max_depth
                ),
            ));
        }
        if self.lod.base_resolution < 2 {
            return Err(invalid("lod.base_resolution", "must be at least 2"));
        }
        let deepest = u64::from(self.lod.base_resolution) << self.lod.max_depth;
        if deepest > MAX_SUPPORTED_RESOLUTION {
            return Err(invalid(
                "lod.base_resolution",
                format!(
                    "resolution {deepest} at depth {} exceeds {MAX_SUPPORTED_RESOLUTION}",
                    self.lod.max_depth
                ),
            ));
        }
        Ok(())
    }
}
