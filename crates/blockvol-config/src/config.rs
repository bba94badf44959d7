//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Shape and palette of the working volume.
    pub volume: VolumeConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Which palette variant a volume is built on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaletteKind {
    /// Ids assigned on first use; single-threaded.
    Local,
    /// Pre-registered ids shared read-only; buffers can cross threads.
    Global,
}

/// How the demo populates a fresh volume.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum FillPattern {
    /// Leave everything as air.
    Empty,
    /// Solid floor of the given height.
    Floor { height: i32 },
    /// Random scatter with the given per-cell probability (0.0 - 1.0).
    Scatter { density: f32 },
}

/// Volume configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeConfig {
    /// Lower corner of the volume.
    pub origin: [i32; 3],
    /// Extent along x, y, z.
    pub size: [i32; 3],
    /// Palette variant.
    pub palette: PaletteKind,
    /// Maximum local palette entries (`None` = full 16-bit id space).
    pub palette_limit: Option<usize>,
    /// Initial contents.
    pub fill: FillPattern,
    /// Seed for randomized fill patterns.
    pub seed: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON logs next to the config file.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            origin: [0, 0, 0],
            size: [16, 16, 16],
            palette: PaletteKind::Local,
            palette_limit: None,
            fill: FillPattern::Floor { height: 4 },
            seed: 0x5eed,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// Per-user config directory for blockvol (`<config_dir>/blockvol`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("blockvol"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

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

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
