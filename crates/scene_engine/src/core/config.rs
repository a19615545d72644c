//! Engine configuration types
//!
//! Configuration is plain data deserialized from TOML; every section has
//! defaults so a partial (or absent) file still yields a runnable engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error in the config file
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Window and clear-color settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Window title
    pub title: String,
    /// RGBA clear color applied each frame
    pub clear_color: [f32; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Scene Engine".to_owned(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Asset loading settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory scanned recursively for textures at startup
    pub texture_dir: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("assets/textures"),
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Asset settings
    pub assets: AssetConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
