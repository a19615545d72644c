//! Engine configuration

pub mod config;

pub use config::{AssetConfig, ConfigError, EngineConfig, WindowConfig};
