//! Driver configuration
//!
//! Loaded from TOML. Every section is optional:
//!
//! ```toml
//! [transaction]
//! timeout_ms = 500
//! max_retries = 3
//!
//! [[models]]
//! pid = 0x0227
//! name = "Razer Huntsman"
//! kind = "keyboard"
//! matrix = { height = 6, width = 22 }
//! effects = ["static", "spectrum", "custom_frame"]
//! ```

use std::path::{Path, PathBuf};

use chroma_device::{DeviceModel, ModelRegistry};
use chroma_transport::TransactionPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading the config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Timeout and retry policy for every device
    pub transaction: TransactionPolicy,
    /// Extra models, added to (or overriding) the builtin table
    pub models: Vec<DeviceModel>,
}

impl DriverConfig {
    /// Default config path (~/.config/chroma/config.toml)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chroma")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Builtin models plus the ones declared here
    pub fn registry(&self) -> ModelRegistry {
        let mut registry = ModelRegistry::with_builtins();
        for model in &self.models {
            registry.register(model.clone());
        }
        registry
    }
}
