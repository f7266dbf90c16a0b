//! Startup configuration.
//!
//! Read once from a camelCase JSON document; every key is optional and falls
//! back to the defaults below. Nothing is re-read while a session runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapping::CoordinateMapper;
use crate::sink::TargetTable;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 9003;
pub const DEFAULT_IMAGE_WIDTH: u32 = 1280;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 720;
pub const DEFAULT_TARGET_WIDTH: f64 = 10.0;
pub const DEFAULT_TARGET_HEIGHT: f64 = 5.0;
pub const DEFAULT_TARGET_COUNT: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Connection, coordinate space and target layout settings.
///
/// # Examples
/// ```
/// use ballsync_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{ "serverPort": 9100, "targets": ["Ball0", null] }"#)?;
/// assert_eq!(config.server_port, 9100);
/// assert_eq!(config.image_width, 1280);
/// assert_eq!(config.targets.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    pub server_address: String,
    pub server_port: u16,
    pub image_width: u32,
    pub image_height: u32,
    pub target_width: f64,
    pub target_height: f64,
    /// Slot names indexed by id; `null` leaves a slot empty.
    pub targets: Vec<Option<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            image_width: DEFAULT_IMAGE_WIDTH,
            image_height: DEFAULT_IMAGE_HEIGHT,
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            targets: (0..DEFAULT_TARGET_COUNT)
                .map(|id| Some(format!("Ball{id}")))
                .collect(),
        }
    }
}

impl Config {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_address.trim().is_empty() {
            return Err(ConfigError::Invalid("serverAddress must not be empty".into()));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size must be positive, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        for (key, value) in [
            ("targetWidth", self.target_width),
            ("targetHeight", self.target_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be a positive number, got {value}"
                )));
            }
        }
        if self.targets.is_empty() {
            return Err(ConfigError::Invalid("targets must list at least one slot".into()));
        }
        Ok(())
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(
            f64::from(self.image_width),
            f64::from(self.image_height),
            self.target_width,
            self.target_height,
        )
    }

    pub fn target_table(&self) -> TargetTable {
        TargetTable::new(self.targets.iter().cloned())
    }
}
