//! Filesystem configuration.
//!
//! Loaded from TOML so a sandbox can ship its limits alongside the rest of
//! its settings:
//!
//! ```toml
//! max_name_len = 255
//! ```
//!
//! Missing keys fall back to [`FsConfig::default`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum length of a single path component, in bytes.
pub const DEFAULT_MAX_NAME_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a [`FileSystem`](crate::FileSystem).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Longest permitted component name, in bytes.
    pub max_name_len: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}

impl FsConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: FsConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_name_len == 0 {
            return Err(ConfigError::Invalid("max_name_len must be positive".into()));
        }
        Ok(())
    }

    /// Set the component name limit.
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }
}
