//! Application configuration.
//!
//! [`AppConfig`] is the single source of truth for runtime settings.  It can
//! be read from an optional TOML file, with command-line flags applied on top
//! (see `main.rs`), or built from defaults for local development and tests.
//!
//! ```toml
//! backend_url = "ws://127.0.0.1:3333/ws"
//! service_name = "jeebus"
//! assets_dir = "assets"
//! start_path = "/"
//! ```
//!
//! Fields missing from the file fall back to their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// All runtime configuration for the client application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// WebSocket URL of the jeebus backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Service name passed to `connect`; sent as the WebSocket subprotocol.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Directory the template resources are read from.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Path navigated to once startup has finished.
    #[serde(default = "default_start_path")]
    pub start_path: String,
}

fn default_backend_url() -> String {
    "ws://127.0.0.1:3333/ws".to_string()
}

fn default_service_name() -> String {
    "jeebus".to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_start_path() -> String {
    "/".to_string()
}

impl Default for AppConfig {
    /// | Field        | Default                  |
    /// |--------------|--------------------------|
    /// | backend_url  | `ws://127.0.0.1:3333/ws` |
    /// | service_name | `jeebus`                 |
    /// | assets_dir   | `assets`                 |
    /// | start_path   | `/`                      |
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            service_name: default_service_name(),
            assets_dir: default_assets_dir(),
            start_path: default_start_path(),
        }
    }
}

impl AppConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML or a field
    /// has the wrong type.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
