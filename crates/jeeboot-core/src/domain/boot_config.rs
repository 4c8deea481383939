//! Boot configuration: which node gets which identity and which software.
//!
//! The configuration is a JSON document:
//!
//! ```json
//! {
//!   "swids": { "1001": "firmware/blinkAvr1.hex" },
//!   "hwids": {
//!     "06300301c48461aeedb09351061900f5": {
//!       "board": 2, "group": 212, "node": 17, "swid": 1001
//!     }
//!   }
//! }
//! ```
//!
//! `swids` maps software IDs (decimal strings) to Intel HEX files.  `hwids`
//! maps lowercase hex hardware IDs to the pairing details of that node and the
//! software it should run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::messages::HwId;

/// Error type for boot configuration loading and lookups.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON content could not be parsed.
    #[error("failed to parse boot config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A key of the `swids` table is not a 16-bit number.
    #[error("invalid software ID {0:?}")]
    InvalidSwId(String),
}

/// Pairing details and assigned software of one known node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct HwIdEntry {
    #[serde(default)]
    pub board: u8,
    #[serde(default)]
    pub group: u8,
    #[serde(default)]
    pub node: u8,
    #[serde(default)]
    pub swid: u16,
}

/// The complete boot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BootConfig {
    /// Software ID → firmware file name.
    #[serde(default, alias = "SwIDs")]
    pub swids: BTreeMap<String, String>,
    /// Lowercase hex hardware ID → node entry.
    #[serde(default, alias = "HwIDs")]
    pub hwids: BTreeMap<String, HwIdEntry>,
}

impl BootConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON or out-of-range numbers.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Looks up the entry for a hardware ID.
    pub fn lookup_hw_id(&self, hw_id: &HwId) -> Option<HwIdEntry> {
        self.hwids.get(&hw_id_hex(hw_id)).copied()
    }

    /// Returns the software ID assigned to `group`/`node`, or 0 if none is.
    pub fn lookup_sw_id(&self, group: u8, node: u8) -> u16 {
        self.hwids
            .values()
            .find(|h| h.group == group && h.node == node)
            .map_or(0, |h| h.swid)
    }

    /// File name of the firmware for `sw_id`.
    pub fn firmware_file(&self, sw_id: u16) -> Option<&str> {
        self.swids.get(&sw_id.to_string()).map(String::as_str)
    }

    /// All `(sw_id, file)` pairs, with the software IDs parsed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSwId`] for a key that is not a `u16`.
    pub fn firmware_files(&self) -> Result<Vec<(u16, &str)>, ConfigError> {
        self.swids
            .iter()
            .map(|(key, file)| {
                key.parse::<u16>()
                    .map(|id| (id, file.as_str()))
                    .map_err(|_| ConfigError::InvalidSwId(key.clone()))
            })
            .collect()
    }
}

/// Lowercase hex encoding of a hardware ID, as used for `hwids` keys.
pub fn hw_id_hex(hw_id: &HwId) -> String {
    hw_id.iter().map(|b| format!("{b:02x}")).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
