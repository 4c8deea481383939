//! Firmware images indexed by software ID.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use jeeboot_core::{BootConfig, ConfigError, Firmware, FirmwareError};

/// Errors that can occur while loading the firmware named in the config.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("software ID {sw_id}: {source}")]
    Firmware {
        sw_id: u16,
        #[source]
        source: FirmwareError,
    },
}

/// Every firmware image the server can hand out.
#[derive(Debug, Clone, Default)]
pub struct FirmwareStore {
    images: HashMap<u16, Firmware>,
}

impl FirmwareStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the Intel HEX file of every `swids` entry, resolving relative
    /// file names against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Config`] for a software ID that is not a number
    /// and [`LoadError::Firmware`] for a file that cannot be read or decoded.
    pub fn load(config: &BootConfig, base_dir: &Path) -> Result<Self, LoadError> {
        let mut store = Self::new();
        for (sw_id, file) in config.firmware_files()? {
            let fw = Firmware::load(&base_dir.join(file))
                .map_err(|source| LoadError::Firmware { sw_id, source })?;
            store.insert(sw_id, fw);
        }
        info!("{} firmware image(s) loaded", store.len());
        Ok(store)
    }

    /// Adds or replaces the image for `sw_id`.
    pub fn insert(&mut self, sw_id: u16, fw: Firmware) -> Option<Firmware> {
        self.images.insert(sw_id, fw)
    }

    pub fn get(&self, sw_id: u16) -> Option<&Firmware> {
        self.images.get(&sw_id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // 4 data bytes at 0x0000, then EOF.
    const TINY_HEX: &str = ":0400000001020304F2\n:00000001FF\n";

    #[test]
    fn test_load_reads_every_swid() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blink.hex"), TINY_HEX).unwrap();
        let config =
            BootConfig::from_json(r#"{"swids": {"1001": "blink.hex"}, "hwids": {}}"#).unwrap();

        // Act
        let store = FirmwareStore::load(&config, dir.path()).unwrap();

        // Assert
        let fw = store.get(1001).unwrap();
        assert_eq!(fw.data.len(), 64);
        assert_eq!(&fw.data[..4], &[1u8, 2, 3, 4]);
        assert!(store.get(1002).is_none());
    }

    #[test]
    fn test_missing_file_names_the_swid() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            BootConfig::from_json(r#"{"swids": {"7": "gone.hex"}, "hwids": {}}"#).unwrap();

        let err = FirmwareStore::load(&config, dir.path()).unwrap_err();

        assert!(matches!(err, LoadError::Firmware { sw_id: 7, .. }));
    }

    #[test]
    fn test_non_numeric_swid_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            BootConfig::from_json(r#"{"swids": {"abc": "x.hex"}, "hwids": {}}"#).unwrap();

        let err = FirmwareStore::load(&config, dir.path()).unwrap_err();

        assert!(matches!(err, LoadError::Config(ConfigError::InvalidSwId(_))));
    }

    #[test]
    fn test_empty_config_gives_empty_store() {
        let config = BootConfig::from_json(r#"{"swids": {}, "hwids": {}}"#).unwrap();
        let store = FirmwareStore::load(&config, Path::new(".")).unwrap();
        assert!(store.is_empty());
    }
}
