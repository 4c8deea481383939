//! Firmware images served to remote nodes.
//!
//! Loading a firmware file runs the same pipeline the node expects on the
//! other end: Intel HEX → binary → padded to a whole number of download
//! blocks with 0xFF → CRC-16 over the padded image.

pub mod crc;
pub mod intel_hex;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub use crc::crc16;
pub use intel_hex::{parse_intel_hex, HexImage};

use crate::protocol::messages::DOWNLOAD_BLOCK_SIZE;

/// Errors that can occur while loading or decoding a firmware image.
#[derive(Debug, Error)]
pub enum FirmwareError {
    /// The firmware file could not be read.
    #[error("I/O error reading firmware {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record is not well-formed hex.
    #[error("invalid Intel HEX at line {line}: {reason}")]
    InvalidHex { line: usize, reason: String },

    /// A record's checksum byte does not match its contents.
    #[error("Intel HEX checksum mismatch at line {line}")]
    ChecksumMismatch { line: usize },

    /// A record type other than 00..05.
    #[error("unsupported Intel HEX record type {kind:#04x} at line {line}")]
    UnsupportedRecord { line: usize, kind: u8 },

    /// The records span more address space than any node could hold.
    #[error("firmware image too large: {size} bytes")]
    ImageTooLarge { size: usize },
}

/// A padded firmware image ready to be served block by block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firmware {
    /// File name the image was loaded from.
    pub name: String,
    /// Load address of the first byte.
    pub addr: u32,
    /// CRC-16 over `data`.
    pub crc: u16,
    /// Image bytes, a multiple of [`DOWNLOAD_BLOCK_SIZE`] long.
    pub data: Vec<u8>,
}

impl Firmware {
    /// Builds a firmware image from Intel HEX text.
    ///
    /// # Errors
    ///
    /// Propagates any [`FirmwareError`] from [`parse_intel_hex`].
    pub fn from_hex(name: impl Into<String>, text: &str) -> Result<Self, FirmwareError> {
        let image = parse_intel_hex(text)?;
        Ok(Self::from_image(name, image))
    }

    /// Pads a decoded image and computes its CRC.
    pub fn from_image(name: impl Into<String>, image: HexImage) -> Self {
        let data = pad_to_multiple(image.data, DOWNLOAD_BLOCK_SIZE);
        Self {
            name: name.into(),
            addr: image.base_addr,
            crc: crc16(&data),
            data,
        }
    }

    /// Reads and decodes an Intel HEX file.
    ///
    /// # Errors
    ///
    /// Returns [`FirmwareError::Io`] if the file cannot be read, or any parse
    /// error from [`parse_intel_hex`].
    pub fn load(path: &Path) -> Result<Self, FirmwareError> {
        let text = std::fs::read_to_string(path).map_err(|source| FirmwareError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fw = Self::from_hex(path.display().to_string(), &text)?;
        info!(
            "firmware {} = addr {} crc {} ({:#06x}) len {}",
            fw.name,
            fw.addr,
            fw.crc,
            fw.crc,
            fw.data.len()
        );
        Ok(fw)
    }

    /// Image size in units of 16 bytes, as reported in upgrade replies.
    ///
    /// Images parsed from hex never exceed [`intel_hex::MAX_IMAGE_SIZE`];
    /// a larger hand-built image saturates at `u16::MAX`.
    pub fn size_in_paragraphs(&self) -> u16 {
        u16::try_from(self.data.len() >> 4).unwrap_or(u16::MAX)
    }

    /// Returns download block `index`, or `None` past the end of the image.
    pub fn block(&self, index: u16) -> Option<&[u8]> {
        let start = index as usize * DOWNLOAD_BLOCK_SIZE;
        self.data.get(start..start + DOWNLOAD_BLOCK_SIZE)
    }
}

/// Pads `data` with 0xFF until its length is a multiple of `count`.
///
/// ```rust
/// use jeeboot_core::firmware::pad_to_multiple;
///
/// assert_eq!(pad_to_multiple(vec![1, 2, 3], 4), vec![1, 2, 3, 0xFF]);
/// ```
pub fn pad_to_multiple(mut data: Vec<u8>, count: usize) -> Vec<u8> {
    if count == 0 {
        return data;
    }
    let rem = data.len() % count;
    if rem != 0 {
        data.resize(data.len() + count - rem, 0xFF);
    }
    data
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FOUR_BYTES: &str = ":0400000001020304F2\n:00000001FF\n";

    #[test]
    fn test_pad_exact_multiple_is_unchanged() {
        let data = vec![0u8; 128];
        assert_eq!(pad_to_multiple(data.clone(), 64), data);
    }

    #[test]
    fn test_pad_empty_stays_empty() {
        assert!(pad_to_multiple(Vec::new(), 64).is_empty());
    }

    #[test]
    fn test_from_hex_pads_to_block_size() {
        // Act
        let fw = Firmware::from_hex("tiny.hex", FOUR_BYTES).unwrap();

        // Assert: 4 data bytes padded with 60 bytes of 0xFF
        assert_eq!(fw.data.len(), 64);
        assert_eq!(&fw.data[..4], &[1, 2, 3, 4]);
        assert!(fw.data[4..].iter().all(|&b| b == 0xFF));
        assert_eq!(fw.crc, crc16(&fw.data));
        assert_eq!(fw.size_in_paragraphs(), 4);
    }

    #[test]
    fn test_largest_image_reports_nonzero_paragraphs() {
        // Arrange
        let image = HexImage {
            base_addr: 0,
            data: vec![0u8; intel_hex::MAX_IMAGE_SIZE],
        };

        // Act
        let fw = Firmware::from_image("big.hex", image);

        // Assert: already block aligned, and the count fits in a u16
        assert_eq!(fw.data.len(), intel_hex::MAX_IMAGE_SIZE);
        assert_eq!(fw.size_in_paragraphs(), 0xFFFC);
    }

    #[test]
    fn test_oversized_image_saturates_paragraph_count() {
        let image = HexImage {
            base_addr: 0,
            data: vec![0u8; 1 << 20],
        };

        let fw = Firmware::from_image("huge.hex", image);

        assert_eq!(fw.size_in_paragraphs(), u16::MAX);
    }

    #[test]
    fn test_block_past_end_is_none() {
        let fw = Firmware::from_hex("tiny.hex", FOUR_BYTES).unwrap();

        assert!(fw.block(0).is_some());
        assert!(fw.block(1).is_none());
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FOUR_BYTES.as_bytes()).unwrap();

        // Act
        let fw = Firmware::load(file.path()).unwrap();

        // Assert
        assert_eq!(fw.addr, 0);
        assert_eq!(fw.data.len(), 64);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Firmware::load(Path::new("/definitely/not/here.hex"));
        assert!(matches!(result, Err(FirmwareError::Io { .. })));
    }
}
