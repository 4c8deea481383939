//! Intel HEX decoding.
//!
//! Each record is one line:
//!
//! ```text
//! :LLAAAATT<data...>CC
//!  │ │   │        └─ two's complement checksum of all preceding bytes
//!  │ │   └────────── record type
//!  │ └────────────── 16-bit load offset (big-endian)
//!  └──────────────── data byte count
//! ```
//!
//! Data records are placed at their absolute address (offset plus any
//! extended segment/linear base) and gaps between them are filled with 0xFF,
//! the erased state of flash.

use crate::firmware::FirmwareError;
use crate::protocol::messages::DOWNLOAD_BLOCK_SIZE;

/// Upper bound on the decoded image size.
///
/// Upgrade replies carry the size in 16-byte paragraphs as a `u16`, so an
/// image padded to whole download blocks must stay within `0xFFFF * 16`
/// bytes.  Larger spans indicate a bogus file.
pub const MAX_IMAGE_SIZE: usize =
    u16::MAX as usize * 16 / DOWNLOAD_BLOCK_SIZE * DOWNLOAD_BLOCK_SIZE;

const RECORD_DATA: u8 = 0x00;
const RECORD_EOF: u8 = 0x01;
const RECORD_EXT_SEGMENT: u8 = 0x02;
const RECORD_START_SEGMENT: u8 = 0x03;
const RECORD_EXT_LINEAR: u8 = 0x04;
const RECORD_START_LINEAR: u8 = 0x05;

/// A contiguous binary image decoded from Intel HEX text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HexImage {
    /// Absolute address of the first byte in `data`.
    pub base_addr: u32,
    pub data: Vec<u8>,
}

/// Parses Intel HEX text into a contiguous image.
///
/// Lines not starting with `:` are ignored.  Parsing stops at the first EOF
/// record.
///
/// # Errors
///
/// Returns a [`FirmwareError`] for bad hex digits, truncated records,
/// checksum mismatches, unknown record types, or an image spanning more than
/// [`MAX_IMAGE_SIZE`] bytes.
pub fn parse_intel_hex(text: &str) -> Result<HexImage, FirmwareError> {
    let mut upper_base: u32 = 0;
    let mut chunks: Vec<(u32, Vec<u8>)> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let Some(hex) = raw.trim().strip_prefix(':') else {
            continue;
        };

        let record = decode_hex(hex).ok_or_else(|| FirmwareError::InvalidHex {
            line: line_no,
            reason: "not a sequence of hex byte pairs".to_string(),
        })?;

        if record.len() < 5 || record.len() != record[0] as usize + 5 {
            return Err(FirmwareError::InvalidHex {
                line: line_no,
                reason: format!("record length {} does not match byte count", record.len()),
            });
        }

        let sum = record.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        if sum != 0 {
            return Err(FirmwareError::ChecksumMismatch { line: line_no });
        }

        let count = record[0] as usize;
        let offset = u16::from_be_bytes([record[1], record[2]]) as u32;
        let data = &record[4..4 + count];

        match record[3] {
            RECORD_DATA => chunks.push((upper_base + offset, data.to_vec())),
            RECORD_EOF => break,
            RECORD_EXT_SEGMENT => upper_base = (be_u16(data, line_no)? as u32) << 4,
            RECORD_EXT_LINEAR => upper_base = (be_u16(data, line_no)? as u32) << 16,
            RECORD_START_SEGMENT | RECORD_START_LINEAR => {}
            kind => return Err(FirmwareError::UnsupportedRecord { line: line_no, kind }),
        }
    }

    assemble(chunks)
}

fn assemble(chunks: Vec<(u32, Vec<u8>)>) -> Result<HexImage, FirmwareError> {
    let Some(base_addr) = chunks.iter().map(|(addr, _)| *addr).min() else {
        return Ok(HexImage::default());
    };
    let end = chunks
        .iter()
        .map(|(addr, data)| *addr as usize + data.len())
        .max()
        .unwrap_or(base_addr as usize);

    let size = end - base_addr as usize;
    if size > MAX_IMAGE_SIZE {
        return Err(FirmwareError::ImageTooLarge { size });
    }

    let mut data = vec![0xFF; size];
    for (addr, bytes) in chunks {
        let start = (addr - base_addr) as usize;
        data[start..start + bytes.len()].copy_from_slice(&bytes);
    }

    Ok(HexImage { base_addr, data })
}

fn be_u16(data: &[u8], line: usize) -> Result<u16, FirmwareError> {
    match data {
        [hi, lo] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(FirmwareError::InvalidHex {
            line,
            reason: "address record must carry two bytes".to_string(),
        }),
    }
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
