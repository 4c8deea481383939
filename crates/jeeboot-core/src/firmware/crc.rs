//! CRC-16 over firmware images.
//!
//! This is the reflected 0xA001 polynomial (CRC-16/MODBUS) computed a nibble
//! at a time, exactly as the loader on the node computes it after a download.

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Computes the CRC-16 of `data`, starting from 0xFFFF.
///
/// ```rust
/// use jeeboot_core::crc16;
///
/// assert_eq!(crc16(b"123456789"), 0x4B37);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0xFFFF, |crc, &byte| {
        let crc = (crc >> 4) ^ CRC_TABLE[(crc & 0x0F) as usize] ^ CRC_TABLE[(byte & 0x0F) as usize];
        (crc >> 4) ^ CRC_TABLE[(crc & 0x0F) as usize] ^ CRC_TABLE[(byte >> 4) as usize]
    })
}
