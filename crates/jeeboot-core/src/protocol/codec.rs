//! Binary codec for JeeBoot packets.
//!
//! Wire format of a request:
//! ```text
//! [rf12_header:1][body:N]     N = 22 (pairing), 8 (upgrade), 4 (download)
//! ```
//! Replies carry no header byte; the RF12demo sketch adds one when sending.
//! All multi-byte integers are little-endian and structs are packed.

use thiserror::Error;

use crate::protocol::messages::{
    BootReply, BootRequest, DownloadRequest, HwId, Packet, PairingRequest, UpgradeRequest,
    DOWNLOAD_REQUEST_LEN, HW_ID_LEN, PAIRING_REQUEST_LEN, UPGRADE_REQUEST_LEN,
};

/// Errors that can occur while decoding a packet or a line of RF12demo output.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The packet did not even contain a header byte.
    #[error("empty packet")]
    Empty,

    /// The body length matches none of the known request kinds.
    #[error("unknown request: {body_len} body bytes")]
    UnknownRequest { body_len: usize },

    /// An `OK` line from the RF12demo sketch contained a non-byte token.
    #[error("malformed RF12demo line: {0}")]
    MalformedLine(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one packet as received from the radio.
///
/// # Errors
///
/// Returns [`ProtocolError::Empty`] for a zero-length slice and
/// [`ProtocolError::UnknownRequest`] when the body length is not one of the
/// three request sizes.
///
/// # Examples
///
/// ```rust
/// use jeeboot_core::protocol::{decode_packet, BootRequest};
///
/// let packet = decode_packet(&[177, 1, 0, 2, 0]).unwrap();
/// assert_eq!(packet.node_id(), 17);
/// assert!(matches!(packet.request, BootRequest::Download(d) if d.sw_index == 2));
/// ```
pub fn decode_packet(bytes: &[u8]) -> Result<Packet, ProtocolError> {
    let (&header, body) = bytes.split_first().ok_or(ProtocolError::Empty)?;

    let request = match body.len() {
        PAIRING_REQUEST_LEN => BootRequest::Pairing(PairingRequest {
            variant: body[0],
            board: body[1],
            group: body[2],
            node_id: body[3],
            check: le_u16(body, 4),
            hw_id: hw_id_at(body, 6),
        }),
        UPGRADE_REQUEST_LEN => BootRequest::Upgrade(UpgradeRequest {
            variant: body[0],
            board: body[1],
            sw_id: le_u16(body, 2),
            sw_size: le_u16(body, 4),
            sw_check: le_u16(body, 6),
        }),
        DOWNLOAD_REQUEST_LEN => BootRequest::Download(DownloadRequest {
            sw_id: le_u16(body, 0),
            sw_index: le_u16(body, 2),
        }),
        body_len => return Err(ProtocolError::UnknownRequest { body_len }),
    };

    Ok(Packet { header, request })
}

/// Encodes a reply into its packed little-endian byte layout.
///
/// # Examples
///
/// ```rust
/// use jeeboot_core::protocol::{encode_reply, BootReply};
///
/// let bytes = encode_reply(&BootReply::DownloadEnd { sw_id_xor: 0x0102 });
/// assert_eq!(bytes, vec![0x02, 0x01]);
/// ```
pub fn encode_reply(reply: &BootReply) -> Vec<u8> {
    let mut buf = Vec::with_capacity(66);
    match reply {
        BootReply::PairingAssign(r) => {
            buf.push(r.variant);
            buf.push(r.board);
            buf.extend_from_slice(&r.hw_id);
        }
        BootReply::Pairing(r) => {
            buf.push(r.variant);
            buf.push(r.board);
            buf.push(r.group);
            buf.push(r.node_id);
            buf.extend_from_slice(&r.shared_key);
        }
        BootReply::Upgrade(r) => {
            buf.push(r.variant);
            buf.push(r.board);
            buf.extend_from_slice(&r.sw_id.to_le_bytes());
            buf.extend_from_slice(&r.sw_size.to_le_bytes());
            buf.extend_from_slice(&r.sw_check.to_le_bytes());
        }
        BootReply::Download(r) => {
            buf.extend_from_slice(&r.sw_id_xor.to_le_bytes());
            buf.extend_from_slice(&r.data);
        }
        BootReply::DownloadEnd { sw_id_xor } => {
            buf.extend_from_slice(&sw_id_xor.to_le_bytes());
        }
    }
    buf
}

// ── Field helpers ─────────────────────────────────────────────────────────────

// Callers have already matched the body length, so the indexing cannot fail.
fn le_u16(body: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([body[at], body[at + 1]])
}

fn hw_id_at(body: &[u8], at: usize) -> HwId {
    let mut id = [0u8; HW_ID_LEN];
    id.copy_from_slice(&body[at..at + HW_ID_LEN]);
    id
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{
        DownloadReply, PairingAssign, PairingReply, UpgradeReply, DOWNLOAD_BLOCK_SIZE,
    };

    #[test]
    fn test_decode_pairing_request_fields() {
        // Arrange: header 0xE0, variant 0, board 2, group 212, node 17,
        // check 0xF0BE, then the 16-byte hardware ID.
        let bytes = [
            224, 0, 2, 212, 17, 190, 240, 6, 48, 3, 1, 196, 132, 97, 174, 237, 176, 147, 81, 6,
            25, 0, 245,
        ];

        // Act
        let packet = decode_packet(&bytes).unwrap();

        // Assert
        assert_eq!(packet.header, 224);
        match packet.request {
            BootRequest::Pairing(p) => {
                assert_eq!(p.board, 2);
                assert_eq!(p.group, 212);
                assert_eq!(p.node_id, 17);
                assert_eq!(p.check, 0xF0BE);
                assert_eq!(p.hw_id[0], 0x06);
                assert_eq!(p.hw_id[15], 0xF5);
            }
            other => panic!("expected pairing request, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_upgrade_request_fields() {
        let packet = decode_packet(&[177, 0, 2, 1, 0, 17, 0, 99, 36]).unwrap();

        assert_eq!(packet.node_id(), 17);
        assert_eq!(
            packet.request,
            BootRequest::Upgrade(UpgradeRequest {
                variant: 0,
                board: 2,
                sw_id: 1,
                sw_size: 17,
                sw_check: 0x2463,
            })
        );
    }

    #[test]
    fn test_decode_download_request_fields() {
        let packet = decode_packet(&[177, 0xE9, 0x03, 5, 0]).unwrap();

        assert_eq!(
            packet.request,
            BootRequest::Download(DownloadRequest {
                sw_id: 1001,
                sw_index: 5,
            })
        );
    }

    #[test]
    fn test_decode_empty_packet_is_error() {
        assert_eq!(decode_packet(&[]), Err(ProtocolError::Empty));
    }

    #[test]
    fn test_decode_header_only_is_unknown_request() {
        assert_eq!(
            decode_packet(&[0x20]),
            Err(ProtocolError::UnknownRequest { body_len: 0 })
        );
    }

    #[test]
    fn test_decode_odd_length_is_unknown_request() {
        // 7 body bytes: one short of an upgrade request.
        let result = decode_packet(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(result, Err(ProtocolError::UnknownRequest { body_len: 7 }));
    }

    #[test]
    fn test_encode_pairing_reply_layout() {
        let reply = BootReply::Pairing(PairingReply {
            variant: 0,
            board: 2,
            group: 212,
            node_id: 17,
            shared_key: [0; 16],
        });

        let bytes = encode_reply(&reply);

        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[..4], &[0, 2, 0xD4, 0x11]);
        assert!(bytes[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_pairing_assign_layout() {
        let mut hw_id = [0u8; 16];
        hw_id[0] = 0xAA;
        hw_id[15] = 0x55;
        let reply = BootReply::PairingAssign(PairingAssign {
            variant: 0,
            board: 3,
            hw_id,
        });

        let bytes = encode_reply(&reply);

        assert_eq!(bytes.len(), 18);
        assert_eq!(bytes[1], 3);
        assert_eq!(bytes[2], 0xAA);
        assert_eq!(bytes[17], 0x55);
    }

    #[test]
    fn test_encode_upgrade_reply_is_little_endian() {
        let reply = BootReply::Upgrade(UpgradeReply {
            variant: 1,
            board: 2,
            sw_id: 1001,
            sw_size: 0x0040,
            sw_check: 0xBEEF,
        });

        assert_eq!(
            encode_reply(&reply),
            vec![1, 2, 0xE9, 0x03, 0x40, 0x00, 0xEF, 0xBE]
        );
    }

    #[test]
    fn test_encode_download_reply_is_66_bytes() {
        let reply = BootReply::Download(DownloadReply {
            sw_id_xor: 0x0304,
            data: [0x11; DOWNLOAD_BLOCK_SIZE],
        });

        let bytes = encode_reply(&reply);

        assert_eq!(bytes.len(), 2 + DOWNLOAD_BLOCK_SIZE);
        assert_eq!(&bytes[..3], &[0x04, 0x03, 0x11]);
    }
}
