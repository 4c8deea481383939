//! Answers JeeBoot requests.
//!
//! [`BootResponder`] is the whole decision logic of the boot server: given a
//! decoded request it consults the boot configuration and the firmware store
//! and returns the reply to send, or nothing.  It does no I/O, so the serial
//! session in `infrastructure` only shuttles lines in and commands out.
//!
//! | request  | reply                                                         |
//! |----------|---------------------------------------------------------------|
//! | pairing  | fresh hardware ID if the node has none, else its pairing       |
//! | upgrade  | software ID, size and CRC for the node's group and node ID     |
//! | download | one 64-byte block, or an end marker past the image             |

use tracing::{debug, info};
use uuid::Uuid;

use jeeboot_core::domain::boot_config::hw_id_hex;
use jeeboot_core::protocol::{
    decode_packet, encode_reply, format_send_command, parse_ok_line, BootReply, BootRequest,
    DownloadReply, DownloadRequest, HwId, Packet, PairingAssign, PairingReply, PairingRequest,
    ProtocolError, UpgradeReply, UpgradeRequest, DOWNLOAD_BLOCK_SIZE, HW_ID_LEN, REPLY_DEST,
};
use jeeboot_core::BootConfig;

use crate::application::firmware_store::FirmwareStore;

/// Source of hardware IDs for nodes that do not have one yet.
pub type HwIdGenerator = fn() -> HwId;

/// 16 random bytes from a version 4 UUID.
pub fn random_hw_id() -> HwId {
    Uuid::new_v4().into_bytes()
}

/// Turns boot requests into replies.
#[derive(Debug, Clone)]
pub struct BootResponder {
    config: BootConfig,
    firmware: FirmwareStore,
    net_group: u8,
    new_hw_id: HwIdGenerator,
}

impl BootResponder {
    /// Creates a responder for nodes in `net_group`.
    pub fn new(config: BootConfig, firmware: FirmwareStore, net_group: u8) -> Self {
        Self {
            config,
            firmware,
            net_group,
            new_hw_id: random_hw_id,
        }
    }

    /// Replaces the hardware ID source.
    pub fn with_hw_id_generator(mut self, generator: HwIdGenerator) -> Self {
        self.new_hw_id = generator;
        self
    }

    pub fn net_group(&self) -> u8 {
        self.net_group
    }

    /// The reply for `packet`, or `None` when the server has nothing to say.
    pub fn respond(&self, packet: &Packet) -> Option<BootReply> {
        match packet.request {
            BootRequest::Pairing(req) => self.pair(packet.header, &req),
            BootRequest::Upgrade(req) => self.upgrade(packet.header, req),
            BootRequest::Download(req) => self.download(&req),
        }
    }

    /// Handles one line of RF12demo output, returning the send command to
    /// write back.
    ///
    /// Lines that are not received packets yield `Ok(None)`, as do requests
    /// the server does not answer.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] for a malformed `OK` line or a packet
    /// whose length matches no request.
    pub fn reply_command(&self, line: &str) -> Result<Option<String>, ProtocolError> {
        let Some(bytes) = parse_ok_line(line)? else {
            return Ok(None);
        };
        let packet = decode_packet(&bytes)?;
        debug!("{} request from node {}", packet.request.kind(), packet.node_id());
        Ok(self
            .respond(&packet)
            .map(|reply| format_send_command(&encode_reply(&reply), REPLY_DEST)))
    }

    fn pair(&self, header: u8, req: &PairingRequest) -> Option<BootReply> {
        if req.hw_id == [0u8; HW_ID_LEN] {
            let hw_id = (self.new_hw_id)();
            info!(
                "assigning fresh hardware ID {} for board {} hdr {header:08b}",
                hw_id_hex(&hw_id),
                req.board
            );
            return Some(BootReply::PairingAssign(PairingAssign {
                variant: 0,
                board: req.board,
                hw_id,
            }));
        }

        let key = hw_id_hex(&req.hw_id);
        match self.config.lookup_hw_id(&req.hw_id) {
            Some(entry) if entry.board == req.board && entry.group != 0 && entry.node != 0 => {
                info!("pair {key} board {} hdr {header:08b}", entry.board);
                Some(BootReply::Pairing(PairingReply {
                    variant: 0,
                    board: entry.board,
                    group: entry.group,
                    node_id: entry.node,
                    shared_key: [0; HW_ID_LEN],
                }))
            }
            _ => {
                info!("pair {key} board {} - no entry", req.board);
                None
            }
        }
    }

    fn upgrade(&self, header: u8, req: UpgradeRequest) -> Option<BootReply> {
        let node = header & jeeboot_core::protocol::RF12_HDR_NODE_MASK;
        let sw_id = self.config.lookup_sw_id(self.net_group, node);
        let Some(fw) = self.firmware.get(sw_id) else {
            debug!("upgrade: no firmware for {}/{node} (swid {sw_id})", self.net_group);
            return None;
        };

        let reply = UpgradeReply {
            sw_id,
            sw_size: fw.size_in_paragraphs(),
            sw_check: fw.crc,
            ..UpgradeReply::from(req)
        };
        info!("upgrade {reply:?} hdr {header:08b}");
        Some(BootReply::Upgrade(reply))
    }

    fn download(&self, req: &DownloadRequest) -> Option<BootReply> {
        let fw = self.firmware.get(req.sw_id)?;
        let sw_id_xor = req.sw_id ^ req.sw_index;

        let Some(block) = fw.block(req.sw_index) else {
            debug!(
                "download: no data at block {} of swid {} ({} bytes)",
                req.sw_index,
                req.sw_id,
                fw.data.len()
            );
            return Some(BootReply::DownloadEnd { sw_id_xor });
        };

        let mut data = [0u8; DOWNLOAD_BLOCK_SIZE];
        for (i, (out, byte)) in data.iter_mut().zip(block).enumerate() {
            *out = byte ^ (211 * i) as u8;
        }
        Some(BootReply::Download(DownloadReply { sw_id_xor, data }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
