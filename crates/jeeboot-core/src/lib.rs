//! # jeeboot-core
//!
//! Shared library for JeeBoot containing the over-the-air boot protocol codec,
//! firmware image handling, and the boot configuration model.
//!
//! The boot server builds on this crate.  It has no dependencies on async
//! runtimes, sockets, or serial ports.
//!
//! # Architecture overview
//!
//! JeeBoot is a loader running in the firmware of remote wireless nodes.  On
//! power-up a node asks a boot server, over the RF12 radio, three things in
//! turn:
//!
//! 1. **Pairing**: "who am I?"  The server answers with the node's board
//!    type, net group, and node ID (or hands out a fresh hardware ID).
//! 2. **Upgrade**: "which software should I run?"  The server answers with the
//!    software ID, its size, and its CRC.
//! 3. **Download**: "give me block N."  The server answers with 64 bytes of
//!    lightly scrambled firmware.
//!
//! This crate defines:
//!
//! - **`protocol`** – The packed little-endian request and reply layouts plus
//!   the text framing used by the RF12demo sketch on the serial link.
//! - **`firmware`** – Intel HEX parsing, padding, and the CRC-16 the loader
//!   verifies after download.
//! - **`domain`** – The boot configuration that maps hardware IDs to pairing
//!   details and software IDs to firmware files.

pub mod domain;
pub mod firmware;
pub mod protocol;

pub use domain::boot_config::{BootConfig, ConfigError, HwIdEntry};
pub use firmware::{crc16, Firmware, FirmwareError};
pub use protocol::codec::{decode_packet, encode_reply, ProtocolError};
pub use protocol::messages::{BootReply, BootRequest, Packet};
