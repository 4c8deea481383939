//! Protocol module containing message types, the binary codec, and the
//! RF12demo text framing.

pub mod codec;
pub mod messages;
pub mod rf12;

pub use codec::{decode_packet, encode_reply, ProtocolError};
pub use messages::*;
pub use rf12::{format_send_command, init_command, parse_ok_line, REPLY_DEST};
