//! Text framing of the RF12demo sketch.
//!
//! The boot server never talks to the radio directly.  A JeeLink running the
//! RF12demo sketch sits on the serial port and:
//!
//! - prints each received packet as `OK <hdr> <b1> <b2> ...` (decimal bytes);
//! - sends a packet when it is given `<b1>,<b2>,...,<dest>s`.

use crate::protocol::codec::ProtocolError;

/// Destination byte used for every reply: 64 (RF12 "destination" flag) plus
/// node 17.
// TODO: derive the destination node from the request header instead of
// always replying to node 17.
pub const REPLY_DEST: u8 = 64 + 17;

/// Extracts the packet bytes from one line of RF12demo output.
///
/// Returns `Ok(None)` for lines that are not received packets (banners,
/// configuration echoes, `?` lines with bad CRCs).
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedLine`] when an `OK` line carries a token
/// that is not a decimal byte.
///
/// # Examples
///
/// ```rust
/// use jeeboot_core::protocol::parse_ok_line;
///
/// assert_eq!(parse_ok_line("OK 177 1 0 0 0").unwrap(), Some(vec![177, 1, 0, 0, 0]));
/// assert_eq!(parse_ok_line("[RF12demo.12] _ i31 g212 @ 868 MHz").unwrap(), None);
/// ```
pub fn parse_ok_line(line: &str) -> Result<Option<Vec<u8>>, ProtocolError> {
    let line = line.trim_end();
    let Some(rest) = line.strip_prefix("OK ") else {
        return Ok(None);
    };

    rest.split_whitespace()
        .map(|token| {
            token
                .parse::<u8>()
                .map_err(|_| ProtocolError::MalformedLine(line.to_string()))
        })
        .collect::<Result<Vec<u8>, _>>()
        .map(Some)
}

/// Formats reply bytes as an RF12demo send command.
///
/// # Examples
///
/// ```rust
/// use jeeboot_core::protocol::format_send_command;
///
/// assert_eq!(format_send_command(&[0, 2, 212], 81), "0,2,212,81s");
/// ```
pub fn format_send_command(bytes: &[u8], dest: u8) -> String {
    let mut cmd = String::with_capacity(bytes.len() * 4 + 4);
    for b in bytes {
        cmd.push_str(&b.to_string());
        cmd.push(',');
    }
    cmd.push_str(&dest.to_string());
    cmd.push('s');
    cmd
}

/// Builds the command that puts the sketch into JeeBoot listening mode:
/// frequency band, net group, node 31, collect mode, quiet, then version.
///
/// ```rust
/// use jeeboot_core::protocol::init_command;
///
/// assert_eq!(init_command(868, 212), "8b 212g 31i 1c 1q v");
/// ```
pub fn init_command(band_mhz: u16, group: u8) -> String {
    format!("{}b {}g 31i 1c 1q v", band_mhz / 100, group)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok_line_with_trailing_cr() {
        let bytes = parse_ok_line("OK 177 1 0 0 0\r").unwrap();
        assert_eq!(bytes, Some(vec![177, 1, 0, 0, 0]));
    }

    #[test]
    fn test_parse_non_packet_line_is_none() {
        assert_eq!(parse_ok_line("? 12 34").unwrap(), None);
        assert_eq!(parse_ok_line("").unwrap(), None);
    }

    #[test]
    fn test_parse_ok_without_payload_is_empty_packet() {
        // "OK " with nothing after it still counts as a (zero-length) packet.
        assert_eq!(parse_ok_line("OK ").unwrap(), Some(vec![]));
    }

    #[test]
    fn test_parse_ok_line_rejects_out_of_range_byte() {
        let result = parse_ok_line("OK 177 256");
        assert!(matches!(result, Err(ProtocolError::MalformedLine(_))));
    }

    #[test]
    fn test_parse_ok_line_rejects_garbage_token() {
        let result = parse_ok_line("OK 1 x 3");
        assert!(matches!(result, Err(ProtocolError::MalformedLine(_))));
    }

    #[test]
    fn test_format_send_command_with_reply_dest() {
        assert_eq!(format_send_command(&[0, 2, 212, 17], REPLY_DEST), "0,2,212,17,81s");
    }

    #[test]
    fn test_format_send_command_empty_payload() {
        assert_eq!(format_send_command(&[], 81), "81s");
    }

    #[test]
    fn test_init_command_433_band() {
        assert_eq!(init_command(433, 5), "4b 5g 31i 1c 1q v");
    }
}
