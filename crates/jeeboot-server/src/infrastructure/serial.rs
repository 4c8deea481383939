//! The serial link to the RF12demo sketch.
//!
//! The JeeLink's serial port is reached through a TCP serial bridge (e.g.
//! `ser2net`), so the link is just a byte stream carrying text lines in both
//! directions.  [`SerialSession`] is generic over the stream so tests can
//! drive it with a scripted mock.
//!
//! # Session
//!
//! ```text
//! wait for the sketch's first line
//! write init command             "8b 212g 31i 1c 1q v"
//! loop:
//!   "OK ..." line  -> responder  -> "b,b,...,81s"
//!   non-UTF-8 line -> rejected
//!   anything else  -> logged
//! until EOF
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::application::responder::BootResponder;

/// Opens the TCP serial bridge at `addr` (`host:port`).
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(addr: &str) -> anyhow::Result<TcpStream> {
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("failed to connect to serial bridge at {addr}"))?;
    info!("serial bridge {addr} connected");
    Ok(stream)
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Lines read from the sketch.
    pub lines: usize,
    /// Boot requests answered.
    pub replies: usize,
    /// Lines that could not be decoded.
    pub rejected: usize,
}

/// One conversation with the RF12demo sketch.
pub struct SerialSession<S> {
    io: BufReader<S>,
    responder: Arc<BootResponder>,
    stats: SessionStats,
}

impl<S> SerialSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, responder: Arc<BootResponder>) -> Self {
        Self {
            io: BufReader::new(stream),
            responder,
            stats: SessionStats::default(),
        }
    }

    /// Runs the session until the stream ends.
    ///
    /// `init` is written once, after the sketch has printed its first line.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from or writing to the stream fails.
    pub async fn run(mut self, init: &str) -> anyhow::Result<SessionStats> {
        // The sketch prints a banner after reset; commands sent earlier are lost.
        match self.read_line().await? {
            Some(banner) => debug!("sketch: {banner}"),
            None => {
                warn!("serial link closed before the sketch said anything");
                return Ok(self.stats);
            }
        }

        info!("initialising sketch: {init}");
        self.write_line(init).await?;

        while let Some(line) = self.read_line().await? {
            self.handle_line(&line).await?;
        }

        info!(
            "serial link closed after {} line(s), {} reply(ies)",
            self.stats.lines, self.stats.replies
        );
        Ok(self.stats)
    }

    async fn handle_line(&mut self, line: &str) -> anyhow::Result<()> {
        match self.responder.reply_command(line) {
            Ok(Some(cmd)) => {
                debug!("reply: {cmd}");
                self.write_line(&cmd).await?;
                self.stats.replies += 1;
            }
            Ok(None) if line.starts_with("OK ") => {}
            Ok(None) => info!("in: {line}"),
            Err(e) => {
                warn!("{e}");
                self.stats.rejected += 1;
            }
        }
        Ok(())
    }

    /// Next non-empty line without its terminator, or `None` at EOF.
    ///
    /// Lines that are not valid UTF-8 (line noise after a reset, a baud rate
    /// mismatch) are counted as rejected and skipped.
    async fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = self
                .io
                .read_until(b'\n', &mut buf)
                .await
                .context("read from serial link failed")?;
            if n == 0 {
                return Ok(None);
            }
            let Ok(text) = std::str::from_utf8(&buf) else {
                self.stats.lines += 1;
                self.stats.rejected += 1;
                warn!(
                    "skipping undecodable line: {:?}",
                    String::from_utf8_lossy(&buf).trim()
                );
                continue;
            };
            let line = text.trim();
            if !line.is_empty() {
                self.stats.lines += 1;
                return Ok(Some(line.to_string()));
            }
        }
    }

    async fn write_line(&mut self, text: &str) -> anyhow::Result<()> {
        let framed = format!("{text}\n");
        let stream = self.io.get_mut();
        stream
            .write_all(framed.as_bytes())
            .await
            .context("write to serial link failed")?;
        stream.flush().await.context("flush of serial link failed")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use jeeboot_core::BootConfig;
    use tokio_test::io::Builder;

    use crate::application::firmware_store::FirmwareStore;

    fn responder() -> Arc<BootResponder> {
        Arc::new(
            BootResponder::new(BootConfig::default(), FirmwareStore::new(), 212)
                .with_hw_id_generator(|| [1; 16]),
        )
    }

    #[tokio::test]
    async fn test_init_is_sent_after_first_line() {
        // Arrange
        let mock = Builder::new()
            .read(b"\n[RF12demo.12] _ i31 g212 @ 868 MHz\n")
            .write(b"8b 212g 31i 1c 1q v\n")
            .build();

        // Act
        let stats = SerialSession::new(mock, responder())
            .run("8b 212g 31i 1c 1q v")
            .await
            .unwrap();

        // Assert
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.replies, 0);
    }

    #[tokio::test]
    async fn test_unpaired_node_is_assigned_an_id() {
        // Arrange: a pairing request with an all-zero hardware ID
        let request = format!("OK 95 1 2 0 0 0 0{}\n", " 0".repeat(16));
        let reply = format!("0,2,{}81s\n", "1,".repeat(16));
        let mock = Builder::new()
            .read(b"[RF12demo.12]\n")
            .write(b"8b 212g 31i 1c 1q v\n")
            .read(request.as_bytes())
            .write(reply.as_bytes())
            .build();

        // Act
        let stats = SerialSession::new(mock, responder())
            .run("8b 212g 31i 1c 1q v")
            .await
            .unwrap();

        // Assert
        assert_eq!(stats.replies, 1);
    }

    #[tokio::test]
    async fn test_bad_lines_are_counted_not_fatal() {
        let mock = Builder::new()
            .read(b"banner\n")
            .write(b"init\n")
            .read(b"OK 17 x y\nOK 17 1 2 3\n config 212\n")
            .build();

        let stats = SerialSession::new(mock, responder()).run("init").await.unwrap();

        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.lines, 4);
    }

    #[tokio::test]
    async fn test_undecodable_line_is_skipped_not_fatal() {
        // Arrange
        let request = format!("OK 95 1 2 0 0 0 0{}\n", " 0".repeat(16));
        let reply = format!("0,2,{}81s\n", "1,".repeat(16));
        let mock = Builder::new()
            .read(b"banner\n")
            .write(b"init\n")
            .read(b"\xff\xfe garbage\n")
            .read(request.as_bytes())
            .write(reply.as_bytes())
            .build();

        // Act
        let stats = SerialSession::new(mock, responder()).run("init").await.unwrap();

        // Assert: the session survived and still answered the next request
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.replies, 1);
        assert_eq!(stats.lines, 3);
    }

    #[tokio::test]
    async fn test_noise_before_banner_does_not_trigger_init() {
        let mock = Builder::new()
            .read(b"\x80\x81\n")
            .read(b"[RF12demo.12]\n")
            .write(b"init\n")
            .build();

        let stats = SerialSession::new(mock, responder()).run("init").await.unwrap();

        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.lines, 2);
    }

    #[tokio::test]
    async fn test_silent_link_sends_nothing() {
        let mock = Builder::new().build();

        let stats = SerialSession::new(mock, responder()).run("init").await.unwrap();

        assert_eq!(stats, SessionStats::default());
    }
}
