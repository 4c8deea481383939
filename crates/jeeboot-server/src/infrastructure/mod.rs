//! Infrastructure layer for jeeboot-server.

pub mod serial;

pub use serial::{connect, SerialSession, SessionStats};
