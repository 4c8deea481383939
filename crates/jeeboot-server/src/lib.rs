//! jeeboot-server library entry point.
//!
//! A boot server for remote nodes running the JeeBoot loader.  The server
//! listens on a JeeLink running the RF12demo sketch, answers the pairing,
//! upgrade and download requests nodes send after reset, and serves firmware
//! images listed in a JSON boot configuration.
//!
//! The modules are re-exported so that integration tests in `tests/` and the
//! binary in `main.rs` share the same tree.

/// Application layer: request responder and firmware store.
pub mod application;

/// Infrastructure layer: the serial link to the sketch.
pub mod infrastructure;
