//! Application layer for jeeboot-server: the request responder and the
//! firmware it serves.

pub mod firmware_store;
pub mod responder;

pub use firmware_store::{FirmwareStore, LoadError};
pub use responder::{random_hw_id, BootResponder};
