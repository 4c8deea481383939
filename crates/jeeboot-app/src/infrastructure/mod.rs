//! Infrastructure layer for jeeboot-app.
//!
//! Everything that touches the outside world:
//!
//! - the WebSocket connection to the jeebus backend;
//! - reading template resources from the assets directory.

pub mod jeebus;
pub mod templates;

pub use jeebus::JeebusClient;
pub use templates::FsTemplateSource;
