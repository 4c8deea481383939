//! Domain entities for JeeBoot.
//!
//! Pure data with no network or serial dependencies.  The boot configuration
//! is the one piece of state the server consults for every request.

pub mod boot_config;
