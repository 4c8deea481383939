//! Domain layer for jeeboot-app.
//!
//! Plain data: the application identity, the cross-view shared state, route
//! declarations, and the configuration file model.

pub mod app_info;
pub mod config;
pub mod route;
pub mod shared_state;

pub use app_info::{AppInfo, JEEBUS_APP_INFO};
pub use config::AppConfig;
pub use route::{NavigationState, RouteDefinition, HOME_ROUTE};
pub use shared_state::SharedState;
