//! Application layer for jeeboot-app.
//!
//! The bootstrap proper: the registry that declares and starts the
//! application, the context handed to every view, the route table and router,
//! the `appVersion` directive, and the view controllers.  The two seams to the
//! outside world, [`BackendClient`] and [`TemplateSource`], are traits here and
//! implemented in `infrastructure`.

pub mod backend;
pub mod context;
pub mod controller;
pub mod directive;
pub mod registry;
pub mod routes;
pub mod templates;

pub use backend::{BackendClient, BackendHandle, ConnectionStatus};
pub use context::{AppContext, Scope};
pub use controller::{Controller, ControllerRegistry, JeeBootCtrl};
pub use directive::{AppVersionDirective, Element, TextElement};
pub use registry::{AppRegistry, Application, FeatureSet, RegistryError, StartupAction};
pub use routes::{ActiveView, RouteTable, Router, RoutingError};
pub use templates::{TemplateError, TemplateSource};
