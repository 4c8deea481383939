//! jeeboot-app library entry point.
//!
//! The client-side bootstrap of the JeeBoot status view.  At startup it:
//!
//! 1. declares the `myApp` module and checks that its routing, animation and
//!    UI-component features are available;
//! 2. declares the `appInfo` value (`JeeBus 0.3.0`) and the `appVersion`
//!    directive;
//! 3. asks the jeebus backend client to connect, without waiting for it;
//! 4. creates the [`AppContext`](application::AppContext) every view shares;
//! 5. navigates to `/`, which shows `jeeboot.html` driven by `JeeBootCtrl`.
//!
//! The modules are re-exported so that integration tests in `tests/` and the
//! binary in `main.rs` share the same tree.

/// Domain layer: application identity, shared state, routes, configuration.
pub mod domain;

/// Application layer: registry, context, router, directive, controllers.
pub mod application;

/// Infrastructure layer: jeebus WebSocket client and template files.
pub mod infrastructure;
