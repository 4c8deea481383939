//! View controllers and the name → constructor table the router uses.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::application::backend::BackendHandle;
use crate::application::context::Scope;

/// A view's controller.  Constructed once per activation with the view's
/// scope and the backend handle.
pub trait Controller: Send + fmt::Debug {
    /// The name the controller is registered under.
    fn name(&self) -> &'static str;
}

/// Constructor stored in a [`ControllerRegistry`].
pub type ControllerFactory = fn(&mut Scope, BackendHandle) -> Box<dyn Controller>;

// ── JeeBootCtrl ───────────────────────────────────────────────────────────────

/// Controller for the JeeBoot home view.
///
/// Receives its scope and the backend handle but does nothing with either:
/// the view's content comes entirely from its template.
pub struct JeeBootCtrl {
    // Held so the view can reach the backend later; unused for now.
    _backend: BackendHandle,
}

impl JeeBootCtrl {
    pub const NAME: &'static str = "JeeBootCtrl";

    pub fn new(_scope: &mut Scope, backend: BackendHandle) -> Self {
        Self { _backend: backend }
    }

    fn boxed(scope: &mut Scope, backend: BackendHandle) -> Box<dyn Controller> {
        Box::new(Self::new(scope, backend))
    }
}

impl fmt::Debug for JeeBootCtrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JeeBootCtrl").finish_non_exhaustive()
    }
}

impl Controller for JeeBootCtrl {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Maps controller names to constructors.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    factories: HashMap<&'static str, ControllerFactory>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The controllers this application ships with.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(JeeBootCtrl::NAME, JeeBootCtrl::boxed);
        registry
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &'static str, factory: ControllerFactory) {
        self.factories.insert(name, factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Constructs the controller registered under `name`, or `None` if there
    /// is none.
    pub fn instantiate(
        &self,
        name: &str,
        scope: &mut Scope,
        backend: BackendHandle,
    ) -> Option<Box<dyn Controller>> {
        let factory = self.factories.get(name)?;
        debug!("instantiating controller {name}");
        Some(factory(scope, backend))
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &names)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::backend::{ConnectionStatus, MockBackendClient};
    use crate::application::context::AppContext;
    use crate::domain::{SharedState, JEEBUS_APP_INFO};

    fn scope_with(backend: BackendHandle) -> Scope {
        Scope::new(AppContext {
            app_info: Arc::new(JEEBUS_APP_INFO),
            shared: SharedState::new(),
            backend,
        })
    }

    #[test]
    fn test_jeeboot_ctrl_has_no_observable_effect() {
        // Arrange: a mock with no expectations panics on any call
        let backend: BackendHandle = Arc::new(MockBackendClient::new());
        let mut scope = scope_with(Arc::clone(&backend));

        // Act
        let ctrl = JeeBootCtrl::new(&mut scope, backend);

        // Assert
        assert_eq!(ctrl.name(), "JeeBootCtrl");
        assert!(scope.locals().is_empty());
        assert!(scope.shared().is_empty());
    }

    #[test]
    fn test_builtin_registry_instantiates_jeeboot_ctrl() {
        let mut mock = MockBackendClient::new();
        mock.expect_status().return_const(ConnectionStatus::Idle);
        let backend: BackendHandle = Arc::new(mock);
        let mut scope = scope_with(Arc::clone(&backend));
        let registry = ControllerRegistry::builtin();

        let ctrl = registry
            .instantiate("JeeBootCtrl", &mut scope, backend)
            .expect("JeeBootCtrl is built in");

        assert_eq!(ctrl.name(), JeeBootCtrl::NAME);
    }

    #[test]
    fn test_unknown_controller_is_none() {
        let backend: BackendHandle = Arc::new(MockBackendClient::new());
        let mut scope = scope_with(Arc::clone(&backend));
        let registry = ControllerRegistry::builtin();

        assert!(registry.instantiate("NopeCtrl", &mut scope, backend).is_none());
        assert!(!registry.contains("NopeCtrl"));
    }
}
