//! The application context and per-view scopes.
//!
//! [`AppContext`] is what every view can reach: the application identity, the
//! shared blackboard, and the backend handle.  It only comes into existence
//! when [`AppRegistry::start`](crate::application::registry::AppRegistry::start)
//! has run the startup actions, so holding one is proof that startup is done.
//!
//! Each activated view gets its own [`Scope`]: a set of view-local values plus
//! a clone of the context.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::application::backend::BackendHandle;
use crate::domain::{AppInfo, SharedState};

/// Process-wide values reachable from every view.
#[derive(Clone)]
pub struct AppContext {
    pub app_info: Arc<AppInfo>,
    pub shared: SharedState,
    pub backend: BackendHandle,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("app_info", &self.app_info)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

/// A view's scope.
#[derive(Debug, Clone)]
pub struct Scope {
    context: AppContext,
    locals: Map<String, Value>,
}

impl Scope {
    /// Creates an empty child scope of the application context.
    pub fn new(context: AppContext) -> Self {
        Self {
            context,
            locals: Map::new(),
        }
    }

    pub fn app_info(&self) -> &AppInfo {
        &self.context.app_info
    }

    /// The cross-view blackboard.
    pub fn shared(&self) -> &SharedState {
        &self.context.shared
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.locals.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.locals.insert(key.into(), value.into());
    }

    /// View-local values.
    pub fn locals(&self) -> &Map<String, Value> {
        &self.locals
    }
}
