//! The application registry.
//!
//! Collects everything the application declares at load time (its module and
//! required features, the `appInfo` value, the `appVersion` directive, and
//! the startup actions) and then starts it.
//!
//! # Lifecycle
//!
//! ```text
//! AppRegistry::new()
//!   .declare_module(..)?          fails if a required feature is missing
//!   .declare_app_info(..)
//!   .declare_app_version_directive()
//!   .run(StartupAction::Connect { .. })
//!   .run(StartupAction::ExposeRootScope)
//!   .start(backend)?              runs the actions once, in order
//! ```
//!
//! [`AppRegistry::start`] consumes the registry, so no declaration can
//! happen after startup and the actions cannot run twice.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::backend::BackendHandle;
use crate::application::context::AppContext;
use crate::application::controller::ControllerRegistry;
use crate::application::directive::AppVersionDirective;
use crate::application::routes::{RouteTable, Router};
use crate::application::templates::TemplateSource;
use crate::domain::{AppInfo, SharedState, JEEBUS_APP_INFO};

/// Name of the application module.
pub const APP_MODULE: &str = "myApp";

/// Client-side routing.
pub const FEATURE_ROUTER: &str = "ui.router";
/// View transition animations.
pub const FEATURE_ANIMATE: &str = "ngAnimate";
/// UI components.
pub const FEATURE_UI: &str = "mm.foundation";

/// Features the application module requires, in declaration order.
pub const REQUIRED_FEATURES: [&str; 3] = [FEATURE_ROUTER, FEATURE_ANIMATE, FEATURE_UI];

/// Key the application identity is declared under.
pub const APP_INFO_KEY: &str = "appInfo";

/// Service the application connects to at startup.
pub const JEEBUS_SERVICE: &str = "jeebus";

/// Errors that prevent the application from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A required feature module is not available.
    #[error("module {module:?} requires feature {feature:?}, which is not available")]
    MissingFeature { module: String, feature: String },

    /// `start` was called before any module was declared.
    #[error("no application module declared")]
    NoModule,

    /// A value the application needs was never declared.
    #[error("value {0:?} was not declared")]
    MissingValue(&'static str),

    /// No startup action exposed the root scope, so views would have no
    /// context.
    #[error("startup actions never exposed the root scope")]
    RootScopeNotExposed,
}

// ── Features ──────────────────────────────────────────────────────────────────

/// Feature modules available at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    names: BTreeSet<String>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The features compiled into this binary: routing, animation and UI
    /// components.
    pub fn builtin() -> Self {
        REQUIRED_FEATURES.iter().copied().collect()
    }

    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.names.remove(name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl<'a> FromIterator<&'a str> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

// ── Declarations ──────────────────────────────────────────────────────────────

/// A declared application module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    pub name: String,
    pub requires: Vec<String>,
}

/// Work done exactly once when the application starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupAction {
    /// Ask the backend client to connect to `service`, without waiting.
    Connect { service: String },
    /// Create the application context: `appInfo` plus an empty
    /// [`SharedState`].
    ExposeRootScope,
}

/// Load-time declarations, not yet started.
#[derive(Debug, Default)]
pub struct AppRegistry {
    module: Option<ModuleDecl>,
    app_info: Option<AppInfo>,
    app_version_directive: bool,
    actions: Vec<StartupAction>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The JeeBoot application: module `myApp` with its three features,
    /// the JeeBus `appInfo`, the `appVersion` directive, and the two startup
    /// actions (connect to `service`, then expose the root scope).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingFeature`] if `features` lacks one of
    /// [`REQUIRED_FEATURES`].
    pub fn jeeboot(features: &FeatureSet, service: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry
            .declare_module(APP_MODULE, &REQUIRED_FEATURES, features)?
            .declare_app_info(JEEBUS_APP_INFO)
            .declare_app_version_directive()
            .run(StartupAction::Connect {
                service: service.to_string(),
            })
            .run(StartupAction::ExposeRootScope);
        Ok(registry)
    }

    /// Declares the application module.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingFeature`] naming the first entry of
    /// `required` that `available` lacks.
    pub fn declare_module(
        &mut self,
        name: &str,
        required: &[&str],
        available: &FeatureSet,
    ) -> Result<&mut Self, RegistryError> {
        if let Some(missing) = required.iter().find(|f| !available.contains(f)) {
            return Err(RegistryError::MissingFeature {
                module: name.to_string(),
                feature: missing.to_string(),
            });
        }
        debug!("module {name:?} declared, requires {required:?}");
        self.module = Some(ModuleDecl {
            name: name.to_string(),
            requires: required.iter().map(|f| f.to_string()).collect(),
        });
        Ok(self)
    }

    /// Declares the `appInfo` value.  A second declaration replaces the first.
    pub fn declare_app_info(&mut self, app_info: AppInfo) -> &mut Self {
        if self.app_info.replace(app_info).is_some() {
            debug!("{APP_INFO_KEY} re-declared, previous value replaced");
        }
        self
    }

    pub fn declare_app_version_directive(&mut self) -> &mut Self {
        self.app_version_directive = true;
        self
    }

    /// Queues a startup action.
    pub fn run(&mut self, action: StartupAction) -> &mut Self {
        self.actions.push(action);
        self
    }

    pub fn module(&self) -> Option<&ModuleDecl> {
        self.module.as_ref()
    }

    pub fn actions(&self) -> &[StartupAction] {
        &self.actions
    }

    /// Runs the startup actions in registration order and returns the
    /// started application.
    ///
    /// The backend's `connect` is called and not awaited; whatever happens
    /// to the connection afterwards does not affect startup.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NoModule`] if no module was declared.
    /// - [`RegistryError::MissingValue`] if `appInfo` was not declared.
    /// - [`RegistryError::RootScopeNotExposed`] if no action exposed the
    ///   root scope.
    pub fn start(self, backend: BackendHandle) -> Result<Application, RegistryError> {
        let module = self.module.ok_or(RegistryError::NoModule)?;
        let app_info = Arc::new(self.app_info.ok_or(RegistryError::MissingValue(APP_INFO_KEY))?);
        // Checked up front so a failed start never touches the backend.
        if !self.actions.contains(&StartupAction::ExposeRootScope) {
            return Err(RegistryError::RootScopeNotExposed);
        }

        let mut context = None;
        for action in &self.actions {
            match action {
                StartupAction::Connect { service } => {
                    debug!("startup: connect({service:?})");
                    backend.connect(service);
                }
                StartupAction::ExposeRootScope => {
                    debug!("startup: exposing root scope");
                    context = Some(AppContext {
                        app_info: Arc::clone(&app_info),
                        shared: SharedState::new(),
                        backend: Arc::clone(&backend),
                    });
                }
            }
        }
        let context = context.ok_or(RegistryError::RootScopeNotExposed)?;

        info!(
            "{} {} started ({} v{})",
            module.name,
            module.requires.join(", "),
            app_info.name,
            app_info.version
        );

        let app_version = self
            .app_version_directive
            .then(|| AppVersionDirective::new(Arc::clone(&app_info)));

        Ok(Application {
            module,
            context,
            app_version,
        })
    }
}

// ── Started application ───────────────────────────────────────────────────────

/// An application whose startup actions have run.
#[derive(Debug)]
pub struct Application {
    module: ModuleDecl,
    context: AppContext,
    app_version: Option<AppVersionDirective>,
}

impl Application {
    pub fn module(&self) -> &ModuleDecl {
        &self.module
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn app_version(&self) -> Option<&AppVersionDirective> {
        self.app_version.as_ref()
    }

    /// A router over `table` whose views share this application's context.
    pub fn router(
        &self,
        table: RouteTable,
        controllers: ControllerRegistry,
        templates: Arc<dyn TemplateSource>,
    ) -> Router {
        Router::new(table, controllers, templates, self.context.clone())
    }

    /// Applies the declared directives to `markup`.
    pub fn render(&self, markup: &str) -> String {
        match &self.app_version {
            Some(directive) => directive.apply(markup),
            None => markup.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
