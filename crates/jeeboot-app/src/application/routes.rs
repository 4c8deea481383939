//! Route table and router.
//!
//! The [`RouteTable`] is a static declaration of which URL maps to which
//! template and controller.  The [`Router`] owns the navigation state and
//! activates a route: resolve the path, fetch the template, give the view a
//! fresh [`Scope`], and construct its controller.
//!
//! # State machine
//!
//! ```text
//! Unloaded ──navigate("/")──▶ Home
//! ```
//!
//! `Home` is terminal.  A failed navigation leaves the router in `Unloaded`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::context::{AppContext, Scope};
use crate::application::controller::{Controller, ControllerRegistry};
use crate::application::templates::{TemplateError, TemplateSource};
use crate::domain::{NavigationState, RouteDefinition, HOME_ROUTE};

/// Errors that can occur while registering or activating a route.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No route matches the path.
    #[error("no route matches {0:?}")]
    Miss(String),

    /// A route with the same name or URL pattern already exists.
    #[error("route {name:?} conflicts with an existing route")]
    Duplicate { name: &'static str },

    /// The route's template could not be fetched.
    #[error("template for route {route:?} unavailable: {source}")]
    Template {
        route: &'static str,
        #[source]
        source: TemplateError,
    },

    /// The route names a controller that was never registered.
    #[error("route {route:?} names unknown controller {controller:?}")]
    UnknownController {
        route: &'static str,
        controller: &'static str,
    },

    /// A view is already active; there is no transition out of it.
    #[error("navigation already in state {0}")]
    AlreadyActive(NavigationState),
}

// ── Route table ───────────────────────────────────────────────────────────────

/// The set of declared routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The application's route table: exactly one route, `home`.
    pub fn jeeboot() -> Self {
        Self {
            routes: vec![HOME_ROUTE],
        }
    }

    /// Adds a route.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Duplicate`] if the name or URL pattern is
    /// already taken.
    pub fn register(&mut self, route: RouteDefinition) -> Result<(), RoutingError> {
        let clash = self
            .routes
            .iter()
            .any(|r| r.name == route.name || r.url_pattern == route.url_pattern);
        if clash {
            return Err(RoutingError::Duplicate { name: route.name });
        }
        self.routes.push(route);
        Ok(())
    }

    /// Finds the route whose URL pattern matches `path` exactly.  A query
    /// string or fragment is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Miss`] when nothing matches.
    pub fn resolve(&self, path: &str) -> Result<&RouteDefinition, RoutingError> {
        let bare = path.split(['?', '#']).next().unwrap_or_default();
        let bare = if bare.is_empty() { "/" } else { bare };
        self.routes
            .iter()
            .find(|r| r.url_pattern == bare)
            .ok_or_else(|| RoutingError::Miss(path.to_string()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter()
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// A route that has been activated.
#[derive(Debug)]
pub struct ActiveView {
    pub route: RouteDefinition,
    /// The template markup, as fetched.
    pub template: String,
    pub scope: Scope,
    pub controller: Box<dyn Controller>,
}

/// Owns navigation state and activates routes.
pub struct Router {
    table: RouteTable,
    controllers: ControllerRegistry,
    templates: Arc<dyn TemplateSource>,
    context: AppContext,
    state: NavigationState,
}

impl Router {
    pub fn new(
        table: RouteTable,
        controllers: ControllerRegistry,
        templates: Arc<dyn TemplateSource>,
        context: AppContext,
    ) -> Self {
        Self {
            table,
            controllers,
            templates,
            context,
            state: NavigationState::Unloaded,
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Navigates to `path`.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::AlreadyActive`] if a view is already showing.
    /// - [`RoutingError::Miss`] if no route matches.
    /// - [`RoutingError::Template`] if the template cannot be fetched.
    /// - [`RoutingError::UnknownController`] if the controller is missing.
    ///
    /// On any error the state is unchanged.
    pub async fn navigate(&mut self, path: &str) -> Result<ActiveView, RoutingError> {
        if self.state != NavigationState::Unloaded {
            return Err(RoutingError::AlreadyActive(self.state));
        }

        let route = *self.table.resolve(path)?;
        debug!("route {:?} matched {path:?}", route.name);

        if !self.controllers.contains(route.controller_name) {
            return Err(RoutingError::UnknownController {
                route: route.name,
                controller: route.controller_name,
            });
        }

        let template = self
            .templates
            .fetch(route.template_resource)
            .await
            .map_err(|source| RoutingError::Template {
                route: route.name,
                source,
            })?;

        let mut scope = Scope::new(self.context.clone());
        let controller = self
            .controllers
            .instantiate(
                route.controller_name,
                &mut scope,
                Arc::clone(&self.context.backend),
            )
            .ok_or(RoutingError::UnknownController {
                route: route.name,
                controller: route.controller_name,
            })?;

        self.state = NavigationState::Home;
        info!(
            "navigated to {:?} ({} with {})",
            route.name,
            route.template_resource,
            controller.name()
        );

        Ok(ActiveView {
            route,
            template,
            scope,
            controller,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
