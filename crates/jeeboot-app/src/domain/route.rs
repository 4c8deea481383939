//! Route declarations and the navigation state.

use std::fmt;

/// One URL-addressable view: which template to render and which controller
/// drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDefinition {
    /// State name used by the routing feature.
    pub name: &'static str,
    /// URL pattern matched against the current path.
    pub url_pattern: &'static str,
    /// Template resource resolved by the template source.
    pub template_resource: &'static str,
    /// Controller instantiated when the route activates.
    pub controller_name: &'static str,
}

/// The only route this application has.
pub const HOME_ROUTE: RouteDefinition = RouteDefinition {
    name: "home",
    url_pattern: "/",
    template_resource: "jeeboot.html",
    controller_name: "JeeBootCtrl",
};

/// Where navigation currently stands.
///
/// `Unloaded → Home` happens once, when `/` is navigated to.  `Home` is
/// terminal: there is no reverse transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationState {
    #[default]
    Unloaded,
    Home,
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationState::Unloaded => f.write_str("unloaded"),
            NavigationState::Home => f.write_str("home"),
        }
    }
}
