//! Routing boundary.

use std::fmt;
use std::sync::Mutex;

use tracing::debug;

/// A navigable location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in screen.
    Login,
    /// Welcome screen.
    Welcome,
    /// Profile form screen.
    Formulario,
    /// Device registration screen.
    Devices,
}

impl Route {
    /// The route's path.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Welcome => "/welcome",
            Self::Formulario => "/formulario",
            Self::Devices => "/devices",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Something that can move the visitor to another route.
pub trait Navigator: Send + Sync {
    /// Navigate to `route`.
    fn navigate(&self, route: Route);
}

/// Navigator that records every navigation in order.
#[derive(Debug, Default)]
pub struct RouteHistory {
    visited: Mutex<Vec<Route>>,
}

impl RouteHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent navigation, if any.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.visited
            .lock()
            .ok()
            .and_then(|visited| visited.last().copied())
    }

    /// Every navigation so far, oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<Route> {
        self.visited
            .lock()
            .map(|visited| visited.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RouteHistory {
    fn navigate(&self, route: Route) {
        debug!(route = %route, "Navigating");
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(route);
        }
    }
}
