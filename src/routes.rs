//! Route table and navigation.
//!
//! ARCHITECTURE
//! ============
//! `/` landing (public), `/login` entry for anonymous users, `/u` and
//! everything under it is the protected dashboard. Unknown paths fall back
//! to the landing route.

use std::fmt;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Dashboard,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Dashboard => "/u",
        }
    }

    /// Whether entry requires the auth guard.
    #[must_use]
    pub fn is_protected(self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Result of matching a path against the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch {
    Matched(Route),
    /// No route matched; the table redirects to this route instead.
    Fallback(Route),
}

impl RouteMatch {
    #[must_use]
    pub fn route(self) -> Route {
        match self {
            Self::Matched(route) | Self::Fallback(route) => route,
        }
    }
}

/// Match a path against the route table.
///
/// Only the protected dashboard matches by prefix (`/u/**`); every other
/// route matches its path exactly.
#[must_use]
pub fn resolve(path: &str) -> RouteMatch {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    match segments.next() {
        None => RouteMatch::Matched(Route::Landing),
        Some("login") if segments.next().is_none() => RouteMatch::Matched(Route::Login),
        Some("u") => RouteMatch::Matched(Route::Dashboard),
        Some(_) => RouteMatch::Fallback(Route::Landing),
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Navigation trigger accepting a target route.
///
/// Implementations must tolerate repeated calls for the route that is
/// already current.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// In-process navigation history.
#[derive(Debug)]
pub struct Navigation {
    inner: Mutex<NavigationInner>,
}

#[derive(Debug)]
struct NavigationInner {
    current: Route,
    history: Vec<Route>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new(Route::Landing)
    }
}

impl Navigation {
    #[must_use]
    pub fn new(start: Route) -> Self {
        Self { inner: Mutex::new(NavigationInner { current: start, history: vec![start] }) }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).current
    }

    /// Every route entered so far, starting with the initial one.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).history.clone()
    }
}

impl Navigator for Navigation {
    fn navigate(&self, route: Route) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.current == route {
            tracing::debug!(%route, "already on route");
            return;
        }
        tracing::debug!(from = %inner.current, to = %route, "navigate");
        inner.current = route;
        inner.history.push(route);
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
