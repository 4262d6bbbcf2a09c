//! Path navigation through the route table and its guards.

use std::sync::Arc;

use crate::guard::Guard;
use crate::routes::{Navigator, Route, RouteMatch, resolve};
use crate::session::SessionStore;
use crate::storage::StorageError;

/// What happened when opening a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The route was entered.
    Entered(Route),
    /// Entry to `requested` was refused or unmatched; the user is now on `to`.
    Redirected { requested: Option<Route>, to: Route },
}

pub struct Router {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    guard: Arc<dyn Guard>,
}

impl Router {
    #[must_use]
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>, guard: Arc<dyn Guard>) -> Self {
        Self { session, navigator, guard }
    }

    /// Resolve `path` and enter its route, consulting the guard first for
    /// protected routes.
    pub fn open(&self, path: &str) -> NavigationOutcome {
        let route = match resolve(path) {
            RouteMatch::Matched(route) => route,
            RouteMatch::Fallback(to) => {
                tracing::debug!(path, %to, "no route matched");
                self.navigator.navigate(to);
                return NavigationOutcome::Redirected { requested: None, to };
            }
        };

        if route.is_protected() && !self.guard.can_enter(route) {
            return NavigationOutcome::Redirected { requested: Some(route), to: Route::Login };
        }

        self.navigator.navigate(route);
        NavigationOutcome::Entered(route)
    }

    /// Explicit user logout: clear the session and return to the landing page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session storage cannot be cleared; no
    /// navigation happens in that case.
    pub fn logout(&self) -> Result<Route, StorageError> {
        self.session.clear()?;
        tracing::info!("user logged out");
        self.navigator.navigate(Route::Landing);
        Ok(Route::Landing)
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
