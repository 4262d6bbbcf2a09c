//! Route guards consulted before entering a protected view.

use std::sync::Arc;

use crate::routes::{Navigator, Route};
use crate::session::SessionStore;

/// Synchronous gate over a target route.
pub trait Guard: Send + Sync {
    /// Return `true` to permit entry. A guard that denies entry is
    /// responsible for any redirect it wants.
    fn can_enter(&self, target: Route) -> bool;
}

/// Permits entry only with a stored token; otherwise redirects to `/login`.
pub struct AuthGuard {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl AuthGuard {
    #[must_use]
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl Guard for AuthGuard {
    fn can_enter(&self, target: Route) -> bool {
        if self.session.has_valid_token() {
            tracing::debug!(%target, "guard: entry permitted");
            return true;
        }

        tracing::debug!(%target, "guard: no credential, redirecting to login");
        self.navigator.navigate(Route::Login);
        false
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
