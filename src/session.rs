//! Auth-session state for the current device user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` is the single source of truth for the stored credential.
//! The route guard and the request interceptor read it; only its own
//! methods write the backing storage.
//!
//! DESIGN
//! ======
//! Authentication is presence-only: a non-empty stored token means
//! authenticated. Expiry and signature are never checked locally; the server
//! signals rejection with a 401 and the interceptor clears the session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::storage::{KeyValueStorage, StorageError, StorageWrite};

pub const TOKEN_KEY: &str = "token";
pub const IDENTITY_KEY: &str = "identity";

const BEARER_PREFIX: &str = "Bearer ";

/// Session-level state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Point-in-time copy of the stored session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub identity: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.is_authenticated() { SessionState::Authenticated } else { SessionState::Anonymous }
    }
}

/// Shared handle to the persisted session. Cloning shares the same storage.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<Mutex<Box<dyn KeyValueStorage>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("state", &self.state()).finish()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        Self { storage: Arc::new(Mutex::new(Box::new(storage))) }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn KeyValueStorage>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().get(TOKEN_KEY)
    }

    /// Stored identity, only when a non-empty token is also present.
    #[must_use]
    pub fn identity(&self) -> Option<String> {
        self.snapshot().identity
    }

    /// Read token and identity under one lock.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        let storage = self.lock();
        let token = storage.get(TOKEN_KEY);
        let identity = if token.as_deref().is_some_and(|t| !t.is_empty()) {
            storage.get(IDENTITY_KEY)
        } else {
            None
        };
        Session { token, identity }
    }

    #[must_use]
    pub fn has_valid_token(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.snapshot().state()
    }

    /// `Bearer <token>`, or `None` when no usable token is stored.
    #[must_use]
    pub fn authorization_header_value(&self) -> Option<String> {
        self.token()
            .filter(|t| !t.is_empty())
            .map(|t| format!("{BEARER_PREFIX}{t}"))
    }

    /// Overwrite token and identity in one storage write.
    ///
    /// A `None` identity removes any previously cached one.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium rejects the write.
    pub fn save(&self, token: &str, identity: Option<&str>) -> Result<(), StorageError> {
        let identity_write = match identity {
            Some(value) => StorageWrite::Set(IDENTITY_KEY, value),
            None => StorageWrite::Remove(IDENTITY_KEY),
        };
        self.lock()
            .write(&[StorageWrite::Set(TOKEN_KEY, token), identity_write])?;
        tracing::info!(identity = identity.unwrap_or_default(), "session saved");
        Ok(())
    }

    /// Remove token and identity. Clearing an empty session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium rejects the write.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut storage = self.lock();
        if storage.get(TOKEN_KEY).is_none() && storage.get(IDENTITY_KEY).is_none() {
            return Ok(());
        }
        storage.write(&[StorageWrite::Remove(TOKEN_KEY), StorageWrite::Remove(IDENTITY_KEY)])?;
        tracing::info!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
