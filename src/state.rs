//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is built once at startup. It owns the session store, the
//! navigation history, the router and the request pipeline, and hands each
//! component explicit references to the ones it depends on.

use std::sync::Arc;

use reqwest::Method;

use crate::config::{ClientConfig, ClientIdentity};
use crate::guard::AuthGuard;
use crate::net::types::build_request;
use crate::net::{ApiError, ApiResponse, AuthInterceptor, Pipeline, ReqwestTransport, Transport};
use crate::router::Router;
use crate::routes::{Navigation, Route};
use crate::session::SessionStore;
use crate::storage::KeyValueStorage;

pub struct AppState {
    pub session: SessionStore,
    pub navigation: Arc<Navigation>,
    pub router: Router,
    pub http: Pipeline,
}

impl AppState {
    /// Wire the components around `storage`, sending requests through
    /// `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client identity is not a valid header value.
    pub fn new(
        storage: impl KeyValueStorage + 'static,
        transport: Arc<dyn Transport>,
        client: &ClientIdentity,
    ) -> Result<Self, ApiError> {
        let session = SessionStore::new(storage);
        let navigation = Arc::new(Navigation::new(Route::Landing));

        let guard = Arc::new(AuthGuard::new(session.clone(), navigation.clone()));
        let router = Router::new(session.clone(), navigation.clone(), guard);
        let http = Pipeline::new(transport).with(AuthInterceptor::new(session.clone(), navigation.clone(), client)?);

        Ok(Self { session, navigation, router, http })
    }

    /// Build state from config with the real HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the client
    /// identity is invalid.
    pub fn from_config(config: &ClientConfig, storage: impl KeyValueStorage + 'static) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new(config.timeouts)?);
        Self::new(storage, transport, &config.identity)
    }

    /// Send a request to `url` through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the pipeline's error unchanged.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        json: Option<&serde_json::Value>,
    ) -> Result<ApiResponse, ApiError> {
        let request = build_request(method, url, json)?;
        self.http.dispatch(request).await
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::storage::MemoryStorage;
    use reqwest::header::HeaderMap;
    use reqwest::{Request, StatusCode};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// What the mock transport saw for one request.
    #[derive(Debug, Clone)]
    pub struct SentRequest {
        pub method: Method,
        pub url: String,
        pub headers: HeaderMap,
    }

    type SendHook = Box<dyn Fn() + Send + Sync>;

    /// Scripted transport: answers with queued outcomes (200 `{}` when empty)
    /// and records every request it receives.
    #[derive(Default)]
    pub struct MockTransport {
        outcomes: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
        sent: Mutex<Vec<SentRequest>>,
        on_send: Option<SendHook>,
    }

    impl MockTransport {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Run `hook` while each request is "in flight".
        #[must_use]
        pub fn with_hook(hook: impl Fn() + Send + Sync + 'static) -> Self {
            Self { on_send: Some(Box::new(hook)), ..Self::default() }
        }

        pub fn push_status(&self, status: StatusCode) {
            let outcome = if status.is_success() {
                Ok(ApiResponse::new(status, "{}"))
            } else {
                Err(ApiError::Status { status, body: String::new() })
            };
            self.push(outcome);
        }

        pub fn push(&self, outcome: Result<ApiResponse, ApiError>) {
            self.outcomes.lock().unwrap().push_back(outcome);
        }

        #[must_use]
        pub fn sent(&self) -> Vec<SentRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: Request) -> Result<ApiResponse, ApiError> {
            self.sent.lock().unwrap().push(SentRequest {
                method: request.method().clone(),
                url: request.url().to_string(),
                headers: request.headers().clone(),
            });
            if let Some(hook) = &self.on_send {
                hook();
            }
            // Let other in-flight requests reach the transport before answering.
            tokio::task::yield_now().await;
            let next = self.outcomes.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(ApiResponse::new(StatusCode::OK, "{}")))
        }
    }

    #[must_use]
    pub fn test_client_identity() -> ClientIdentity {
        ClientIdentity { api_key: "test-api-key".into(), client_id: "test-client".into() }
    }

    /// `AppState` over memory storage and a mock transport.
    #[must_use]
    pub fn test_app_state() -> (AppState, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let state = AppState::new(MemoryStorage::new(), transport.clone(), &test_client_identity()).unwrap();
        (state, transport)
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
