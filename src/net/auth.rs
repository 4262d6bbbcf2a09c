//! Auth interceptor: stamps credentials on outbound requests and reacts to
//! credential rejection.
//!
//! DESIGN
//! ======
//! The token is read once per request at dispatch time. Requests already in
//! flight keep the header they were sent with even if the session is cleared
//! afterwards.
//!
//! ERROR HANDLING
//! ==============
//! On a 401 the session is cleared and the user is sent to `/login` before
//! the original error is returned. Every other outcome passes through
//! untouched. Several concurrent 401s are safe: clearing and redirecting are
//! both idempotent.

use std::sync::Arc;

use reqwest::Request;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, HeaderValue};

use super::middleware::{Middleware, Next};
use super::types::{ApiError, ApiResponse};
use crate::config::ClientIdentity;
use crate::routes::{Navigator, Route};
use crate::session::SessionStore;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const CLIENT_ID_HEADER: &str = "x-client-id";

pub struct AuthInterceptor {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    api_key: HeaderValue,
    client_id: HeaderValue,
}

impl AuthInterceptor {
    /// # Errors
    ///
    /// Returns an error if the client identity values are not valid header
    /// values.
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>, client: &ClientIdentity) -> Result<Self, ApiError> {
        Ok(Self {
            session,
            navigator,
            api_key: sensitive_header(&client.api_key, API_KEY_HEADER)?,
            client_id: header_value(&client.client_id, CLIENT_ID_HEADER)?,
        })
    }

    fn authorize(&self, request: &mut Request, authorization: &str) -> Result<(), ApiError> {
        let authorization = sensitive_header(authorization, AUTHORIZATION.as_str())?;
        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(API_KEY_HEADER, self.api_key.clone());
        headers.insert(CLIENT_ID_HEADER, self.client_id.clone());
        Ok(())
    }

    fn reject_credential(&self, url: &str) {
        tracing::warn!(url, "unauthorized request, credential may be expired");
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "failed to clear rejected session");
        }
        self.navigator.navigate(Route::Login);
    }
}

#[async_trait::async_trait]
impl Middleware for AuthInterceptor {
    async fn handle(&self, mut request: Request, next: Next<'_>) -> Result<ApiResponse, ApiError> {
        if let Some(authorization) = self.session.authorization_header_value() {
            self.authorize(&mut request, &authorization)?;
        }

        let url = request.url().to_string();
        let result = next.run(request).await;
        if let Err(err) = &result {
            if err.is_unauthorized() {
                self.reject_credential(&url);
            }
        }
        result
    }
}

fn header_value(value: &str, name: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_| ApiError::InvalidRequest(format!("invalid value for header {name}")))
}

fn sensitive_header(value: &str, name: &str) -> Result<HeaderValue, ApiError> {
    let mut value = header_value(value, name)?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
