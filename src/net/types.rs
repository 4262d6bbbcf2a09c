//! Response and error types shared by the request pipeline.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Request, StatusCode, Url};
use serde::de::DeserializeOwned;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced while dispatching a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be built (bad URL, bad header value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}")]
    Status { status: StatusCode, body: String },

    /// The request never produced a response (connect, timeout, body read).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the presented credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// A fully read HTTP response with a success status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }

    /// Whether the server labelled the body as JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("application/json"))
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// Build a request for `url`, with an optional JSON body.
///
/// # Errors
///
/// Returns an error if `url` does not parse.
pub fn build_request(method: Method, url: &str, json: Option<&serde_json::Value>) -> Result<Request, ApiError> {
    let url = Url::parse(url).map_err(|e| ApiError::InvalidRequest(format!("{url}: {e}")))?;
    let mut request = Request::new(method, url);
    if let Some(value) = json {
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(value.to_string().into());
    }
    Ok(request)
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
