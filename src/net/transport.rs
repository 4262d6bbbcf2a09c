//! HTTP transport on `reqwest`.
//!
//! Non-success statuses come back as `ApiError::Status` so middleware can
//! react to them the same way it reacts to transport failures.

use std::time::Duration;

use reqwest::Request;

use super::middleware::Transport;
use super::types::{ApiError, ApiResponse};
use crate::config::HttpTimeouts;

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<ApiResponse, ApiError> {
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }
        Ok(ApiResponse { status, headers, body })
    }
}
