//! Ordered middleware chain ending in a transport.
//!
//! DESIGN
//! ======
//! Each middleware receives the request plus a `Next` continuation holding
//! the rest of the chain. Calling `next.run(request)` forwards the request;
//! whatever it returns flows back through every earlier middleware in
//! reverse order.

use std::sync::Arc;

use reqwest::Request;

use super::types::{ApiError, ApiResponse};

/// Terminal stage that actually sends a request.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<ApiResponse, ApiError>;
}

/// A unit composed into the request pipeline.
#[async_trait::async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<ApiResponse, ApiError>;
}

/// The remainder of the chain after the current middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    transport: &'a dyn Transport,
}

impl Next<'_> {
    /// Forward `request` to the next middleware, or to the transport when the
    /// chain is exhausted.
    ///
    /// # Errors
    ///
    /// Returns whatever the downstream stages return.
    pub async fn run(self, request: Request) -> Result<ApiResponse, ApiError> {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(request, Next { chain: rest, transport: self.transport }).await,
            None => self.transport.send(request).await,
        }
    }
}

/// Request dispatch pipeline: middleware in order, then the transport.
pub struct Pipeline {
    chain: Vec<Arc<dyn Middleware>>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { chain: Vec::new(), transport }
    }

    /// Append a middleware; earlier middleware see the request first.
    #[must_use]
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.chain.push(Arc::new(middleware));
        self
    }

    /// Send `request` through the chain.
    ///
    /// # Errors
    ///
    /// Returns the error surfaced by the chain or the transport.
    pub async fn dispatch(&self, request: Request) -> Result<ApiResponse, ApiError> {
        tracing::debug!(method = %request.method(), url = %request.url(), "dispatch");
        Next { chain: &self.chain, transport: self.transport.as_ref() }
            .run(request)
            .await
    }
}

#[cfg(test)]
#[path = "middleware_test.rs"]
mod tests;
