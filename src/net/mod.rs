//! Outbound request pipeline.
//!
//! SYSTEM CONTEXT
//! ==============
//! `middleware` defines the ordered chain and its terminal transport,
//! `auth` is the interceptor that stamps credentials and reacts to 401s,
//! `transport` sends over HTTP, and `types` holds the shared response and
//! error types.

pub mod auth;
pub mod middleware;
pub mod transport;
pub mod types;

pub use auth::AuthInterceptor;
pub use middleware::{Middleware, Next, Pipeline, Transport};
pub use transport::ReqwestTransport;
pub use types::{ApiError, ApiResponse};
