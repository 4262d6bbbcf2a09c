//! # sarathi
//!
//! Client-side auth session and request authorization for the Sarathi API.
//!
//! A stored bearer token decides whether the user may enter protected
//! routes and is stamped on every outbound request. A 401 from the server
//! clears the session and sends the user back to `/login`.

pub mod config;
pub mod guard;
pub mod net;
pub mod router;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
