//! StudyFlow timer API.
//!
//! Everything except the binary entrypoint lives in this library so the
//! integration tests can build the exact production router.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
