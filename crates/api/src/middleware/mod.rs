//! Authentication middleware extractors.
//!
//! - [`auth::AuthStudent`] -- Extracts the authenticated student from a JWT
//!   Bearer token.

pub mod auth;
