//! Keygate REST API
//!
//! This crate provides the Axum-based HTTP API for Keygate: registration
//! and login (which issue tokens) and the protected user-read routes
//! behind the authentication gate.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
