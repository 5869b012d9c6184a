//! Keygate Database Layer
//!
//! This crate provides the persistence layer for Keygate user accounts,
//! using SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::{NewUser, User};
pub use repository::Database;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
