//! Keygate Authentication Core
//!
//! This crate provides JWT issuance, verification, and the fail-closed
//! authentication middleware for Keygate. Tokens are signed with an RSA
//! key pair loaded once at startup and shared read-only by the issuer
//! and verifier.

pub mod error;
pub mod jwt;
pub mod keys;
pub mod middleware;
pub mod password;

#[cfg(test)]
mod test_keys;

pub use error::AuthError;
pub use jwt::{Claims, TokenIssuer, TokenVerifier};
pub use keys::KeyStore;
pub use middleware::{auth_gate, AuthGate};
pub use password::{hash_password, verify_password};
