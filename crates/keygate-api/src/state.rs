//! Application state

use keygate_auth::{AuthGate, TokenIssuer};
use keygate_db::Database;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub issuer: Arc<TokenIssuer>,
    pub gate: AuthGate,
}

impl AppState {
    pub fn new(db: Database, issuer: Arc<TokenIssuer>, gate: AuthGate) -> Self {
        Self { db, issuer, gate }
    }
}
