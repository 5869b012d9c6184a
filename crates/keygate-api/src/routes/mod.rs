//! API routes

mod auth;
mod health;
mod types;
mod users;

use axum::middleware::from_fn_with_state;
use axum::Router;
use keygate_auth::auth_gate;

use crate::state::AppState;

/// Create the main router
///
/// Registration, login, and health checks stay public; everything under
/// the user routes sits behind the authentication gate.
pub fn create_router(state: AppState) -> Router {
    let protected = users::routes().layer(from_fn_with_state(state.gate.clone(), auth_gate));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected)
        .with_state(state)
}
