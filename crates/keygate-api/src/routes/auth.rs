//! Registration and login routes
//!
//! These are the only places tokens are issued. Credentials are checked
//! here, never in the auth core.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use keygate_auth::{hash_password, verify_password};
use keygate_db::NewUser;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

// ==================== Input Validation ====================

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 50;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Validate username length
fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username can not be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username can not be larger than {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate email shape
fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email can not be empty".to_string()));
    }
    if !email.contains('@') {
        return Err(ApiError::BadRequest(
            "Email must be valid (include @)".to_string(),
        ));
    }
    Ok(())
}

/// Validate password length
fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must have at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Auth Routes ====================

/// POST /api/v1/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate_username(&request.username)?;
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    debug!("Registering user: {}", request.username);

    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .insert_user(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
        })
        .await?;

    info!("User {} registered successfully", user.username);

    // The account exists at this point; a signing failure must not be
    // reported as a failed registration.
    let token = match state.issuer.issue(&user.username) {
        Ok(token) => token,
        Err(e) => {
            warn!("Token issuance failed for new user {}: {}", user.username, e);
            return Err(ApiError::Internal(
                "User created successfully but token issuance failed, try logging in".to_string(),
            ));
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            user: UserResponse::from(user),
            token,
            expires_in: state.issuer.ttl_secs(),
        }),
    ))
}

/// POST /api/v1/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_email(&request.email)?;
    if request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and Password are required".to_string(),
        ));
    }
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }

    debug!("Login attempt for email: {}", request.email);

    let user_result = state.db.get_user_by_email(&request.email).await?;

    // Always run password verification so a missing account takes the
    // same time as a wrong password. The dummy is a well-formed Argon2
    // hash that never matches.
    const DUMMY_HASH: &str =
        "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

    let (hash_to_verify, user) = match user_result {
        Some(u) => (u.password_hash.clone(), Some(u)),
        None => (DUMMY_HASH.to_string(), None),
    };

    let password_valid = verify_password(&request.password, &hash_to_verify)?;

    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => return Err(ApiError::InvalidCredentials),
    };

    let token = state.issuer.issue(&user.username)?;

    info!("User {} logged in successfully", user.username);

    Ok(Json(AuthResponse {
        message: "User logged in successfully".to_string(),
        user: UserResponse::from(user),
        token,
        expires_in: state.issuer.ttl_secs(),
    }))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/register", post(register))
        .route("/api/v1/login", post(login))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
        assert!(validate_username(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("pass123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(257)).is_err());
    }
}
