//! JWT issuance and verification

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::keys::KeyStore;

/// The only algorithm Keygate signs with. Tokens declaring anything else
/// (including `none`) are rejected before any signature work.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Name of [`SIGNING_ALGORITHM`] as it appears in a token header.
const SIGNING_ALGORITHM_NAME: &str = "RS256";

/// JWT claims
///
/// Constructed fresh per issuance, serialized into the token payload, and
/// reconstructed from untrusted input at verification time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username of the authenticated principal)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Builds signed tokens with the key store's private key.
pub struct TokenIssuer {
    keys: Arc<KeyStore>,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer with the given token lifetime.
    pub fn new(keys: Arc<KeyStore>, ttl_hours: i64) -> Self {
        Self {
            keys,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for an authenticated username.
    ///
    /// Callers must have already authenticated the principal; this only
    /// encodes and signs.
    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token with an explicit issuance time.
    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: username.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        debug!("Issuing token for user: {}", username);

        encode(&Header::new(SIGNING_ALGORITHM), &claims, self.keys.encoding_key())
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Token lifetime in seconds, for reporting to clients.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

/// Verifies token strings with the key store's public key.
///
/// Holds no mutable state; a single verifier may serve any number of
/// concurrent verification calls.
pub struct TokenVerifier {
    keys: Arc<KeyStore>,
    leeway_secs: i64,
}

impl TokenVerifier {
    /// Create a verifier with zero clock-skew tolerance.
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self {
            keys,
            leeway_secs: 0,
        }
    }

    /// Allow the given number of seconds of clock skew on expiry checks.
    pub fn with_leeway(mut self, secs: i64) -> Self {
        self.leeway_secs = secs;
        self
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit current time.
    ///
    /// Checks run in a fixed order and any failure is terminal:
    /// structure, declared algorithm, signature, expiry. A token is
    /// valid through its expiry timestamp inclusive (plus leeway).
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        check_declared_algorithm(token)?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is checked manually below against the caller's clock.
        validation.validate_exp = false;

        let token_data = decode::<Claims>(token, self.keys.decoding_key(), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::AlgorithmMismatch
                }
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            })?;

        if now.timestamp() > token_data.claims.exp + self.leeway_secs {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}

/// Check token structure and the declared `alg` before any signature work.
///
/// The header is inspected unverified, the same way as routing-time header
/// peeks: the algorithm merely selects the rejection kind here, and the
/// signature check that follows is what grants trust. Done by hand because
/// `jsonwebtoken` cannot even parse a header declaring `none`, and a
/// downgraded token must surface as an algorithm mismatch rather than a
/// malformed one.
fn check_declared_algorithm(token: &str) -> Result<(), AuthError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(AuthError::MalformedToken);
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(parts[0])
        .map_err(|_| AuthError::MalformedToken)?;
    let header: serde_json::Value =
        serde_json::from_slice(&header_bytes).map_err(|_| AuthError::MalformedToken)?;

    match header.get("alg").and_then(|v| v.as_str()) {
        Some(SIGNING_ALGORITHM_NAME) => Ok(()),
        Some(_) => Err(AuthError::AlgorithmMismatch),
        None => Err(AuthError::MalformedToken),
    }
}
