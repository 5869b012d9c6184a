//! Fail-closed authentication middleware for Axum

use axum::{
    extract::{Request, State},
    http::header::{HeaderName, AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::TokenVerifier;

/// Decision point guarding protected routes.
///
/// Extracts a bearer token from the configured request header, delegates
/// to the verifier, and either forwards the request or short-circuits
/// with a rejection. It performs no business logic of its own.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<TokenVerifier>,
    header: HeaderName,
}

impl AuthGate {
    /// Create a gate reading tokens from the `Authorization` header.
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self {
            verifier,
            header: AUTHORIZATION,
        }
    }

    /// Override the header the token is carried in.
    pub fn with_header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }
}

/// Extract bearer token from an authorization header value
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    if !header.starts_with("Bearer ") {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(&header[7..])
}

/// Authentication middleware
///
/// On success the verified [`Claims`](crate::jwt::Claims) are added to the
/// request extensions and the wrapped handler runs. On any extraction or
/// verification failure the handler is never invoked and the client
/// receives the uniform rejection response; the specific failure kind is
/// only logged.
pub async fn auth_gate(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(&gate.header)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = extract_bearer_token(header)?;

    let claims = gate.verifier.verify(token).map_err(|e| {
        debug!("Rejected token: {}", e);
        e
    })?;

    debug!("Authenticated user: {}", claims.sub);

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::TokenIssuer;
    use crate::test_keys::test_keystore;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn protected_app(gate: AuthGate) -> (Router, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let app = Router::new()
            .route(
                "/protected",
                get(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        "ok"
                    }
                }),
            )
            .layer(axum::middleware::from_fn_with_state(gate, auth_gate));

        (app, hits)
    }

    fn request(header: Option<(&HeaderName, &str)>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/protected");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_header_short_circuits() {
        let gate = AuthGate::new(Arc::new(TokenVerifier::new(test_keystore())));
        let (app, hits) = protected_app(gate);

        let response = app.oneshot(request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_token_short_circuits() {
        let gate = AuthGate::new(Arc::new(TokenVerifier::new(test_keystore())));
        let (app, hits) = protected_app(gate);

        let response = app
            .oneshot(request(Some((&AUTHORIZATION, "Bearer not-a-token"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_bearer_header_short_circuits() {
        let gate = AuthGate::new(Arc::new(TokenVerifier::new(test_keystore())));
        let (app, hits) = protected_app(gate);

        let token = TokenIssuer::new(test_keystore(), 24).issue("testuser").unwrap();
        let response = app
            .oneshot(request(Some((&AUTHORIZATION, token.as_str()))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let gate = AuthGate::new(Arc::new(TokenVerifier::new(test_keystore())));
        let (app, hits) = protected_app(gate);

        let token = TokenIssuer::new(test_keystore(), 24).issue("testuser").unwrap();
        let value = format!("Bearer {}", token);
        let response = app
            .oneshot(request(Some((&AUTHORIZATION, value.as_str()))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_configured_token_header() {
        let header = HeaderName::from_static("x-keygate-token");
        let gate = AuthGate::new(Arc::new(TokenVerifier::new(test_keystore())))
            .with_header(header.clone());
        let (app, hits) = protected_app(gate);

        let token = TokenIssuer::new(test_keystore(), 24).issue("testuser").unwrap();
        let value = format!("Bearer {}", token);
        let response = app
            .oneshot(request(Some((&header, value.as_str()))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
