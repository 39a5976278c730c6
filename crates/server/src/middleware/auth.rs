//! Bearer-token authentication gate.
//!
//! [`require_auth`] runs as a route layer in front of protected routes. It
//! verifies the `Authorization: Bearer <token>` header and stores the caller
//! in request extensions, where handlers pick it up with [`RequireAuth`].
//! Requests without a valid token are answered with 401 before any handler
//! runs.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// The caller identified by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Middleware that rejects requests without a valid bearer token.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the header is absent, not a bearer
/// credential, or the token fails verification.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

    let claims = state.tokens().verify(token).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        AppError::Unauthorized("invalid or expired token".to_string())
    })?;

    set_sentry_user(&claims.username);
    request.extensions_mut().insert(AuthenticatedUser {
        username: claims.username,
    });

    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header.
///
/// The scheme name is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extractor for the authenticated caller on routes behind [`require_auth`].
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))
    }
}
