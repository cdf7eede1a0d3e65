//! Authentication middleware: Bearer token extraction and validation.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use kredo_core::error::CoreError;

use crate::AppState;
use crate::error::AppError;

/// Phone number proven by the request's access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedPhone(pub String);

/// Axum middleware: extracts `Authorization: Bearer <token>`, validates it,
/// and injects [`AuthenticatedPhone`] into request extensions.
///
/// Every failure gives the same response so callers cannot tell a bad
/// signature from an expired token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let phone = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|token| state.tokens.validate(token.trim()))
        .ok_or_else(|| CoreError::Unauthorized("invalid or missing access token".into()))?;

    request.extensions_mut().insert(AuthenticatedPhone(phone));

    Ok(next.run(request).await)
}
