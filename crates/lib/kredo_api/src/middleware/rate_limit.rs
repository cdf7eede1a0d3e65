//! Per-client throttling of the public endpoints.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use kredo_core::rate_limit::BucketKey;

use crate::AppState;
use crate::error::AppError;

/// Axum middleware: consumes one token from the `(client ip, path)` bucket
/// or rejects with `RATE_LIMIT_EXCEEDED` before the handler runs.
pub async fn throttle(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = BucketKey::new(client_ip(&request), request.uri().path());
    state.rate_limiter.check(&key)?;
    Ok(next.run(request).await)
}

/// First `X-Forwarded-For` entry, else the peer address.
pub fn client_ip(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
