use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::logging::TraceId;

/// Pull the token out of an `Authorization: Bearer <token>` header.
/// The scheme name is matched case-insensitively.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Some(token.trim()).filter(|token| !token.is_empty())
}

/// Equal-length comparison that does not stop at the first differing byte
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Reject requests whose bearer token does not match the configured one
pub async fn require_bearer_token(
    State(auth): State<Arc<AuthConfig>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = extract_bearer_token(request.headers());
    let token_present = presented.is_some();
    let authorized = presented.is_some_and(|token| tokens_match(token, &auth.api_token));

    if !authorized {
        warn!(
            trace_id = TraceId::of(&request).map(TraceId::as_str),
            path = %request.uri().path(),
            token_present,
            "Unauthorized request"
        );
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
