//! Request guards.
//!
//! Each guard is an axum middleware that reads the caller's key from the
//! `X-API-Key` header, runs one [`Predicate`] through the [`Gate`], and
//! either continues to the handler or ends the request with a bare 403.
//! Guards are attached with `route_layer`, so they run before the handler
//! extracts anything from the body.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use peruser_core::UserIndex;
use peruser_perms::{Decision, Gate, Predicate};

use crate::error::ApiError;

/// Header carrying the caller's credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// The caller's key, if the header is present and valid UTF-8.
pub fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

async fn run(gate: &Gate, predicate: Predicate, req: Request, next: Next) -> Response {
    // Owned, so no borrow of the request is held across the lookup.
    let key = api_key(req.headers()).map(str::to_owned);
    match gate.check(key.as_deref(), &predicate).await {
        Decision::Allow => next.run(req).await,
        Decision::Deny => ApiError::Forbidden.into_response(),
    }
}

/// EnabledGuard: the caller's account is enabled.
pub async fn require_enabled(State(gate): State<Gate>, req: Request, next: Next) -> Response {
    run(&gate, Predicate::Enabled, req, next).await
}

/// AdminGuard: the caller is an enabled admin.
pub async fn require_admin(State(gate): State<Gate>, req: Request, next: Next) -> Response {
    run(&gate, Predicate::Admin, req, next).await
}

/// SelfOrAdminGuard: the caller owns the `{index}` in the path, or is an
/// enabled admin. A path that does not yield an index is denied.
pub async fn require_self_or_admin(
    State(gate): State<Gate>,
    index: Result<Path<UserIndex>, PathRejection>,
    req: Request,
    next: Next,
) -> Response {
    match index {
        Ok(Path(index)) => run(&gate, Predicate::SelfOrAdmin(index), req, next).await,
        Err(e) => {
            tracing::debug!(error = %e, "no target index in path, denying");
            ApiError::Forbidden.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_api_key_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(api_key(&headers), None);

        headers.insert("X-API-Key", HeaderValue::from_static("abc"));
        assert_eq!(api_key(&headers), Some("abc"));
    }

    #[test]
    fn test_api_key_non_utf8() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        assert_eq!(api_key(&headers), None);
    }
}
