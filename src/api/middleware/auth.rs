//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, validates the JWT, the
//! logout deny-list and the account behind it, and injects `CallerContext`
//! into request extensions for downstream handlers.

use axum::http::header::{AUTHORIZATION, CACHE_CONTROL};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};
use crate::auth;

/// Require a valid access token.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
/// On success: injects `CallerContext` and adds `Cache-Control: no-store`.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;

    let caller = authenticate(&ctx, token).await.inspect_err(|_| {
        tracing::warn!(path = %req.uri().path(), "Rejected bearer token");
    })?;
    req.extensions_mut().insert(caller);

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

/// Validate a bearer token against the signing key and deny-list.
pub async fn authenticate(ctx: &ApiContext, token: String) -> Result<CallerContext, ApiError> {
    let claims = ctx
        .with_db(move |conn, core| auth::authenticate(conn, core.tokens(), &token))
        .await?;
    Ok(CallerContext::from(claims))
}

/// The token after `Bearer `, if the header is present and well-formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }
}
