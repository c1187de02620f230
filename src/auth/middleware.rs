//! Session guard middleware for protected routes.
//!
//! Extracts the session token from the explicit header or the session
//! cookie, validates it, and re-fetches the account so a token for a
//! since-deleted account is rejected. The wrapped handler only ever runs
//! with a resolved account in the request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::error::AuthError;
use super::token::TokenError;
use crate::account::{Account, AccountRepository};
use crate::gateway::state::AppState;

/// Name of the HTTP-only session cookie set at login.
pub const SESSION_COOKIE: &str = "ledger_token";
/// Explicit token header, preferred by non-browser clients.
pub const TOKEN_HEADER: &str = "x-access-token";

/// Account resolved by the session guard, injected into request extensions.
#[derive(Clone)]
pub struct CurrentAccount(pub Account);

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid => AuthError::TokenInvalid,
        }
    }
}

/// Pull the session token out of the explicit header, falling back to the
/// session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }
    cookie_token(headers)
}

/// Find the session cookie among the request's Cookie headers.
pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((name, token)) = pair.trim().split_once('=') {
                if name == SESSION_COOKIE && !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

/// Resolve a token string to its account, failing closed on any storage or
/// decode problem.
pub async fn resolve_account(state: &AppState, token: &str) -> Result<Account, AuthError> {
    let claims = state.tokens.verify(token)?;
    let user_id: i64 = claims.sub.parse().map_err(|_| AuthError::TokenInvalid)?;

    let account = AccountRepository::find_by_id(state.db.pool(), user_id)
        .await
        .map_err(|e| {
            tracing::error!("Account lookup failed during token validation: {e}");
            AuthError::TokenInvalid
        })?
        .ok_or(AuthError::TokenInvalid)?;
    Ok(account)
}

/// Axum middleware guarding the sync routes. On any failure the wrapped
/// handler is never invoked.
pub async fn session_guard(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = token_from_headers(request.headers()).ok_or(AuthError::Unauthenticated)?;
    let account = resolve_account(&state, &token).await?;

    request.extensions_mut().insert(CurrentAccount(account));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_token_preferred_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("header-token"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("ledger_token=cookie-token"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; ledger_token=cookie-token; theme=dark"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_no_carrier_yields_none() {
        let headers = HeaderMap::new();
        assert!(token_from_headers(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("other=1"));
        assert!(token_from_headers(&headers).is_none());
    }

    #[test]
    fn test_empty_values_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static(""));
        headers.insert(header::COOKIE, HeaderValue::from_static("ledger_token="));
        assert!(token_from_headers(&headers).is_none());
    }

    #[test]
    fn test_token_error_mapping() {
        assert_eq!(AuthError::from(TokenError::Expired), AuthError::TokenExpired);
        assert_eq!(AuthError::from(TokenError::Invalid), AuthError::TokenInvalid);
    }
}
