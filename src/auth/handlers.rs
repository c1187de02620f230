//! Login and registration endpoints.
//!
//! The login decision order is fixed: lock state, then rate limit, then
//! allow-list membership, then password verification. Blocked and
//! disallowed identities short-circuit before any hashing, so neither
//! timing nor status codes reveal allow-list membership to a locked-out
//! caller. Each terminal branch records exactly one audit event.

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use utoipa::ToSchema;

use super::error::AuthError;
use super::middleware::SESSION_COOKIE;
use super::throttle::AttemptTracker;
use crate::account::{AccountRepository, password::verify_password};
use crate::audit::{AuditLog, AuthEvent, notes};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, error_codes};

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "user@allowed.example")]
    #[serde(default)]
    pub email: String,
    #[schema(example = "password123")]
    #[serde(default)]
    pub password: String,
}

/// Login response data
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginData {
    pub token: String,
    pub email: String,
}

/// Login with an allow-listed email and password
///
/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = ApiResponse<LoginData>),
        (status = 401, description = "Wrong email or password"),
        (status = 403, description = "Email not allow-listed"),
        (status = 429, description = "Rate limited or locked out")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let client_addr = addr.ip().to_string();
    let email = req.email.trim();
    let key = AttemptTracker::attempt_key("login", &client_addr, email);

    // 1. Active lockout. Checked first: correct credentials never bypass
    // a running cooldown.
    if state.throttle.is_locked(&key) {
        AuditLog::record(
            state.db.pool().clone(),
            AuthEvent::login(Some(email), &client_addr, false, Some(notes::LOCKED)),
        );
        return Err(AuthError::Locked);
    }

    // 2. Sliding window. Exhausting it escalates to a lockout.
    if !state.throttle.check_rate(&key) {
        state.throttle.lock(&key);
        AuditLog::record(
            state.db.pool().clone(),
            AuthEvent::login(Some(email), &client_addr, false, Some(notes::RATE_LIMITED_LOCKED)),
        );
        return Err(AuthError::RateLimited);
    }

    // 3. Allow-list membership, before touching the account store.
    if !state.allowlist.contains(email) {
        AuditLog::record(
            state.db.pool().clone(),
            AuthEvent::login(Some(email), &client_addr, false, Some(notes::EMAIL_NOT_ALLOWED)),
        );
        return Err(AuthError::IdentityNotAllowed);
    }

    // 4. Credentials. A storage error fails closed as a credential
    // mismatch, never as a pass.
    let account = match AccountRepository::find_by_email(state.db.pool(), email).await {
        Ok(Some(account)) => Some(account),
        Ok(None) => None,
        Err(e) => {
            tracing::error!("Account lookup failed during login: {e}");
            None
        }
    };
    let verified = account
        .as_ref()
        .is_some_and(|a| verify_password(&req.password, &a.password_hash));
    let Some(account) = account.filter(|_| verified) else {
        AuditLog::record(
            state.db.pool().clone(),
            AuthEvent::login(Some(email), &client_addr, false, Some(notes::BAD_CREDENTIALS)),
        );
        return Err(AuthError::CredentialMismatch);
    };

    // 5. Success: issue the session token.
    let token = state.tokens.issue(account.user_id).map_err(|e| {
        tracing::error!("Token issuance failed: {e}");
        AuthError::StorageUnavailable
    })?;

    AuditLog::record(
        state.db.pool().clone(),
        AuthEvent::login(Some(email), &client_addr, true, None),
    );

    let body = ApiResponse::success(LoginData {
        token: token.clone(),
        email: account.email,
    });
    let mut response = (StatusCode::OK, Json(body)).into_response();
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// Registration is permanently disabled
///
/// POST /auth/register
///
/// The route exists only to answer with a clear denial instead of a 404.
#[utoipa::path(
    post,
    path = "/auth/register",
    responses(
        (status = 403, description = "Registration is disabled")
    ),
    tag = "Auth"
)]
pub async fn register_disabled() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error(
            error_codes::REGISTRATION_DISABLED,
            "Registration is disabled",
        )),
    )
}
