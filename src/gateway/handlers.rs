//! Gateway handlers: health, decoy endpoint, app-shell rendering routes.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use utoipa::ToSchema;

use super::state::AppState;
use super::types::{ApiResponse, error_codes};
use crate::audit::{AuditLog, AuthEvent};
use crate::auth::TokenError;
use crate::auth::middleware::token_from_headers;

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
}

/// Health check endpoint
///
/// Pings PostgreSQL at most once per interval; the response never exposes
/// internal details.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    // Rate limit: only ping DB once per interval
    static LAST_CHECK_MS: AtomicU64 = AtomicU64::new(0);
    const CHECK_INTERVAL_MS: u64 = 5000;

    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let last_check = LAST_CHECK_MS.load(Ordering::Relaxed);
    let healthy = if now_ms.saturating_sub(last_check) > CHECK_INTERVAL_MS {
        LAST_CHECK_MS.store(now_ms, Ordering::Relaxed);
        match state.db.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                false
            }
        }
    } else {
        true // Within interval, assume healthy
    };

    if healthy {
        (
            StatusCode::OK,
            Json(ApiResponse::success(HealthResponse {
                timestamp_ms: now_ms,
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                code: error_codes::SERVICE_UNAVAILABLE,
                msg: "unavailable".to_string(),
                data: None,
            }),
        )
    }
}

/// Decoy endpoint. Not a real resource: every access is answered 404 and
/// recorded as a suspicious-probe audit event.
pub async fn decoy(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    AuditLog::record(
        state.db.pool().clone(),
        AuthEvent::decoy(&addr.ip().to_string()),
    );
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(
            error_codes::NOT_FOUND,
            "Resource not available",
        )),
    )
}

/// Serve the application shell.
///
/// GET /app
///
/// The one route that also accepts the token as a `?token=` query
/// parameter, for direct browser navigation. Failures redirect to the
/// login page with a reason instead of returning JSON.
pub async fn serve_app(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let token = token_from_headers(&headers)
        .or_else(|| params.get("token").filter(|t| !t.is_empty()).cloned());

    let Some(token) = token else {
        return Redirect::to("/login-page").into_response();
    };
    match state.tokens.verify(&token) {
        Ok(_) => {}
        Err(TokenError::Expired) => {
            return Redirect::to("/login-page?reason=expired").into_response();
        }
        Err(TokenError::Invalid) => {
            return Redirect::to("/login-page?reason=invalid").into_response();
        }
    }

    match tokio::fs::read_to_string(&state.app_shell_path).await {
        Ok(html) => Html(inject_backend_origin(&html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to read app shell: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    error_codes::INTERNAL_ERROR,
                    "App shell not found",
                )),
            )
                .into_response()
        }
    }
}

/// Serve the login page (the same shell, unauthenticated).
///
/// GET /login-page
pub async fn login_page(State(state): State<Arc<AppState>>) -> Response {
    match tokio::fs::read_to_string(&state.app_shell_path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to read app shell: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    error_codes::INTERNAL_ERROR,
                    "App shell not found",
                )),
            )
                .into_response()
        }
    }
}

/// Tell the shell it is being served by this backend (same origin), by
/// injecting a marker script just before `</head>`. A shell without a
/// head section is served untouched.
fn inject_backend_origin(html: &str) -> String {
    const MARKER: &str = "<script>window.BACKEND_ORIGIN = '';</script>";
    match find_head_close(html) {
        Some(idx) => format!("{}{}{}", &html[..idx], MARKER, &html[idx..]),
        None => html.to_string(),
    }
}

fn find_head_close(html: &str) -> Option<usize> {
    html.as_bytes()
        .windows(b"</head>".len())
        .position(|w| w.eq_ignore_ascii_case(b"</head>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_head_close() {
        let html = "<html><head><title>t</title></head><body></body></html>";
        let out = inject_backend_origin(html);
        let idx = out.find("window.BACKEND_ORIGIN").expect("marker injected");
        assert!(idx < out.find("</head>").expect("head close kept"));
    }

    #[test]
    fn test_inject_is_case_insensitive() {
        let html = "<HTML><HEAD></HEAD><BODY></BODY></HTML>";
        let out = inject_backend_origin(html);
        assert!(out.contains("window.BACKEND_ORIGIN"));
    }

    #[test]
    fn test_no_head_leaves_html_untouched() {
        let html = "<p>bare fragment</p>";
        assert_eq!(inject_backend_origin(html), html);
    }
}
