//! Snapshot upload/download handlers.
//!
//! Both routes sit behind the session guard; the authenticated account
//! arrives through request extensions.

use axum::{Extension, Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::repository::SnapshotRepository;
use crate::auth::middleware::CurrentAccount;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, error_codes};

/// Upload the application snapshot
///
/// POST /api/sync/upload
///
/// The body is an arbitrary JSON object stored verbatim, keyed by the
/// authenticated account.
#[utoipa::path(
    post,
    path = "/api/sync/upload",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Snapshot stored"),
        (status = 400, description = "Empty body"),
        (status = 401, description = "Missing, expired or invalid token"),
        (status = 500, description = "Storage error")
    ),
    security(("session_token" = [])),
    tag = "Sync"
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), (StatusCode, Json<ApiResponse<()>>)> {
    let empty = payload.is_null() || payload.as_object().is_some_and(|m| m.is_empty());
    if empty {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                "No data to upload",
            )),
        ));
    }

    match SnapshotRepository::put(state.db.pool(), account.user_id, &account.email, &payload).await
    {
        Ok(()) => Ok((StatusCode::OK, Json(ApiResponse::success(())))),
        Err(e) => {
            tracing::error!(user_id = account.user_id, "Snapshot store failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    error_codes::INTERNAL_ERROR,
                    "Failed to store snapshot",
                )),
            ))
        }
    }
}

/// Download the last uploaded snapshot
///
/// GET /api/sync/download
///
/// An account that never uploaded gets an empty object, not an error.
#[utoipa::path(
    get,
    path = "/api/sync/download",
    responses(
        (status = 200, description = "Last stored snapshot (or empty object)"),
        (status = 401, description = "Missing, expired or invalid token"),
        (status = 500, description = "Storage error")
    ),
    security(("session_token" = [])),
    tag = "Sync"
)]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), (StatusCode, Json<ApiResponse<()>>)>
{
    match SnapshotRepository::get(state.db.pool(), account.user_id).await {
        Ok(payload) => {
            let data = payload.unwrap_or_else(|| serde_json::json!({}));
            Ok((StatusCode::OK, Json(ApiResponse::success(data))))
        }
        Err(e) => {
            tracing::error!(user_id = account.user_id, "Snapshot fetch failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    error_codes::INTERNAL_ERROR,
                    "Failed to fetch snapshot",
                )),
            ))
        }
    }
}
