pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Request, header},
    middleware::{self, Next, from_fn_with_state},
    response::Response,
    routing::{get, post},
};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::account::{AccountRepository, Database};
use crate::auth::{AttemptTracker, TokenService};
use crate::config::AppConfig;
use state::AppState;

const CSP: &str = "default-src 'self'; script-src 'self' 'unsafe-inline' https:; \
                   style-src 'self' 'unsafe-inline' https:; font-src 'self' https:; \
                   img-src 'self' data: https:;";

/// Attach the security response headers to every response. Part of the
/// trust boundary, independent of route.
async fn security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer-when-downgrade"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("geolocation=()"),
    );
    response
}

/// Start the HTTP gateway.
///
/// Reconciles the account allow-list, assembles the shared state and
/// serves until the process exits.
pub async fn run_server(app_config: &AppConfig, db: Arc<Database>, jwt_secret: String, port: u16) {
    // Seed/refresh the allow-listed accounts before accepting logins
    AccountRepository::reconcile_allowlist(db.pool(), &app_config.auth.allowed_accounts).await;

    let allowlist: HashSet<String> = app_config
        .auth
        .allowed_accounts
        .iter()
        .map(|a| a.email.clone())
        .collect();

    let state = Arc::new(AppState::new(
        db,
        TokenService::new(jwt_secret, app_config.auth.token_ttl_hours),
        AttemptTracker::from_config(&app_config.auth),
        allowlist,
        PathBuf::from(&app_config.sync.app_shell_path),
    ));

    // ==========================================================================
    // Auth routes (public)
    // ==========================================================================
    let auth_routes = Router::new()
        .route("/login", post(crate::auth::handlers::login))
        .route("/register", post(crate::auth::handlers::register_disabled));

    // ==========================================================================
    // Sync routes - protected by the session guard
    // ==========================================================================
    let sync_routes = Router::new()
        .route("/upload", post(crate::sync::handlers::upload))
        .route("/download", get(crate::sync::handlers::download))
        .layer(from_fn_with_state(
            state.clone(),
            crate::auth::middleware::session_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(handlers::health_check))
        .nest("/auth", auth_routes)
        .nest("/api/sync", sync_routes)
        // Browser rendering routes
        .route("/app", get(handlers::serve_app))
        .route("/login-page", get(handlers::login_page))
        // Honeytrap: answers 404 and logs the probe
        .route("/decoy", get(handlers::decoy).post(handlers::decoy))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        // Applied last so every response carries the security headers
        .layer(middleware::from_fn(security_headers))
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", app_config.gateway.host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                port, port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Gateway listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);
    println!("🔒 Protected API: /api/sync/* (session token required)");

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
