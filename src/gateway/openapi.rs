//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:5000/docs`
//! - OpenAPI JSON: `http://localhost:5000/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::handlers::{LoginData, LoginRequest};
use crate::gateway::handlers::HealthResponse;

/// Session-token security scheme (header carrier; a cookie works too)
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-access-token",
                    "Session token issued by POST /auth/login. \
                     Browsers may present it via the ledger_token cookie instead.",
                ))),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledger Sync API",
        version = "1.0.0",
        description = "Allow-list authentication and snapshot synchronization for a personal financial tracker.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Development"),
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register_disabled,
        crate::sync::handlers::upload,
        crate::sync::handlers::download,
        crate::gateway::handlers::health_check,
    ),
    components(
        schemas(
            LoginRequest,
            LoginData,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login against the fixed account allow-list"),
        (name = "Sync", description = "Snapshot upload/download (session token required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
