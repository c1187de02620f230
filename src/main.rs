//! Ledger Sync - service entry point
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│ Reconcile │───▶│ Gateway  │───▶│ Postgres │
//! │  (YAML)  │    │ allowlist │    │  (axum)  │    │ (sqlx)   │
//! └──────────┘    └───────────┘    └──────────┘    └──────────┘
//! ```

use std::sync::Arc;

use ledger_sync::account::Database;
use ledger_sync::config::AppConfig;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument) or PORT env
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    std::env::var("PORT").ok().and_then(|p| p.parse().ok())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env);
    let _log_guard = ledger_sync::logging::init_logging(&app_config);

    tracing::info!(
        "Starting ledger_sync {} ({}) in {} mode",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env
    );

    let jwt_secret = app_config.resolved_jwt_secret()?;
    let postgres_url = app_config.resolved_postgres_url()?;
    let db = Arc::new(Database::connect(&postgres_url).await?);

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    ledger_sync::gateway::run_server(&app_config, db, jwt_secret, port).await;
    Ok(())
}
