use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::account::Database;
use crate::auth::{AttemptTracker, TokenService};

/// Shared gateway state. One instance per process, behind an `Arc`; every
/// component that needs throttle or token state receives it through here
/// rather than through globals.
pub struct AppState {
    /// PostgreSQL pool (accounts, audit log, snapshots)
    pub db: Arc<Database>,
    /// Session token issuance/validation
    pub tokens: TokenService,
    /// Attempt windows + lockouts, process-local
    pub throttle: AttemptTracker,
    /// Emails permitted to authenticate
    pub allowlist: HashSet<String>,
    /// HTML shell served by the rendering routes
    pub app_shell_path: PathBuf,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        tokens: TokenService,
        throttle: AttemptTracker,
        allowlist: HashSet<String>,
        app_shell_path: PathBuf,
    ) -> Self {
        Self {
            db,
            tokens,
            throttle,
            allowlist,
            app_shell_path,
        }
    }
}
