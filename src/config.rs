use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; `DATABASE_URL` wins when set
    #[serde(default)]
    pub postgres_url: Option<String>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication policy: signing secret, token lifetime, throttle limits
/// and the fixed account allow-list.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret; `SECRET_KEY` wins when set
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    #[serde(default = "default_rate_limit_max_attempts")]
    pub rate_limit_max_attempts: usize,
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
    /// The only identities allowed to authenticate. Reconciled into the
    /// account store at startup; there is no open registration.
    #[serde(default)]
    pub allowed_accounts: Vec<AllowedAccount>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AllowedAccount {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncConfig {
    /// HTML shell served by the `/app` and `/login-page` routes
    pub app_shell_path: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            app_shell_path: "static/app-shell.html".to_string(),
        }
    }
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_rate_limit_max_attempts() -> usize {
    15
}

fn default_lockout_secs() -> u64 {
    300
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }

    /// Resolve the JWT signing secret: environment first, then config.
    pub fn resolved_jwt_secret(&self) -> anyhow::Result<String> {
        if let Ok(secret) = std::env::var("SECRET_KEY") {
            if !secret.is_empty() {
                return Ok(secret);
            }
        }
        self.auth
            .jwt_secret
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No JWT secret: set SECRET_KEY or auth.jwt_secret"))
    }

    /// Resolve the database URL: environment first, then config.
    pub fn resolved_postgres_url(&self) -> anyhow::Result<String> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                return Ok(url);
            }
        }
        self.postgres_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No database URL: set DATABASE_URL or postgres_url"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_YAML: &str = r#"
log_level: "info"
log_dir: "logs"
log_file: "test.log"
use_json: false
rotation: "never"
gateway:
  host: "127.0.0.1"
  port: 5000
auth:
  jwt_secret: "s"
"#;

    #[test]
    fn test_auth_defaults_fill_missing_fields() {
        let config: AppConfig = serde_yaml::from_str(MINIMAL_YAML).expect("should parse");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.auth.rate_limit_window_secs, 60);
        assert_eq!(config.auth.rate_limit_max_attempts, 15);
        assert_eq!(config.auth.lockout_secs, 300);
        assert!(config.auth.allowed_accounts.is_empty());
        assert_eq!(config.sync.app_shell_path, "static/app-shell.html");
    }

    #[test]
    fn test_allowed_accounts_parse() {
        let yaml = format!(
            "{}\n  allowed_accounts:\n    - email: \"a@b.c\"\n      password: \"pw\"\n",
            MINIMAL_YAML.trim_end()
        );
        let config: AppConfig = serde_yaml::from_str(&yaml).expect("should parse");
        assert_eq!(config.auth.allowed_accounts.len(), 1);
        assert_eq!(config.auth.allowed_accounts[0].email, "a@b.c");
    }
}
