//! Data models for account management

use chrono::{DateTime, Utc};

/// Allow-listed user account.
///
/// `password_hash` is an Argon2 PHC string; the plaintext is never stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub user_id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
