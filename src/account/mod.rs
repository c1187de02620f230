//! Allow-listed account management
//!
//! Accounts exist only for identities on the configured allow-list and are
//! seeded/reconciled once at startup. There is no end-user account creation.
//!
//! - [`models`] - Account record
//! - [`db`] - PostgreSQL connection pool
//! - [`password`] - Argon2 hash/verify helpers
//! - [`repository`] - account queries + allow-list reconciliation

pub mod db;
pub mod models;
pub mod password;
pub mod repository;

pub use db::Database;
pub use models::Account;
pub use repository::AccountRepository;
