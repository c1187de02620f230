//! Ledger Sync - Allow-list Authentication & Snapshot Sync Backend
//!
//! A small production backend for a personal financial tracker: a fixed
//! allow-list of accounts, signed session tokens, sliding-window rate
//! limiting with escalating lockout, an append-only auth audit log, and
//! verbatim JSON snapshot storage.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing setup (rolling file + stdout)
//! - [`account`] - allow-listed accounts and Argon2 credential checks
//! - [`auth`] - login flow, throttle state, session tokens, guard
//! - [`audit`] - append-only auth event log
//! - [`sync`] - snapshot upload/download
//! - [`gateway`] - HTTP surface (axum)

pub mod account;
pub mod audit;
pub mod auth;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod sync;

// Convenient re-exports at crate root
pub use account::{Account, AccountRepository, Database};
pub use audit::{AuditLog, AuthEvent};
pub use auth::{AttemptTracker, AuthError, Claims, TokenError, TokenService};
pub use sync::SnapshotRepository;
