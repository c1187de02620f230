//! Authentication and abuse control
//!
//! The login decision flow is: lock check, then rate limit, then allow-list
//! membership, then password verification. The order is fixed so blocked or
//! disallowed identities short-circuit before any hash comparison runs.
//!
//! - [`error`] - terminal auth error taxonomy with HTTP mapping
//! - [`throttle`] - sliding-window rate limiter + lockout tracker
//! - [`token`] - signed session token issuance/validation
//! - [`middleware`] - session guard protecting the sync routes
//! - [`handlers`] - login / disabled-registration endpoints

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod throttle;
pub mod token;

pub use error::AuthError;
pub use throttle::AttemptTracker;
pub use token::{Claims, TokenError, TokenService};
