//! Authentication error types.
//!
//! Every auth failure is terminal and surfaces as an HTTP status plus a
//! structured error code; nothing in this subsystem retries.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Terminal authentication failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing session token")]
    Unauthenticated,

    #[error("Session token expired")]
    TokenExpired,

    #[error("Session token invalid")]
    TokenInvalid,

    #[error("Access denied: email is not allow-listed")]
    IdentityNotAllowed,

    #[error("Login failed: wrong email or password")]
    CredentialMismatch,

    #[error("Too many attempts, temporarily blocked")]
    RateLimited,

    #[error("Too many attempts, try again later")]
    Locked,

    #[error("Storage unavailable")]
    StorageUnavailable,
}

impl AuthError {
    /// Machine error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Unauthenticated => 2001,
            Self::TokenExpired => 2002,
            Self::TokenInvalid => 2003,
            Self::IdentityNotAllowed => 2004,
            Self::CredentialMismatch => 2005,
            Self::RateLimited => 4291,
            Self::Locked => 4292,
            Self::StorageUnavailable => 5001,
        }
    }

    /// Stable error name string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "MISSING_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::IdentityNotAllowed => "EMAIL_NOT_ALLOWED",
            Self::CredentialMismatch => "BAD_CREDENTIALS",
            Self::RateLimited => "RATE_LIMITED",
            Self::Locked => "LOCKED",
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
        }
    }

    /// HTTP status mapping.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::CredentialMismatch => StatusCode::UNAUTHORIZED,
            Self::IdentityNotAllowed => StatusCode::FORBIDDEN,
            Self::RateLimited | Self::Locked => StatusCode::TOO_MANY_REQUESTS,
            Self::StorageUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON response body for auth errors.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub code: i32,
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = AuthErrorResponse {
            code: self.code(),
            error: self.name(),
            message: self.to_string(),
        };
        (self.http_status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(AuthError::Unauthenticated.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::CredentialMismatch.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::IdentityNotAllowed.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::RateLimited.http_status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AuthError::Locked.http_status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AuthError::StorageUnavailable.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_expired_and_invalid_are_distinct() {
        // Clients distinguish "re-login" from "tampered token" by name.
        assert_ne!(AuthError::TokenExpired.name(), AuthError::TokenInvalid.name());
        assert_ne!(AuthError::TokenExpired.code(), AuthError::TokenInvalid.code());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::Unauthenticated.code(), 2001);
        assert_eq!(AuthError::RateLimited.code(), 4291);
        assert_eq!(AuthError::Locked.code(), 4292);
    }
}
