//! Signed session tokens.
//!
//! Tokens are stateless HS256 JWTs bound to a user id with a mandatory
//! expiry. There is no server-side session table and no revocation list: a
//! token stays valid until its embedded expiry regardless of server-side
//! action. That trade-off is deliberate.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

/// Token validation failures. `Expired` is reported distinctly so clients
/// can tell a re-login from a tampered token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Token invalid")]
    Invalid,
}

/// Issues and validates session tokens with a server-held secret.
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: String, ttl_hours: i64) -> Self {
        Self {
            secret,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for `user_id`, expiring after the configured TTL.
    pub fn issue(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Explicit-clock variant of [`issue`](Self::issue) for deterministic
    /// tests.
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> anyhow::Result<String> {
        let expiry = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("Token expiry overflows timestamp range"))?;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiry.timestamp() as usize,
            iat: issued_at.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Validate and decode a token.
    ///
    /// Anything other than a clean expiry failure normalizes to
    /// [`TokenError::Invalid`]; raw decode errors never escape.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact, no clock-skew allowance
        validation.leeway = 0;

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(TokenError::Expired),
            Err(_) => Err(TokenError::Invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret".to_string(), 24)
    }

    #[test]
    fn test_issue_then_verify() {
        let svc = service();
        let token = svc.issue(42).expect("should issue");
        let claims = svc.verify(&token).expect("should verify");
        assert_eq!(claims.sub, "42");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_valid_just_before_expiry() {
        let svc = service();
        // Issued 23h59m ago, so one minute of validity remains
        let issued = Utc::now() - Duration::hours(23) - Duration::minutes(59);
        let token = svc.issue_at(42, issued).expect("should issue");
        assert!(svc.verify(&token).is_ok());
    }

    #[test]
    fn test_expired_just_after_expiry() {
        let svc = service();
        // Issued 24h01m ago, expiry passed one minute ago
        let issued = Utc::now() - Duration::hours(24) - Duration::minutes(1);
        let token = svc.issue_at(42, issued).expect("should issue");
        assert_eq!(svc.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_token_is_invalid_not_expired() {
        let svc = service();
        let token = svc.issue(42).expect("should issue");
        let mut tampered = token.clone();
        tampered.push('x');
        assert_eq!(svc.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(42).expect("should issue");
        let other = TokenService::new("other-secret".to_string(), 24);
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(service().verify("not.a.jwt"), Err(TokenError::Invalid));
        assert_eq!(service().verify(""), Err(TokenError::Invalid));
    }
}
