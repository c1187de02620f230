//! Argon2 password hashing helpers.
//!
//! Verification is delegated to the argon2 crate, which compares digests
//! in constant time.

use anyhow::Result;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a plaintext password into an Argon2 PHC string.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext password against a stored PHC string.
///
/// A malformed stored hash counts as a mismatch, never a panic.
pub fn verify_password(plain: &str, phc: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("hunter2").expect("should hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("hunter2").expect("should hash");
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
        assert!(!verify_password("hunter2", ""));
    }

    #[test]
    fn test_same_password_different_salts() {
        let h1 = hash_password("hunter2").expect("should hash");
        let h2 = hash_password("hunter2").expect("should hash");
        assert_ne!(h1, h2);
        assert!(verify_password("hunter2", &h1));
        assert!(verify_password("hunter2", &h2));
    }
}
