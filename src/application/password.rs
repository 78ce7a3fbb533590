//! Argon2 password hashing with per-password random salts.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::domain::errors::DomainError;

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    if password.is_empty() {
        return Err(DomainError::Validation("password must not be empty".to_string()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::Internal(format!("password hashing failed: {}", e)))
}

/// Returns `Ok(false)` on a mismatch; only malformed stored hashes are errors.
pub fn verify_password(stored_hash: &str, provided: &str) -> Result<bool, DomainError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| DomainError::Internal(format!("invalid stored password hash: {}", e)))?;
    match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DomainError::Internal(format!(
            "password verification failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2").expect("hash failed");
        assert_ne!(hash, "hunter2");
        assert!(verify_password(&hash, "hunter2").expect("verify failed"));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("hunter2").expect("hash failed");
        assert!(!verify_password(&hash, "hunter3").expect("verify failed"));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(hash_password("").is_err());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("not-a-phc-string", "hunter2").is_err());
    }
}
