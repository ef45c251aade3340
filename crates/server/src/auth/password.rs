use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("stored hash is not argon2 or bcrypt")]
    UnknownFormat,
}

/// Outcome of checking a login password against the stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verified {
    /// Matches an argon2 hash.
    Current,
    /// Matches a bcrypt hash; the caller should store a fresh argon2 hash.
    Legacy,
    Mismatch,
}

impl Verified {
    pub fn is_valid(self) -> bool {
        self != Verified::Mismatch
    }
}

/// Hash a password with argon2id.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// Check a password against an argon2 hash or a bcrypt hash carried over
/// from older accounts.
pub fn verify_password(password: &str, hash: &str) -> Result<Verified, PasswordError> {
    if hash.starts_with("$argon2") {
        let parsed = PasswordHash::new(hash).map_err(PasswordError::Hash)?;
        let ok = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        Ok(if ok { Verified::Current } else { Verified::Mismatch })
    } else if hash.starts_with("$2b$") || hash.starts_with("$2a$") || hash.starts_with("$2y$") {
        let ok = bcrypt::verify(password, hash).unwrap_or(false);
        Ok(if ok { Verified::Legacy } else { Verified::Mismatch })
    } else {
        Err(PasswordError::UnknownFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_eq!(verify_password("test_password_123", &hash).unwrap(), Verified::Current);
        assert_eq!(verify_password("wrong_password", &hash).unwrap(), Verified::Mismatch);
    }

    #[test]
    fn test_legacy_bcrypt() {
        let hash = bcrypt::hash("hunter2hunter2", 4).unwrap();
        assert_eq!(verify_password("hunter2hunter2", &hash).unwrap(), Verified::Legacy);
        assert!(!verify_password("nope", &hash).unwrap().is_valid());
    }

    #[test]
    fn test_unknown_hash_format() {
        assert!(matches!(
            verify_password("x", "plaintext"),
            Err(PasswordError::UnknownFormat)
        ));
    }
}
