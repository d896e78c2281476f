//! Password hashing and verification using Argon2
//!
//! Uses the argon2id variant with default parameters. Stored hashes are PHC
//! strings carrying their own salt and parameters.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use lph_core::{DeskError, Result};

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(DeskError::invalid("Password must not be empty"));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DeskError::invalid(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
///
/// A hash that does not parse is a store problem, not a wrong password.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| DeskError::Store(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "bismillah-2024";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_different_salts() {
        let hash1 = hash_password("same-password").unwrap();
        let hash2 = hash_password("same-password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("same-password", &hash1).unwrap());
        assert!(verify_password("same-password", &hash2).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(matches!(
            verify_password("password", "plaintext-from-old-seed"),
            Err(DeskError::Store(_))
        ));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(hash_password(""), Err(DeskError::Validation(_))));
    }
}
