//! Argon2 password hashing and verification.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! the algorithm, cost, and salt travel with the digest.

use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;

use crate::error::CredentialError;

fn salt() -> Result<SaltString, CredentialError> {
    use rand::Rng;
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    SaltString::encode_b64(&bytes).map_err(|e| CredentialError::Hashing {
        reason: e.to_string(),
    })
}

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
///
/// Returns [`CredentialError::Hashing`] if salt encoding or hashing fails.
pub fn hash(password: &str) -> Result<String, CredentialError> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
        .map_err(|e| CredentialError::Hashing {
            reason: e.to_string(),
        })
}

/// Check a plaintext password against a stored hash.
///
/// Returns `false` for a wrong password and for a hash that cannot be
/// parsed.
#[must_use]
pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .is_some_and(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_the_password() {
        let hashed = hash("secret").unwrap();
        assert_ne!(hashed, "secret");
        assert!(!hashed.contains("secret"));
        assert!(hashed.starts_with("$argon2"));
    }

    #[test]
    fn verify_accepts_the_right_password() {
        let hashed = hash("rainbow").unwrap();
        assert!(verify("rainbow", &hashed));
    }

    #[test]
    fn verify_rejects_a_wrong_password() {
        let hashed = hash("rainbow").unwrap();
        assert!(!verify("rainbows", &hashed));
        assert!(!verify("", &hashed));
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        assert_ne!(hash("secret").unwrap(), hash("secret").unwrap());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify("secret", "secret"));
        assert!(!verify("secret", ""));
    }
}
