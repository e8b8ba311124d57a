//! Password digests and session tokens
//!
//! Passwords are hashed with Argon2id and stored as PHC strings, so the salt
//! and cost parameters travel with the digest. Tokens are 32 random bytes,
//! base64url encoded; only their SHA-256 is ever stored.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::constants::{SALT_BYTES, TOKEN_BYTES};
use crate::error::{AuthError, Result};

fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes).map_err(AuthError::Random)?;
    Ok(bytes)
}

/// Generate a session token (32 bytes, base64url encoded)
pub fn generate_token() -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(random_bytes::<TOKEN_BYTES>()?))
}

/// Hash token with SHA-256 for storage
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Produce a fresh Argon2id digest for storage
pub fn digest_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(&random_bytes::<SALT_BYTES>()?)?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored digest
///
/// A digest that does not parse as a PHC string is `AuthError::Corrupted`;
/// a mismatch is `Ok(false)`.
pub fn verify_password(digest: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| AuthError::Corrupted(format!("password digest: {}", e)))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_round_trip() {
        let d = digest_password("testtest").unwrap();
        assert!(verify_password(&d, "testtest").unwrap());
        assert!(!verify_password(&d, "TESTTEST").unwrap());
        assert!(!verify_password(&d, "").unwrap());
    }

    #[test]
    fn digests_are_salted_argon2id() {
        let a = digest_password("testtest").unwrap();
        let b = digest_password("testtest").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(!a.contains("testtest"));
    }

    #[test]
    fn corrupted_digest_is_an_error() {
        assert!(matches!(verify_password("salt|hash", "x"), Err(AuthError::Corrupted(_))));
    }

    #[test]
    fn token_hash_is_hex_sha256() {
        let token = generate_token().unwrap();
        let hash = hash_token(&token);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token(&token));
        assert_ne!(hash, hash_token(&generate_token().unwrap()));
    }
}
