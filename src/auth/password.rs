//! Password hashing
//!
//! Argon2 for the relational store. Directory entries get `{SSHA}` (salted
//! SHA-1), the scheme LDAP servers accept for `userPassword`.

use crate::utils::error::{Result, WardenError};
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha1::{Digest, Sha1};

const SSHA_PREFIX: &str = "{SSHA}";
const SSHA_SALT_LEN: usize = 8;
const SHA1_LEN: usize = 20;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| WardenError::Crypto(format!("Failed to hash password: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| WardenError::Crypto(format!("Failed to parse password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(WardenError::Crypto(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Hash a password for a directory `userPassword` attribute
pub fn ssha_password(password: &str) -> String {
    let mut salt = [0u8; SSHA_SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    ssha_with_salt(password, &salt)
}

fn ssha_with_salt(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    let mut raw = hasher.finalize().to_vec();
    raw.extend_from_slice(salt);
    format!("{}{}", SSHA_PREFIX, STANDARD.encode(raw))
}

/// Check a password against an `{SSHA}` value
pub fn verify_ssha(password: &str, encoded: &str) -> bool {
    let Some(raw) = encoded
        .strip_prefix(SSHA_PREFIX)
        .and_then(|b64| STANDARD.decode(b64).ok())
    else {
        return false;
    };
    if raw.len() <= SHA1_LEN {
        return false;
    }
    ssha_with_salt(password, &raw[SHA1_LEN..]) == encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_ssha_known_value() {
        assert_eq!(
            ssha_with_salt("secret", &[1, 2, 3, 4, 5, 6, 7, 8]),
            "{SSHA}lHFzXul4wnzRItssVcTnvXWRjNgBAgMEBQYHCA=="
        );
    }

    #[test]
    fn test_ssha_is_salted() {
        let first = ssha_password("secret");
        let second = ssha_password("secret");
        assert_ne!(first, second);
        assert!(verify_ssha("secret", &first));
        assert!(verify_ssha("secret", &second));
        assert!(!verify_ssha("Secret", &first));
        assert!(!verify_ssha("secret", "{SHA}abc"));
        assert!(!verify_ssha("secret", "{SSHA}AAAA"));
    }
}
