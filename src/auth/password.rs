//! Password hashing and verification for rankgate.
//!
//! Uses Argon2id over an explicit per-account salt. The salt and the derived
//! hash are stored side by side as standard base64 strings.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand_core::{OsRng, RngCore};
use thiserror::Error;
use tracing::debug;

use crate::config::HashingConfig;

/// Length of a generated salt in bytes.
pub const SALT_LEN: usize = 32;

/// Length of a derived password hash in bytes.
pub const HASH_LEN: usize = 32;

/// Hashing-related errors.
///
/// These never leave [`HashingEngine::verify_password`], which folds every
/// failure into `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashingError {
    /// The salt is not valid base64.
    #[error("salt is not valid base64")]
    InvalidSalt,

    /// The cost parameters were rejected.
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    /// The Argon2 primitive failed (e.g. the decoded salt is too short).
    #[error("password hashing failed: {0}")]
    Primitive(String),
}

/// Stateless Argon2id hashing engine.
///
/// Cloning is cheap; it only carries the cost parameters.
#[derive(Debug, Clone)]
pub struct HashingEngine {
    params: Params,
}

impl Default for HashingEngine {
    /// Argon2's recommended defaults (19 MiB, 2 passes, 1 lane).
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl HashingEngine {
    /// Create an engine with explicit Argon2id cost parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use rankgate::auth::HashingEngine;
    ///
    /// assert!(HashingEngine::new(1024, 1, 1).is_ok());
    /// assert!(HashingEngine::new(1024, 0, 1).is_err());
    /// ```
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashingError> {
        let params = Params::new(memory_kib, iterations, parallelism, Some(HASH_LEN))
            .map_err(|e| HashingError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    /// Create an engine from the `[hashing]` configuration section.
    pub fn from_config(config: &HashingConfig) -> Result<Self, HashingError> {
        Self::new(config.memory_kib, config.iterations, config.parallelism)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Generate a fresh random salt.
    ///
    /// Returns [`SALT_LEN`] bytes from the operating system's CSPRNG encoded
    /// as padded base64 (44 characters).
    pub fn generate_salt(&self) -> String {
        let mut bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }

    /// Derive the hash of `password` under `salt`.
    ///
    /// Deterministic for a given engine configuration: the same inputs
    /// always produce the same base64 string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rankgate::auth::HashingEngine;
    ///
    /// let engine = HashingEngine::new(1024, 1, 1).unwrap();
    /// let salt = engine.generate_salt();
    /// let first = engine.hash_password("correct horse", &salt).unwrap();
    /// let second = engine.hash_password("correct horse", &salt).unwrap();
    /// assert_eq!(first, second);
    /// ```
    pub fn hash_password(&self, password: &str, salt: &str) -> Result<String, HashingError> {
        let salt = STANDARD
            .decode(salt)
            .map_err(|_| HashingError::InvalidSalt)?;

        let mut out = [0u8; HASH_LEN];
        self.argon2()
            .hash_password_into(password.as_bytes(), &salt, &mut out)
            .map_err(|e| HashingError::Primitive(e.to_string()))?;

        Ok(STANDARD.encode(out))
    }

    /// Verify `password` against a stored hash and salt.
    ///
    /// Returns `false` for a missing or empty input, a malformed salt, or any
    /// hashing failure. Never panics and never reports why it failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rankgate::auth::HashingEngine;
    ///
    /// let engine = HashingEngine::new(1024, 1, 1).unwrap();
    /// let salt = engine.generate_salt();
    /// let hash = engine.hash_password("hunter22", &salt).unwrap();
    ///
    /// assert!(engine.verify_password(Some("hunter22"), Some(hash.as_str()), Some(salt.as_str())));
    /// assert!(!engine.verify_password(Some("hunter23"), Some(hash.as_str()), Some(salt.as_str())));
    /// assert!(!engine.verify_password(None, Some(hash.as_str()), Some(salt.as_str())));
    /// ```
    pub fn verify_password(
        &self,
        password: Option<&str>,
        stored_hash: Option<&str>,
        salt: Option<&str>,
    ) -> bool {
        let (Some(password), Some(stored_hash), Some(salt)) = (password, stored_hash, salt) else {
            return false;
        };
        if password.is_empty() || stored_hash.is_empty() || salt.is_empty() {
            return false;
        }

        match self.hash_password(password, salt) {
            Ok(computed) => constant_time_eq(computed.as_bytes(), stored_hash.as_bytes()),
            Err(e) => {
                debug!(error = %e, "Password verification aborted");
                false
            }
        }
    }
}

/// Compare two byte strings without an early exit on the first mismatch.
///
/// Only the lengths are compared in variable time.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HashingEngine {
        HashingEngine::new(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_generate_salt_unique() {
        let engine = engine();
        let salt1 = engine.generate_salt();
        let salt2 = engine.generate_salt();

        assert!(!salt1.is_empty());
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_generate_salt_length() {
        let salt = engine().generate_salt();

        // 32 bytes in padded base64
        assert_eq!(salt.len(), 44);
        assert_eq!(STANDARD.decode(&salt).unwrap().len(), SALT_LEN);
    }

    #[test]
    fn test_hash_password_not_plaintext() {
        let engine = engine();
        let salt = engine.generate_salt();
        let hash = engine.hash_password("testPassword123", &salt).unwrap();

        assert!(!hash.is_empty());
        assert_ne!(hash, "testPassword123");
        assert_eq!(STANDARD.decode(&hash).unwrap().len(), HASH_LEN);
    }

    #[test]
    fn test_hash_password_deterministic() {
        let engine = engine();
        let salt = engine.generate_salt();

        let hash1 = engine.hash_password("testPassword123", &salt).unwrap();
        let hash2 = engine.hash_password("testPassword123", &salt).unwrap();

        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_password_salt_sensitive() {
        let engine = engine();
        let salt1 = engine.generate_salt();
        let salt2 = engine.generate_salt();

        let hash1 = engine.hash_password("testPassword123", &salt1).unwrap();
        let hash2 = engine.hash_password("testPassword123", &salt2).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_password_params_sensitive() {
        let cheap = engine();
        let costlier = HashingEngine::new(2048, 1, 1).unwrap();
        let salt = cheap.generate_salt();

        assert_ne!(
            cheap.hash_password("same", &salt).unwrap(),
            costlier.hash_password("same", &salt).unwrap()
        );
    }

    #[test]
    fn test_hash_password_invalid_salt() {
        let result = engine().hash_password("password", "invalid-base64!!!");
        assert_eq!(result, Err(HashingError::InvalidSalt));
    }

    #[test]
    fn test_hash_password_salt_too_short() {
        // Valid base64, but only 3 bytes once decoded
        let result = engine().hash_password("password", "YWJj");
        assert!(matches!(result, Err(HashingError::Primitive(_))));
    }

    #[test]
    fn test_verify_password_correct() {
        let engine = engine();
        let salt = engine.generate_salt();
        let hash = engine.hash_password("testPassword123", &salt).unwrap();

        assert!(engine.verify_password(Some("testPassword123"), Some(hash.as_str()), Some(salt.as_str())));
    }

    #[test]
    fn test_verify_password_wrong() {
        let engine = engine();
        let salt = engine.generate_salt();
        let hash = engine.hash_password("testPassword123", &salt).unwrap();

        assert!(!engine.verify_password(Some("wrongPassword"), Some(hash.as_str()), Some(salt.as_str())));
    }

    #[test]
    fn test_verify_password_missing_inputs() {
        let engine = engine();
        let salt = engine.generate_salt();
        let hash = engine.hash_password("password", &salt).unwrap();

        assert!(!engine.verify_password(None, Some(hash.as_str()), Some(salt.as_str())));
        assert!(!engine.verify_password(Some("password"), None, Some(salt.as_str())));
        assert!(!engine.verify_password(Some("password"), Some(hash.as_str()), None));
    }

    #[test]
    fn test_verify_password_empty_inputs() {
        let engine = engine();
        let salt = engine.generate_salt();
        let hash = engine.hash_password("password", &salt).unwrap();

        assert!(!engine.verify_password(Some(""), Some(hash.as_str()), Some(salt.as_str())));
        assert!(!engine.verify_password(Some("password"), Some(""), Some(salt.as_str())));
        assert!(!engine.verify_password(Some("password"), Some(hash.as_str()), Some("")));
    }

    #[test]
    fn test_verify_password_malformed_salt() {
        assert!(!engine().verify_password(Some("password"), Some("hash"), Some("invalid-base64!!!")));
    }

    #[test]
    fn test_verify_password_truncated_hash() {
        let engine = engine();
        let salt = engine.generate_salt();
        let hash = engine.hash_password("password", &salt).unwrap();

        assert!(!engine.verify_password(Some("password"), Some(&hash[..20]), Some(salt.as_str())));
    }

    #[test]
    fn test_password_with_special_chars() {
        let engine = engine();
        let salt = engine.generate_salt();
        let password = "pàssw@rd!#$%^&*()_+{}|:<>?[]\\;',./~`";
        let hash = engine.hash_password(password, &salt).unwrap();

        assert!(engine.verify_password(Some(password), Some(hash.as_str()), Some(salt.as_str())));
    }

    #[test]
    fn test_password_with_unicode() {
        let engine = engine();
        let salt = engine.generate_salt();
        let password = "pássw@rd中文🌟";
        let hash = engine.hash_password(password, &salt).unwrap();

        assert!(engine.verify_password(Some(password), Some(hash.as_str()), Some(salt.as_str())));
    }

    #[test]
    fn test_very_long_password() {
        let engine = engine();
        let salt = engine.generate_salt();
        let password = "a".repeat(1000);
        let hash = engine.hash_password(&password, &salt).unwrap();

        assert!(engine.verify_password(Some(password.as_str()), Some(hash.as_str()), Some(salt.as_str())));
    }

    #[test]
    fn test_invalid_params() {
        assert!(matches!(
            HashingEngine::new(1024, 0, 1),
            Err(HashingError::Params(_))
        ));
        assert!(HashingEngine::from_config(&HashingConfig::default()).is_ok());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
        assert!(!constant_time_eq(b"abcdef", b"xbcdef"));
        assert!(!constant_time_eq(b"abc", b"abcdef"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_hashing_error_display() {
        assert_eq!(
            HashingError::InvalidSalt.to_string(),
            "salt is not valid base64"
        );
        assert_eq!(
            HashingError::Primitive("salt too short".to_string()).to_string(),
            "password hashing failed: salt too short"
        );
    }
}
