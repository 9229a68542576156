//! Password hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, Version};

use crate::error::AuthError;

/// One-way password hashing.
///
/// Implementations are shared across tasks behind an `Arc<dyn PasswordHasher>`.
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` into a self-describing PHC string.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Check `password` against a stored PHC string.
    ///
    /// Returns `Ok(false)` on mismatch and `Err(AuthError::Crypto)` when
    /// `hash` cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id with OWASP-recommended parameters (m=19456 KiB, t=2, p=1).
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    pepper: Option<String>,
}

impl Argon2PasswordHasher {
    pub fn new(pepper: Option<String>) -> Self {
        Self { pepper }
    }

    fn argon2() -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(19_456, 2, 1, None)
            .map_err(|e| AuthError::Crypto(format!("argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn peppered(&self, password: &str) -> String {
        match &self.pepper {
            Some(p) => format!("{p}{password}"),
            None => password.to_owned(),
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        use argon2::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        Self::argon2()?
            .hash_password(self.peppered(password).as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Crypto(format!("hash error: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        use argon2::PasswordVerifier as _;

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

        // Parameters come from the PHC string, so older hashes still verify.
        match Argon2::default().verify_password(self.peppered(password).as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
        }
    }
}
