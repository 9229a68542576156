//! Authentication error types.

use bastion_core::error::BastionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password and inactive account all collapse
    /// into this one variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("malformed token: {0}")]
    TokenMalformed(String),

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("invalid token claims: {0}")]
    TokenInvalidClaims(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for BastionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenMalformed(_)
            | AuthError::TokenInvalid(_)
            | AuthError::TokenInvalidClaims(_) => BastionError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => BastionError::Crypto(msg),
        }
    }
}
