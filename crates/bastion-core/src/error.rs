//! Error types for the Bastion system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BastionError {
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint conflict: {entity}.{field}")]
    Conflict { entity: String, field: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BastionError {
    /// Shorthand for a field-tagged validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The field named by a validation failure, if this is one.
    pub fn validation_field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type BastionResult<T> = Result<T, BastionError>;
