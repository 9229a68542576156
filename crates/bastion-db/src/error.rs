//! Store-specific error types and conversions.

use bastion_core::error::BastionError;

/// Store-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated: {entity}.{field}")]
    Conflict { entity: String, field: String },

    #[error("No fields to update on {entity}")]
    NoFieldsToUpdate { entity: String },
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(entity: &str, field: &str) -> Self {
        Self::Conflict {
            entity: entity.into(),
            field: field.into(),
        }
    }
}

impl From<DbError> for BastionError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => BastionError::NotFound { entity, id },
            DbError::Conflict { entity, field } => BastionError::Conflict { entity, field },
            DbError::NoFieldsToUpdate { entity } => BastionError::Validation {
                field: "fields".into(),
                message: format!("no fields to update on {entity}"),
            },
        }
    }
}
