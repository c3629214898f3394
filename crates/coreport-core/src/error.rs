//! Error types for the Coreport system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreportError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreportError {
    /// Stable machine-readable code for this error category.
    pub fn code(&self) -> &'static str {
        match self {
            CoreportError::NotFound { .. } => "NOT_FOUND",
            CoreportError::Forbidden { .. } => "FORBIDDEN",
            CoreportError::InvalidState { .. } => "INVALID_STATE",
            CoreportError::Conflict { .. } => "CONFLICT",
            CoreportError::Validation { .. } => "VALIDATION_ERROR",
            CoreportError::Database(_) => "DATABASE_ERROR",
            CoreportError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type CoreportResult<T> = Result<T, CoreportError>;
