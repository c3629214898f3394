//! Database-specific error types and conversions.

use coreport_core::error::CoreportError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed record: {0}")]
    InvalidRecord(String),

    #[error("Rejected: {0}")]
    InvalidState(String),

    #[error("Rejected: {0}")]
    Conflict(String),

    #[error("Rejected: {0}")]
    Forbidden(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for CoreportError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CoreportError::NotFound { entity, id },
            DbError::InvalidState(reason) => CoreportError::InvalidState { reason },
            DbError::Conflict(reason) => CoreportError::Conflict { reason },
            DbError::Forbidden(reason) => CoreportError::Forbidden { reason },
            other => CoreportError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_entity_context() {
        let err: CoreportError = DbError::NotFound {
            entity: "user".into(),
            id: "abc".into(),
        }
        .into();
        assert!(matches!(
            err,
            CoreportError::NotFound { ref entity, ref id } if entity == "user" && id == "abc"
        ));
    }

    #[test]
    fn guard_rejections_keep_their_category() {
        let err: CoreportError = DbError::InvalidState("company is inactive".into()).into();
        assert!(matches!(err, CoreportError::InvalidState { .. }));

        let err: CoreportError = DbError::Conflict("still responsible".into()).into();
        assert!(matches!(err, CoreportError::Conflict { .. }));
    }

    #[test]
    fn other_errors_become_database_errors() {
        let err: CoreportError = DbError::Query("boom".into()).into();
        assert!(matches!(err, CoreportError::Database(ref msg) if msg.contains("boom")));
    }
}
