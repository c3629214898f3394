//! SurrealDB repository implementations.

mod company;
mod link;
mod user;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

pub use company::SurrealCompanyRepository;
pub use link::SurrealLinkStore;
pub use user::SurrealUserRepository;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::InvalidRecord(format!("invalid {what} UUID: {e}")))
}

/// Prefixes of `THROW` messages raised by guard statements.
pub(crate) const INVALID_STATE_TAG: &str = "coreport:invalid_state:";
pub(crate) const CONFLICT_TAG: &str = "coreport:conflict:";
pub(crate) const FORBIDDEN_TAG: &str = "coreport:forbidden:";

/// Classify a failed query, recovering rule violations raised by guards.
pub(crate) fn query_failure(err: surrealdb::Error) -> DbError {
    classify_failure(err.to_string())
}

fn classify_failure(message: String) -> DbError {
    let tagged = |tag: &str| {
        message.find(tag).map(|at| {
            message[at + tag.len()..]
                .trim()
                .trim_end_matches(['"', '\''])
                .to_string()
        })
    };
    if let Some(reason) = tagged(INVALID_STATE_TAG) {
        DbError::InvalidState(reason)
    } else if let Some(reason) = tagged(CONFLICT_TAG) {
        DbError::Conflict(reason)
    } else if let Some(reason) = tagged(FORBIDDEN_TAG) {
        DbError::Forbidden(reason)
    } else {
        DbError::Query(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thrown_tags_are_recovered() {
        let err = classify_failure(format!(
            "An error occurred: {INVALID_STATE_TAG} company c is inactive"
        ));
        assert!(matches!(err, DbError::InvalidState(ref r) if r == "company c is inactive"));

        let err = classify_failure(format!("An error occurred: {CONFLICT_TAG} still responsible"));
        assert!(matches!(err, DbError::Conflict(ref r) if r == "still responsible"));

        let err = classify_failure(format!("An error occurred: {FORBIDDEN_TAG} not eligible"));
        assert!(matches!(err, DbError::Forbidden(_)));
    }

    #[test]
    fn untagged_failures_stay_query_errors() {
        let err = classify_failure("Parse error".into());
        assert!(matches!(err, DbError::Query(_)));
    }
}
