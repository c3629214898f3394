//! Link rule violations.

use coreport_core::error::CoreportError;
use coreport_core::models::user::UserRole;
use thiserror::Error;
use uuid::Uuid;

use crate::evaluator::PairShape;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("user {user_id} has role {role}; only managers and admins can be responsible")]
    RoleNotEligible { user_id: Uuid, role: UserRole },

    #[error("company {company_id} is inactive and accepts no new assignments")]
    CompanyInactive { company_id: Uuid },

    #[error("user {user_id} is already an employee of company {company_id}")]
    AlreadyEmployee { user_id: Uuid, company_id: Uuid },

    #[error(
        "user {user_id} is the responsible user of company {company_id}; \
         remove the responsibility first"
    )]
    StillResponsible { user_id: Uuid, company_id: Uuid },

    #[error("user {user_id} is still an employee or responsible of company {company_id}")]
    RoleStillHeld { user_id: Uuid, company_id: Uuid },

    #[error("pair ({user_id}, {company_id}) is already consistent")]
    NothingToResolve { user_id: Uuid, company_id: Uuid },

    #[error("pair ({user_id}, {company_id}) is {shape}; it cannot be repaired automatically")]
    Unresolvable {
        user_id: Uuid,
        company_id: Uuid,
        shape: PairShape,
    },
}

impl From<LinkError> for CoreportError {
    fn from(err: LinkError) -> Self {
        let reason = err.to_string();
        match err {
            LinkError::RoleNotEligible { .. } => CoreportError::Forbidden { reason },
            LinkError::CompanyInactive { .. }
            | LinkError::RoleStillHeld { .. }
            | LinkError::Unresolvable { .. } => CoreportError::InvalidState { reason },
            LinkError::AlreadyEmployee { .. }
            | LinkError::StillResponsible { .. }
            | LinkError::NothingToResolve { .. } => CoreportError::Conflict { reason },
        }
    }
}
