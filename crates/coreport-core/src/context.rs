//! Per-request caller context.
//!
//! Every service and store call receives the context explicitly; nothing
//! about the caller lives in shared mutable state.

use uuid::Uuid;

use crate::error::{CoreportError, CoreportResult};
use crate::models::user::{User, UserRole};

/// The authenticated caller, as resolved from the user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub tenant_id: Uuid,
    pub actor: Actor,
    /// Returned to the caller with every mutation receipt.
    pub correlation_id: Uuid,
}

impl RequestContext {
    pub fn new(tenant_id: Uuid, actor: Actor) -> Self {
        Self::with_correlation_id(tenant_id, actor, Uuid::new_v4())
    }

    pub fn with_correlation_id(tenant_id: Uuid, actor: Actor, correlation_id: Uuid) -> Self {
        Self {
            tenant_id,
            actor,
            correlation_id,
        }
    }

    /// Reject callers that are not admins.
    pub fn require_admin(&self) -> CoreportResult<()> {
        if self.actor.role == UserRole::Admin {
            Ok(())
        } else {
            Err(CoreportError::Forbidden {
                reason: format!(
                    "user {} has role {}; admin role required",
                    self.actor.user_id, self.actor.role
                ),
            })
        }
    }
}
