//! Deterministic repair of inconsistent pairs.

use coreport_core::context::RequestContext;
use coreport_core::error::CoreportResult;
use coreport_core::models::link::{LinkChange, Relation};
use coreport_core::repository::LinkStore;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::LinkError;
use crate::evaluator::{PairShape, PairStatus};
use crate::service::{LinkAction, LinkReceipt, LinkService};

/// The single corrective action chosen for a pair.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Repair {
    /// A stray link is treated as an implicit membership.
    AddEmployee,
    /// The link is brought in line with the operational role.
    AddLink,
}

impl Repair {
    fn change(self, rel: Relation) -> LinkChange {
        match self {
            Repair::AddEmployee => LinkChange::Employ(rel),
            Repair::AddLink => LinkChange::Link(rel),
        }
    }

    fn action(self) -> LinkAction {
        match self {
            Repair::AddEmployee => LinkAction::AddEmployee,
            Repair::AddLink => LinkAction::AddLink,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub repair: Repair,
    pub receipt: LinkReceipt,
    /// The pair re-evaluated after the repair.
    pub status: PairStatus,
}

/// Choose the repair for a pair, or explain why there is none.
pub fn plan_repair(status: &PairStatus) -> Result<Repair, LinkError> {
    match status.shape {
        PairShape::LinkedWithoutRole => Ok(Repair::AddEmployee),
        PairShape::RoleWithoutLink => Ok(Repair::AddLink),
        PairShape::Consistent => Err(LinkError::NothingToResolve {
            user_id: status.user_id,
            company_id: status.company_id,
        }),
        shape @ PairShape::ResponsibleNotEmployee => Err(LinkError::Unresolvable {
            user_id: status.user_id,
            company_id: status.company_id,
            shape,
        }),
    }
}

impl<S: LinkStore> LinkService<S> {
    /// Apply exactly one corrective action to an inconsistent pair.
    ///
    /// Adding an employee to an inactive company is refused like any
    /// other new assignment.
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        company_id: Uuid,
    ) -> CoreportResult<Resolution> {
        ctx.require_admin()?;
        let pair = self.store.load_pair(ctx.tenant_id, user_id, company_id).await?;
        let before = PairStatus::from_snapshot(&pair);

        let repair = plan_repair(&before).inspect_err(|err| {
            if matches!(err, LinkError::Unresolvable { .. }) {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    %user_id,
                    %company_id,
                    shape = %before.shape,
                    "Pair cannot be repaired automatically"
                );
            }
        })?;
        if repair == Repair::AddEmployee && !pair.company.active {
            return Err(LinkError::CompanyInactive { company_id }.into());
        }

        let receipt = self
            .commit(
                ctx,
                repair.action(),
                Some(user_id),
                company_id,
                vec![repair.change(pair.relation())],
            )
            .await?;

        let after = self.store.load_pair(ctx.tenant_id, user_id, company_id).await?;
        let status = PairStatus::from_snapshot(&after);
        info!(
            correlation_id = %ctx.correlation_id,
            ?repair,
            from = %before.shape,
            to = %status.shape,
            "Inconsistency resolved"
        );

        Ok(Resolution {
            repair,
            receipt,
            status,
        })
    }
}
