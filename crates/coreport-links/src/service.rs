//! Link operations: add/remove for the three relation kinds.
//!
//! Every mutation requires an admin caller, validates the business rules
//! against a fresh read of the pair, and hands the resulting changes to
//! the store as one transaction. Calls that would not change anything
//! succeed with `changed = false`.

use coreport_core::context::RequestContext;
use coreport_core::error::CoreportResult;
use coreport_core::models::link::{LinkChange, PairSnapshot, Relation};
use coreport_core::repository::LinkStore;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::evaluator::PairStatus;
use crate::report::ConsistencyReport;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkAction {
    AddLink,
    RemoveLink,
    AddEmployee,
    RemoveEmployee,
    SetResponsible,
    RemoveResponsible,
}

/// Outcome of a mutation, returned to the caller.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LinkReceipt {
    pub correlation_id: Uuid,
    pub action: LinkAction,
    /// `None` only for `RemoveResponsible` on a company without one.
    pub user_id: Option<Uuid>,
    pub company_id: Uuid,
    /// Whether the store was written to.
    pub changed: bool,
}

/// User/company link service.
///
/// Generic over the store so that the engine has no dependency on the
/// database crate.
pub struct LinkService<S: LinkStore> {
    pub(crate) store: S,
    config: LinkConfig,
}

impl<S: LinkStore> LinkService<S> {
    pub fn new(store: S, config: LinkConfig) -> Self {
        Self { store, config }
    }

    /// Compute the tenant's consistency report.
    pub async fn report(&self, ctx: &RequestContext) -> CoreportResult<ConsistencyReport> {
        ctx.require_admin()?;
        let graph = self.store.load_graph(ctx.tenant_id).await?;
        Ok(ConsistencyReport::build(&graph))
    }

    /// Evaluate a single pair.
    pub async fn pair_status(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        company_id: Uuid,
    ) -> CoreportResult<PairStatus> {
        ctx.require_admin()?;
        let pair = self.store.load_pair(ctx.tenant_id, user_id, company_id).await?;
        Ok(PairStatus::from_snapshot(&pair))
    }

    pub async fn add_link(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        company_id: Uuid,
    ) -> CoreportResult<LinkReceipt> {
        let pair = self.authorized_pair(ctx, user_id, company_id).await?;

        let changes = if pair.is_linked {
            vec![]
        } else {
            vec![LinkChange::Link(pair.relation())]
        };
        self.commit(ctx, LinkAction::AddLink, Some(user_id), company_id, changes)
            .await
    }

    /// Remove the generic link. The employee and responsible relations are
    /// left alone, so the pair becomes inconsistent if either holds.
    pub async fn remove_link(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        company_id: Uuid,
    ) -> CoreportResult<LinkReceipt> {
        let pair = self.authorized_pair(ctx, user_id, company_id).await?;
        let holds_role = pair.is_employee || pair.is_responsible();

        if holds_role && self.config.strict_unlink {
            return Err(LinkError::RoleStillHeld {
                user_id,
                company_id,
            }
            .into());
        }

        let changes = if pair.is_linked {
            vec![LinkChange::Unlink(pair.relation())]
        } else {
            vec![]
        };
        if holds_role && !changes.is_empty() {
            warn!(
                correlation_id = %ctx.correlation_id,
                %user_id,
                %company_id,
                "Removing link while user still holds a role; pair will be inconsistent"
            );
        }
        self.commit(ctx, LinkAction::RemoveLink, Some(user_id), company_id, changes)
            .await
    }

    pub async fn set_employee(
        &self,
        ctx: &RequestContext,
        company_id: Uuid,
        user_id: Uuid,
    ) -> CoreportResult<LinkReceipt> {
        let pair = self.authorized_pair(ctx, user_id, company_id).await?;

        if !pair.company.active {
            return Err(LinkError::CompanyInactive { company_id }.into());
        }
        if pair.is_employee {
            return Err(LinkError::AlreadyEmployee {
                user_id,
                company_id,
            }
            .into());
        }

        let changes = vec![LinkChange::Employ(pair.relation())];
        self.commit(ctx, LinkAction::AddEmployee, Some(user_id), company_id, changes)
            .await
    }

    /// Remove employee status. Responsibility must be relinquished first.
    pub async fn remove_employee(
        &self,
        ctx: &RequestContext,
        company_id: Uuid,
        user_id: Uuid,
    ) -> CoreportResult<LinkReceipt> {
        let pair = self.authorized_pair(ctx, user_id, company_id).await?;

        if pair.is_responsible() {
            return Err(LinkError::StillResponsible {
                user_id,
                company_id,
            }
            .into());
        }

        let changes = if pair.is_employee {
            vec![LinkChange::Dismiss(pair.relation())]
        } else {
            vec![]
        };
        self.commit(ctx, LinkAction::RemoveEmployee, Some(user_id), company_id, changes)
            .await
    }

    /// Make `user_id` the company's responsible user.
    ///
    /// The user is made an employee in the same transaction. The generic
    /// link is not touched.
    pub async fn set_responsible(
        &self,
        ctx: &RequestContext,
        company_id: Uuid,
        user_id: Uuid,
    ) -> CoreportResult<LinkReceipt> {
        let pair = self.authorized_pair(ctx, user_id, company_id).await?;

        if !pair.user.role.can_be_responsible() {
            return Err(LinkError::RoleNotEligible {
                user_id,
                role: pair.user.role,
            }
            .into());
        }
        if !pair.company.active {
            return Err(LinkError::CompanyInactive { company_id }.into());
        }
        if pair.is_responsible() && pair.is_employee {
            return self
                .commit(ctx, LinkAction::SetResponsible, Some(user_id), company_id, vec![])
                .await;
        }

        // The store makes the new responsible user an employee in the same
        // transaction. A previous responsible user stays on as an employee.
        let mut changes = Vec::with_capacity(2);
        if let Some(prior) = pair.company.responsible_user_id.filter(|&p| p != user_id) {
            debug!(%company_id, %prior, "Demoting previous responsible user to employee");
            changes.push(LinkChange::Employ(Relation::new(prior, company_id)));
        }
        changes.push(LinkChange::AssignResponsible(pair.relation()));

        self.commit(ctx, LinkAction::SetResponsible, Some(user_id), company_id, changes)
            .await
    }

    /// Clear the company's responsible user. Employee and link status of
    /// that user are kept.
    pub async fn remove_responsible(
        &self,
        ctx: &RequestContext,
        company_id: Uuid,
    ) -> CoreportResult<LinkReceipt> {
        ctx.require_admin()?;
        let company = self.store.load_company(ctx.tenant_id, company_id).await?;

        let changes = if company.responsible_user_id.is_some() {
            vec![LinkChange::ClearResponsible { company_id }]
        } else {
            vec![]
        };
        self.commit(
            ctx,
            LinkAction::RemoveResponsible,
            company.responsible_user_id,
            company_id,
            changes,
        )
        .await
    }

    async fn authorized_pair(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        company_id: Uuid,
    ) -> CoreportResult<PairSnapshot> {
        ctx.require_admin()?;
        self.store.load_pair(ctx.tenant_id, user_id, company_id).await
    }

    pub(crate) async fn commit(
        &self,
        ctx: &RequestContext,
        action: LinkAction,
        user_id: Option<Uuid>,
        company_id: Uuid,
        changes: Vec<LinkChange>,
    ) -> CoreportResult<LinkReceipt> {
        let changed = !changes.is_empty();
        if changed {
            self.store.apply(ctx.tenant_id, &changes).await?;
            info!(
                correlation_id = %ctx.correlation_id,
                tenant_id = %ctx.tenant_id,
                actor = %ctx.actor.user_id,
                ?action,
                ?user_id,
                %company_id,
                changes = changes.len(),
                "Link mutation applied"
            );
        } else {
            debug!(
                correlation_id = %ctx.correlation_id,
                ?action,
                ?user_id,
                %company_id,
                "Link mutation had nothing to change"
            );
        }

        Ok(LinkReceipt {
            correlation_id: ctx.correlation_id,
            action,
            user_id,
            company_id,
            changed,
        })
    }
}
