//! In-memory `LinkStore` for service unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use coreport_core::error::{CoreportError, CoreportResult};
use coreport_core::models::company::Company;
use coreport_core::models::link::{LinkChange, LinkGraph, PairSnapshot, Relation};
use coreport_core::repository::LinkStore;
use uuid::Uuid;

#[derive(Default)]
pub(crate) struct MemoryLinkStore {
    graph: Mutex<LinkGraph>,
    fail_apply: AtomicBool,
}

impl MemoryLinkStore {
    pub(crate) fn new(graph: LinkGraph) -> Self {
        Self {
            graph: Mutex::new(graph),
            fail_apply: AtomicBool::new(false),
        }
    }

    /// Make every following `apply` fail before touching state.
    pub(crate) fn fail_next_applies(&self) {
        self.fail_apply.store(true, Ordering::SeqCst);
    }

    pub(crate) fn snapshot(&self) -> LinkGraph {
        self.graph.lock().unwrap().clone()
    }
}

fn insert(edges: &mut Vec<Relation>, rel: Relation) {
    if !edges.contains(&rel) {
        edges.push(rel);
    }
}

fn scoped(graph: &LinkGraph, tenant_id: Uuid) -> LinkGraph {
    LinkGraph {
        users: graph
            .users
            .iter()
            .filter(|u| u.tenant_id == tenant_id)
            .cloned()
            .collect(),
        companies: graph
            .companies
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect(),
        links: graph.links.clone(),
        employees: graph.employees.clone(),
    }
}

/// The write-time rules every `LinkStore` enforces.
fn check(graph: &LinkGraph, change: &LinkChange) -> CoreportResult<()> {
    let company = |id: Uuid| graph.companies.iter().find(|c| c.id == id);
    match *change {
        LinkChange::AssignResponsible(rel)
            if !graph
                .users
                .iter()
                .any(|u| u.id == rel.user_id && u.role.can_be_responsible()) =>
        {
            Err(CoreportError::Forbidden {
                reason: format!("user {} cannot be responsible", rel.user_id),
            })
        }
        LinkChange::Employ(rel) | LinkChange::AssignResponsible(rel)
            if !company(rel.company_id).is_some_and(|c| c.active) =>
        {
            Err(CoreportError::InvalidState {
                reason: format!("company {} is inactive", rel.company_id),
            })
        }
        LinkChange::Dismiss(rel)
            if company(rel.company_id).is_some_and(|c| c.is_responsible(rel.user_id)) =>
        {
            Err(CoreportError::Conflict {
                reason: format!("user {} is responsible", rel.user_id),
            })
        }
        _ => Ok(()),
    }
}

impl LinkStore for MemoryLinkStore {
    async fn load_graph(&self, tenant_id: Uuid) -> CoreportResult<LinkGraph> {
        Ok(scoped(&self.graph.lock().unwrap(), tenant_id))
    }

    async fn load_pair(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        company_id: Uuid,
    ) -> CoreportResult<PairSnapshot> {
        let graph = scoped(&self.graph.lock().unwrap(), tenant_id);
        let user = graph
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| CoreportError::NotFound {
                entity: "user".into(),
                id: user_id.to_string(),
            })?;
        let company = graph
            .companies
            .iter()
            .find(|c| c.id == company_id)
            .cloned()
            .ok_or_else(|| CoreportError::NotFound {
                entity: "company".into(),
                id: company_id.to_string(),
            })?;
        let rel = Relation::new(user_id, company_id);
        Ok(PairSnapshot {
            user,
            company,
            is_linked: graph.links.contains(&rel),
            is_employee: graph.employees.contains(&rel),
        })
    }

    async fn load_company(&self, tenant_id: Uuid, company_id: Uuid) -> CoreportResult<Company> {
        self.graph
            .lock()
            .unwrap()
            .companies
            .iter()
            .find(|c| c.id == company_id && c.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| CoreportError::NotFound {
                entity: "company".into(),
                id: company_id.to_string(),
            })
    }

    async fn apply(&self, _tenant_id: Uuid, changes: &[LinkChange]) -> CoreportResult<()> {
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(CoreportError::Database("injected failure".into()));
        }
        let mut guard = self.graph.lock().unwrap();
        for change in changes {
            check(&guard, change)?;
        }
        let mut graph = guard.clone();
        for change in changes {
            match *change {
                LinkChange::Link(rel) => insert(&mut graph.links, rel),
                LinkChange::Unlink(rel) => graph.links.retain(|r| *r != rel),
                LinkChange::Employ(rel) => insert(&mut graph.employees, rel),
                LinkChange::Dismiss(rel) => graph.employees.retain(|r| *r != rel),
                LinkChange::AssignResponsible(rel) => {
                    insert(&mut graph.employees, rel);
                    for c in graph.companies.iter_mut().filter(|c| c.id == rel.company_id) {
                        c.responsible_user_id = Some(rel.user_id);
                    }
                }
                LinkChange::ClearResponsible { company_id } => {
                    for c in graph.companies.iter_mut().filter(|c| c.id == company_id) {
                        c.responsible_user_id = None;
                    }
                }
            }
        }
        *guard = graph;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkConfig;
    use crate::evaluator::tests::{company, user};
    use crate::evaluator::{PairShape, evaluate};
    use crate::service::LinkService;
    use coreport_core::context::{Actor, RequestContext};
    use coreport_core::models::user::{User, UserRole};

    struct Setup {
        service: LinkService<MemoryLinkStore>,
        admin: User,
        manager: User,
        staff: User,
        acme: Company,
    }

    fn setup() -> Setup {
        let admin = user("root", UserRole::Admin);
        let manager = user("maria", UserRole::Manager);
        let staff = user("ulisses", UserRole::User);
        let acme = company("acme");
        let graph = LinkGraph {
            users: vec![admin.clone(), manager.clone(), staff.clone()],
            companies: vec![acme.clone()],
            ..Default::default()
        };
        Setup {
            service: LinkService::new(MemoryLinkStore::new(graph), LinkConfig::default()),
            admin,
            manager,
            staff,
            acme,
        }
    }

    fn ctx(actor: &User) -> RequestContext {
        RequestContext::new(Uuid::nil(), Actor::from(actor))
    }

    #[tokio::test]
    async fn failed_apply_leaves_state_untouched() {
        let s = setup();
        s.service.store.fail_next_applies();
        let before = s.service.store.snapshot();

        let err = s
            .service
            .set_responsible(&ctx(&s.admin), s.acme.id, s.manager.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "DATABASE_ERROR");

        let after = s.service.store.snapshot();
        assert_eq!(after.employees, before.employees);
        assert_eq!(after.companies[0].responsible_user_id, None);
    }

    #[tokio::test]
    async fn previous_responsible_stays_employee() {
        let s = setup();
        let admin = ctx(&s.admin);
        let other = user("otto", UserRole::Manager);
        s.service.store.graph.lock().unwrap().users.push(other.clone());

        s.service
            .set_responsible(&admin, s.acme.id, s.manager.id)
            .await
            .unwrap();
        s.service
            .set_responsible(&admin, s.acme.id, other.id)
            .await
            .unwrap();

        let graph = s.service.store.snapshot();
        assert_eq!(graph.companies[0].responsible_user_id, Some(other.id));
        assert!(graph.employees.contains(&Relation::new(s.manager.id, s.acme.id)));
        assert!(graph.employees.contains(&Relation::new(other.id, s.acme.id)));
    }

    #[tokio::test]
    async fn legacy_responsible_without_employee_is_employed_on_replacement() {
        let s = setup();
        let admin = ctx(&s.admin);
        let other = user("otto", UserRole::Manager);
        {
            let mut graph = s.service.store.graph.lock().unwrap();
            graph.users.push(other.clone());
            graph.companies[0].responsible_user_id = Some(s.manager.id);
        }

        s.service
            .set_responsible(&admin, s.acme.id, other.id)
            .await
            .unwrap();

        let graph = s.service.store.snapshot();
        assert!(graph.employees.contains(&Relation::new(s.manager.id, s.acme.id)));
    }

    #[tokio::test]
    async fn resolve_repairs_every_resolvable_pair() {
        let s = setup();
        let admin = ctx(&s.admin);
        s.service.add_link(&admin, s.staff.id, s.acme.id).await.unwrap();
        s.service
            .set_responsible(&admin, s.acme.id, s.manager.id)
            .await
            .unwrap();

        let report = s.service.report(&admin).await.unwrap();
        assert_eq!(report.totals.total_inconsistencies, 2);

        for pair in evaluate(&s.service.store.snapshot()) {
            if pair.has_inconsistency {
                let resolution = s
                    .service
                    .resolve(&admin, pair.user_id, pair.company_id)
                    .await
                    .unwrap();
                assert!(!resolution.status.has_inconsistency);
                assert_eq!(resolution.status.shape, PairShape::Consistent);
            }
        }

        let report = s.service.report(&admin).await.unwrap();
        assert_eq!(report.totals.total_inconsistencies, 0);
    }

    #[tokio::test]
    async fn non_admin_cannot_mutate() {
        let s = setup();
        let err = s
            .service
            .add_link(&ctx(&s.manager), s.staff.id, s.acme.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        assert!(s.service.store.snapshot().links.is_empty());
    }

    #[tokio::test]
    async fn store_refuses_to_dismiss_the_responsible_user() {
        let s = setup();
        let rel = Relation::new(s.manager.id, s.acme.id);
        s.service
            .store
            .apply(Uuid::nil(), &[LinkChange::AssignResponsible(rel)])
            .await
            .unwrap();

        let err = s
            .service
            .store
            .apply(Uuid::nil(), &[LinkChange::Dismiss(rel)])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
        assert!(s.service.store.snapshot().employees.contains(&rel));
    }
}
