//! Consistency evaluation of user/company pairs.
//!
//! A pair is inconsistent exactly when the generic link disagrees with
//! whether the user plays an operational role (employee or responsible)
//! in the company. Evaluation is pure: it only reads a [`LinkGraph`].

use std::collections::HashSet;
use std::fmt;

use coreport_core::models::company::Company;
use coreport_core::models::link::{LinkGraph, PairSnapshot, Relation};
use coreport_core::models::user::User;
use serde::Serialize;
use uuid::Uuid;

/// Classification of a pair's relation flags.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PairShape {
    Consistent,
    /// Linked, but neither employee nor responsible.
    LinkedWithoutRole,
    /// Employee and/or responsible, but not linked.
    RoleWithoutLink,
    /// Linked and responsible but not an employee. Not an inconsistency,
    /// yet responsible assignment always employs the user, so this only
    /// shows up in legacy data.
    ResponsibleNotEmployee,
}

impl PairShape {
    pub fn classify(is_linked: bool, is_employee: bool, is_responsible: bool) -> Self {
        let has_role = is_employee || is_responsible;
        match (is_linked, has_role) {
            (true, false) => PairShape::LinkedWithoutRole,
            (false, true) => PairShape::RoleWithoutLink,
            _ if is_responsible && !is_employee => PairShape::ResponsibleNotEmployee,
            _ => PairShape::Consistent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PairShape::Consistent => "consistent",
            PairShape::LinkedWithoutRole => "linked_without_role",
            PairShape::RoleWithoutLink => "role_without_link",
            PairShape::ResponsibleNotEmployee => "responsible_not_employee",
        }
    }
}

impl fmt::Display for PairShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one (user, company) pair.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PairStatus {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub username: String,
    pub company_name: String,
    pub is_linked: bool,
    pub is_employee: bool,
    pub is_responsible: bool,
    pub has_inconsistency: bool,
    pub shape: PairShape,
}

impl PairStatus {
    pub fn new(user: &User, company: &Company, is_linked: bool, is_employee: bool) -> Self {
        let is_responsible = company.is_responsible(user.id);
        Self {
            user_id: user.id,
            company_id: company.id,
            username: user.username.clone(),
            company_name: company.name.clone(),
            is_linked,
            is_employee,
            is_responsible,
            has_inconsistency: is_linked != (is_employee || is_responsible),
            shape: PairShape::classify(is_linked, is_employee, is_responsible),
        }
    }

    pub fn from_snapshot(pair: &PairSnapshot) -> Self {
        Self::new(&pair.user, &pair.company, pair.is_linked, pair.is_employee)
    }
}

/// Evaluate every (non-admin user, company) pair of the graph.
///
/// Admins have implicit access to every company and are left out.
/// Pairs come out user-major, in the order the graph lists them.
pub fn evaluate(graph: &LinkGraph) -> Vec<PairStatus> {
    let links: HashSet<Relation> = graph.links.iter().copied().collect();
    let employees: HashSet<Relation> = graph.employees.iter().copied().collect();

    graph
        .users
        .iter()
        .filter(|user| !user.is_admin())
        .flat_map(|user| {
            let links = &links;
            let employees = &employees;
            graph.companies.iter().map(move |company| {
                let rel = Relation::new(user.id, company.id);
                PairStatus::new(user, company, links.contains(&rel), employees.contains(&rel))
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use coreport_core::models::user::UserRole;

    pub(crate) fn user(name: &str, role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            username: name.into(),
            email: format!("{name}@example.com"),
            role,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn company(name: &str) -> Company {
        Company {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            name: name.into(),
            tax_id: format!("{name}-tax"),
            active: true,
            responsible_user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn classify_covers_every_flag_combination() {
        use PairShape::*;
        let cases = [
            ((false, false, false), Consistent),
            ((true, false, false), LinkedWithoutRole),
            ((false, true, false), RoleWithoutLink),
            ((false, false, true), RoleWithoutLink),
            ((false, true, true), RoleWithoutLink),
            ((true, true, false), Consistent),
            ((true, false, true), ResponsibleNotEmployee),
            ((true, true, true), Consistent),
        ];
        for ((linked, employee, responsible), expected) in cases {
            assert_eq!(
                PairShape::classify(linked, employee, responsible),
                expected,
                "linked={linked} employee={employee} responsible={responsible}"
            );
        }
    }

    #[test]
    fn inconsistency_matches_link_versus_role() {
        let u = user("u", UserRole::User);
        let c = company("c");

        assert!(!PairStatus::new(&u, &c, false, false).has_inconsistency);
        assert!(PairStatus::new(&u, &c, true, false).has_inconsistency);
        assert!(PairStatus::new(&u, &c, false, true).has_inconsistency);
        assert!(!PairStatus::new(&u, &c, true, true).has_inconsistency);
    }

    #[test]
    fn responsible_counts_as_role() {
        let m = user("m", UserRole::Manager);
        let mut c = company("c");
        c.responsible_user_id = Some(m.id);

        let status = PairStatus::new(&m, &c, false, true);
        assert!(status.is_responsible);
        assert!(status.has_inconsistency);
        assert_eq!(status.shape, PairShape::RoleWithoutLink);
    }

    #[test]
    fn evaluate_skips_admins_and_covers_every_pair() {
        let admin = user("root", UserRole::Admin);
        let a = user("a", UserRole::User);
        let b = user("b", UserRole::Manager);
        let c1 = company("c1");
        let c2 = company("c2");
        let graph = LinkGraph {
            users: vec![admin.clone(), a.clone(), b.clone()],
            companies: vec![c1.clone(), c2.clone()],
            links: vec![Relation::new(a.id, c1.id), Relation::new(admin.id, c1.id)],
            employees: vec![Relation::new(b.id, c2.id)],
        };

        let pairs = evaluate(&graph);
        assert_eq!(pairs.len(), 4);
        assert!(pairs.iter().all(|p| p.user_id != admin.id));

        let a_c1 = pairs
            .iter()
            .find(|p| p.user_id == a.id && p.company_id == c1.id)
            .unwrap();
        assert_eq!(a_c1.shape, PairShape::LinkedWithoutRole);

        let b_c2 = pairs
            .iter()
            .find(|p| p.user_id == b.id && p.company_id == c2.id)
            .unwrap();
        assert_eq!(b_c2.shape, PairShape::RoleWithoutLink);
        assert_eq!(b_c2.company_name, "c2");
    }

    #[test]
    fn duplicate_edges_count_once() {
        let a = user("a", UserRole::User);
        let c = company("c");
        let rel = Relation::new(a.id, c.id);
        let graph = LinkGraph {
            users: vec![a],
            companies: vec![c],
            links: vec![rel, rel],
            employees: vec![rel, rel],
        };

        let pairs = evaluate(&graph);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].shape, PairShape::Consistent);
    }
}
