//! Tenant-wide consistency report.

use std::collections::HashSet;

use coreport_core::models::link::LinkGraph;
use serde::Serialize;
use uuid::Uuid;

use crate::evaluator::{PairShape, PairStatus, evaluate};

/// Aggregate counters over the evaluated pairs.
///
/// Every counter is derived from the non-admin pair set, so admins'
/// links and memberships never show up here.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportTotals {
    pub total_users: usize,
    pub total_companies: usize,
    pub total_links: usize,
    pub total_inconsistencies: usize,
    /// Pairs whose shape the resolver will refuse to repair.
    pub total_unresolvable: usize,
    pub users_without_company: usize,
    pub companies_without_employees: usize,
    pub average_links_per_user: f64,
    pub average_employees_per_company: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    pub pairs: Vec<PairStatus>,
    pub totals: ReportTotals,
}

impl ConsistencyReport {
    pub fn build(graph: &LinkGraph) -> Self {
        let pairs = evaluate(graph);
        let total_users = graph.users.iter().filter(|u| !u.is_admin()).count();
        let total_companies = graph.companies.len();

        let linked: Vec<&PairStatus> = pairs.iter().filter(|p| p.is_linked).collect();
        let employed: Vec<&PairStatus> = pairs.iter().filter(|p| p.is_employee).collect();

        let users_with_company: HashSet<Uuid> = linked.iter().map(|p| p.user_id).collect();
        let companies_with_employees: HashSet<Uuid> =
            employed.iter().map(|p| p.company_id).collect();

        let totals = ReportTotals {
            total_users,
            total_companies,
            total_links: linked.len(),
            total_inconsistencies: pairs.iter().filter(|p| p.has_inconsistency).count(),
            total_unresolvable: pairs
                .iter()
                .filter(|p| p.shape == PairShape::ResponsibleNotEmployee)
                .count(),
            users_without_company: total_users - users_with_company.len(),
            companies_without_employees: total_companies - companies_with_employees.len(),
            average_links_per_user: ratio(linked.len(), total_users),
            average_employees_per_company: ratio(employed.len(), total_companies),
        };

        Self { pairs, totals }
    }

    pub fn inconsistent_pairs(&self) -> impl Iterator<Item = &PairStatus> {
        self.pairs.iter().filter(|p| p.has_inconsistency)
    }
}

fn ratio(count: usize, over: usize) -> f64 {
    if over == 0 {
        0.0
    } else {
        count as f64 / over as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::tests::{company, user};
    use coreport_core::models::link::Relation;
    use coreport_core::models::user::UserRole;

    #[test]
    fn empty_graph_has_zero_averages() {
        let report = ConsistencyReport::build(&LinkGraph::default());
        assert!(report.pairs.is_empty());
        assert_eq!(report.totals.average_links_per_user, 0.0);
        assert_eq!(report.totals.average_employees_per_company, 0.0);
    }

    #[test]
    fn counters_follow_the_pairs() {
        let admin = user("root", UserRole::Admin);
        let a = user("a", UserRole::User);
        let b = user("b", UserRole::User);
        let m = user("m", UserRole::Manager);
        let c1 = company("c1");
        let mut c2 = company("c2");
        let c3 = company("c3");
        c2.responsible_user_id = Some(m.id);

        let graph = LinkGraph {
            users: vec![admin.clone(), a.clone(), b.clone(), m.clone()],
            companies: vec![c1.clone(), c2.clone(), c3.clone()],
            links: vec![
                Relation::new(a.id, c1.id),
                Relation::new(a.id, c2.id),
                Relation::new(m.id, c2.id),
                Relation::new(admin.id, c3.id),
            ],
            employees: vec![Relation::new(a.id, c1.id), Relation::new(admin.id, c3.id)],
        };

        let report = ConsistencyReport::build(&graph);
        let t = &report.totals;
        assert_eq!(report.pairs.len(), 9);
        assert_eq!(t.total_users, 3);
        assert_eq!(t.total_companies, 3);
        assert_eq!(t.total_links, 3);
        // a-c2 is linked without role; m-c2 is responsible but not employee.
        assert_eq!(t.total_inconsistencies, 1);
        assert_eq!(t.total_unresolvable, 1);
        assert_eq!(t.users_without_company, 1);
        // The admin's membership in c3 is not counted.
        assert_eq!(t.companies_without_employees, 2);
        assert_eq!(t.average_links_per_user, 1.0);
        assert!((t.average_employees_per_company - 1.0 / 3.0).abs() < f64::EPSILON);

        let inconsistent: Vec<_> = report.inconsistent_pairs().collect();
        assert_eq!(inconsistent.len(), 1);
        assert_eq!(inconsistent[0].user_id, a.id);
        assert_eq!(inconsistent[0].company_id, c2.id);
    }
}
