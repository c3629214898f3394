//! SurrealDB implementation of [`LinkStore`].
//!
//! Generic links and employee memberships are `linked_to` / `employee_of`
//! edges from `user` to `company`, each stamped with the tenant. The
//! responsible user is the company's `responsible_user_id` field.

use coreport_core::error::CoreportResult;
use coreport_core::models::company::Company;
use coreport_core::models::link::{LinkChange, LinkGraph, PairSnapshot, Relation};
use coreport_core::repository::LinkStore;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::company::CompanyRow;
use super::user::UserRow;
use super::{
    CONFLICT_TAG, CountRow, FORBIDDEN_TAG, INVALID_STATE_TAG, parse_uuid, query_failure,
};
use crate::error::DbError;

const LINK_EDGE: &str = "linked_to";
const EMPLOYEE_EDGE: &str = "employee_of";

/// Row struct for edge listings.
#[derive(Debug, SurrealValue)]
struct EdgeRow {
    user_id: String,
    company_id: String,
}

impl EdgeRow {
    fn try_into_relation(self) -> Result<Relation, DbError> {
        Ok(Relation::new(
            parse_uuid(&self.user_id, "edge user id")?,
            parse_uuid(&self.company_id, "edge company id")?,
        ))
    }
}

fn relations(rows: Vec<EdgeRow>) -> Result<Vec<Relation>, DbError> {
    rows.into_iter().map(EdgeRow::try_into_relation).collect()
}

/// Render one change as SurrealQL. Record ids are embedded literally
/// because `RELATE` needs literal record-id syntax; they come from
/// [`Uuid`] values so they cannot carry injected text.
fn change_statement(change: &LinkChange) -> String {
    match *change {
        LinkChange::Link(rel) => relate(LINK_EDGE, rel),
        LinkChange::Unlink(rel) => unrelate(LINK_EDGE, rel),
        LinkChange::Employ(rel) => relate(EMPLOYEE_EDGE, rel),
        LinkChange::Dismiss(rel) => unrelate(EMPLOYEE_EDGE, rel),
        // The responsible user is always an employee as well.
        LinkChange::AssignResponsible(rel) => format!(
            "{} UPDATE company:`{}` SET responsible_user_id = '{}', \
             updated_at = time::now() WHERE tenant_id = $tenant_id;",
            relate(EMPLOYEE_EDGE, rel),
            rel.company_id,
            rel.user_id
        ),
        LinkChange::ClearResponsible { company_id } => format!(
            "UPDATE company:`{company_id}` SET responsible_user_id = NONE, \
             updated_at = time::now() WHERE tenant_id = $tenant_id;"
        ),
    }
}

// Deleting first keeps a repeated relate from leaving a duplicate edge.
fn relate(edge: &str, rel: Relation) -> String {
    format!(
        "{} RELATE user:`{}` -> {edge} -> company:`{}` SET tenant_id = $tenant_id;",
        unrelate(edge, rel),
        rel.user_id,
        rel.company_id
    )
}

fn unrelate(edge: &str, rel: Relation) -> String {
    format!(
        "DELETE {edge} WHERE in = user:`{}` AND out = company:`{}` \
         AND tenant_id = $tenant_id;",
        rel.user_id, rel.company_id
    )
}

/// Conditions under which a change must not be applied, paired with the
/// error raised. They are evaluated inside the write transaction, so they
/// see the state the changes land on rather than the caller's earlier read.
fn guards(change: &LinkChange) -> Vec<(String, String)> {
    let inactive = |rel: Relation| {
        (
            format!(
                "(SELECT VALUE active FROM ONLY company:`{}`) != true",
                rel.company_id
            ),
            format!(
                "{INVALID_STATE_TAG} company {} is inactive and accepts no new assignments",
                rel.company_id
            ),
        )
    };
    match *change {
        LinkChange::Employ(rel) => vec![inactive(rel)],
        LinkChange::AssignResponsible(rel) => vec![
            (
                format!(
                    "(SELECT VALUE role FROM ONLY user:`{}`) NOT IN ['admin', 'manager']",
                    rel.user_id
                ),
                format!(
                    "{FORBIDDEN_TAG} user {}: only managers and admins can be responsible",
                    rel.user_id
                ),
            ),
            inactive(rel),
        ],
        LinkChange::Dismiss(rel) => vec![(
            format!(
                "(SELECT VALUE responsible_user_id FROM ONLY company:`{}`) = '{}'",
                rel.company_id, rel.user_id
            ),
            format!(
                "{CONFLICT_TAG} user {} is the responsible user of company {}; \
                 remove the responsibility first",
                rel.user_id, rel.company_id
            ),
        )],
        _ => Vec::new(),
    }
}

/// A single `IF .. ELSE IF ..` statement raising the first violated guard.
/// It is one statement so that a failure is reported at the head of the
/// transaction's results.
fn guard_statement(changes: &[LinkChange]) -> Option<String> {
    let mut seen: Vec<(String, String)> = Vec::new();
    for (condition, message) in changes.iter().flat_map(guards) {
        if !seen.iter().any(|(c, _)| *c == condition) {
            seen.push((condition, message));
        }
    }
    if seen.is_empty() {
        return None;
    }
    let branches: Vec<String> = seen
        .into_iter()
        .map(|(condition, message)| format!("IF {condition} {{ THROW \"{message}\" }}"))
        .collect();
    Some(format!("{};", branches.join(" ELSE ")))
}

/// Wrap the statements for `changes` in a single transaction, guards first.
fn transaction(changes: &[LinkChange]) -> String {
    let mut query = String::from("BEGIN TRANSACTION;\n");
    if let Some(guard) = guard_statement(changes) {
        query.push_str(&guard);
        query.push('\n');
    }
    for change in changes {
        query.push_str(&change_statement(change));
        query.push('\n');
    }
    query.push_str("COMMIT TRANSACTION;");
    query
}

/// SurrealDB implementation of the link store.
#[derive(Clone)]
pub struct SurrealLinkStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLinkStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LinkStore for SurrealLinkStore<C> {
    async fn load_graph(&self, tenant_id: Uuid) -> CoreportResult<LinkGraph> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE tenant_id = $tenant_id ORDER BY username ASC; \
                 SELECT meta::id(id) AS record_id, * FROM company \
                 WHERE tenant_id = $tenant_id ORDER BY name ASC; \
                 SELECT meta::id(in) AS user_id, meta::id(out) AS company_id \
                 FROM linked_to WHERE tenant_id = $tenant_id; \
                 SELECT meta::id(in) AS user_id, meta::id(out) AS company_id \
                 FROM employee_of WHERE tenant_id = $tenant_id;",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let users: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let companies: Vec<CompanyRow> = result.take(1).map_err(DbError::from)?;
        let links: Vec<EdgeRow> = result.take(2).map_err(DbError::from)?;
        let employees: Vec<EdgeRow> = result.take(3).map_err(DbError::from)?;

        let graph = LinkGraph {
            users: users
                .into_iter()
                .map(UserRow::try_into_user)
                .collect::<Result<Vec<_>, DbError>>()?,
            companies: companies
                .into_iter()
                .map(CompanyRow::try_into_company)
                .collect::<Result<Vec<_>, DbError>>()?,
            links: relations(links)?,
            employees: relations(employees)?,
        };

        debug!(
            %tenant_id,
            users = graph.users.len(),
            companies = graph.companies.len(),
            links = graph.links.len(),
            employees = graph.employees.len(),
            "Loaded link graph"
        );

        Ok(graph)
    }

    async fn load_pair(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        company_id: Uuid,
    ) -> CoreportResult<PairSnapshot> {
        let user_id_str = user_id.to_string();
        let company_id_str = company_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('user', $user_id) \
                 WHERE tenant_id = $tenant_id; \
                 SELECT meta::id(id) AS record_id, * FROM type::record('company', $company_id) \
                 WHERE tenant_id = $tenant_id; \
                 SELECT count() AS total FROM linked_to \
                 WHERE in = type::record('user', $user_id) \
                 AND out = type::record('company', $company_id) \
                 AND tenant_id = $tenant_id GROUP ALL; \
                 SELECT count() AS total FROM employee_of \
                 WHERE in = type::record('user', $user_id) \
                 AND out = type::record('company', $company_id) \
                 AND tenant_id = $tenant_id GROUP ALL;",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id_str.clone()))
            .bind(("company_id", company_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let users: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let user = users
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "user".into(),
                id: user_id_str,
            })?
            .try_into_user()?;

        let companies: Vec<CompanyRow> = result.take(1).map_err(DbError::from)?;
        let company = companies
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "company".into(),
                id: company_id_str,
            })?
            .try_into_company()?;

        let links: Vec<CountRow> = result.take(2).map_err(DbError::from)?;
        let employees: Vec<CountRow> = result.take(3).map_err(DbError::from)?;

        Ok(PairSnapshot {
            user,
            company,
            is_linked: links.first().is_some_and(|r| r.total > 0),
            is_employee: employees.first().is_some_and(|r| r.total > 0),
        })
    }

    async fn load_company(&self, tenant_id: Uuid, company_id: Uuid) -> CoreportResult<Company> {
        let id_str = company_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('company', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CompanyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "company".into(),
            id: id_str,
        })?;

        Ok(row.try_into_company()?)
    }

    async fn apply(&self, tenant_id: Uuid, changes: &[LinkChange]) -> CoreportResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        debug!(%tenant_id, changes = changes.len(), "Applying link changes");

        self.db
            .query(transaction(changes))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(query_failure)?;

        Ok(())
    }
}
