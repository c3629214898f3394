//! User/company relation model.
//!
//! Three relation kinds exist between a user and a company:
//!
//! - *Linked*: generic association granting report visibility
//!   (`linked_to` edge).
//! - *Employee*: the user is company staff (`employee_of` edge).
//! - *Responsible*: the company's `responsible_user_id` points at the user.
//!
//! None of them is stored on the user or company record itself, so
//! concurrent changes to different pairs never overwrite each other.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::company::Company;
use super::user::User;

/// A single user → company edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Relation {
    pub user_id: Uuid,
    pub company_id: Uuid,
}

impl Relation {
    pub fn new(user_id: Uuid, company_id: Uuid) -> Self {
        Self {
            user_id,
            company_id,
        }
    }
}

/// Everything a tenant's consistency report is computed from.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    pub users: Vec<User>,
    pub companies: Vec<Company>,
    /// Generic links.
    pub links: Vec<Relation>,
    /// Employee memberships.
    pub employees: Vec<Relation>,
}

/// Current state of one (user, company) pair, loaded in a single read.
#[derive(Debug, Clone)]
pub struct PairSnapshot {
    pub user: User,
    pub company: Company,
    pub is_linked: bool,
    pub is_employee: bool,
}

impl PairSnapshot {
    pub fn is_responsible(&self) -> bool {
        self.company.is_responsible(self.user.id)
    }

    pub fn relation(&self) -> Relation {
        Relation::new(self.user.id, self.company.id)
    }
}

/// One relation mutation. A store applies a slice of these atomically and
/// rejects the whole slice when, at write time:
///
/// - `Employ` or `AssignResponsible` targets an inactive company
///   (`InvalidState`);
/// - `Dismiss` targets the company's responsible user (`Conflict`).
///
/// `AssignResponsible` also makes the user an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    Link(Relation),
    Unlink(Relation),
    Employ(Relation),
    Dismiss(Relation),
    AssignResponsible(Relation),
    ClearResponsible { company_id: Uuid },
}
