//! Company domain model.
//!
//! Companies are the tenant-scoped entities users report on. Employees
//! are stored as relations (see [`crate::models::link`]); the responsible
//! user is a single field so a company can never have two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Tax identification number as registered.
    pub tax_id: String,
    /// Inactive companies accept no new employee or responsible assignments.
    pub active: bool,
    /// The manager/admin accountable for this company, if any.
    pub responsible_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn is_responsible(&self, user_id: Uuid) -> bool {
        self.responsible_user_id == Some(user_id)
    }
}

/// Fields required to create a new company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    pub tenant_id: Uuid,
    pub name: String,
    pub tax_id: String,
}

/// Fields that can be updated on an existing company.
///
/// The responsible user changes only through link operations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub active: Option<bool>,
}
