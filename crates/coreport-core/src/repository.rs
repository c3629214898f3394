//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and tenant-scoped: every call
//! takes the `tenant_id` it operates in.

use uuid::Uuid;

use crate::error::CoreportResult;
use crate::models::{
    company::{Company, CreateCompany, UpdateCompany},
    link::{LinkChange, LinkGraph, PairSnapshot},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Entity CRUD
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CoreportResult<User>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CoreportResult<User>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = CoreportResult<User>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CoreportResult<PaginatedResult<User>>> + Send;
}

pub trait CompanyRepository: Send + Sync {
    fn create(&self, input: CreateCompany)
    -> impl Future<Output = CoreportResult<Company>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CoreportResult<Company>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateCompany,
    ) -> impl Future<Output = CoreportResult<Company>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CoreportResult<PaginatedResult<Company>>> + Send;
}

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

/// Persistence for user/company relations.
pub trait LinkStore: Send + Sync {
    /// Load every user, company and relation of a tenant.
    fn load_graph(&self, tenant_id: Uuid) -> impl Future<Output = CoreportResult<LinkGraph>> + Send;

    /// Load one pair. Fails with `NotFound` if either side is unknown in
    /// the tenant.
    fn load_pair(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        company_id: Uuid,
    ) -> impl Future<Output = CoreportResult<PairSnapshot>> + Send;

    fn load_company(
        &self,
        tenant_id: Uuid,
        company_id: Uuid,
    ) -> impl Future<Output = CoreportResult<Company>> + Send;

    /// Apply all changes in one transaction: either every change is
    /// persisted or none is. Re-applying a change that already holds is
    /// not an error.
    fn apply(
        &self,
        tenant_id: Uuid,
        changes: &[LinkChange],
    ) -> impl Future<Output = CoreportResult<()>> + Send;
}
