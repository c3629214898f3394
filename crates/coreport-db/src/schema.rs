//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "users_companies_relations",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "relation_pair_indexes",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1: users, companies and their relations
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (tenant scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE string;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['admin', 'manager', 'user'];
DEFINE FIELD active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_tenant_username ON TABLE user \
    COLUMNS tenant_id, username UNIQUE;
DEFINE INDEX idx_user_tenant_email ON TABLE user \
    COLUMNS tenant_id, email UNIQUE;

-- =======================================================================
-- Companies (tenant scope)
-- =======================================================================
DEFINE TABLE company SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE company TYPE string;
DEFINE FIELD name ON TABLE company TYPE string;
DEFINE FIELD tax_id ON TABLE company TYPE string;
DEFINE FIELD active ON TABLE company TYPE bool DEFAULT true;
DEFINE FIELD responsible_user_id ON TABLE company TYPE option<string>;
DEFINE FIELD created_at ON TABLE company TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE company TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_company_tenant_tax_id ON TABLE company \
    COLUMNS tenant_id, tax_id UNIQUE;

-- =======================================================================
-- Graph Edge Tables (relations)
-- =======================================================================

-- User -> Company generic link (report visibility)
DEFINE TABLE linked_to TYPE RELATION SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE linked_to TYPE string;
DEFINE FIELD created_at ON TABLE linked_to TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_linked_to_tenant ON TABLE linked_to \
    COLUMNS tenant_id;

-- User -> Company employee membership
DEFINE TABLE employee_of TYPE RELATION SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE employee_of TYPE string;
DEFINE FIELD created_at ON TABLE employee_of TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_employee_of_tenant ON TABLE employee_of \
    COLUMNS tenant_id;
";

// -----------------------------------------------------------------------
// Schema v2: pair lookups on relation tables
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE INDEX idx_linked_to_pair ON TABLE linked_to COLUMNS in, out;
DEFINE INDEX idx_employee_of_pair ON TABLE employee_of COLUMNS in, out;
DEFINE INDEX idx_company_tenant ON TABLE company COLUMNS tenant_id;
DEFINE INDEX idx_user_tenant ON TABLE user COLUMNS tenant_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Returns how many migrations were applied; zero means the schema was
/// already current.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let current = current_version(db).await?;
    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply_migration(db, migration).await?;
        applied += 1;
    }

    if applied == 0 {
        info!(version = current, "Schema is up to date");
    }
    Ok(applied)
}

async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

/// Apply one migration's DDL, then record it in `_migration`.
async fn apply_migration<C: Connection>(
    db: &Surreal<C>,
    migration: &Migration,
) -> Result<(), DbError> {
    info!(
        version = migration.version,
        name = migration.name,
        "Applying migration"
    );

    let failed = |e: surrealdb::Error| {
        DbError::Migration(format!("v{} '{}': {e}", migration.version, migration.name))
    };

    db.query(migration.sql).await?.check().map_err(failed)?;
    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(failed)?;

    info!(version = migration.version, "Migration applied");
    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defines_both_relation_tables() {
        assert!(SCHEMA_V1.contains("DEFINE TABLE linked_to TYPE RELATION"));
        assert!(SCHEMA_V1.contains("DEFINE TABLE employee_of TYPE RELATION"));
        assert!(SCHEMA_V1.contains("responsible_user_id"));
    }

    #[test]
    fn migrations_are_strictly_ascending_from_one() {
        assert_eq!(MIGRATIONS.first().map(|m| m.version), Some(1));
        for window in MIGRATIONS.windows(2) {
            assert!(window[0].version < window[1].version);
        }
    }
}
