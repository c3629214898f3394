//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    let applied = coreport_db::run_migrations(&db).await.unwrap();
    assert_eq!(applied, 2);

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("user"), "missing user table");
    assert!(info_str.contains("company"), "missing company table");
    assert!(info_str.contains("linked_to"), "missing linked_to edge");
    assert!(info_str.contains("employee_of"), "missing employee_of edge");
}

#[tokio::test]
async fn rerunning_migrations_is_a_no_op() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    coreport_db::run_migrations(&db).await.unwrap();
    let applied = coreport_db::run_migrations(&db).await.unwrap();
    assert_eq!(applied, 0);
}
