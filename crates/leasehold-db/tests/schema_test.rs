//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    leasehold_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in ["account", "session", "property", "tenant", "invitation", "_migration"] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    leasehold_db::run_migrations(&db).await.unwrap();
    leasehold_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn invitation_status_is_constrained() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leasehold_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE invitation SET \
             email = 'jane@x.com', tenant_id = 't1', \
             token_hash = 'abc', status = 'Expired', \
             expires_at = time::now()",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "unknown status should be rejected");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_invitation_tokens() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leasehold_db::run_migrations(&db).await.unwrap();

    let create = "CREATE invitation SET \
         email = 'jane@x.com', tenant_id = 't1', \
         token_hash = 'same-digest', status = 'Pending', \
         expires_at = time::now()";

    db.query(create).await.unwrap().check().unwrap();
    let result = db.query(create).await.unwrap().check();

    assert!(result.is_err(), "duplicate token hash should be rejected");
}

#[tokio::test]
async fn attaching_a_manager_migrates_the_database() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    let manager = leasehold_db::DbManager::attach(db).await.unwrap();
    // A second handle on the same database finds nothing left to apply.
    let again = leasehold_db::DbManager::attach(manager.client().clone())
        .await
        .unwrap();

    let mut result = again
        .client()
        .query("SELECT * FROM _migration")
        .await
        .unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1);
}
