/// Integration tests for the embedded migrations
///
/// Require PostgreSQL in `DATABASE_URL`; skipped otherwise.

mod common;

use softdesk_shared::db::migrations::{get_migration_status, run_migrations};

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let first = get_migration_status(&pool).await.unwrap();
    run_migrations(&pool).await.expect("Second run should be a no-op");
    let second = get_migration_status(&pool).await.unwrap();

    assert!(first.is_up_to_date);
    assert_eq!(first.applied_migrations, second.applied_migrations);
    assert_eq!(first.latest_version, second.latest_version);
}

#[tokio::test]
async fn test_migration_creates_all_tables() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    for table in ["users", "projects", "contributors", "issues", "comments"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(exists, "Table {} should exist", table);
    }
}

#[tokio::test]
async fn test_migration_creates_enums() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let labels: Vec<String> = sqlx::query_scalar(
        "SELECT e.enumlabel::text FROM pg_enum e
         JOIN pg_type t ON t.oid = e.enumtypid
         WHERE t.typname = 'issue_status'
         ORDER BY e.enumsortorder",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(labels, vec!["todo", "in_progress", "finished"]);
}

#[tokio::test]
async fn test_age_check_constraint() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, age) VALUES ($1, 'x', 14)",
    )
    .bind(format!("too-young-{}", uuid::Uuid::new_v4().simple()))
    .execute(&pool)
    .await;

    assert!(result.is_err(), "age below 15 must be rejected by the schema");
}
