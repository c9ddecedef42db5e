//! Shared helpers for database-backed tests
//!
//! Tests need a PostgreSQL database in `DATABASE_URL`; without it they log a
//! notice and return early. Every fixture uses random names so tests can run
//! in parallel against one database.

#![allow(dead_code)]

use softdesk_shared::auth::policy::Actor;
use softdesk_shared::db::migrations::run_migrations;
use softdesk_shared::db::pool::{create_pool, DatabaseConfig};
use softdesk_shared::models::project::{Project, ProjectType};
use softdesk_shared::models::user::{CreateUser, User};
use softdesk_shared::tracker::projects::{create_project, CreateProjectInput};
use sqlx::PgPool;
use uuid::Uuid;

pub fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Migrated pool, or `None` when no database is configured
pub async fn test_pool() -> Option<PgPool> {
    let Some(url) = database_url() else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 5,
        ..Default::default()
    })
    .await
    .expect("Failed to create pool");

    run_migrations(&pool).await.expect("Failed to run migrations");

    Some(pool)
}

/// Inserts a user directly, skipping password hashing
pub async fn create_user(pool: &PgPool, prefix: &str) -> User {
    User::create(
        pool,
        CreateUser {
            username: format!("{}-{}", prefix, Uuid::new_v4().simple()),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA".to_string(),
            age: 30,
            can_be_contacted: false,
            can_data_be_shared: false,
        },
    )
    .await
    .expect("Failed to create user")
}

pub async fn create_actor(pool: &PgPool, prefix: &str) -> Actor {
    Actor::user(create_user(pool, prefix).await.id)
}

pub async fn create_test_project(pool: &PgPool, author: &Actor, name: &str) -> Project {
    create_project(
        pool,
        author,
        CreateProjectInput {
            name: name.to_string(),
            description: None,
            project_type: ProjectType::Backend,
        },
    )
    .await
    .expect("Failed to create project")
}
