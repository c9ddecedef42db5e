/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     content TEXT NOT NULL,
///     issue_id UUID NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,

    pub content: String,

    pub issue_id: Uuid,

    pub author_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub issue_id: Uuid,

    pub author_id: Uuid,

    pub content: String,
}

impl Comment {
    pub async fn create<'e, E>(executor: E, data: CreateComment) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (content, issue_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, content, issue_id, author_id, created_at, updated_at
            "#,
        )
        .bind(data.content)
        .bind(data.issue_id)
        .bind(data.author_id)
        .fetch_one(executor)
        .await
    }

    /// Finds a comment only if it belongs to `issue_id`
    pub async fn find_in_issue(
        pool: &PgPool,
        issue_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, content, issue_id, author_id, created_at, updated_at
            FROM comments
            WHERE id = $1 AND issue_id = $2
            "#,
        )
        .bind(id)
        .bind(issue_id)
        .fetch_optional(pool)
        .await
    }

    /// Every comment of an issue in creation order, ties broken by ID
    pub async fn list_by_issue(pool: &PgPool, issue_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, content, issue_id, author_id, created_at, updated_at
            FROM comments
            WHERE issue_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(issue_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update_content(
        pool: &PgPool,
        id: Uuid,
        content: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, content, issue_id, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
