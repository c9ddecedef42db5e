/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_type AS ENUM ('backend', 'frontend', 'ios', 'android');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     project_type project_type NOT NULL,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// A project is never visible without its founding author membership:
/// [`Project::create_with_author`] writes both rows in one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::contributor::{Contributor, ContributorRole, CreateContributor};

const PROJECT_COLUMNS: &str =
    "p.id, p.name, p.description, p.project_type, p.author_id, p.created_at, p.updated_at";

/// Platform a project targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Backend,
    Frontend,
    Ios,
    Android,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Backend => "backend",
            ProjectType::Frontend => "frontend",
            ProjectType::Ios => "ios",
            ProjectType::Android => "android",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    pub name: String,

    pub description: Option<String>,

    #[serde(rename = "type")]
    pub project_type: ProjectType,

    /// Owning user; fixed at creation
    pub author_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project; the author comes from the acting user
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,

    pub description: Option<String>,

    pub project_type: ProjectType,
}

/// Input for updating a project
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,

    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,

    pub project_type: Option<ProjectType>,
}

impl Project {
    /// Creates a project and its founding author membership atomically
    ///
    /// Both inserts share one transaction; if the membership insert fails the
    /// project row is rolled back.
    pub async fn create_with_author(
        pool: &PgPool,
        author_id: Uuid,
        data: CreateProject,
    ) -> Result<(Self, Contributor), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects AS p (name, description, project_type, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING p.id, p.name, p.description, p.project_type, p.author_id,
                      p.created_at, p.updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.project_type)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;

        let membership = Contributor::insert(
            &mut *tx,
            CreateContributor {
                user_id: author_id,
                project_id: project.id,
                role: ContributorRole::Author,
            },
        )
        .await?;

        tx.commit().await?;

        Ok((project, membership))
    }

    /// Finds a project by ID, regardless of who is asking
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = $1");

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists projects the user is a member of (author rows included)
    pub async fn list_for_member(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p \
             JOIN contributors c ON c.project_id = p.id AND c.user_id = $1 \
             ORDER BY p.created_at ASC, p.id ASC \
             LIMIT $2 OFFSET $3"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Updates the `Some` fields of `data`; `None` if the project is gone
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects AS p SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.project_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(", project_type = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE p.id = $1 RETURNING {PROJECT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(project_type) = data.project_type {
            q = q.bind(project_type);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a project; memberships, issues and comments cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
