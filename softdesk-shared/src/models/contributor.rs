/// Contributor model: the project membership ledger
///
/// A contributor row binds a user to a project with a role. It is the single
/// source of truth for project visibility, issue assignment eligibility and
/// comment eligibility.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE contributor_role AS ENUM ('author', 'contributor');
///
/// CREATE TABLE contributors (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     role contributor_role NOT NULL DEFAULT 'contributor',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT unique_contributor UNIQUE (user_id, project_id)
/// );
///
/// CREATE UNIQUE INDEX contributors_one_author_per_project
///     ON contributors(project_id) WHERE role = 'author';
/// ```
///
/// # Roles
///
/// - **author**: the founding row created together with the project
/// - **contributor**: every membership added afterwards
///
/// Uniqueness of (user, project) is enforced by the `unique_contributor`
/// constraint, so two concurrent inserts for the same pair cannot both
/// succeed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

/// Name of the (user, project) uniqueness constraint
pub const UNIQUE_CONTRIBUTOR_CONSTRAINT: &str = "unique_contributor";

/// Role of a user within a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contributor_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContributorRole {
    /// Founding membership of the project's author
    Author,

    /// Member added by the author
    Contributor,
}

impl ContributorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributorRole::Author => "author",
            ContributorRole::Contributor => "contributor",
        }
    }

    /// Only the author may manage the project and its membership
    pub fn can_manage_project(&self) -> bool {
        matches!(self, ContributorRole::Author)
    }
}

impl Default for ContributorRole {
    fn default() -> Self {
        ContributorRole::Contributor
    }
}

/// A membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contributor {
    pub id: Uuid,

    pub user_id: Uuid,

    pub project_id: Uuid,

    pub role: ContributorRole,

    pub created_at: DateTime<Utc>,
}

/// Input for inserting a membership
#[derive(Debug, Clone)]
pub struct CreateContributor {
    pub user_id: Uuid,

    pub project_id: Uuid,

    pub role: ContributorRole,
}

impl Contributor {
    /// Inserts a membership row
    ///
    /// Generic over the executor so project creation can run it inside the
    /// same transaction as the project insert.
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `unique_contributor` if the user is
    /// already a member, or on `contributors_one_author_per_project` for a
    /// second author row.
    pub async fn insert<'e, E>(executor: E, data: CreateContributor) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Contributor>(
            r#"
            INSERT INTO contributors (user_id, project_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, project_id, role, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.role)
        .fetch_one(executor)
        .await
    }

    /// Finds a membership by ID, scoped to its project
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contributor>(
            r#"
            SELECT id, user_id, project_id, role, created_at
            FROM contributors
            WHERE id = $1 AND project_id = $2
            "#,
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(pool)
        .await
    }

    /// Finds the membership of a user in a project
    ///
    /// Not used by the tracker operations, which go through `get_role` and
    /// `lock_membership`; kept for checking the membership ledger from tests
    /// and tooling.
    pub async fn find(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contributor>(
            r#"
            SELECT id, user_id, project_id, role, created_at
            FROM contributors
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Whether the user holds any membership on the project
    pub async fn is_member<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM contributors
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// The user's role in the project, if any
    pub async fn get_role(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ContributorRole>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT role FROM contributors
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Checks membership and holds a share lock on the row until commit
    ///
    /// Used when assigning an issue so a concurrent removal of the same
    /// membership waits for the assignment to commit (and then clears it).
    pub async fn lock_membership(
        conn: &mut PgConnection,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM contributors
            WHERE project_id = $1 AND user_id = $2
            FOR SHARE
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(row.is_some())
    }

    /// Deletes a membership; returns false if it didn't exist
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM contributors WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the members of a project, founding author first
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contributor>(
            r#"
            SELECT id, user_id, project_id, role, created_at
            FROM contributors
            WHERE project_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts rows with the given role in a project
    ///
    /// Used to check the one-author-per-project invariant; no request path
    /// calls it.
    pub async fn count_by_role(
        pool: &PgPool,
        project_id: Uuid,
        role: ContributorRole,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM contributors WHERE project_id = $1 AND role = $2",
        )
        .bind(project_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contributor_role_as_str() {
        assert_eq!(ContributorRole::Author.as_str(), "author");
        assert_eq!(ContributorRole::Contributor.as_str(), "contributor");
    }

    #[test]
    fn test_default_role_is_contributor() {
        assert_eq!(ContributorRole::default(), ContributorRole::Contributor);
    }

    #[test]
    fn test_only_author_manages_project() {
        assert!(ContributorRole::Author.can_manage_project());
        assert!(!ContributorRole::Contributor.can_manage_project());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&ContributorRole::Contributor).unwrap();
        assert_eq!(json, "\"contributor\"");

        let role: ContributorRole = serde_json::from_str("\"author\"").unwrap();
        assert_eq!(role, ContributorRole::Author);
    }
}
