/// Issue model and database operations
///
/// Issues belong to exactly one project for their whole life. The optional
/// assignee must hold a membership on that project; the model layer does not
/// check this itself. Callers assign inside a transaction after
/// [`Contributor::lock_membership`](super::contributor::Contributor::lock_membership).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE issues (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     priority issue_priority NOT NULL DEFAULT 'low',
///     tag issue_tag NOT NULL DEFAULT 'task',
///     status issue_status NOT NULL DEFAULT 'todo',
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const ISSUE_COLUMNS: &str = "i.id, i.title, i.description, i.priority, i.tag, i.status, \
                             i.project_id, i.author_id, i.assignee_id, i.created_at, i.updated_at";

// Each filter is bound as a nullable parameter: NULL disables it.
const FILTER_CLAUSE: &str = "($2::issue_status IS NULL OR i.status = $2) \
                             AND ($3::issue_priority IS NULL OR i.priority = $3) \
                             AND ($4::issue_tag IS NULL OR i.tag = $4) \
                             AND ($5::uuid IS NULL OR i.assignee_id = $5)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_tag", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssueTag {
    Bug,
    Feature,
    #[default]
    Task,
}

/// Workflow status; any status may move to any other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Todo,
    InProgress,
    Finished,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Todo => "todo",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Issue {
    pub id: Uuid,

    pub title: String,

    pub description: Option<String>,

    pub priority: IssuePriority,

    pub tag: IssueTag,

    pub status: IssueStatus,

    pub project_id: Uuid,

    pub author_id: Uuid,

    /// Member of `project_id`, or nobody
    pub assignee_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateIssue {
    pub project_id: Uuid,

    pub author_id: Uuid,

    pub title: String,

    pub description: Option<String>,

    pub priority: IssuePriority,

    pub tag: IssueTag,

    pub status: IssueStatus,

    pub assignee_id: Option<Uuid>,
}

/// Input for updating an issue; project and author are immutable
#[derive(Debug, Clone, Default)]
pub struct UpdateIssue {
    pub title: Option<String>,

    pub description: Option<Option<String>>,

    pub priority: Option<IssuePriority>,

    pub tag: Option<IssueTag>,

    pub status: Option<IssueStatus>,

    /// `Some(None)` unassigns
    pub assignee_id: Option<Option<Uuid>>,
}

/// Optional listing filters, combined with AND
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFilters {
    pub status: Option<IssueStatus>,

    pub priority: Option<IssuePriority>,

    pub tag: Option<IssueTag>,

    #[serde(alias = "assignee")]
    pub assignee_id: Option<Uuid>,
}

impl Issue {
    pub async fn create<'e, E>(executor: E, data: CreateIssue) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO issues AS i \
             (title, description, priority, tag, status, project_id, author_id, assignee_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ISSUE_COLUMNS}"
        );

        sqlx::query_as::<_, Issue>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(data.priority)
            .bind(data.tag)
            .bind(data.status)
            .bind(data.project_id)
            .bind(data.author_id)
            .bind(data.assignee_id)
            .fetch_one(executor)
            .await
    }

    /// Finds an issue only if it belongs to `project_id`
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query =
            format!("SELECT {ISSUE_COLUMNS} FROM issues i WHERE i.id = $1 AND i.project_id = $2");

        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Updates the `Some` fields of `data`
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateIssue,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("UPDATE issues AS i SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.tag.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tag = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE i.id = $1 RETURNING {ISSUE_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Issue>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(tag) = data.tag {
            q = q.bind(tag);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(assignee_id) = data.assignee_id {
            q = q.bind(assignee_id);
        }

        q.fetch_optional(executor).await
    }

    /// Lists issues across every project the user is a member of
    ///
    /// The membership join is part of the statement, so filters and
    /// pagination only ever narrow an already-visible set.
    pub async fn list_visible(
        pool: &PgPool,
        user_id: Uuid,
        filters: &IssueFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {ISSUE_COLUMNS} FROM issues i \
             JOIN contributors c ON c.project_id = i.project_id AND c.user_id = $1 \
             WHERE {FILTER_CLAUSE} \
             ORDER BY i.created_at ASC, i.id ASC \
             LIMIT $6 OFFSET $7"
        );

        sqlx::query_as::<_, Issue>(&query)
            .bind(user_id)
            .bind(filters.status)
            .bind(filters.priority)
            .bind(filters.tag)
            .bind(filters.assignee_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Lists issues of one project; visibility is the caller's concern
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
        filters: &IssueFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {ISSUE_COLUMNS} FROM issues i \
             WHERE i.project_id = $1 AND {FILTER_CLAUSE} \
             ORDER BY i.created_at ASC, i.id ASC \
             LIMIT $6 OFFSET $7"
        );

        sqlx::query_as::<_, Issue>(&query)
            .bind(project_id)
            .bind(filters.status)
            .bind(filters.priority)
            .bind(filters.tag)
            .bind(filters.assignee_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Unassigns `user_id` from every issue of the project
    ///
    /// Returns the number of issues touched.
    pub async fn clear_assignee_in_project<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE issues
            SET assignee_id = NULL, updated_at = NOW()
            WHERE project_id = $1 AND assignee_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes an issue and its comments
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(IssuePriority::default(), IssuePriority::Low);
        assert_eq!(IssueTag::default(), IssueTag::Task);
        assert_eq!(IssueStatus::default(), IssueStatus::Todo);
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&IssueStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: IssueStatus = serde_json::from_str("\"finished\"").unwrap();
        assert_eq!(status, IssueStatus::Finished);
        assert_eq!(IssueStatus::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn test_filters_accept_assignee_alias() {
        let id = Uuid::new_v4();
        let filters: IssueFilters =
            serde_json::from_value(serde_json::json!({ "assignee": id, "tag": "bug" })).unwrap();
        assert_eq!(filters.assignee_id, Some(id));
        assert_eq!(filters.tag, Some(IssueTag::Bug));
        assert!(filters.status.is_none());
    }
}
