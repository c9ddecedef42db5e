/// Issue tracker operations
///
/// Any member of a project may create, edit and delete its issues. An
/// assignee must be a member too: the membership row is share-locked inside
/// the write transaction, so a concurrent removal either waits and then
/// clears the new assignment, or wins and makes the assignment fail.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{double_option, Page};
use crate::auth::authorization::{authorize, load_project, AuthzError};
use crate::auth::policy::{Actor, IssueScope, Operation};
use crate::error::{DomainError, DomainResult};
use crate::models::contributor::Contributor;
use crate::models::issue::{
    CreateIssue, Issue, IssueFilters, IssuePriority, IssueStatus, IssueTag, UpdateIssue,
};

const ASSIGNEE_NOT_MEMBER: &str = "assignee must be a contributor of this project";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIssueInput {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: IssuePriority,

    #[serde(default)]
    pub tag: IssueTag,

    #[serde(default)]
    pub status: IssueStatus,

    #[serde(default, alias = "assignee_id")]
    pub assignee: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateIssueInput {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub priority: Option<IssuePriority>,

    pub tag: Option<IssueTag>,

    pub status: Option<IssueStatus>,

    /// `null` unassigns
    #[serde(default, alias = "assignee_id", deserialize_with = "double_option")]
    pub assignee: Option<Option<Uuid>>,
}

/// Creates an issue authored by the actor
///
/// # Errors
///
/// - `NotFound` if the project doesn't exist
/// - `PermissionDenied` if the actor isn't a member
/// - `Validation` for bad fields or a non-member assignee
pub async fn create_issue(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    input: CreateIssueInput,
) -> DomainResult<Issue> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&IssueScope(scope), actor, Operation::Create)?;
    input.validate()?;

    let mut tx = pool.begin().await?;

    if let Some(assignee) = input.assignee {
        if !Contributor::lock_membership(&mut *tx, project_id, assignee).await? {
            return Err(DomainError::invalid("assignee", ASSIGNEE_NOT_MEMBER));
        }
    }

    let issue = Issue::create(
        &mut *tx,
        CreateIssue {
            project_id,
            author_id: actor.user_id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            tag: input.tag,
            status: input.status,
            assignee_id: input.assignee,
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        issue_id = %issue.id,
        project_id = %project_id,
        author_id = %actor.user_id,
        assignee_id = ?issue.assignee_id,
        "Issue created"
    );

    Ok(issue)
}

/// Updates an issue; project and author never change
///
/// Status may move between any two values. The assignee is re-checked only
/// when the input sets a new one.
pub async fn update_issue(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
    input: UpdateIssueInput,
) -> DomainResult<Issue> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&IssueScope(scope), actor, Operation::Update)?;

    let current = Issue::find_in_project(pool, project_id, issue_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Issue"))?;

    input.validate()?;

    let mut tx = pool.begin().await?;

    if let Some(Some(assignee)) = input.assignee {
        if !Contributor::lock_membership(&mut *tx, project_id, assignee).await? {
            return Err(DomainError::invalid("assignee", ASSIGNEE_NOT_MEMBER));
        }
    }

    let issue = Issue::update(
        &mut *tx,
        current.id,
        UpdateIssue {
            title: input.title,
            description: input.description,
            priority: input.priority,
            tag: input.tag,
            status: input.status,
            assignee_id: input.assignee,
        },
    )
    .await?
    .ok_or_else(|| AuthzError::not_found("Issue"))?;

    tx.commit().await?;

    info!(
        issue_id = %issue.id,
        actor = %actor.user_id,
        status = issue.status.as_str(),
        "Issue updated"
    );

    Ok(issue)
}

pub async fn delete_issue(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
) -> DomainResult<()> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&IssueScope(scope), actor, Operation::Delete)?;

    Issue::find_in_project(pool, project_id, issue_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Issue"))?;

    Issue::delete(pool, issue_id).await?;

    info!(issue_id = %issue_id, actor = %actor.user_id, "Issue deleted");

    Ok(())
}

/// Fetches an issue through its project
///
/// `NotFound` unless the project is visible and contains the issue.
pub async fn get_issue(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
) -> DomainResult<Issue> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&IssueScope(scope), actor, Operation::Retrieve)?;

    Issue::find_in_project(pool, project_id, issue_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Issue").into())
}

/// Issues across every project the actor belongs to
pub async fn list_issues(
    pool: &PgPool,
    actor: &Actor,
    filters: &IssueFilters,
    page: Page,
) -> DomainResult<Vec<Issue>> {
    let issues = Issue::list_visible(pool, actor.user_id, filters, page.limit, page.offset).await?;
    debug!(actor = %actor.user_id, count = issues.len(), "Issues listed");
    Ok(issues)
}

pub async fn list_project_issues(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    filters: &IssueFilters,
    page: Page,
) -> DomainResult<Vec<Issue>> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&IssueScope(scope), actor, Operation::List)?;

    let issues =
        Issue::list_by_project(pool, project_id, filters, page.limit, page.offset).await?;
    debug!(project_id = %project_id, count = issues.len(), "Project issues listed");

    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_defaults() {
        let input: CreateIssueInput = serde_json::from_str(r#"{"title": "Crash"}"#).unwrap();
        assert_eq!(input.priority, IssuePriority::Low);
        assert_eq!(input.tag, IssueTag::Task);
        assert_eq!(input.status, IssueStatus::Todo);
        assert!(input.assignee.is_none());
    }

    #[test]
    fn test_empty_title_rejected() {
        let input: CreateIssueInput = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_update_assignee_null_unassigns() {
        let input: UpdateIssueInput = serde_json::from_str(r#"{"assignee": null}"#).unwrap();
        assert_eq!(input.assignee, Some(None));

        let input: UpdateIssueInput =
            serde_json::from_str(r#"{"status": "in_progress"}"#).unwrap();
        assert_eq!(input.assignee, None);
        assert_eq!(input.status, Some(IssueStatus::InProgress));
    }
}
