/// Comment log operations
///
/// Comments are reached through their project and issue. Members read and
/// write comments; only a comment's writer may edit or delete it.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorization::{authorize, load_project, AuthzError};
use crate::auth::policy::{Actor, CommentScope, Operation, ProjectScope};
use crate::error::{DomainError, DomainResult};
use crate::models::comment::{Comment, CreateComment};
use crate::models::contributor::Contributor;
use crate::models::issue::Issue;

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub content: String,
}

impl CommentInput {
    fn into_content(self) -> DomainResult<String> {
        if self.content.trim().is_empty() {
            return Err(DomainError::invalid("content", "Content must not be empty"));
        }
        Ok(self.content)
    }
}

/// Resolves the path parents: the project must exist and contain the issue
async fn load_issue(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
) -> DomainResult<(ProjectScope, Issue)> {
    let (_, scope) = load_project(pool, actor, project_id).await?;

    let issue = Issue::find_in_project(pool, project_id, issue_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Issue"))?;

    Ok((scope, issue))
}

fn collection_scope(project: ProjectScope) -> CommentScope {
    CommentScope {
        project,
        comment_author_id: None,
    }
}

/// Adds a comment written by the actor
///
/// # Errors
///
/// - `NotFound` if the project or issue doesn't exist
/// - `PermissionDenied` unless the actor is a member of the issue's project
/// - `Validation` for blank content
pub async fn create_comment(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
    input: CommentInput,
) -> DomainResult<Comment> {
    let (scope, issue) = load_issue(pool, actor, project_id, issue_id).await?;
    authorize(&collection_scope(scope), actor, Operation::Create)?;
    let content = input.into_content()?;

    let mut tx = pool.begin().await?;

    // Membership must still hold when the row is written
    if !Contributor::lock_membership(&mut *tx, project_id, actor.user_id).await? {
        return Err(DomainError::PermissionDenied(
            "Only contributors of this project can access its comments".to_string(),
        ));
    }

    let comment = Comment::create(
        &mut *tx,
        CreateComment {
            issue_id: issue.id,
            author_id: actor.user_id,
            content,
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        comment_id = %comment.id,
        issue_id = %issue.id,
        author_id = %actor.user_id,
        "Comment created"
    );

    Ok(comment)
}

/// All comments of an issue, oldest first
pub async fn list_comments(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
) -> DomainResult<Vec<Comment>> {
    let (scope, issue) = load_issue(pool, actor, project_id, issue_id).await?;
    authorize(&collection_scope(scope), actor, Operation::List)?;

    let comments = Comment::list_by_issue(pool, issue.id).await?;
    debug!(issue_id = %issue.id, count = comments.len(), "Comments listed");

    Ok(comments)
}

async fn load_comment(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
    comment_id: Uuid,
    operation: Operation,
) -> DomainResult<Comment> {
    let (scope, issue) = load_issue(pool, actor, project_id, issue_id).await?;

    let comment = Comment::find_in_issue(pool, issue.id, comment_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Comment"))?;

    let guard = CommentScope {
        project: scope,
        comment_author_id: Some(comment.author_id),
    };
    authorize(&guard, actor, operation)?;

    Ok(comment)
}

pub async fn get_comment(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
    comment_id: Uuid,
) -> DomainResult<Comment> {
    load_comment(pool, actor, project_id, issue_id, comment_id, Operation::Retrieve).await
}

/// Replaces the content; writer only
pub async fn update_comment(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
    comment_id: Uuid,
    input: CommentInput,
) -> DomainResult<Comment> {
    let comment =
        load_comment(pool, actor, project_id, issue_id, comment_id, Operation::Update).await?;
    let content = input.into_content()?;

    let comment = Comment::update_content(pool, comment.id, content)
        .await?
        .ok_or_else(|| AuthzError::not_found("Comment"))?;

    info!(comment_id = %comment.id, actor = %actor.user_id, "Comment updated");

    Ok(comment)
}

/// Writer only
pub async fn delete_comment(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    issue_id: Uuid,
    comment_id: Uuid,
) -> DomainResult<()> {
    let comment =
        load_comment(pool, actor, project_id, issue_id, comment_id, Operation::Delete).await?;

    Comment::delete(pool, comment.id).await?;

    info!(comment_id = %comment.id, actor = %actor.user_id, "Comment deleted");

    Ok(())
}
