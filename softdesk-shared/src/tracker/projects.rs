/// Project registry operations

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{double_option, Page};
use crate::auth::authorization::{authorize, load_project, AuthzError};
use crate::auth::policy::{Actor, Operation};
use crate::error::DomainResult;
use crate::models::project::{CreateProject, Project, ProjectType, UpdateProject};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectInput {
    #[validate(length(min = 3, max = 255, message = "Name must be 3-255 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub project_type: ProjectType,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProjectInput {
    #[validate(length(min = 3, max = 255, message = "Name must be 3-255 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
}

/// Creates a project owned by the actor
///
/// The actor's author membership is written in the same transaction.
pub async fn create_project(
    pool: &PgPool,
    actor: &Actor,
    input: CreateProjectInput,
) -> DomainResult<Project> {
    input.validate()?;

    let (project, membership) = Project::create_with_author(
        pool,
        actor.user_id,
        CreateProject {
            name: input.name,
            description: input.description,
            project_type: input.project_type,
        },
    )
    .await?;

    info!(
        project_id = %project.id,
        author_id = %project.author_id,
        membership_id = %membership.id,
        "Project created"
    );

    Ok(project)
}

/// Projects where the actor is author or contributor
pub async fn list_projects(pool: &PgPool, actor: &Actor, page: Page) -> DomainResult<Vec<Project>> {
    let projects = Project::list_for_member(pool, actor.user_id, page.limit, page.offset).await?;
    debug!(actor = %actor.user_id, count = projects.len(), "Projects listed");
    Ok(projects)
}

pub async fn get_project(pool: &PgPool, actor: &Actor, project_id: Uuid) -> DomainResult<Project> {
    let (project, scope) = load_project(pool, actor, project_id).await?;
    authorize(&scope, actor, Operation::Retrieve)?;
    Ok(project)
}

/// Author only; the author itself cannot change
pub async fn update_project(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    input: UpdateProjectInput,
) -> DomainResult<Project> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&scope, actor, Operation::Update)?;
    input.validate()?;

    let project = Project::update(
        pool,
        project_id,
        UpdateProject {
            name: input.name,
            description: input.description,
            project_type: input.project_type,
        },
    )
    .await?
    .ok_or_else(|| AuthzError::not_found("Project"))?;

    info!(project_id = %project.id, actor = %actor.user_id, "Project updated");

    Ok(project)
}

/// Author only; memberships, issues and comments go with it
pub async fn delete_project(pool: &PgPool, actor: &Actor, project_id: Uuid) -> DomainResult<()> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&scope, actor, Operation::Delete)?;

    if !Project::delete(pool, project_id).await? {
        return Err(AuthzError::not_found("Project").into());
    }

    info!(project_id = %project_id, actor = %actor.user_id, "Project deleted");

    Ok(())
}
