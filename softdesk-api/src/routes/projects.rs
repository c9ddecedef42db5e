/// Project endpoints
///
/// - `GET|POST /v1/projects`
/// - `GET|PATCH|DELETE /v1/projects/:project_id`
///
/// Listing returns only projects the caller contributes to. Creating a
/// project makes the caller its author and first contributor.

use crate::{app::AppState, error::ApiResult, extract::{ApiJson, ApiPath, ApiQuery}};
use axum::{extract::State, http::StatusCode, Json};
use softdesk_shared::{
    auth::middleware::AuthContext,
    models::project::Project,
    tracker::projects::{self, CreateProjectInput, UpdateProjectInput},
};
use uuid::Uuid;

use super::Pagination;

pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = projects::list_projects(&state.db, &auth.actor(), page.into()).await?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(input): ApiJson<CreateProjectInput>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = projects::create_project(&state.db, &auth.actor(), input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = projects::get_project(&state.db, &auth.actor(), project_id).await?;
    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateProjectInput>,
) -> ApiResult<Json<Project>> {
    let project = projects::update_project(&state.db, &auth.actor(), project_id, input).await?;
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    projects::delete_project(&state.db, &auth.actor(), project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
