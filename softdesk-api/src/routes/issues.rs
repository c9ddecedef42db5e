/// Issue endpoints
///
/// - `GET /v1/issues`: every issue in every project the caller contributes to
/// - `GET|POST /v1/projects/:project_id/issues`
/// - `GET|PATCH|DELETE /v1/projects/:project_id/issues/:issue_id`
///
/// Both listings accept `status`, `priority`, `tag` and `assignee` filters
/// alongside `limit`/`offset`.

use crate::{app::AppState, error::ApiResult, extract::{ApiJson, ApiPath, ApiQuery}};
use axum::{extract::State, http::StatusCode, Json};
use softdesk_shared::{
    auth::middleware::AuthContext,
    models::issue::{Issue, IssueFilters},
    tracker::issues::{self, CreateIssueInput, UpdateIssueInput},
};
use uuid::Uuid;

use super::Pagination;

pub async fn list_all_issues(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(filters): ApiQuery<IssueFilters>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Issue>>> {
    let issues = issues::list_issues(&state.db, &auth.actor(), &filters, page.into()).await?;
    Ok(Json(issues))
}

pub async fn list_project_issues(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiQuery(filters): ApiQuery<IssueFilters>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Issue>>> {
    let issues =
        issues::list_project_issues(&state.db, &auth.actor(), project_id, &filters, page.into())
            .await?;
    Ok(Json(issues))
}

/// # Errors
///
/// - `404` if the project is hidden from the caller
/// - `403` unless the caller is a contributor
/// - `422` if the assignee is not a contributor of the project
pub async fn create_issue(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CreateIssueInput>,
) -> ApiResult<(StatusCode, Json<Issue>)> {
    let issue = issues::create_issue(&state.db, &auth.actor(), project_id, input).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

pub async fn get_issue(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, issue_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Issue>> {
    let issue = issues::get_issue(&state.db, &auth.actor(), project_id, issue_id).await?;
    Ok(Json(issue))
}

/// `"assignee": null` unassigns; omitting the field leaves it alone
pub async fn update_issue(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, issue_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdateIssueInput>,
) -> ApiResult<Json<Issue>> {
    let issue =
        issues::update_issue(&state.db, &auth.actor(), project_id, issue_id, input).await?;
    Ok(Json(issue))
}

pub async fn delete_issue(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, issue_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    issues::delete_issue(&state.db, &auth.actor(), project_id, issue_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
