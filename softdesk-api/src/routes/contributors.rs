/// Contributor (membership) endpoints
///
/// - `GET|POST /v1/projects/:project_id/contributors`
/// - `GET|DELETE /v1/projects/:project_id/contributors/:contributor_id`
///
/// Members may read the roster; only the project author adds or removes
/// contributors. Removing a contributor also unassigns them from every issue
/// in the project.

use crate::{app::AppState, error::ApiResult, extract::{ApiJson, ApiPath, ApiQuery}};
use axum::{extract::State, http::StatusCode, Json};
use softdesk_shared::{
    auth::middleware::AuthContext,
    models::contributor::Contributor,
    tracker::contributors::{self, AddContributorInput},
};
use uuid::Uuid;

use super::Pagination;

pub async fn list_contributors(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<Contributor>>> {
    let roster =
        contributors::list_memberships(&state.db, &auth.actor(), project_id, page.into()).await?;
    Ok(Json(roster))
}

/// # Errors
///
/// - `404` if the project is hidden from the caller
/// - `403` unless the caller is the project author
/// - `422` if the target user doesn't exist or `role` is `author`
/// - `409` if the user is already a contributor
pub async fn add_contributor(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<AddContributorInput>,
) -> ApiResult<(StatusCode, Json<Contributor>)> {
    let membership = contributors::add_membership(
        &state.db,
        &auth.actor(),
        project_id,
        input.user,
        input.role,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn get_contributor(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, contributor_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Contributor>> {
    let membership =
        contributors::get_membership(&state.db, &auth.actor(), project_id, contributor_id).await?;
    Ok(Json(membership))
}

pub async fn remove_contributor(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, contributor_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    contributors::remove_membership(&state.db, &auth.actor(), project_id, contributor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
