/// Comment endpoints
///
/// - `GET|POST /v1/projects/:project_id/issues/:issue_id/comments` (the listing
///   is never paginated)
/// - `GET|PATCH|DELETE /v1/projects/:project_id/issues/:issue_id/comments/:comment_id`

use crate::{app::AppState, error::ApiResult, extract::{ApiJson, ApiPath}};
use axum::{extract::State, http::StatusCode, Json};
use softdesk_shared::{
    auth::middleware::AuthContext,
    models::comment::Comment,
    tracker::comments::{self, CommentInput},
};
use uuid::Uuid;

pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, issue_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<Comment>>> {
    let list = comments::list_comments(&state.db, &auth.actor(), project_id, issue_id).await?;
    Ok(Json(list))
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, issue_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<CommentInput>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment =
        comments::create_comment(&state.db, &auth.actor(), project_id, issue_id, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, issue_id, comment_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<Comment>> {
    let comment =
        comments::get_comment(&state.db, &auth.actor(), project_id, issue_id, comment_id).await?;
    Ok(Json(comment))
}

/// Writer only
pub async fn update_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, issue_id, comment_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    ApiJson(input): ApiJson<CommentInput>,
) -> ApiResult<Json<Comment>> {
    let comment = comments::update_comment(
        &state.db,
        &auth.actor(),
        project_id,
        issue_id,
        comment_id,
        input,
    )
    .await?;
    Ok(Json(comment))
}

/// Writer only
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, issue_id, comment_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    comments::delete_comment(&state.db, &auth.actor(), project_id, issue_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
