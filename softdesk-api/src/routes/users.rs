/// User account endpoints
///
/// - `GET /v1/users`
/// - `GET|PATCH|DELETE /v1/users/:user_id`
///
/// Non-administrators only ever see and manage their own record.

use crate::{app::AppState, error::ApiResult, extract::{ApiJson, ApiPath, ApiQuery}};
use axum::{extract::State, http::StatusCode, Json};
use softdesk_shared::{
    auth::middleware::AuthContext,
    models::user::User,
    tracker::users::{self, UpdateUserInput},
};
use uuid::Uuid;

use super::Pagination;

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<User>>> {
    let users = users::list_users(&state.db, &auth.actor(), page.into()).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Json<User>> {
    let user = users::get_user(&state.db, &auth.actor(), user_id).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateUserInput>,
) -> ApiResult<Json<User>> {
    let user = users::update_user(&state.db, &auth.actor(), user_id, input).await?;
    Ok(Json(user))
}

/// Hard delete; the caller's tokens stop working on the next request
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    users::delete_user(&state.db, &auth.actor(), user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
