/// Authentication endpoints
///
/// - `POST /v1/auth/register`: create an account
/// - `POST /v1/auth/login`: exchange credentials for a token pair
/// - `POST /v1/auth/refresh`: exchange a refresh token for a new access token
///
/// Registration returns the new user, not tokens; clients log in afterwards.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use softdesk_shared::{
    auth::jwt::{self, TokenPair},
    models::user::User,
    tracker::users::{self, RegisterUser},
};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,

    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,

    pub token_type: &'static str,

    /// Seconds
    pub expires_in: i64,
}

/// # Errors
///
/// - `422` for a bad username, weak password or age below 15
/// - `409` if the username is taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = users::register(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// # Errors
///
/// - `401` for an unknown username or wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let user = users::authenticate(&state.db, &req.username, &req.password).await?;

    let tokens = jwt::issue_token_pair(user.id, state.jwt_secret(), &state.config.jwt.lifetimes())?;

    info!(user_id = %user.id, "Tokens issued");

    Ok(Json(tokens))
}

/// # Errors
///
/// - `401` for an invalid or expired refresh token, an access token, or a
///   token whose user has since been deleted
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let lifetimes = state.config.jwt.lifetimes();

    let (user_id, access_token) =
        jwt::refresh_access_token(&req.refresh_token, state.jwt_secret(), lifetimes.access)?;

    if !User::exists(&state.db, user_id).await? {
        return Err(ApiError::AuthenticationFailed(
            "User no longer exists".to_string(),
        ));
    }

    info!(user_id = %user_id, "Access token refreshed");

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer",
        expires_in: lifetimes.access.num_seconds(),
    }))
}
