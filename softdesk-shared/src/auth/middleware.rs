/// Request authentication
///
/// Validates `Authorization: Bearer <token>` access tokens and resolves them
/// to an [`AuthContext`]. The user row is re-read on every request so a
/// deleted account loses access at once and the administrator flag is always
/// current.
///
/// The router installs [`authenticate`] in a `from_fn_with_state` layer and
/// puts the resulting context into the request extensions. Handlers take the
/// context as an extractor:
///
/// ```no_run
/// use softdesk_shared::auth::middleware::AuthContext;
///
/// async fn whoami(auth: AuthContext) -> String {
///     format!("{} ({})", auth.username, auth.user_id)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use super::policy::Actor;
use crate::models::user::User;

/// Authenticated identity attached to a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,

    pub username: String,

    pub is_admin: bool,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }

    /// The policy actor for this request
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            is_admin: self.is_admin,
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,

    InvalidFormat(String),

    InvalidToken(String),

    /// Token is valid but its user no longer exists
    UnknownUser,

    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "authentication_failed",
                "Missing credentials".to_string(),
            ),
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => {
                (StatusCode::UNAUTHORIZED, "authentication_failed", msg)
            }
            AuthError::UnknownUser => (
                StatusCode::UNAUTHORIZED,
                "authentication_failed",
                "User no longer exists".to_string(),
            ),
            AuthError::DatabaseError(msg) => {
                error!(error = %msg, "Authentication lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Validates the bearer token and loads its user
///
/// # Errors
///
/// - `MissingCredentials` / `InvalidFormat` for a missing or malformed header
/// - `InvalidToken` for a bad, expired or refresh token
/// - `UnknownUser` if the user was deleted after the token was issued
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
    })?;

    let user = User::find_by_id(pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    debug!(user_id = %user.id, "Request authenticated");

    Ok(AuthContext::from_user(&user))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}
