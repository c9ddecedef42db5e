/// Error handling for the API server
///
/// Every handler returns [`ApiResult`]. Domain errors map onto HTTP statuses
/// one to one:
///
/// | Domain kind            | Status | `error` code            |
/// |------------------------|--------|-------------------------|
/// | Validation             | 422    | `validation_error`      |
/// | AuthenticationFailed   | 401    | `authentication_failed` |
/// | PermissionDenied       | 403    | `permission_denied`     |
/// | NotFound               | 404    | `not_found`             |
/// | Conflict               | 409    | `conflict`              |
/// | malformed request      | 400    | `bad_request`           |
/// | anything internal      | 500    | `internal_error`        |
///
/// Internal details are logged and never sent to the client.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use softdesk_shared::auth::jwt::JwtError;
use softdesk_shared::auth::password::PasswordError;
use softdesk_shared::error::{DomainError, FieldViolation};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 401
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// 403
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 409
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 422
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// 500
    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,

    pub message: String,
}

impl From<FieldViolation> for ValidationErrorDetail {
    fn from(v: FieldViolation) -> Self {
        Self {
            field: v.field,
            message: v.message,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable kind, e.g. `not_found`
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::AuthenticationFailed(_) => "authentication_failed",
            ApiError::PermissionDenied(_) => "permission_denied",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            ApiError::ValidationError(errors) => {
                ("Request validation failed".to_string(), Some(errors))
            }
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ("An internal error occurred".to_string(), None)
            }
            ApiError::BadRequest(msg)
            | ApiError::AuthenticationFailed(msg)
            | ApiError::PermissionDenied(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => (msg, None),
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(violations) => {
                ApiError::ValidationError(violations.into_iter().map(Into::into).collect())
            }
            DomainError::AuthenticationFailed(msg) => ApiError::AuthenticationFailed(msg),
            DomainError::PermissionDenied(msg) => ApiError::PermissionDenied(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Database(err) => ApiError::InternalError(format!("Database error: {}", err)),
            DomainError::Password(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::InternalError(format!("Database error: {}", err))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::Expired => ApiError::AuthenticationFailed("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::AuthenticationFailed("Invalid token issuer".to_string())
            }
            other => ApiError::AuthenticationFailed(format!("Invalid token: {}", other)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "age".to_string(),
            message: "too young".to_string(),
        }]);
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
    }

    #[test]
    fn test_domain_error_mapping() {
        let cases = [
            (DomainError::invalid("age", "x"), StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            (
                DomainError::AuthenticationFailed("x".into()),
                StatusCode::UNAUTHORIZED,
                "authentication_failed",
            ),
            (
                DomainError::PermissionDenied("x".into()),
                StatusCode::FORBIDDEN,
                "permission_denied",
            ),
            (DomainError::NotFound("x".into()), StatusCode::NOT_FOUND, "not_found"),
            (DomainError::Conflict("x".into()), StatusCode::CONFLICT, "conflict"),
            (
                DomainError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
        ];

        for (domain, status, code) in cases {
            let api = ApiError::from(domain);
            assert_eq!(api.status(), status);
            assert_eq!(api.code(), code);
        }
    }

    #[test]
    fn test_domain_and_api_codes_agree() {
        let domain = DomainError::Conflict("dup".into());
        let kind = domain.kind();
        assert_eq!(ApiError::from(domain).code(), kind.as_str());
    }

    #[tokio::test]
    async fn test_validation_body_has_details() {
        let err = ApiError::from(DomainError::invalid("assignee", "not a member"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"][0]["field"], "assignee");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::InternalError("connection refused on 10.0.0.3".into())
            .into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_jwt_error_mapping() {
        assert_eq!(ApiError::from(JwtError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(JwtError::CreateError("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
