/// Domain error taxonomy
///
/// Every tracker operation returns `DomainResult<T>`. Each variant carries a
/// human-readable message and maps to a stable, machine-checkable
/// [`ErrorKind`]. The API layer translates kinds into HTTP statuses; nothing
/// here is retried or swallowed.

use serde::{Deserialize, Serialize};

use crate::auth::authorization::AuthzError;
use crate::auth::password::PasswordError;

/// Result alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// A single invalid input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field that failed validation
    pub field: String,

    /// Why it failed
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Machine-checkable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    AuthenticationFailed,
    PermissionDenied,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::AuthenticationFailed => "authentication_failed",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal_error",
        }
    }
}

/// Errors raised by tracker operations
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Input is malformed or semantically invalid
    #[error("Validation failed: {}", describe_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// Bad or missing credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Authenticated, but not allowed to perform this mutation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource absent, or hidden from the actor
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Hashing failure
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl DomainError {
    /// Single-field validation error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation(vec![FieldViolation::new(field, message)])
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
            DomainError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::Database(_) | DomainError::Password(_) => ErrorKind::Internal,
        }
    }
}

fn describe_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldViolation::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Invalid value".to_string()),
                    )
                })
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        DomainError::Validation(violations)
    }
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::PermissionDenied(reason) => DomainError::PermissionDenied(reason),
            AuthzError::NotFound(what) => DomainError::NotFound(what),
            AuthzError::Database(err) => DomainError::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(range(min = 15, message = "too young"))]
        age: i32,
    }

    #[test]
    fn test_kind_strings() {
        assert_eq!(ErrorKind::Validation.as_str(), "validation_error");
        assert_eq!(ErrorKind::PermissionDenied.as_str(), "permission_denied");
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::Conflict.as_str(), "conflict");
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            DomainError::invalid("assignee", "x").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            DomainError::PermissionDenied("x".into()).kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            DomainError::Database(sqlx::Error::RowNotFound).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_from_validation_errors_collects_fields() {
        let probe = Probe {
            name: "ab".to_string(),
            age: 14,
        };
        let err = DomainError::from(probe.validate().unwrap_err());

        match err {
            DomainError::Validation(violations) => {
                assert_eq!(violations.len(), 2);
                assert_eq!(violations[0], FieldViolation::new("age", "too young"));
                assert_eq!(violations[1], FieldViolation::new("name", "too short"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display_lists_violations() {
        let err = DomainError::invalid("age", "must be at least 15");
        assert_eq!(err.to_string(), "Validation failed: age: must be at least 15");
    }

    #[test]
    fn test_from_authz_error() {
        let err: DomainError = AuthzError::NotFound("Project not found".into()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: DomainError = AuthzError::PermissionDenied("nope".into()).into();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }
}
