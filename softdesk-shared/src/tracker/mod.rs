/// Actor-threaded tracker operations
///
/// Each operation takes the acting [`Actor`](crate::auth::policy::Actor)
/// explicitly, consults the access policy, validates input and performs the
/// write. These are the only functions the HTTP layer calls for domain work.
///
/// # Modules
///
/// - [`users`]: registration, credential checks, account management
/// - [`projects`]: project registry
/// - [`contributors`]: membership ledger
/// - [`issues`]: issue tracker
/// - [`comments`]: comment log

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::db::{is_unique_violation, violated_constraint};
use crate::error::DomainError;

pub mod comments;
pub mod contributors;
pub mod issues;
pub mod projects;
pub mod users;

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Limit/offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Page {
    /// Builds a page from optional query values, clamping out-of-range input
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// Maps a unique violation to `Conflict`, anything else to `Database`
pub(crate) fn conflict_on_duplicate(err: sqlx::Error, message: &str) -> DomainError {
    if is_unique_violation(&err) {
        debug!(constraint = ?violated_constraint(&err), "Unique constraint violated");
        DomainError::Conflict(message.to_string())
    } else {
        DomainError::Database(err)
    }
}

/// Deserializes a field that distinguishes "absent" from "null"
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: an absent
/// field stays `None`, an explicit `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
