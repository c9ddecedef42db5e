/// API route handlers, one module per resource
///
/// Handlers stay thin: extract, call the matching `softdesk_shared::tracker`
/// operation with the caller's actor, and wrap the result. All access
/// decisions live in the shared crate.

use serde::Deserialize;
use softdesk_shared::tracker::Page;

pub mod auth;
pub mod comments;
pub mod contributors;
pub mod health;
pub mod issues;
pub mod projects;
pub mod users;

/// `?limit=&offset=` on every listing
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<Pagination> for Page {
    fn from(p: Pagination) -> Self {
        Page::new(p.limit, p.offset)
    }
}
