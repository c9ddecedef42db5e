//! # SoftDesk Shared Library
//!
//! This crate contains the domain model, persistence, authentication and
//! authorization logic used by the SoftDesk API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models and their CRUD operations
//! - `auth`: Password hashing, JWT tokens, request identity and access policy
//! - `tracker`: Actor-scoped operations (projects, contributors, issues, comments, users)
//! - `error`: Domain error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod tracker;

/// Current version of the SoftDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
