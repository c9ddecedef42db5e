/// Database models for SoftDesk
///
/// Row types and their CRUD operations. Nothing in here checks who is asking:
/// access decisions live in [`crate::auth::policy`] and the actor-threaded
/// operations in [`crate::tracker`].
///
/// # Models
///
/// - `user`: accounts, consent flags and the administrator flag
/// - `project`: projects, created together with their author membership
/// - `contributor`: the membership ledger
/// - `issue`: issues scoped to a project
/// - `comment`: comments scoped to an issue

pub mod comment;
pub mod contributor;
pub mod issue;
pub mod project;
pub mod user;
