/// Access control policy
///
/// Every access decision goes through [`AccessPolicy::decide`], evaluated per
/// (actor, resource instance, operation). Guards are plain values describing
/// the resource as seen by the actor (its project, the actor's role there,
/// the comment's author). Loading them is the job of
/// [`authorization`](super::authorization); deciding is pure and synchronous.
///
/// # Rules
///
/// | Resource   | SAFE (list, retrieve)     | UNSAFE (create, update, delete)       |
/// |------------|---------------------------|---------------------------------------|
/// | Project    | member or author          | author                                |
/// | Membership | member of the project     | project author                        |
/// | Issue      | member of the project     | member of the project                 |
/// | Comment    | member of the project     | create: member; update/delete: writer |
/// | User       | self or administrator     | self or administrator                 |
///
/// A denied UNSAFE operation surfaces as `PermissionDenied`. A denied SAFE
/// operation on a single resource surfaces as `NotFound`, and listings omit
/// what the actor cannot see.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::contributor::ContributorRole;

/// The identity on whose behalf an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,

    /// Read from the database on every request, never from the token
    pub is_admin: bool,
}

impl Actor {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Project,
    Membership,
    Issue,
    Comment,
}

impl ResourceKind {
    /// Human-readable name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::User => "User",
            ResourceKind::Project => "Project",
            ResourceKind::Membership => "Contributor",
            ResourceKind::Issue => "Issue",
            ResourceKind::Comment => "Comment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

/// SAFE operations only read; UNSAFE ones write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationClass {
    Safe,
    Unsafe,
}

impl Operation {
    pub fn class(&self) -> OperationClass {
        match self {
            Operation::List | Operation::Retrieve => OperationClass::Safe,
            Operation::Create | Operation::Update | Operation::Delete => OperationClass::Unsafe,
        }
    }

    pub fn is_safe(&self) -> bool {
        self.class() == OperationClass::Safe
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Retrieve => "retrieve",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn allow_if(condition: bool, reason: &str) -> Self {
        if condition {
            Decision::Allow
        } else {
            Decision::deny(reason)
        }
    }
}

/// Per-entity access guard
pub trait AccessPolicy {
    /// Resource kind this guard protects
    const KIND: ResourceKind;

    fn decide(&self, actor: &Actor, operation: Operation) -> Decision;
}

/// A project as seen by one actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectScope {
    pub project_id: Uuid,

    pub author_id: Uuid,

    /// The actor's membership role, if any
    pub actor_role: Option<ContributorRole>,
}

impl ProjectScope {
    pub fn is_member(&self) -> bool {
        self.actor_role.is_some()
    }

    pub fn is_author(&self, actor: &Actor) -> bool {
        self.author_id == actor.user_id
    }

    /// Whether the actor's membership row carries the author role
    pub fn can_manage(&self) -> bool {
        self.actor_role.is_some_and(|role| role.can_manage_project())
    }
}

impl AccessPolicy for ProjectScope {
    const KIND: ResourceKind = ResourceKind::Project;

    fn decide(&self, actor: &Actor, operation: Operation) -> Decision {
        match operation.class() {
            OperationClass::Safe => Decision::allow_if(
                self.is_member() || self.is_author(actor),
                "You are not a contributor of this project",
            ),
            OperationClass::Unsafe => Decision::allow_if(
                self.is_author(actor),
                "Only the project author can modify this project",
            ),
        }
    }
}

/// Guard for the membership rows of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipScope(pub ProjectScope);

impl AccessPolicy for MembershipScope {
    const KIND: ResourceKind = ResourceKind::Membership;

    fn decide(&self, _actor: &Actor, operation: Operation) -> Decision {
        let project = &self.0;
        match operation.class() {
            OperationClass::Safe => Decision::allow_if(
                project.is_member(),
                "You are not a contributor of this project",
            ),
            OperationClass::Unsafe => Decision::allow_if(
                project.can_manage(),
                "Only the project author can manage contributors",
            ),
        }
    }
}

/// Guard for the issues of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueScope(pub ProjectScope);

impl AccessPolicy for IssueScope {
    const KIND: ResourceKind = ResourceKind::Issue;

    fn decide(&self, _actor: &Actor, _operation: Operation) -> Decision {
        Decision::allow_if(
            self.0.is_member(),
            "Only contributors of this project can access its issues",
        )
    }
}

/// Guard for the comments of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentScope {
    pub project: ProjectScope,

    /// Writer of the targeted comment; `None` for collection-level operations
    pub comment_author_id: Option<Uuid>,
}

impl AccessPolicy for CommentScope {
    const KIND: ResourceKind = ResourceKind::Comment;

    fn decide(&self, actor: &Actor, operation: Operation) -> Decision {
        if !self.project.is_member() {
            return Decision::deny("Only contributors of this project can access its comments");
        }

        match operation {
            Operation::Update | Operation::Delete => Decision::allow_if(
                self.comment_author_id == Some(actor.user_id),
                "Only the author of a comment can modify it",
            ),
            _ => Decision::Allow,
        }
    }
}

/// Guard for a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: Uuid,
}

impl AccessPolicy for UserRecord {
    const KIND: ResourceKind = ResourceKind::User;

    fn decide(&self, actor: &Actor, _operation: Operation) -> Decision {
        Decision::allow_if(
            actor.is_admin || actor.user_id == self.user_id,
            "You can only manage your own account",
        )
    }
}
