/// Membership ledger operations
///
/// Only the project author adds or removes contributors. Removing a
/// contributor also unassigns them from the project's issues, in the same
/// transaction, so an issue never points at a non-member.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{conflict_on_duplicate, Page};
use crate::auth::authorization::{authorize, load_project, AuthzError};
use crate::auth::policy::{Actor, MembershipScope, Operation};
use crate::error::{DomainError, DomainResult};
use crate::models::contributor::{Contributor, ContributorRole, CreateContributor};
use crate::models::issue::Issue;
use crate::models::user::User;

const ALREADY_MEMBER: &str = "This user is already a contributor of this project";

#[derive(Debug, Clone, Deserialize)]
pub struct AddContributorInput {
    #[serde(alias = "user_id")]
    pub user: Uuid,

    #[serde(default)]
    pub role: Option<ContributorRole>,
}

/// Adds `target_user` to the project as a contributor
///
/// # Errors
///
/// - `NotFound` if the project doesn't exist
/// - `PermissionDenied` unless the actor is the project author
/// - `Validation` if the user doesn't exist or `role` is `author`
/// - `Conflict` if the user is already a member
pub async fn add_membership(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    target_user: Uuid,
    role: Option<ContributorRole>,
) -> DomainResult<Contributor> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&MembershipScope(scope), actor, Operation::Create)?;

    if role == Some(ContributorRole::Author) {
        return Err(DomainError::invalid(
            "role",
            "Only the project's founding membership can have the author role",
        ));
    }

    if !User::exists(pool, target_user).await? {
        return Err(DomainError::invalid("user", "User does not exist"));
    }

    let membership = Contributor::insert(
        pool,
        CreateContributor {
            user_id: target_user,
            project_id,
            role: ContributorRole::Contributor,
        },
    )
    .await
    .map_err(|e| conflict_on_duplicate(e, ALREADY_MEMBER))?;

    info!(
        project_id = %project_id,
        user_id = %target_user,
        membership_id = %membership.id,
        "Contributor added"
    );

    Ok(membership)
}

/// Removes a membership and clears the user's assignments on the project
///
/// # Errors
///
/// - `NotFound` if the membership isn't on this project
/// - `PermissionDenied` unless the actor is the project author
/// - `Validation` when targeting the author's founding membership
pub async fn remove_membership(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    membership_id: Uuid,
) -> DomainResult<()> {
    let (_, scope) = load_project(pool, actor, project_id).await?;

    let membership = Contributor::find_in_project(pool, project_id, membership_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Contributor"))?;

    authorize(&MembershipScope(scope), actor, Operation::Delete)?;

    if membership.role == ContributorRole::Author {
        return Err(DomainError::invalid(
            "contributor",
            "The project author cannot be removed from the project",
        ));
    }

    let mut tx = pool.begin().await?;

    if !Contributor::delete(&mut *tx, membership.id).await? {
        return Err(AuthzError::not_found("Contributor").into());
    }
    let unassigned =
        Issue::clear_assignee_in_project(&mut *tx, project_id, membership.user_id).await?;

    tx.commit().await?;

    info!(
        project_id = %project_id,
        user_id = %membership.user_id,
        unassigned_issues = unassigned,
        "Contributor removed"
    );

    Ok(())
}

pub async fn is_member(pool: &PgPool, user_id: Uuid, project_id: Uuid) -> DomainResult<bool> {
    Ok(Contributor::is_member(pool, project_id, user_id).await?)
}

pub async fn list_memberships(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    page: Page,
) -> DomainResult<Vec<Contributor>> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&MembershipScope(scope), actor, Operation::List)?;

    let memberships =
        Contributor::list_by_project(pool, project_id, page.limit, page.offset).await?;
    debug!(project_id = %project_id, count = memberships.len(), "Contributors listed");

    Ok(memberships)
}

pub async fn get_membership(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    membership_id: Uuid,
) -> DomainResult<Contributor> {
    let (_, scope) = load_project(pool, actor, project_id).await?;
    authorize(&MembershipScope(scope), actor, Operation::Retrieve)?;

    Contributor::find_in_project(pool, project_id, membership_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Contributor").into())
}
