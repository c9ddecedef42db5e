/// Policy enforcement
///
/// Turns [`Decision`]s into errors and loads the guards the policy needs.
///
/// # Failure mapping
///
/// 1. **Denied SAFE operation**: `NotFound`, so a non-member cannot tell a
///    hidden project from a missing one
/// 2. **Denied UNSAFE operation**: `PermissionDenied` with the policy's reason
///
/// # Example
///
/// ```no_run
/// use softdesk_shared::auth::authorization::{authorize, load_project};
/// use softdesk_shared::auth::policy::{Actor, Operation};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, actor: Actor, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let (project, scope) = load_project(&pool, &actor, project_id).await?;
/// authorize(&scope, &actor, Operation::Update)?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::policy::{AccessPolicy, Actor, Decision, Operation, ProjectScope};
use crate::models::contributor::Contributor;
use crate::models::project::Project;

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("{0}")]
    PermissionDenied(String),

    /// Missing, or hidden from the actor
    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthzError {
    pub fn not_found(label: &str) -> Self {
        AuthzError::NotFound(format!("{} not found", label))
    }
}

/// Applies a guard's decision
///
/// # Errors
///
/// - `NotFound` when a SAFE operation is denied
/// - `PermissionDenied` when an UNSAFE operation is denied
pub fn authorize<P: AccessPolicy>(
    policy: &P,
    actor: &Actor,
    operation: Operation,
) -> Result<(), AuthzError> {
    match policy.decide(actor, operation) {
        Decision::Allow => Ok(()),
        Decision::Deny { reason } => {
            warn!(
                actor = %actor.user_id,
                resource = P::KIND.label(),
                operation = operation.as_str(),
                reason = %reason,
                "Access denied"
            );

            if operation.is_safe() {
                Err(AuthzError::not_found(P::KIND.label()))
            } else {
                Err(AuthzError::PermissionDenied(reason))
            }
        }
    }
}

/// Loads a project and the actor's standing in it
///
/// # Errors
///
/// Returns `NotFound` if the project doesn't exist. Visibility is not
/// checked here; pass the scope to [`authorize`].
pub async fn load_project(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
) -> Result<(Project, ProjectScope), AuthzError> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("Project"))?;

    let actor_role = Contributor::get_role(pool, project_id, actor.user_id).await?;

    let scope = ProjectScope {
        project_id: project.id,
        author_id: project.author_id,
        actor_role,
    };

    Ok((project, scope))
}
