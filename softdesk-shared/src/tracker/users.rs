/// Identity store operations
///
/// Registration and login are the only operations without an actor. Every
/// other operation acts on a single user record and is gated by
/// [`UserRecord`]: users manage themselves, administrators manage anyone.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{conflict_on_duplicate, Page};
use crate::auth::authorization::{authorize, AuthzError};
use crate::auth::password::{hash_password_async, validate_password_strength, verify_password_async};
use crate::auth::policy::{Actor, Operation, UserRecord};
use crate::error::{DomainError, DomainResult};
use crate::models::user::{CreateUser, UpdateUser, User};

/// Minimum age at registration
pub const MIN_AGE: i32 = 15;

const USERNAME_TAKEN: &str = "A user with that username already exists";
const BAD_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    pub password: String,

    #[validate(range(min = 15, message = "You must be at least 15 years old to register"))]
    pub age: i32,

    #[serde(default)]
    pub can_be_contacted: bool,

    #[serde(default)]
    pub can_data_be_shared: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: Option<String>,

    pub password: Option<String>,

    /// Present only so a client that sends it gets a clear error
    pub age: Option<i32>,

    pub can_be_contacted: Option<bool>,

    pub can_data_be_shared: Option<bool>,
}

fn check_password(password: &str) -> DomainResult<()> {
    validate_password_strength(password).map_err(|msg| DomainError::invalid("password", msg))
}

/// Creates an account
///
/// # Errors
///
/// - `Validation` for a bad username, weak password or age below 15
/// - `Conflict` if the username is taken
pub async fn register(pool: &PgPool, input: RegisterUser) -> DomainResult<User> {
    input.validate()?;
    check_password(&input.password)?;

    let password_hash = hash_password_async(input.password).await?;

    let user = User::create(
        pool,
        CreateUser {
            username: input.username,
            password_hash,
            age: input.age,
            can_be_contacted: input.can_be_contacted,
            can_data_be_shared: input.can_data_be_shared,
        },
    )
    .await
    .map_err(|e| conflict_on_duplicate(e, USERNAME_TAKEN))?;

    info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(user)
}

/// Checks credentials
///
/// Unknown usernames and wrong passwords fail with the same message.
pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> DomainResult<User> {
    let Some(user) = User::find_by_username(pool, username).await? else {
        warn!(username = %username, "Login for unknown username");
        return Err(DomainError::AuthenticationFailed(BAD_CREDENTIALS.to_string()));
    };

    if !verify_password_async(password.to_string(), user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "Login with wrong password");
        return Err(DomainError::AuthenticationFailed(BAD_CREDENTIALS.to_string()));
    }

    info!(user_id = %user.id, "User authenticated");

    Ok(user)
}

async fn load_user(pool: &PgPool, actor: &Actor, user_id: Uuid, op: Operation) -> DomainResult<User> {
    let user = User::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AuthzError::not_found("User"))?;

    authorize(&UserRecord { user_id }, actor, op)?;

    Ok(user)
}

pub async fn get_user(pool: &PgPool, actor: &Actor, user_id: Uuid) -> DomainResult<User> {
    let user = load_user(pool, actor, user_id, Operation::Retrieve).await?;
    debug!(user_id = %user.id, "User retrieved");
    Ok(user)
}

/// Administrators see every user; anyone else sees only themselves
pub async fn list_users(pool: &PgPool, actor: &Actor, page: Page) -> DomainResult<Vec<User>> {
    if actor.is_admin {
        return Ok(User::list(pool, page.limit, page.offset).await?);
    }

    if page.offset > 0 {
        return Ok(Vec::new());
    }

    Ok(User::find_by_id(pool, actor.user_id).await?.into_iter().collect())
}

/// Updates username, password or consent flags
///
/// # Errors
///
/// - `Validation` if the input tries to change the age or is invalid
/// - `Conflict` if the new username is taken
pub async fn update_user(
    pool: &PgPool,
    actor: &Actor,
    user_id: Uuid,
    input: UpdateUserInput,
) -> DomainResult<User> {
    load_user(pool, actor, user_id, Operation::Update).await?;

    input.validate()?;
    if input.age.is_some() {
        return Err(DomainError::invalid("age", "Age cannot be changed after registration"));
    }

    let password_hash = match input.password {
        Some(password) => {
            check_password(&password)?;
            Some(hash_password_async(password).await?)
        }
        None => None,
    };

    let update = UpdateUser {
        username: input.username,
        password_hash,
        can_be_contacted: input.can_be_contacted,
        can_data_be_shared: input.can_data_be_shared,
    };

    let user = User::update(pool, user_id, update)
        .await
        .map_err(|e| conflict_on_duplicate(e, USERNAME_TAKEN))?
        .ok_or_else(|| AuthzError::not_found("User"))?;

    info!(user_id = %user.id, actor = %actor.user_id, "User updated");

    Ok(user)
}

/// Hard-deletes an account with everything it authored
pub async fn delete_user(pool: &PgPool, actor: &Actor, user_id: Uuid) -> DomainResult<()> {
    load_user(pool, actor, user_id, Operation::Delete).await?;

    if !User::delete(pool, user_id).await? {
        return Err(AuthzError::not_found("User").into());
    }

    info!(user_id = %user_id, actor = %actor.user_id, "User deleted");

    Ok(())
}
