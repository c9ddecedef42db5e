/// User model and database operations
///
/// Users own projects, hold memberships, author issues and comments.
/// Deleting a user cascades to their memberships and authored content, and
/// clears any issue assignments pointing at them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(150) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     age INTEGER NOT NULL CHECK (age >= 15),
///     can_be_contacted BOOLEAN NOT NULL DEFAULT FALSE,
///     can_data_be_shared BOOLEAN NOT NULL DEFAULT FALSE,
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use softdesk_shared::models::user::{User, CreateUser};
/// use softdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     age: 31,
///     can_be_contacted: true,
///     can_data_be_shared: false,
/// }).await?;
///
/// let found = User::find_by_username(&pool, "alice").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, password_hash, age, can_be_contacted, \
                            can_data_be_shared, is_admin, created_at, updated_at";

/// A user account
///
/// The password hash is skipped during serialization so a `User` can never
/// leak it into a response body.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Login name, unique across all users
    pub username: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Age at registration; fixed after creation
    pub age: i32,

    /// Consent to be contacted
    pub can_be_contacted: bool,

    /// Consent to data sharing
    pub can_data_be_shared: bool,

    /// Administrators may act on any user record
    pub is_admin: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,

    /// Argon2id hash, never the plaintext password
    pub password_hash: String,

    pub age: i32,

    pub can_be_contacted: bool,

    pub can_data_be_shared: bool,
}

/// Input for updating a user
///
/// Only `Some` fields are written. Age, creation time and the administrator
/// flag are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,

    pub password_hash: Option<String>,

    pub can_be_contacted: Option<bool>,

    pub can_data_be_shared: Option<bool>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password_hash.is_none()
            && self.can_be_contacted.is_none()
            && self.can_data_be_shared.is_none()
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_username_key` when the
    /// username is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, password_hash, age, can_be_contacted, can_data_be_shared) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.password_hash)
            .bind(data.age)
            .bind(data.can_be_contacted)
            .bind(data.can_data_be_shared)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by exact username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Checks whether a user row exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Updates the `Some` fields of `data`
    ///
    /// Returns `None` if the user doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.can_be_contacted.is_some() {
            bind_count += 1;
            query.push_str(&format!(", can_be_contacted = ${}", bind_count));
        }
        if data.can_data_be_shared.is_some() {
            bind_count += 1;
            query.push_str(&format!(", can_data_be_shared = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(can_be_contacted) = data.can_be_contacted {
            q = q.bind(can_be_contacted);
        }
        if let Some(can_data_be_shared) = data.can_data_be_shared {
            q = q.bind(can_data_be_shared);
        }

        q.fetch_optional(pool).await
    }

    /// Grants or revokes the administrator flag
    ///
    /// Not reachable through the HTTP API; administrators are provisioned by
    /// operators.
    pub async fn set_admin(pool: &PgPool, id: Uuid, is_admin: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET is_admin = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(is_admin)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user; returns false if no such user
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users, oldest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            age: 30,
            can_be_contacted: true,
            can_data_be_shared: false,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["age"], 30);
    }

    #[test]
    fn test_update_user_default_is_empty() {
        let update = UpdateUser::default();
        assert!(update.is_empty());

        let update = UpdateUser {
            can_be_contacted: Some(false),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
