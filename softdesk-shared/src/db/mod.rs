/// Database layer for SoftDesk
///
/// This module provides database connection pooling and migrations.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Embedded sqlx migration runner
/// - Models are in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use softdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;

/// SQLSTATE raised by PostgreSQL on unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Returns true when the error is a unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == UNIQUE_VIOLATION).unwrap_or(false);
    }
    false
}

/// Returns the violated constraint name, if the error carries one
pub fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}
