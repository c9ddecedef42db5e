/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and strength rules
/// - [`jwt`]: access/refresh token issuing and validation
/// - [`middleware`]: the authenticated request context
/// - [`policy`]: per-resource access decisions
/// - [`authorization`]: loads resource scopes and enforces policy decisions
///
/// # Example
///
/// ```no_run
/// use softdesk_shared::auth::password::{hash_password, verify_password};
/// use softdesk_shared::auth::jwt::{create_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("S3cret!pass")?;
/// assert!(verify_password("S3cret!pass", &hash)?);
///
/// let claims = Claims::access(uuid::Uuid::new_v4());
/// let token = create_token(&claims, "a-secret-that-is-at-least-32-chars!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;
