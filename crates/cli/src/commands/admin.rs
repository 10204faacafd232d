//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an administrator, or promote an existing account
//! fm-cli admin create -e admin@example.com -n "Admin Name" -p 'long-password'
//!
//! # Replace a user's password
//! fm-cli admin reset-password -e admin@example.com -p 'new-password'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use thiserror::Error;

use fraz_modern_core::{Email, UserId};
use fraz_modern_storefront::db::{RepositoryError, UserRepository};
use fraz_modern_storefront::services::auth::{AuthError, hash_password, validate_password};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected or not hashable.
    #[error("{0}")]
    Password(#[from] AuthError),

    /// No account with this email.
    #[error("No user with email: {0}")]
    UnknownUser(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),
}

fn parse_email(email: &str) -> Result<Email, AdminError> {
    Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))
}

/// Create an administrator.
///
/// An existing account with the same email is promoted and given the new
/// password instead.
///
/// # Returns
///
/// The ID of the administrator.
///
/// # Errors
///
/// Returns an error if the input is invalid or the database fails.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let email = parse_email(email)?;
    validate_password(password).map_err(AdminError::from)?;
    let hash = hash_password(password).map_err(AdminError::from)?;

    let pool = super::connect().await?;
    let users = UserRepository::new(&pool);

    if let Some(existing) = users.get_by_email(&email).await.map_err(AdminError::from)? {
        users
            .set_password_hash(&email, &hash)
            .await
            .map_err(AdminError::from)?;
        let user = users
            .set_admin(existing.id, true)
            .await
            .map_err(AdminError::from)?;
        tracing::info!("Existing user promoted to admin! ID: {}, Email: {}", user.id, user.email);
        return Ok(user.id);
    }

    let name = Some(name.trim()).filter(|n| !n.is_empty());
    let user = users
        .create(&email, &hash, name, true)
        .await
        .map_err(AdminError::from)?;
    tracing::info!("Admin user created successfully! ID: {}, Email: {}", user.id, user.email);
    Ok(user.id)
}

/// Replace the password of an existing user.
///
/// # Errors
///
/// Returns an error if the user doesn't exist, the password is too short or
/// the database fails.
pub async fn reset_password(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_email(email)?;
    validate_password(password).map_err(AdminError::from)?;
    let hash = hash_password(password).map_err(AdminError::from)?;

    let pool = super::connect().await?;
    UserRepository::new(&pool)
        .set_password_hash(&parsed, &hash)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UnknownUser(email.to_owned()),
            other => AdminError::Database(other),
        })?;

    tracing::info!("Password reset for {}", parsed);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_validated() {
        assert!(matches!(
            parse_email("not-an-email"),
            Err(AdminError::InvalidEmail(_))
        ));
        assert_eq!(
            parse_email("Admin@Example.com").unwrap().as_str(),
            "admin@example.com"
        );
    }
}
