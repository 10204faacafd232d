//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fraz_modern_core::{Email, UserId};

use super::CurrentUser;

/// A shopper or administrator account.
///
/// The password hash is never part of this type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Identity to store in the session after login.
    #[must_use]
    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// The profile shown to the account owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub avatar: Option<String>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            avatar: user.avatar,
        }
    }
}

/// A user reference nested in other resources.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserRef {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
}
