//! Back-office views of user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fraz_modern_core::{Email, UserId};
use fraz_modern_storefront::models::{Order, User};

/// A row of the user list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserListItem {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// A user with activity counts and their latest orders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub order_count: i64,
    pub review_count: i64,
    pub recent_orders: Vec<Order>,
}

/// Request body for changing a user's admin flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminFlagUpdate {
    pub is_admin: Option<bool>,
}
