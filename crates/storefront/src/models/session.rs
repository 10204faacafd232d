//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use fraz_modern_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name, if set.
    pub name: Option<String>,
    /// Whether the user may use the back-office.
    pub is_admin: bool,
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for the logged-in shopper (storefront session).
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the logged-in administrator (back-office session).
    pub const CURRENT_ADMIN: &str = "current_admin";
}
