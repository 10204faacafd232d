//! Activity log entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fraz_modern_core::ActivityLogId;
use fraz_modern_storefront::models::UserRef;

/// A recorded back-office action, as listed in the activity feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: ActivityLogId,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i32>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserRef>,
}

/// An action about to be recorded.
///
/// `action` is `<entity>.<verb>`, e.g. `product.create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub action: String,
    pub entity_type: &'static str,
    pub entity_id: Option<i32>,
    pub details: Option<String>,
}

impl Activity {
    /// An action on `entity_type`, recorded as `<entity_type>.<verb>`.
    #[must_use]
    pub fn new(entity_type: &'static str, verb: &str) -> Self {
        Self {
            action: format!("{entity_type}.{verb}"),
            entity_type,
            entity_id: None,
            details: None,
        }
    }

    /// The affected row.
    #[must_use]
    pub const fn entity(mut self, id: i32) -> Self {
        self.entity_id = Some(id);
        self
    }

    /// Free-form description shown in the feed.
    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_name() {
        let activity = Activity::new("product", "create")
            .entity(7)
            .details("Created product Desk Lamp");
        assert_eq!(activity.action, "product.create");
        assert_eq!(activity.entity_type, "product");
        assert_eq!(activity.entity_id, Some(7));
        assert_eq!(activity.details.as_deref(), Some("Created product Desk Lamp"));
    }

    #[test]
    fn test_bare_activity() {
        let activity = Activity::new("newsletter", "send");
        assert_eq!(activity.action, "newsletter.send");
        assert!(activity.entity_id.is_none());
        assert!(activity.details.is_none());
    }
}
