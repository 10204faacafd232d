//! Newsletter subscriber model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fraz_modern_core::{Email, SubscriberId};

/// A newsletter subscription.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: SubscriberId,
    pub email: Email,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}
