//! Activity log repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fraz_modern_core::{ActivityLogId, Email, UserId};
use fraz_modern_storefront::db::RepositoryError;
use fraz_modern_storefront::models::UserRef;

use crate::models::{Activity, ActivityEntry};

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: ActivityLogId,
    action: String,
    entity_type: String,
    entity_id: Option<i32>,
    details: Option<String>,
    created_at: DateTime<Utc>,
    user_id: Option<UserId>,
    user_email: Option<Email>,
    user_name: Option<String>,
}

impl From<EntryRow> for ActivityEntry {
    fn from(row: EntryRow) -> Self {
        let user = match (row.user_id, row.user_email) {
            (Some(id), Some(email)) => Some(UserRef {
                id,
                email,
                name: row.user_name,
            }),
            _ => None,
        };
        Self {
            id: row.id,
            action: row.action,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            details: row.details,
            created_at: row.created_at,
            user,
        }
    }
}

/// Repository for the back-office audit trail.
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    /// Create a new activity repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record an action taken by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(&self, user_id: UserId, activity: &Activity) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.activity_log (user_id, action, entity_type, entity_id, details)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user_id)
        .bind(&activity.action)
        .bind(activity.entity_type)
        .bind(activity.entity_id)
        .bind(&activity.details)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// The latest entries, newest first, with the acting user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r"
            SELECT a.id, a.action, a.entity_type, a.entity_id, a.details, a.created_at,
                   u.id AS user_id, u.email AS user_email, u.name AS user_name
            FROM shop.activity_log a
            LEFT JOIN shop.user u ON u.id = a.user_id
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
