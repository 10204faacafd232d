//! Newsletter subscriber repository.

use sqlx::PgPool;

use fraz_modern_core::{Email, SubscriberId};

use super::RepositoryError;
use crate::models::Subscriber;

const SUBSCRIBER_COLUMNS: &str = "id, email, is_active, subscribed_at, unsubscribed_at";

/// What a subscribe request did.
#[derive(Debug, Clone)]
pub enum Subscription {
    /// A new subscriber row was created.
    Created(Subscriber),
    /// A previously unsubscribed address became active again.
    Reactivated(Subscriber),
    /// The address is already an active subscriber.
    AlreadyActive,
}

/// Repository for newsletter subscriber operations.
pub struct NewsletterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsletterRepository<'a> {
    /// Create a new newsletter repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an address, reactivating it if it unsubscribed earlier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn subscribe(&self, email: &Email) -> Result<Subscription, RepositoryError> {
        let existing = sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM shop.newsletter_subscriber WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        match existing {
            Some(subscriber) if subscriber.is_active => Ok(Subscription::AlreadyActive),
            Some(subscriber) => {
                let subscriber = sqlx::query_as::<_, Subscriber>(&format!(
                    r"
                    UPDATE shop.newsletter_subscriber
                    SET is_active = TRUE, subscribed_at = NOW(), unsubscribed_at = NULL
                    WHERE id = $1
                    RETURNING {SUBSCRIBER_COLUMNS}
                    "
                ))
                .bind(subscriber.id)
                .fetch_one(self.pool)
                .await?;
                Ok(Subscription::Reactivated(subscriber))
            }
            None => {
                // A concurrent subscribe of the same address lands in DO NOTHING.
                let created = sqlx::query_as::<_, Subscriber>(&format!(
                    r"
                    INSERT INTO shop.newsletter_subscriber (email)
                    VALUES ($1)
                    ON CONFLICT (email) DO NOTHING
                    RETURNING {SUBSCRIBER_COLUMNS}
                    "
                ))
                .bind(email)
                .fetch_optional(self.pool)
                .await?;
                Ok(created.map_or(Subscription::AlreadyActive, Subscription::Created))
            }
        }
    }

    /// Mark an address as unsubscribed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address never subscribed.
    pub async fn unsubscribe(&self, email: &Email) -> Result<Subscriber, RepositoryError> {
        sqlx::query_as::<_, Subscriber>(&format!(
            r"
            UPDATE shop.newsletter_subscriber
            SET is_active = FALSE, unsubscribed_at = NOW()
            WHERE email = $1
            RETURNING {SUBSCRIBER_COLUMNS}
            "
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Active subscribers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        let subscribers = sqlx::query_as::<_, Subscriber>(&format!(
            r"
            SELECT {SUBSCRIBER_COLUMNS}
            FROM shop.newsletter_subscriber
            WHERE is_active
            ORDER BY subscribed_at DESC, id DESC
            "
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(subscribers)
    }

    /// Remove a subscriber row entirely.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the subscriber doesn't exist.
    pub async fn delete(&self, id: SubscriberId) -> Result<Subscriber, RepositoryError> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "DELETE FROM shop.newsletter_subscriber WHERE id = $1 RETURNING {SUBSCRIBER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
