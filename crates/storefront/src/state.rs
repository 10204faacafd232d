//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{EmailService, PaymentClient, PaymentError, UploadService};

/// Error building the shared services.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("email setup failed: {0}")]
    Email(#[from] lettre::transport::smtp::Error),
    #[error("payment client setup failed: {0}")]
    Payments(#[from] PaymentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    email: Option<EmailService>,
    uploads: UploadService,
    payments: Option<PaymentClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Email and payments are only set up when configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured service cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let email = config
            .email
            .as_ref()
            .map(|c| EmailService::new(c, config.base_url.clone()))
            .transpose()?;
        let payments = config.payments.as_ref().map(PaymentClient::new).transpose()?;
        let uploads = UploadService::new(config.upload_dir.clone());

        if email.is_none() {
            tracing::info!("SMTP not configured, emails will be skipped");
        }
        if payments.is_none() {
            tracing::info!("Payment processor not configured, checkout payments disabled");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                uploads,
                payments,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The email service, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// The upload service.
    #[must_use]
    pub fn uploads(&self) -> &UploadService {
        &self.inner.uploads
    }

    /// The payment processor client, if configured.
    #[must_use]
    pub fn payments(&self) -> Option<&PaymentClient> {
        self.inner.payments.as_ref()
    }
}
