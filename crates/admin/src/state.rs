//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use fraz_modern_storefront::services::{EmailService, UploadService};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    email: Option<EmailService>,
    uploads: UploadService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Email is only set up when SMTP is configured. Links in customer email
    /// point at the storefront.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, lettre::transport::smtp::Error> {
        let email = config
            .email
            .as_ref()
            .map(|c| EmailService::new(c, config.storefront_url.clone()))
            .transpose()?;
        let uploads = UploadService::new(config.upload_dir.clone());

        if email.is_none() {
            tracing::info!("SMTP not configured, emails will be skipped");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                uploads,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
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
}
