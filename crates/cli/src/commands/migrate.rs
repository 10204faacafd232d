//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! fm-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Plain SQL in `crates/storefront/migrations/`, embedded at compile time.
//! The session tables of both servers are created there too.

use sqlx::migrate::Migrator;

static MIGRATOR: Migrator = sqlx::migrate!("../storefront/migrations");

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
