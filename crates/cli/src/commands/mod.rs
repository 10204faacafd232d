//! `fm-cli` subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

use fraz_modern_storefront::config::get_database_url;
use fraz_modern_storefront::db::create_pool;

/// Connect using `DATABASE_URL`, loading `.env` first.
///
/// # Errors
///
/// Returns an error if the variable is missing or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let database_url: SecretString = get_database_url("DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    Ok(create_pool(&database_url).await?)
}
