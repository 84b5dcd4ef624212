//! Postgres pool for the ledger

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::utils::errors::SplitBuddyError;

pub type DatabasePool = Pool<Postgres>;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Connection URL with the password masked, for logs
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}

/// Open the pool and make sure the server answers
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, SplitBuddyError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(&config.url)
        .await?;

    health_check(&pool).await?;

    info!(
        target_db = %redact_url(&config.url),
        max_connections = config.max_connections,
        "Ledger database pool ready"
    );
    Ok(pool)
}

/// Apply the schema in `migrations/`
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), SplitBuddyError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Ledger schema is up to date");
    Ok(())
}

pub async fn health_check(pool: &DatabasePool) -> Result<(), SplitBuddyError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
