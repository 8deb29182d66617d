//! Database module for SQLite connection management.

use backoff::{future::retry, ExponentialBackoffBuilder};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Create a SQLite connection pool with foreign keys enforced.
///
/// Connection failures are retried with exponential backoff up to
/// `config.connect_retries` attempts, so the service can start before its
/// storage volume is ready.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Connecting to SQLite...");

    let options = SqliteConnectOptions::from_str(&config.url)?.foreign_keys(true);

    // Every in-memory connection is its own database, so keep the only one alive
    let in_memory = config.url.contains(":memory:");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
    };

    let max_attempts = config.connect_retries.max(1);
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(250))
        .with_max_interval(Duration::from_secs(5))
        .with_max_elapsed_time(None)
        .build();

    let mut attempt = 0;
    let pool = retry(policy, || {
        attempt += 1;
        let current = attempt;
        let options = options.clone();
        let pool_options = pool_options.clone();
        async move {
            pool_options.connect_with(options).await.map_err(|e| {
                if current >= max_attempts {
                    tracing::error!(attempt = current, error = %e, "Database unavailable, giving up");
                    backoff::Error::permanent(e)
                } else {
                    tracing::warn!(attempt = current, error = %e, "Database unavailable, retrying");
                    backoff::Error::transient(e)
                }
            })
        }
    })
    .await?;

    tracing::info!("Successfully connected to SQLite");

    Ok(pool)
}

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

/// Check database health.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
