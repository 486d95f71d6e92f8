use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::config::Config;

const FIRST_RETRY_DELAY: Duration = Duration::from_millis(500);
// Long enough that the pool never recycles its only in-memory connection.
const IN_MEMORY_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 100);

pub async fn connect_and_migrate(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let db = connect_with_retry(
        &config.database_url,
        config.db_max_retries,
        Duration::from_secs(config.db_max_retry_delay_secs),
    )
    .await?;
    Migrator::up(&db, None).await?;
    info!("database schema is up to date");
    Ok(db)
}

/// Transient connection failures are retried `max_retries` times, doubling
/// the delay each time up to `max_delay`.
pub async fn connect_with_retry(
    database_url: &str,
    max_retries: u32,
    max_delay: Duration,
) -> Result<DatabaseConnection, DbErr> {
    let mut delay = FIRST_RETRY_DELAY.min(max_delay);
    let mut attempt = 0;

    loop {
        match Database::connect(options(database_url)).await {
            Ok(db) => return Ok(db),
            Err(err) if attempt < max_retries => {
                attempt += 1;
                warn!(
                    attempt,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = next_delay(delay, max_delay);
            },
            Err(err) => return Err(err),
        }
    }
}

fn next_delay(delay: Duration, max_delay: Duration) -> Duration {
    delay.saturating_mul(2).min(max_delay)
}

fn options(database_url: &str) -> ConnectOptions {
    let mut opts = ConnectOptions::new(database_url.to_string());
    opts.sqlx_logging(false);
    // Every connection to an in-memory SQLite database sees its own empty
    // database, so the pool must never open a second one or drop the first.
    if database_url.contains(":memory:") || database_url.contains("mode=memory") {
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(IN_MEMORY_LIFETIME)
            .max_lifetime(IN_MEMORY_LIFETIME);
    }
    opts
}

#[cfg(test)]
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    let db = connect_with_retry("sqlite::memory:", 0, Duration::ZERO).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}
