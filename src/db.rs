//! Database connection.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;

/// Open a connection pool against the configured Postgres instance.
///
/// Callers own the pool and close it on their shutdown path; request
/// concurrency is handled by the pool itself, not by this crate.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database.url())
        .await?;

    Ok(pool)
}
