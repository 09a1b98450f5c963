//! PostgreSQL connection setup and schema migrations.
//!
//! Startup order:
//! 1. Connect (retried with exponential backoff)
//! 2. Create the configured schema if it does not exist
//! 3. Build the pool with `search_path` pinned to that schema
//! 4. Apply pending migrations from `./migrations`

use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgConnection, PgPool};
use std::str::FromStr;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::config::{Config, mask_connection_string};

/// Versioned migrations embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connects to the database described by `config`, bootstrapping the schema first.
///
/// # Errors
///
/// Returns an error if the URL is missing or malformed, or the database stays
/// unreachable after `db_connect_retries` attempts.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for PostgreSQL storage")?;
    let base_options = PgConnectOptions::from_str(url).context("Invalid DATABASE_URL")?;

    if let Some(schema) = &config.db_schema {
        bootstrap_schema(&base_options, schema, config.db_connect_retries).await?;
    }

    let connect_options = match &config.db_schema {
        Some(schema) => base_options.options([("search_path", schema.as_str())]),
        None => base_options,
    };

    let pool_options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let pool = with_retry(config.db_connect_retries, || {
        pool_options.clone().connect_with(connect_options.clone())
    })
    .await
    .with_context(|| format!("Failed to connect to {}", mask_connection_string(url)))?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Applies pending migrations. Already-applied versions are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("Failed to apply database migrations")?;
    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        "Database schema is up to date"
    );
    Ok(())
}

/// Creates `schema` ahead of the migrator, which needs it for its own table.
async fn bootstrap_schema(options: &PgConnectOptions, schema: &str, retries: usize) -> Result<()> {
    let mut conn: PgConnection = with_retry(retries, || PgConnection::connect_with(options))
        .await
        .context("Failed to connect for schema bootstrap")?;

    // The name is validated as a plain identifier by `Config::validate`.
    sqlx::query(&format!(r#"CREATE SCHEMA IF NOT EXISTS "{}""#, schema))
        .execute(&mut conn)
        .await
        .with_context(|| format!("Failed to create schema '{}'", schema))?;

    conn.close().await.ok();
    tracing::info!(schema, "Database schema ensured");
    Ok(())
}

async fn with_retry<T, F, Fut>(attempts: usize, action: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let strategy = ExponentialBackoff::from_millis(50)
        .factor(4)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(attempts.saturating_sub(1));

    let mut action = action;
    let mut attempt = 0usize;
    Retry::spawn(strategy, move || {
        attempt += 1;
        let fut = action();
        async move {
            let result = fut.await;
            if let Err(e) = &result {
                tracing::warn!(attempt, error = %e, "Database connection attempt failed");
            }
            result
        }
    })
    .await
}
