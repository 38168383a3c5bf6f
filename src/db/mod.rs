pub mod collections;
pub mod daily;
pub mod devices;
pub mod models;
pub mod recipes;
pub mod tags;
pub mod users;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

pub type DbPool = Pool<Sqlite>;

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create the data directory for file-backed SQLite URLs
async fn ensure_parent_dir(database_url: &str) -> Result<()> {
    if is_in_memory(database_url) {
        return Ok(());
    }

    if let Some(path) = database_url.strip_prefix("sqlite:") {
        let path = path.trim_start_matches("//");
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }

    Ok(())
}

/// In-memory databases live inside a single connection, so the pool must
/// never open a second one or recycle the first.
fn memory_pool_options() -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

/// Turn a UNIQUE constraint failure into a conflict. `message` receives the
/// database message, which names the offending `table.column`.
pub(crate) fn unique_conflict(err: sqlx::Error, message: impl FnOnce(&str) -> String) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::Conflict(message(db_err.message()));
        }
    }
    Error::Database(err)
}

/// Initialize database connection pool
pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    ensure_parent_dir(database_url).await?;

    let options = if is_in_memory(database_url) {
        memory_pool_options()
    } else {
        SqlitePoolOptions::new()
    };

    let pool = options.connect(&create_if_missing(database_url)).await?;
    Ok(pool)
}

/// Initialize database connection pool with custom configuration
pub async fn init_pool_with_config(config: &DatabaseConfig) -> Result<DbPool> {
    if is_in_memory(&config.url) {
        return init_pool(&config.url).await;
    }

    ensure_parent_dir(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .connect(&create_if_missing(&config.url))
        .await?;

    Ok(pool)
}

/// Append `mode=rwc` so a fresh deployment creates its database file
fn create_if_missing(database_url: &str) -> String {
    if is_in_memory(database_url) || database_url.contains("mode=") {
        database_url.to_string()
    } else if database_url.contains('?') {
        format!("{database_url}&mode=rwc")
    } else {
        format!("{database_url}?mode=rwc")
    }
}

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
