//! Database initialization
//!
//! Creates the database file and schema on first run; safe to call again on
//! every startup (all statements are idempotent).

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Initialize the connection pool and create tables if needed
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    // Create the parent directory for file-backed databases
    if let Some(raw_path) = database_url.strip_prefix("sqlite://") {
        let path = raw_path.split('?').next().unwrap_or(raw_path);
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    info!("Opened database: {}", database_url);

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while timer tasks write
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Bounded lock waits instead of immediate SQLITE_BUSY
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_users_table(&pool).await?;
    create_products_table(&pool).await?;
    create_subscriptions_table(&pool).await?;

    Ok(pool)
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_products_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            guid TEXT PRIMARY KEY,
            artikul TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            rating REAL NOT NULL,
            total_quantity INTEGER NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_subscriptions_table(pool: &SqlitePool) -> Result<()> {
    // artikul is deliberately not UNIQUE here; the subscribe operation
    // enforces one subscription per artikul at the application level
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            guid TEXT PRIMARY KEY,
            artikul TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_subscriptions_artikul ON subscriptions(artikul)")
        .execute(pool)
        .await?;

    Ok(())
}
