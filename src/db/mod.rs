//! Database module for gator.
//!
//! This module provides SQLite connectivity (through a `sqlx` pool) and
//! migration management.

mod repository;
mod schema;
mod user;

pub use repository::UserRepository;
pub use schema::MIGRATIONS;
pub use user::User;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{GatorError, Result};

/// Connection pool type used by the repositories.
pub type DbPool = SqlitePool;

/// Database wrapper for managing the connection pool and migrations.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open the database identified by `url` (e.g. `sqlite://gator.db`).
    ///
    /// The database file is created when missing and pending migrations are
    /// applied.
    pub async fn open(url: &str) -> Result<Self> {
        info!("Opening database at {}", url);

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| GatorError::Config(format!("invalid database url {url:?}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory database");

        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| GatorError::Config(e.to_string()))?
            .foreign_keys(true);

        // Every connection to `:memory:` is a separate database, so keep one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get the current schema version.
    pub async fn schema_version(&self) -> Result<i64> {
        if !self.table_exists("schema_version").await? {
            return Ok(0);
        }

        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?;

        Ok(version)
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        let current_version = self.schema_version().await?;
        let migrations = MIGRATIONS;

        if current_version as usize >= migrations.len() {
            debug!("Database is up to date (version {})", current_version);
            return Ok(());
        }

        info!(
            "Migrating database from version {} to {}",
            current_version,
            migrations.len()
        );

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version     INTEGER PRIMARY KEY,
                applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        // Apply each pending migration in a transaction
        for (i, migration) in migrations.iter().enumerate().skip(current_version as usize) {
            let version = (i + 1) as i64;
            debug!("Applying migration v{}", version);

            let mut tx = self.pool.begin().await?;

            sqlx::raw_sql(migration.trim()).execute(&mut *tx).await?;

            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(version)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
        }

        info!(
            "Database migration complete (now at version {})",
            migrations.len()
        );
        Ok(())
    }

    /// Check if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
