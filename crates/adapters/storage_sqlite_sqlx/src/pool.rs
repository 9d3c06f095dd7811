//! Opening the places database and bringing its schema up to date.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqliteConnectOptions;

use crate::error::StorageError;

/// Schema migrations for the `places` table, embedded at compile time.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Where the places database lives.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:placehub.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// A private in-memory database, gone once the last connection closes.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
        }
    }

    /// Open the database and apply pending schema migrations.
    ///
    /// A database file that does not exist yet is created.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connect`] if the database cannot be opened and
    /// [`StorageError::Migration`] if the schema cannot be brought up to date.
    pub async fn build(self) -> Result<Database, StorageError> {
        let pool = Database::connect(&self.database_url).await?;
        Database::migrate(&pool).await?;
        Ok(Database { pool })
    }
}

/// An open places database with an up-to-date schema.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn connect(database_url: &str) -> Result<SqlitePool, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .create_if_missing(true);
        SqlitePool::connect_with(options)
            .await
            .map_err(StorageError::Connect)
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), StorageError> {
        MIGRATOR.run(pool).await?;
        tracing::debug!(migrations = MIGRATOR.iter().count(), "places schema up to date");
        Ok(())
    }

    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
