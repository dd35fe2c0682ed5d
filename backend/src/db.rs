use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use shared::Bank;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

/// Store failures, classified once here so `sqlx` types never leave this module
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// The store could not be reached or no connection became available in time
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// A statement was rejected by a table constraint
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Query(String),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => PersistenceError::Unavailable(err.to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => PersistenceError::Constraint(db_err.message().to_string()),
                _ => PersistenceError::Query(err.to_string()),
            },
            _ => PersistenceError::Query(err.to_string()),
        }
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Validated field values for a new row
#[derive(Debug, Clone, PartialEq)]
pub struct NewBank {
    pub name: String,
    pub location: String,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BankChanges {
    pub name: Option<String>,
    pub location: Option<String>,
}

/// DbConnection owns the pool and translates bank operations into SQL.
///
/// Every statement runs directly against the pool, which hands out a
/// connection for that statement and takes it back when the statement
/// finishes or fails.
#[derive(Clone)]
pub struct DbConnection {
    pool: SqlitePool,
}

impl DbConnection {
    /// Connect using the configured target, creating the database file if needed
    pub async fn connect(config: &DatabaseConfig) -> PersistenceResult<Self> {
        info!("Connecting to database at {}", config.url);

        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Fresh, private in-memory store.
    ///
    /// SQLite gives every connection its own `:memory:` database, so the pool
    /// is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> PersistenceResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> PersistenceResult<Self> {
        Self::setup_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> PersistenceResult<()> {
        // AUTOINCREMENT keeps SQLite from handing out the id of a deleted row again
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS banks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_banks_name
            ON banks(name);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Release all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert a bank and return it with its generated id and timestamps
    pub async fn insert_bank(&self, bank: &NewBank) -> PersistenceResult<Bank> {
        let now = Utc::now();

        // read back what was stored so callers see the same values a later get returns
        let row = sqlx::query(
            r#"
            INSERT INTO banks (name, location, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, location, created_at, updated_at
            "#,
        )
        .bind(&bank.name)
        .bind(&bank.location)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        let inserted = bank_from_row(&row)?;
        debug!("Inserted bank row {}", inserted.id);

        Ok(inserted)
    }

    /// Retrieve a bank by id; `None` when no such row exists
    pub async fn get_bank(&self, id: i64) -> PersistenceResult<Option<Bank>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, location, created_at, updated_at
            FROM banks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(bank_from_row(&r)?)),
            None => Ok(None),
        }
    }

    /// List all banks ordered by name, ties broken by id
    pub async fn list_banks(&self) -> PersistenceResult<Vec<Bank>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, location, created_at, updated_at
            FROM banks
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let banks = rows
            .iter()
            .map(bank_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(banks)
    }

    /// Apply a partial update and refresh `updated_at`.
    /// Returns false if no bank has this id.
    pub async fn update_bank(&self, id: i64, changes: &BankChanges) -> PersistenceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE banks
            SET name = COALESCE(?, name),
                location = COALESCE(?, location),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.location)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a bank by id. Returns false if no bank has this id.
    pub async fn delete_bank(&self, id: i64) -> PersistenceResult<bool> {
        let result = sqlx::query("DELETE FROM banks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn bank_from_row(row: &SqliteRow) -> Result<Bank, sqlx::Error> {
    Ok(Bank {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
