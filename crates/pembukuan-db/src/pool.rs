//! # Database Pool
//!
//! Opens the ledger's SQLite file and applies the embedded migrations.
//!
//! ```text
//! Database::new(DbConfig::new(path))
//!     ├── WAL journal, foreign keys on (file databases)
//!     ├── migrations 001, 002
//!     ├── db.gateway() → SqliteGateway over the ledger tables
//!     └── db.pool()    → LocalAuth (users, sessions)
//! ```
//!
//! Dashboard reads run concurrently, so a file database gets a few
//! connections. `:memory:` gets exactly one, since every SQLite connection
//! would otherwise open its own empty database.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::sqlite::SqliteGateway;

const IN_MEMORY: &str = ":memory:";

/// Where the ledger lives and how many connections it may hold.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
}

impl DbConfig {
    /// A file database at `path`, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
        }
    }

    /// A private in-memory database, for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let connect_err = |e: sqlx::Error| DbError::ConnectionFailed(e.to_string());

        if self.is_in_memory() {
            return Ok(SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(connect_err)?
                .foreign_keys(true));
        }

        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());
        Ok(SqliteConnectOptions::from_str(&url)
            .map_err(connect_err)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Sales and purchases rely on ON DELETE SET NULL.
            .foreign_keys(true)
            .create_if_missing(true))
    }
}

/// Owns the pool. Gateways and the auth service share it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening ledger database");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;
        info!(max_connections = config.max_connections, "Ledger database ready");

        Ok(Database { pool })
    }

    /// For the auth tables, which sit outside the gateway.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A gateway over this pool, checking sessions against the wall clock.
    pub fn gateway(&self) -> SqliteGateway {
        SqliteGateway::new(self.pool.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
