//! # Pembukuan Dashboard Library
//!
//! Orchestration layer for the Pempek Putri bookkeeping dashboard. The
//! frontend calls the functions in [`commands`]; each one plans its writes
//! with `pembukuan-core` and performs them through the `pembukuan-db`
//! gateway.
//!
//! ## Module Organization
//! ```text
//! pembukuan_dashboard/
//! ├── lib.rs          ◄─── You are here (tracing, bootstrap)
//! ├── config.rs       ◄─── AppConfig: defaults → config.toml → PEMBUKUAN_* env
//! ├── clock           ◄─── Clock trait, SystemClock, FixedClock (from pembukuan-db)
//! ├── auth.rs         ◄─── LocalAuth: Argon2 passwords, JWT sessions
//! ├── state/
//! │   ├── context.rs  ◄─── AppContext (gateway + clock + config)
//! │   └── view.rs     ◄─── Date filter and form drafts
//! ├── commands/       ◄─── One async fn per dashboard action
//! └── error.rs        ◄─── AuthError, ServiceError, ApiError
//! ```
//!
//! ## Startup
//! ```text
//! AppConfig::load()
//!     │
//!     ▼
//! bootstrap(config)
//!     ├── create the data folder
//!     ├── Database::new (WAL, foreign keys, migrations)
//!     ├── LocalAuth over the same pool
//!     └── AppContext { SqliteGateway, SystemClock, config }
//!         (the gateway checks session expiry against the same clock)
//! ```

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

pub use pembukuan_db::clock;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use pembukuan_db::{Database, DbConfig, DbError, SqliteGateway};

use auth::LocalAuth;
use clock::{Clock, SystemClock};
use config::{AppConfig, ConfigError};
use state::AppContext;

/// Everything the frontend needs, wired together.
pub struct App {
    pub db: Database,
    pub auth: LocalAuth,
    pub context: AppContext,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot create data folder {path}: {message}")]
    DataDir { path: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pembukuan=trace` - Show trace for pembukuan crates only
/// - Default: `info,pembukuan=debug,sqlx=warn`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pembukuan=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Opens the database and builds the auth service and command context.
pub async fn bootstrap(config: AppConfig) -> Result<App, StartupError> {
    config.check()?;

    if let Some(dir) = config.database_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| StartupError::DataDir {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
    }
    info!(path = %config.database_path.display(), "Opening database");

    let db = Database::new(DbConfig::new(config.database_path.clone())).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let auth = LocalAuth::new(db.pool().clone(), &config, Arc::clone(&clock));
    let gateway = Arc::new(SqliteGateway::new(db.pool().clone()).with_clock(Arc::clone(&clock)));
    let context = AppContext::new(gateway, clock, config);

    info!(business = %context.config().business_name, "Dashboard ready");
    Ok(App { db, auth, context })
}
