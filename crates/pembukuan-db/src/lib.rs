//! # pembukuan-db: Persistence Gateway
//!
//! Table-scoped CRUD for the ledger, behind one async trait.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pembukuan Data Flow                              │
//! │                                                                         │
//! │  Dashboard command (record_sale)                                       │
//! │       │  &Session, Table::Sales, Record                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  pembukuan-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │ trait Gateway │    │ SqliteGateway │    │  Migrations  │   │   │
//! │  │   │ + GatewayExt  │◄───│ MemoryGateway │    │  (embedded)  │   │   │
//! │  │   │ (gateway.rs)  │    │               │    │ 001, 002     │   │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘   │   │
//! │  │                                │                                │   │
//! │  │                        Database (pool.rs)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/pembukuan/pembukuan.db                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`gateway`] - The `Gateway` trait, query model, typed helpers
//! - [`clock`] - The clock session expiry is checked against
//! - [`sqlite`] - SQLite implementation
//! - [`memory`] - In-memory implementation with failure injection
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pembukuan_db::{Database, DbConfig, GatewayExt, Query};
//!
//! let db = Database::new(DbConfig::new("pembukuan.db")).await?;
//! let gateway = db.gateway();
//!
//! let today_sales: Vec<SaleTransaction> = gateway
//!     .query_as(&session, &Query::new().on_date("date", today))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod sqlite;

// =============================================================================
// Re-exports
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DbError, DbResult};
pub use gateway::{Filter, FilterOp, Gateway, GatewayExt, Order, Query, Record};
pub use memory::{MemoryGateway, Operation};
pub use pool::{Database, DbConfig};
pub use sqlite::SqliteGateway;
