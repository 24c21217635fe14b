//! # pembukuan-core: Pure Bookkeeping Logic
//!
//! This crate is the **heart** of Pembukuan. It contains the ledger rules,
//! report aggregation and CSV export as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pembukuan Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard frontend                           │   │
//! │  │   Penjualan ─ Pengeluaran ─ Stok ─ Piutang/Hutang ─ Laporan     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pembukuan-dashboard commands                    │   │
//! │  │    record_sale, record_purchase, mark_receivable_paid, ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ pembukuan-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │ ledger  │ │ period  │ │aggregation│ │ export │  │   │
//! │  │   │  money  │ │  plans  │ │ ranges  │ │  reports  │ │  CSV   │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └───────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  pembukuan-db (Persistence Gateway)             │   │
//! │  │              table-scoped CRUD over SQLite or memory            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ledger entities (Product, SaleTransaction, Receivable, ...)
//! - [`money`] - Whole-rupiah Money type
//! - [`ledger`] - Planning of every write (totals, stock upserts, mark paid)
//! - [`period`] - Report periods and date ranges
//! - [`aggregation`] - Dashboard and report math
//! - [`export`] - CSV report rendering
//! - [`session`] - The session token passed to the gateway
//! - [`validation`] - Field rules and form parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pembukuan_core::aggregation::margin_percent;
//! use pembukuan_core::Money;
//!
//! let income = Money::from_rupiah(200_000);
//! let net = Money::from_rupiah(50_000);
//! assert_eq!(margin_percent(net, income), 25.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregation;
pub mod error;
pub mod export;
pub mod ledger;
pub mod money;
pub mod period;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pembukuan_core::Money` instead of
// `use pembukuan_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use period::{DateRange, Period, YearMonth};
pub use session::Session;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// A material with fewer units than this is "low".
///
/// Fixed business rule; zero is "out".
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Largest rupiah amount a single price, expense, debt or line total may hold.
///
/// Keeps thousands of rows summable without leaving `i64`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Unit given to a stock row created by a purchase of a new material.
pub const DEFAULT_MATERIAL_UNIT: &str = "Kg";

/// Number of recent purchases shown on a supplier's card.
pub const SUPPLIER_RECENT_PURCHASES: usize = 5;
