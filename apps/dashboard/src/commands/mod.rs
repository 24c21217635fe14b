//! # Commands Module
//!
//! One async function per dashboard action.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports)
//! ├── sale.rs        ◄─── Record/list/delete sales (credit → receivable)
//! ├── purchase.rs    ◄─── Record/list purchases (→ stock upsert)
//! ├── product.rs     ◄─── Product CRUD
//! ├── expense.rs     ◄─── Expense list/create/delete
//! ├── supplier.rs    ◄─── Supplier CRUD + recent purchases
//! ├── stock.rs       ◄─── Material stock CRUD + levels
//! ├── obligation.rs  ◄─── Receivables and payables, mark paid
//! ├── dashboard.rs   ◄─── Today's summary, weekly chart, notifications
//! ├── report.rs      ◄─── Period report + CSV export
//! └── backup.rs      ◄─── JSON backup of every table
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Command Flow                                    │
//! │                                                                         │
//! │  async fn record_sale(                                                  │
//! │      ctx: &AppContext,      ◄── gateway, clock, config                  │
//! │      session: &Session,     ◄── from sign_in, passed on every call     │
//! │      input: SaleInput,      ◄── from SaleDraft::to_input               │
//! │  ) -> ServiceResult<RecordedSale>                                       │
//! │         │                                                               │
//! │         ├── plan with pembukuan-core (pure, validated)                  │
//! │         ├── write through the gateway, awaited in order                 │
//! │         └── independent reads joined with tokio::try_join!              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors convert to [`crate::error::ApiError`] at the presentation edge.

pub mod backup;
pub mod dashboard;
pub mod expense;
pub mod obligation;
pub mod product;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod stock;
pub mod supplier;
