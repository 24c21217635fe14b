//! # State Module
//!
//! Everything a command needs besides its arguments, and the presentation
//! layer's own state.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────────┐    │
//! │  │       AppContext         │      │         View state           │    │
//! │  │                          │      │                              │    │
//! │  │  Arc<dyn Gateway>        │      │  DateFilter (list pages)     │    │
//! │  │  Arc<dyn Clock>          │      │  SaleDraft, PurchaseDraft,   │    │
//! │  │  AppConfig               │      │  ExpenseDraft, ... (forms)   │    │
//! │  └──────────────────────────┘      └──────────────────────────────┘    │
//! │        shared, read-only             owned by one page, plain data     │
//! │                                                                         │
//! │  The Session is NOT stored here; it is passed to each command.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod context;
mod view;

pub use context::AppContext;
pub use view::{
    DateFilter, ExpenseDraft, ObligationDraft, ProductDraft, PurchaseDraft, SaleDraft,
    SignUpDraft, StockDraft, SupplierDraft,
};
