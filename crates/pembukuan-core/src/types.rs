//! # Domain Types
//!
//! Ledger entities used throughout Pembukuan.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ledger Entities                                 │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ SaleTransaction │   │   Receivable    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  (Piutang)      │       │
//! │  │  name (unique)  │◄──│  product_id?    │   │  customer_name  │       │
//! │  │  price          │   │  unit_price ❄   │   │  amount         │       │
//! │  │  stock          │   │  total ❄        │──►│  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                           credit sale: independent insert, no FK        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Supplier      │◄──│MaterialPurchase │──►│ MaterialStock   │       │
//! │  │                 │   │  total ❄        │   │  material_name  │       │
//! │  └─────────────────┘   └─────────────────┘   │  (unique), qty  │       │
//! │                          purchase: upsert ──►└─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Expense      │   │    Payable      │   ❄ = snapshot taken at     │
//! │  │  category       │   │  (Hutang)       │       write time, never     │
//! │  │  amount         │   │  status         │       recomputed            │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stored vs New
//! Each table has a stored type (with the gateway-assigned `id`) and a
//! `New*` insert payload. Partial updates use `*Update` types whose `None`
//! fields are left out of the serialized record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tables
// =============================================================================

/// The tables the persistence gateway exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Products,
    Sales,
    Expenses,
    Suppliers,
    MaterialPurchases,
    MaterialStock,
    Receivables,
    Payables,
}

impl Table {
    /// Every table, in backup order.
    pub const ALL: [Table; 8] = [
        Table::Products,
        Table::Sales,
        Table::Expenses,
        Table::MaterialStock,
        Table::MaterialPurchases,
        Table::Suppliers,
        Table::Receivables,
        Table::Payables,
    ];

    /// Table name in the store.
    pub const fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Sales => "sales",
            Table::Expenses => "expenses",
            Table::Suppliers => "suppliers",
            Table::MaterialPurchases => "material_purchases",
            Table::MaterialStock => "material_stock",
            Table::Receivables => "receivables",
            Table::Payables => "payables",
        }
    }

    /// Columns a record in this table may carry, `id` included.
    ///
    /// The gateway rejects any other field name, which is what keeps
    /// dynamically built SQL free of injected identifiers.
    pub const fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Products => &["id", "name", "price", "stock"],
            Table::Sales => &[
                "id",
                "date",
                "product_id",
                "quantity",
                "unit_price",
                "total",
                "payment_method",
                "note",
                "created_at",
            ],
            Table::Expenses => &["id", "date", "category", "description", "amount"],
            Table::Suppliers => &["id", "name", "contact", "address", "supplied_materials"],
            Table::MaterialPurchases => &[
                "id",
                "date",
                "supplier_id",
                "material_name",
                "quantity",
                "unit_price",
                "total",
                "created_at",
            ],
            Table::MaterialStock => &["id", "material_name", "quantity", "unit", "updated_at"],
            Table::Receivables => &[
                "id",
                "customer_name",
                "amount",
                "transaction_date",
                "due_date",
                "status",
            ],
            Table::Payables => &[
                "id",
                "counterparty_name",
                "amount",
                "loan_date",
                "due_date",
                "status",
            ],
        }
    }

    /// Checks whether `field` is a column of this table.
    pub fn has_column(&self, field: &str) -> bool {
        self.columns().contains(&field)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Record Traits
// =============================================================================

/// A stored row with a gateway-assigned id.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Table the entity lives in.
    const TABLE: Table;

    /// Human name used in not-found messages.
    const NAME: &'static str;

    fn id(&self) -> i64;
}

/// An insert payload for a table.
pub trait NewRecord: Serialize + Send + Sync {
    /// What the gateway hands back after insert.
    type Stored: Entity;
}

/// A receivable or payable: something that is either still owed or settled.
///
/// Lets [`crate::aggregation::overdue_list`] treat both ledgers the same way.
pub trait Obligation {
    fn party(&self) -> &str;
    fn amount(&self) -> Money;
    fn due_date(&self) -> Option<NaiveDate>;
    fn is_unpaid(&self) -> bool;
}

// =============================================================================
// Product
// =============================================================================

/// A product on the menu (e.g. "Pempek Lenjer").
///
/// `stock` is edited by hand only; recording a sale never decrements it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: i64,
    /// Display name, unique across products.
    pub name: String,
    /// Current selling price in rupiah.
    pub price: i64,
    pub stock: i64,
}

impl Product {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_rupiah(self.price)
    }
}

impl Entity for Product {
    const TABLE: Table = Table::Products;
    const NAME: &'static str = "Product";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub stock: i64,
}

impl NewRecord for NewProduct {
    type Stored = Product;
}

/// Partial product edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid. Stored with the Indonesian labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash.
    #[serde(rename = "Tunai")]
    Cash,
    /// Transfer, QRIS, card.
    #[serde(rename = "Non-Tunai")]
    NonCash,
    /// Customer pays later; creates a receivable.
    #[serde(rename = "Piutang")]
    Credit,
}

impl PaymentMethod {
    /// Label shown in the dashboard and stored in the `payment_method` column.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Tunai",
            PaymentMethod::NonCash => "Non-Tunai",
            PaymentMethod::Credit => "Piutang",
        }
    }

    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::NonCash, PaymentMethod::Credit];
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

/// A recorded sale.
///
/// Uses the snapshot pattern: `unit_price` and `total` are frozen at the
/// moment of sale so later price edits never rewrite history. `product_id`
/// is nullable because the product may be deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTransaction {
    pub id: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub product_id: Option<i64>,
    pub quantity: i64,
    /// Product price at time of sale (frozen).
    pub unit_price: i64,
    /// `quantity × unit_price` at time of sale (frozen).
    pub total: Option<i64>,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleTransaction {
    /// Sale total, with a missing snapshot counting as zero.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_rupiah(self.total.unwrap_or(0))
    }
}

impl Entity for SaleTransaction {
    const TABLE: Table = Table::Sales;
    const NAME: &'static str = "Sale";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub product_id: Option<i64>,
    pub quantity: i64,
    pub unit_price: i64,
    pub total: i64,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl NewRecord for NewSale {
    type Stored = SaleTransaction;
}

// =============================================================================
// Expense
// =============================================================================

/// Suggested expense categories offered by the expense form.
pub const EXPENSE_CATEGORIES: [&str; 8] = [
    "Bahan Baku",
    "Gas",
    "Minyak",
    "Gaji",
    "Sewa",
    "Listrik & Air",
    "Transportasi",
    "Lainnya",
];

/// Money going out (pengeluaran).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub id: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Free text; conventionally one of [`EXPENSE_CATEGORIES`].
    pub category: String,
    pub description: Option<String>,
    pub amount: i64,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_rupiah(self.amount)
    }
}

impl Entity for Expense {
    const TABLE: Table = Table::Expenses;
    const NAME: &'static str = "Expense";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    pub amount: i64,
}

impl NewRecord for NewExpense {
    type Stored = Expense;
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact: Option<String>,
    pub address: Option<String>,
    /// Free-text description of what this supplier delivers.
    pub supplied_materials: Option<String>,
}

impl Entity for Supplier {
    const TABLE: Table = Table::Suppliers;
    const NAME: &'static str = "Supplier";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub supplied_materials: Option<String>,
}

impl NewRecord for NewSupplier {
    type Stored = Supplier;
}

/// Partial supplier edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplied_materials: Option<String>,
}

// =============================================================================
// Material Purchase
// =============================================================================

/// A purchase of raw material (pembelian bahan).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialPurchase {
    pub id: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub supplier_id: Option<i64>,
    pub material_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    /// `quantity × unit_price` at time of purchase (frozen).
    pub total: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl MaterialPurchase {
    /// Purchase total, with a missing snapshot counting as zero.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_rupiah(self.total.unwrap_or(0))
    }
}

impl Entity for MaterialPurchase {
    const TABLE: Table = Table::MaterialPurchases;
    const NAME: &'static str = "Material purchase";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMaterialPurchase {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub supplier_id: Option<i64>,
    pub material_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub total: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl NewRecord for NewMaterialPurchase {
    type Stored = MaterialPurchase;
}

// =============================================================================
// Material Stock
// =============================================================================

/// Running quantity of one raw material (stok bahan).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialStock {
    pub id: i64,
    /// Unique key; purchases find their stock row by this name.
    pub material_name: String,
    pub quantity: i64,
    /// Unit of measure ("Kg", "Liter", "Pcs").
    pub unit: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for MaterialStock {
    const TABLE: Table = Table::MaterialStock;
    const NAME: &'static str = "Material stock";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMaterialStock {
    pub material_name: String,
    pub quantity: i64,
    pub unit: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl NewRecord for NewMaterialStock {
    type Stored = MaterialStock;
}

/// Partial stock edit. Manual decrements go through here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialStockUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Receivable (Piutang)
// =============================================================================

/// Settlement status of a receivable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ReceivableStatus {
    #[serde(rename = "Belum Bayar")]
    Unpaid,
    #[serde(rename = "Sudah Bayar")]
    Paid,
}

impl Default for ReceivableStatus {
    fn default() -> Self {
        ReceivableStatus::Unpaid
    }
}

/// Money a customer owes the business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receivable {
    pub id: i64,
    pub customer_name: String,
    pub amount: i64,
    #[ts(as = "String")]
    pub transaction_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub status: ReceivableStatus,
}

impl Entity for Receivable {
    const TABLE: Table = Table::Receivables;
    const NAME: &'static str = "Receivable";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Obligation for Receivable {
    fn party(&self) -> &str {
        &self.customer_name
    }

    fn amount(&self) -> Money {
        Money::from_rupiah(self.amount)
    }

    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    fn is_unpaid(&self) -> bool {
        self.status == ReceivableStatus::Unpaid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewReceivable {
    pub customer_name: String,
    pub amount: i64,
    #[ts(as = "String")]
    pub transaction_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub status: ReceivableStatus,
}

impl NewRecord for NewReceivable {
    type Stored = Receivable;
}

// =============================================================================
// Payable (Hutang)
// =============================================================================

/// Settlement status of a payable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PayableStatus {
    #[serde(rename = "Belum Lunas")]
    Unpaid,
    #[serde(rename = "Lunas")]
    Paid,
}

impl Default for PayableStatus {
    fn default() -> Self {
        PayableStatus::Unpaid
    }
}

/// Money the business owes a third party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Payable {
    pub id: i64,
    pub counterparty_name: String,
    pub amount: i64,
    #[ts(as = "String")]
    pub loan_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub status: PayableStatus,
}

impl Entity for Payable {
    const TABLE: Table = Table::Payables;
    const NAME: &'static str = "Payable";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Obligation for Payable {
    fn party(&self) -> &str {
        &self.counterparty_name
    }

    fn amount(&self) -> Money {
        Money::from_rupiah(self.amount)
    }

    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    fn is_unpaid(&self) -> bool {
        self.status == PayableStatus::Unpaid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPayable {
    pub counterparty_name: String,
    pub amount: i64,
    #[ts(as = "String")]
    pub loan_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub status: PayableStatus,
}

impl NewRecord for NewPayable {
    type Stored = Payable;
}

/// Patch that only touches the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate<S> {
    pub status: S,
}

// =============================================================================
// Unit Tests
// =============================================================================
