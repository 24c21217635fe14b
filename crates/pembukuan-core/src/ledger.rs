//! # Ledger Write Rules
//!
//! Pure planning for every ledger write. Commands in the dashboard load what
//! they need, call a `plan_*` function here, then hand the planned records
//! to the persistence gateway.
//!
//! ## Two-Step Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Record Sale                                                            │
//! │    plan_sale(product, input, today, now)                                │
//! │      ├── NewSale { total = quantity × product.price }   ← step 1        │
//! │      └── NewReceivable (Credit only)                    ← step 2        │
//! │                                                                         │
//! │  Record Material Purchase                                               │
//! │    plan_purchase(input, now)       → NewMaterialPurchase ← step 1       │
//! │    plan_stock_upsert(existing, …)  → StockUpsert         ← step 2       │
//! │      ├── Increment { id, quantity += purchased }                        │
//! │      └── Create { quantity = purchased, unit = default }                │
//! │                                                                         │
//! │  Step 2 is planned up front where possible so a validation failure      │
//! │  never leaves step 1 behind.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are computed exactly once, here, and frozen into the record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::MAX_AMOUNT;
use crate::types::{
    MaterialStock, MaterialStockUpdate, NewExpense, NewMaterialPurchase, NewMaterialStock,
    NewPayable, NewProduct, NewReceivable, NewSale, NewSupplier, Obligation, PayableStatus,
    PaymentMethod, Product, ReceivableStatus,
};
use crate::validation::{
    normalize_optional, validate_amount, validate_customer_name, validate_material_name,
    validate_name, validate_product_name, validate_quantity, validate_stock,
};

// =============================================================================
// Sales
// =============================================================================

/// What the sale form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleInput {
    pub product_id: i64,
    pub quantity: i64,
    pub payment_method: PaymentMethod,
    /// Required when `payment_method` is Credit.
    pub customer_name: Option<String>,
    pub note: Option<String>,
}

/// The records a sale produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalePlan {
    pub sale: NewSale,
    /// Present only for credit sales.
    pub receivable: Option<NewReceivable>,
}

/// Plans a sale of `product`.
///
/// ## Snapshot Rule
/// `unit_price` and `total` are copied from the product *now*. Editing the
/// product price afterwards never changes this sale.
///
/// ## Errors
/// - `MustBePositive` if quantity ≤ 0
/// - `Required` if Credit and no customer name
/// - `Overflow` if `quantity × price` exceeds [`MAX_AMOUNT`]
///
/// ## Example
/// ```rust
/// use chrono::{NaiveDate, Utc};
/// use pembukuan_core::ledger::{plan_sale, SaleInput};
/// use pembukuan_core::types::{PaymentMethod, Product};
///
/// let lenjer = Product { id: 1, name: "Pempek Lenjer".into(), price: 5000, stock: 40 };
/// let input = SaleInput {
///     product_id: 1,
///     quantity: 3,
///     payment_method: PaymentMethod::Cash,
///     customer_name: None,
///     note: None,
/// };
/// let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
///
/// let plan = plan_sale(&lenjer, &input, today, Utc::now()).unwrap();
/// assert_eq!(plan.sale.total, 15000);
/// assert!(plan.receivable.is_none());
/// ```
pub fn plan_sale(
    product: &Product,
    input: &SaleInput,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> CoreResult<SalePlan> {
    validate_quantity(input.quantity)?;
    let customer = validate_customer_name(input.payment_method, input.customer_name.as_deref())?;

    let total = line_total(product.price(), input.quantity)?;

    let sale = NewSale {
        date: today,
        product_id: Some(product.id),
        quantity: input.quantity,
        unit_price: product.price,
        total: total.rupiah(),
        payment_method: input.payment_method,
        note: normalize_optional(input.note.as_deref()),
        created_at: now,
    };

    let receivable = customer.map(|customer_name| NewReceivable {
        customer_name,
        amount: total.rupiah(),
        transaction_date: today,
        due_date: None,
        status: ReceivableStatus::Unpaid,
    });

    Ok(SalePlan { sale, receivable })
}

/// `unit_price × quantity`, bounded by [`MAX_AMOUNT`].
fn line_total(unit_price: Money, quantity: i64) -> CoreResult<Money> {
    unit_price
        .checked_multiply_quantity(quantity)
        .filter(|total| total.rupiah() <= MAX_AMOUNT)
        .ok_or_else(|| ValidationError::overflow("total").into())
}

// =============================================================================
// Material Purchases & Stock
// =============================================================================

/// What the purchase form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseInput {
    pub supplier_id: Option<i64>,
    pub material_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

/// Plans the purchase row with its total precomputed.
pub fn plan_purchase(input: &PurchaseInput, now: DateTime<Utc>) -> CoreResult<NewMaterialPurchase> {
    let material_name = validate_material_name(&input.material_name)?;
    validate_quantity(input.quantity)?;
    validate_amount("unit_price", input.unit_price)?;

    let total = line_total(Money::from_rupiah(input.unit_price), input.quantity)?;

    Ok(NewMaterialPurchase {
        date: input.date,
        supplier_id: input.supplier_id,
        material_name,
        quantity: input.quantity,
        unit_price: input.unit_price,
        total: total.rupiah(),
        created_at: now,
    })
}

/// How the stock row for a purchased material changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockUpsert {
    /// The material already has a row; add to it.
    Increment {
        id: i64,
        update: MaterialStockUpdate,
    },
    /// First purchase of this material.
    Create(NewMaterialStock),
}

/// Plans the stock change caused by purchasing `quantity` of `material_name`.
///
/// `existing` is the stock row whose name matches, if any. The unit of an
/// existing row is never changed.
pub fn plan_stock_upsert(
    existing: Option<&MaterialStock>,
    material_name: &str,
    quantity: i64,
    default_unit: &str,
    now: DateTime<Utc>,
) -> CoreResult<StockUpsert> {
    validate_quantity(quantity)?;

    match existing {
        Some(stock) => {
            let quantity = stock
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| ValidationError::overflow("quantity"))?;

            Ok(StockUpsert::Increment {
                id: stock.id,
                update: MaterialStockUpdate {
                    quantity: Some(quantity),
                    updated_at: Some(now),
                    ..Default::default()
                },
            })
        }
        None => Ok(StockUpsert::Create(NewMaterialStock {
            material_name: validate_material_name(material_name)?,
            quantity,
            unit: default_unit.to_string(),
            updated_at: now,
        })),
    }
}

/// Stock health of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum StockLevel {
    /// Nothing left.
    Out,
    /// Below the threshold.
    Low,
    Ok,
}

impl StockLevel {
    /// Classifies a quantity against `threshold` (see [`crate::LOW_STOCK_THRESHOLD`]).
    pub fn classify(quantity: i64, threshold: i64) -> Self {
        if quantity <= 0 {
            StockLevel::Out
        } else if quantity < threshold {
            StockLevel::Low
        } else {
            StockLevel::Ok
        }
    }

    /// Badge text on the stock page.
    pub const fn label(&self) -> &'static str {
        match self {
            StockLevel::Out => "Habis",
            StockLevel::Low => "Menipis",
            StockLevel::Ok => "Aman",
        }
    }

    #[inline]
    pub fn needs_restock(&self) -> bool {
        !matches!(self, StockLevel::Ok)
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// Outcome of marking a receivable or payable paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum MarkPaid {
    /// Status moved Unpaid → Paid.
    MarkedPaid,
    /// Already settled; nothing was written.
    AlreadyPaid,
}

/// Decides the Unpaid → Paid transition. There is no way back.
pub fn mark_paid<O: Obligation>(record: &O) -> MarkPaid {
    if record.is_unpaid() {
        MarkPaid::MarkedPaid
    } else {
        MarkPaid::AlreadyPaid
    }
}

// =============================================================================
// Simple Records
// =============================================================================

/// What the expense form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseInput {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    pub amount: i64,
}

pub fn plan_expense(input: &ExpenseInput) -> CoreResult<NewExpense> {
    let category = validate_name("category", &input.category)?;
    validate_amount("amount", input.amount)?;

    Ok(NewExpense {
        date: input.date,
        category,
        description: normalize_optional(input.description.as_deref()),
        amount: input.amount,
    })
}

pub fn plan_product(name: &str, price: i64, stock: i64) -> CoreResult<NewProduct> {
    let name = validate_product_name(name)?;
    validate_amount("price", price)?;
    validate_stock("stock", stock)?;

    Ok(NewProduct { name, price, stock })
}

/// What the supplier form submits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInput {
    pub name: String,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub supplied_materials: Option<String>,
}

pub fn plan_supplier(input: &SupplierInput) -> CoreResult<NewSupplier> {
    Ok(NewSupplier {
        name: validate_name("name", &input.name)?,
        contact: normalize_optional(input.contact.as_deref()),
        address: normalize_optional(input.address.as_deref()),
        supplied_materials: normalize_optional(input.supplied_materials.as_deref()),
    })
}

/// A stock row entered by hand on the stock page.
pub fn plan_material_stock(
    material_name: &str,
    quantity: i64,
    unit: &str,
    now: DateTime<Utc>,
) -> CoreResult<NewMaterialStock> {
    validate_stock("quantity", quantity)?;

    Ok(NewMaterialStock {
        material_name: validate_material_name(material_name)?,
        quantity,
        unit: validate_name("unit", unit)?,
        updated_at: now,
    })
}

/// What the receivable/payable form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ObligationInput {
    /// Customer (receivable) or creditor (payable).
    pub party: String,
    pub amount: i64,
    /// Transaction or loan date; defaults to today.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
}

pub fn plan_receivable(input: &ObligationInput, today: NaiveDate) -> CoreResult<NewReceivable> {
    validate_amount("amount", input.amount)?;

    Ok(NewReceivable {
        customer_name: validate_name("customer_name", &input.party)?,
        amount: input.amount,
        transaction_date: input.date.unwrap_or(today),
        due_date: input.due_date,
        status: ReceivableStatus::Unpaid,
    })
}

pub fn plan_payable(input: &ObligationInput, today: NaiveDate) -> CoreResult<NewPayable> {
    validate_amount("amount", input.amount)?;

    Ok(NewPayable {
        counterparty_name: validate_name("counterparty_name", &input.party)?,
        amount: input.amount,
        loan_date: input.date.unwrap_or(today),
        due_date: input.due_date,
        status: PayableStatus::Unpaid,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{Payable, Receivable};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-10-19T04:30:00Z".parse().unwrap()
    }

    fn product(id: i64, name: &str, price: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            price,
            stock: 40,
        }
    }

    fn sale_input(quantity: i64, method: PaymentMethod, customer: Option<&str>) -> SaleInput {
        SaleInput {
            product_id: 1,
            quantity,
            payment_method: method,
            customer_name: customer.map(str::to_string),
            note: None,
        }
    }

    #[test]
    fn test_cash_sale_freezes_total() {
        let mut lenjer = product(1, "Pempek Lenjer", 5000);
        let plan = plan_sale(&lenjer, &sale_input(3, PaymentMethod::Cash, None), today(), now())
            .unwrap();

        assert_eq!(plan.sale.unit_price, 5000);
        assert_eq!(plan.sale.total, 15000);
        assert_eq!(plan.sale.date, today());
        assert!(plan.receivable.is_none());

        // A later price edit does not touch the planned record
        lenjer.price = 6000;
        assert_eq!(plan.sale.total, 15000);
    }

    #[test]
    fn test_credit_sale_plans_receivable() {
        let kapal_selam = product(2, "Pempek Kapal Selam", 7000);
        let plan = plan_sale(
            &kapal_selam,
            &sale_input(2, PaymentMethod::Credit, Some("Budi")),
            today(),
            now(),
        )
        .unwrap();

        let receivable = plan.receivable.unwrap();
        assert_eq!(receivable.customer_name, "Budi");
        assert_eq!(receivable.amount, 14000);
        assert_eq!(receivable.transaction_date, today());
        assert_eq!(receivable.status, ReceivableStatus::Unpaid);
    }

    #[test]
    fn test_sale_rejects_bad_input() {
        let lenjer = product(1, "Pempek Lenjer", 5000);

        let err = plan_sale(&lenjer, &sale_input(0, PaymentMethod::Cash, None), today(), now())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));

        let err = plan_sale(&lenjer, &sale_input(1, PaymentMethod::Credit, None), today(), now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Required { .. })));

        let pricey = product(3, "Emas", i64::MAX);
        assert!(plan_sale(&pricey, &sale_input(2, PaymentMethod::Cash, None), today(), now()).is_err());
    }

    #[test]
    fn test_plan_purchase() {
        let input = PurchaseInput {
            supplier_id: Some(4),
            material_name: " Ikan Tenggiri ".to_string(),
            quantity: 5,
            unit_price: 80000,
            date: today(),
        };
        let purchase = plan_purchase(&input, now()).unwrap();
        assert_eq!(purchase.material_name, "Ikan Tenggiri");
        assert_eq!(purchase.total, 400000);

        let blank = PurchaseInput {
            material_name: "".to_string(),
            ..input
        };
        assert!(plan_purchase(&blank, now()).is_err());
    }

    #[test]
    fn test_stock_upsert_increments_existing() {
        let existing = MaterialStock {
            id: 9,
            material_name: "Tepung Sagu".to_string(),
            quantity: 12,
            unit: "Karung".to_string(),
            updated_at: "2026-10-01T00:00:00Z".parse().unwrap(),
        };

        let plan = plan_stock_upsert(Some(&existing), "Tepung Sagu", 5, "Kg", now()).unwrap();
        match plan {
            StockUpsert::Increment { id, update } => {
                assert_eq!(id, 9);
                assert_eq!(update.quantity, Some(17));
                assert_eq!(update.unit, None);
                assert_eq!(update.updated_at, Some(now()));
            }
            other => panic!("expected increment, got {other:?}"),
        }
    }

    #[test]
    fn test_stock_upsert_creates_new_material() {
        let plan = plan_stock_upsert(None, "Cuka", 3, "Kg", now()).unwrap();
        assert_eq!(
            plan,
            StockUpsert::Create(NewMaterialStock {
                material_name: "Cuka".to_string(),
                quantity: 3,
                unit: "Kg".to_string(),
                updated_at: now(),
            })
        );
    }

    #[test]
    fn test_stock_level_classify() {
        assert_eq!(StockLevel::classify(0, 10), StockLevel::Out);
        assert_eq!(StockLevel::classify(9, 10), StockLevel::Low);
        assert_eq!(StockLevel::classify(10, 10), StockLevel::Ok);
        assert!(StockLevel::Low.needs_restock());
        assert_eq!(StockLevel::Out.label(), "Habis");
    }

    #[test]
    fn test_mark_paid_transitions() {
        let mut receivable = Receivable {
            id: 1,
            customer_name: "Budi".to_string(),
            amount: 14000,
            transaction_date: today(),
            due_date: None,
            status: ReceivableStatus::Unpaid,
        };
        assert_eq!(mark_paid(&receivable), MarkPaid::MarkedPaid);

        receivable.status = ReceivableStatus::Paid;
        assert_eq!(mark_paid(&receivable), MarkPaid::AlreadyPaid);

        let payable = Payable {
            id: 2,
            counterparty_name: "Toko Bahan Jaya".to_string(),
            amount: 500000,
            loan_date: today(),
            due_date: None,
            status: PayableStatus::Paid,
        };
        assert_eq!(mark_paid(&payable), MarkPaid::AlreadyPaid);
    }

    #[test]
    fn test_payable_loan_date_defaults_to_today() {
        let input = ObligationInput {
            party: "Koperasi".to_string(),
            amount: 1_000_000,
            date: None,
            due_date: NaiveDate::from_ymd_opt(2026, 11, 19),
        };
        let payable = plan_payable(&input, today()).unwrap();
        assert_eq!(payable.loan_date, today());
        assert_eq!(payable.status, PayableStatus::Unpaid);
    }

    #[test]
    fn test_plan_expense_trims() {
        let expense = plan_expense(&ExpenseInput {
            date: today(),
            category: " Gas ".to_string(),
            description: Some("".to_string()),
            amount: 20000,
        })
        .unwrap();
        assert_eq!(expense.category, "Gas");
        assert_eq!(expense.description, None);
    }

    #[test]
    fn test_amounts_above_ledger_bound_are_rejected() {
        let half = i64::MAX / 2 + 1;
        let err = plan_expense(&ExpenseInput {
            date: today(),
            category: "Sewa".to_string(),
            description: None,
            amount: half,
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Overflow { .. })));

        // Each factor is fine on its own, the product is not.
        let input = PurchaseInput {
            supplier_id: None,
            material_name: "Ikan Tenggiri".to_string(),
            quantity: 1_000_000,
            unit_price: MAX_AMOUNT / 1000,
            date: today(),
        };
        let err = plan_purchase(&input, now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Overflow { .. })));

        let bulk = product(4, "Paket Besar", MAX_AMOUNT / 2);
        let plan = plan_sale(&bulk, &sale_input(2, PaymentMethod::Cash, None), today(), now())
            .unwrap();
        assert_eq!(plan.sale.total, MAX_AMOUNT);
    }
}
