//! # View State
//!
//! Plain data owned by the presentation layer: the date a list page is
//! showing, and what has been typed into each form.
//!
//! Drafts keep raw text exactly as typed. `to_input` parses it into the
//! typed input a command takes, or returns the first field error. Nothing
//! here touches the gateway or the clock; callers pass "today" in.
//!
//! ```text
//!   user types ──► Draft (Strings) ──to_input()──► SaleInput ──► record_sale
//!                        ▲                │
//!                        └── field error ─┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pembukuan_core::ledger::{ExpenseInput, ObligationInput, PurchaseInput, SaleInput, SupplierInput};
use pembukuan_core::validation::{
    normalize_optional, parse_amount, parse_date, parse_integer, parse_optional_date,
    parse_quantity, validate_customer_name, validate_email, validate_material_name,
    validate_name, validate_password, validate_password_confirmation, validate_product_name,
    validate_stock, ValidationResult,
};
use pembukuan_core::{PaymentMethod, Product, ValidationError, EXPENSE_CATEGORIES};

use crate::auth::SignUpProfile;
use crate::commands::product::ProductInput;
use crate::commands::stock::StockInput;

fn blank_to_none(raw: &str) -> Option<String> {
    normalize_optional(Some(raw))
}

// =============================================================================
// Date Filter
// =============================================================================

/// The date picker above a list page.
///
/// Unset means "all dates", which only the purchase list supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    selected: Option<NaiveDate>,
}

impl DateFilter {
    /// Starts on `today`.
    pub fn new(today: NaiveDate) -> Self {
        DateFilter {
            selected: Some(today),
        }
    }

    /// Starts with no date selected.
    pub fn all() -> Self {
        DateFilter { selected: None }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// The selected date, or `today` when none is selected.
    pub fn day_or(&self, today: NaiveDate) -> NaiveDate {
        self.selected.unwrap_or(today)
    }

    /// Sets the date from the picker's text. Blank clears it.
    ///
    /// On a parse error the previous selection is kept.
    pub fn set(&mut self, raw: &str) -> ValidationResult<()> {
        self.selected = parse_optional_date("date", raw)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn previous_day(&mut self) {
        if let Some(date) = self.selected.and_then(|d| d.pred_opt()) {
            self.selected = Some(date);
        }
    }

    pub fn next_day(&mut self) {
        if let Some(date) = self.selected.and_then(|d| d.succ_opt()) {
            self.selected = Some(date);
        }
    }

    pub fn is_today(&self, today: NaiveDate) -> bool {
        self.selected == Some(today)
    }
}

// =============================================================================
// Ledger Forms
// =============================================================================

/// The "Catat Penjualan" form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub product_id: Option<i64>,
    pub quantity: String,
    pub payment_method: PaymentMethod,
    /// Only shown when the payment method is Credit.
    pub customer_name: String,
    pub note: String,
}

impl Default for SaleDraft {
    fn default() -> Self {
        SaleDraft {
            product_id: None,
            quantity: "1".to_string(),
            payment_method: PaymentMethod::Cash,
            customer_name: String::new(),
            note: String::new(),
        }
    }
}

impl SaleDraft {
    pub fn to_input(&self) -> ValidationResult<SaleInput> {
        let product_id = self.product_id.ok_or_else(|| ValidationError::Required {
            field: "product_id".to_string(),
        })?;
        let quantity = parse_quantity(&self.quantity)?;
        let customer_name = validate_customer_name(self.payment_method, Some(&self.customer_name))?;

        Ok(SaleInput {
            product_id,
            quantity,
            payment_method: self.payment_method,
            customer_name,
            note: blank_to_none(&self.note),
        })
    }

    /// Clears the form after a successful save.
    pub fn reset(&mut self) {
        *self = SaleDraft::default();
    }
}

/// The "Catat Pembelian" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseDraft {
    pub supplier_id: Option<i64>,
    pub material_name: String,
    pub quantity: String,
    pub unit_price: String,
    /// Blank means today.
    pub date: String,
}

impl PurchaseDraft {
    pub fn to_input(&self, today: NaiveDate) -> ValidationResult<PurchaseInput> {
        Ok(PurchaseInput {
            supplier_id: self.supplier_id,
            material_name: validate_material_name(&self.material_name)?,
            quantity: parse_quantity(&self.quantity)?,
            unit_price: parse_amount("unit_price", &self.unit_price)?,
            date: parse_optional_date("date", &self.date)?.unwrap_or(today),
        })
    }
}

/// The expense form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: String,
}

impl Default for ExpenseDraft {
    fn default() -> Self {
        ExpenseDraft {
            date: String::new(),
            category: EXPENSE_CATEGORIES[0].to_string(),
            description: String::new(),
            amount: String::new(),
        }
    }
}

impl ExpenseDraft {
    pub fn to_input(&self, today: NaiveDate) -> ValidationResult<ExpenseInput> {
        Ok(ExpenseInput {
            date: parse_optional_date("date", &self.date)?.unwrap_or(today),
            category: validate_name("category", &self.category)?,
            description: blank_to_none(&self.description),
            amount: parse_amount("amount", &self.amount)?,
        })
    }
}

/// The receivable and payable forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationDraft {
    pub party: String,
    pub amount: String,
    pub date: String,
    pub due_date: String,
}

impl ObligationDraft {
    pub fn to_input(&self) -> ValidationResult<ObligationInput> {
        Ok(ObligationInput {
            party: validate_name("party", &self.party)?,
            amount: parse_amount("amount", &self.amount)?,
            date: parse_optional_date("date", &self.date)?,
            due_date: parse_optional_date("due_date", &self.due_date)?,
        })
    }
}

// =============================================================================
// Master Data Forms
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: String,
    pub stock: String,
}

impl ProductDraft {
    /// Pre-fills the edit dialog.
    pub fn from_product(product: &Product) -> Self {
        ProductDraft {
            name: product.name.clone(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
        }
    }

    pub fn to_input(&self) -> ValidationResult<ProductInput> {
        let stock = if self.stock.trim().is_empty() {
            0
        } else {
            parse_integer("stock", &self.stock)?
        };
        validate_stock("stock", stock)?;

        Ok(ProductInput {
            name: validate_product_name(&self.name)?,
            price: parse_amount("price", &self.price)?,
            stock,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDraft {
    pub material_name: String,
    pub quantity: String,
    pub unit: String,
}

impl StockDraft {
    pub fn new(default_unit: &str) -> Self {
        StockDraft {
            material_name: String::new(),
            quantity: String::new(),
            unit: default_unit.to_string(),
        }
    }

    pub fn to_input(&self) -> ValidationResult<StockInput> {
        let quantity = parse_integer("quantity", &self.quantity)?;
        validate_stock("quantity", quantity)?;

        Ok(StockInput {
            material_name: validate_material_name(&self.material_name)?,
            quantity,
            unit: validate_name("unit", &self.unit)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDraft {
    pub name: String,
    pub contact: String,
    pub address: String,
    pub supplied_materials: String,
}

impl SupplierDraft {
    pub fn to_input(&self) -> ValidationResult<SupplierInput> {
        Ok(SupplierInput {
            name: validate_name("name", &self.name)?,
            contact: blank_to_none(&self.contact),
            address: blank_to_none(&self.address),
            supplied_materials: blank_to_none(&self.supplied_materials),
        })
    }
}

// =============================================================================
// Sign-up Form
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpDraft {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub display_name: String,
    pub business_name: String,
}

impl SignUpDraft {
    /// Checks the form and returns the profile to sign up with.
    pub fn validate(&self) -> ValidationResult<SignUpProfile> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_password_confirmation(&self.password, &self.password_confirmation)?;

        Ok(SignUpProfile {
            display_name: blank_to_none(&self.display_name),
            business_name: blank_to_none(&self.business_name),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
