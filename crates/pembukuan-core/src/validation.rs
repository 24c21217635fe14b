//! # Validation Module
//!
//! Input validation for every ledger write and the sign-up form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form drafts (dashboard view state)                           │
//! │  ├── Raw text → numbers/dates (parse_* below)                          │
//! │  └── Immediate feedback per field                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ledger planning (pembukuan-core::ledger)                     │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store (SQLite)                                               │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (product name, material name)                              │
//! │                                                                         │
//! │  Nothing reaches the gateway until layers 1 and 2 pass.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pembukuan_core::validation::{validate_quantity, validate_material_name};
//!
//! assert!(validate_quantity(3).is_ok());
//! assert_eq!(validate_material_name("  Tepung Sagu ").unwrap(), "Tepung Sagu");
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::PaymentMethod;
use crate::MAX_AMOUNT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest name accepted for products, materials, suppliers and parties.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name field and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    validate_name("name", name)
}

/// Validates a material name. Stock rows are matched on the trimmed name.
///
/// ## Example
/// ```rust
/// use pembukuan_core::validation::validate_material_name;
///
/// assert!(validate_material_name("Ikan Tenggiri").is_ok());
/// assert!(validate_material_name("   ").is_err());
/// ```
pub fn validate_material_name(name: &str) -> ValidationResult<String> {
    validate_name("material_name", name)
}

/// Validates the customer name of a sale.
///
/// ## Rules
/// - Required when the payment method is Credit (the receivable needs a debtor)
/// - Otherwise ignored
pub fn validate_customer_name(
    method: PaymentMethod,
    customer: Option<&str>,
) -> ValidationResult<Option<String>> {
    match method {
        PaymentMethod::Credit => {
            validate_name("customer_name", customer.unwrap_or_default()).map(Some)
        }
        PaymentMethod::Cash | PaymentMethod::NonCash => Ok(None),
    }
}

/// Trims optional free text, mapping blank to `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    Ok(())
}

/// Validates a rupiah amount (price, expense, debt).
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, placeholder debts)
/// - At most [`MAX_AMOUNT`]
pub fn validate_amount(field: &str, rupiah: i64) -> ValidationResult<()> {
    if rupiah < 0 {
        return Err(ValidationError::must_not_be_negative(field));
    }
    if rupiah > MAX_AMOUNT {
        return Err(ValidationError::overflow(field));
    }

    Ok(())
}

/// Validates a stock count. Manual decrements may reach zero but not below.
pub fn validate_stock(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::must_not_be_negative(field));
    }

    Ok(())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an email address. Returns it trimmed and lowercased.
///
/// ## Rules
/// - Must not be empty
/// - Must contain `@` with text on both sides
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_lowercase())
        }
        _ => Err(ValidationError::invalid_format("email", "must contain @")),
    }
}

/// Validates a new password.
///
/// ## Rules
/// - At least [`MIN_PASSWORD_LEN`] characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates that the confirmation field repeats the password.
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> ValidationResult<()> {
    if password != confirmation {
        return Err(ValidationError::Mismatch {
            field: "password_confirmation".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Text Parsers (form input)
// =============================================================================

/// Parses a whole number typed into a form field.
///
/// Accepts `.` thousands separators as typed in Indonesian locale
/// (`15.000`).
pub fn parse_integer(field: &str, raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::required(field));
    }

    let digits: String = raw.chars().filter(|c| *c != '.').collect();
    digits
        .parse::<i64>()
        .map_err(|_| ValidationError::invalid_format(field, format!("{raw:?} is not a number")))
}

/// Parses and validates a quantity typed into a form.
pub fn parse_quantity(raw: &str) -> ValidationResult<i64> {
    let qty = parse_integer("quantity", raw)?;
    validate_quantity(qty)?;
    Ok(qty)
}

/// Parses and validates a rupiah amount typed into a form.
pub fn parse_amount(field: &str, raw: &str) -> ValidationResult<i64> {
    let amount = parse_integer(field, raw)?;
    validate_amount(field, amount)?;
    Ok(amount)
}

/// Parses an ISO `YYYY-MM-DD` date typed into a form.
pub fn parse_date(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::required(field));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_format(field, "expected YYYY-MM-DD"))
}

/// Parses an optional date field; blank means unset.
pub fn parse_optional_date(field: &str, raw: &str) -> ValidationResult<Option<NaiveDate>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    parse_date(field, raw).map(Some)
}

// =============================================================================
// Unit Tests
// =============================================================================
