//! # Error Types
//!
//! Domain-specific error types for pembukuan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pembukuan-core errors (this file)                                     │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pembukuan-db errors (separate crate)                                  │
//! │  └── DbError          - Gateway failures                               │
//! │                                                                         │
//! │  dashboard errors (app)                                                │
//! │  ├── ServiceError     - What a command returns                         │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Validation always happens before any write

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product referenced by a sale cannot be found.
    ///
    /// ## When This Occurs
    /// - The product was deleted between loading the sale form and submitting it
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Any other referenced ledger row is missing.
    #[error("{entity} not found: {id}")]
    RecordNotFound { entity: String, id: i64 },

    /// Writing an exported report failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Raised before any write reaches the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., non-numeric quantity, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Two fields that must agree do not (password confirmation).
    #[error("{field} does not match")]
    Mismatch { field: String },

    /// Computed amount does not fit in the ledger's integer columns.
    #[error("{field} is too large")]
    Overflow { field: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }

    pub(crate) fn must_not_be_negative(field: &str) -> Self {
        ValidationError::MustNotBeNegative {
            field: field.to_string(),
        }
    }

    pub(crate) fn overflow(field: &str) -> Self {
        ValidationError::Overflow {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
