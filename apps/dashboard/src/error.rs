//! # Error Types
//!
//! What commands return, and what the presentation layer receives.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Pembukuan                              │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  recordSale(...)                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  ServiceResult<T>                                                │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Bad input? ─────── ValidationError ────────► Validation        │  │
//! │  │  Missing row? ───── DbError::NotFound ──────► NotFound          │  │
//! │  │  First write failed? DbError ───────────────► Persistence       │  │
//! │  │  Second write failed? ──────────────────────► PartiallyApplied  │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  ApiError { code, message } ────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use pembukuan_core::{CoreError, ValidationError};
use pembukuan_db::DbError;

// =============================================================================
// Auth Error
// =============================================================================

/// Sign-in and session failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account exists but the email link was never followed.
    #[error("Email has not been confirmed")]
    EmailNotVerified,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Bad, expired or unknown token (access or verification).
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The session expired or was signed out.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Database(err.into())
    }
}

// =============================================================================
// Service Error
// =============================================================================

/// Error returned by every command.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before anything was written.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: i64 },

    /// The store failed; nothing was written by this command.
    #[error("Persistence error: {0}")]
    Persistence(DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// The first write of a two-step command succeeded, the second did not.
    ///
    /// ## When This Occurs
    /// - Credit sale saved, receivable insert failed
    /// - Purchase saved, stock upsert failed
    ///
    /// Nothing is rolled back or retried.
    #[error("{completed} was saved but {failed} failed: {source}")]
    PartiallyApplied {
        completed: String,
        failed: String,
        #[source]
        source: Box<ServiceError>,
    },

    /// Building an export file failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl ServiceError {
    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id,
        }
    }

    /// Wraps the failure of a second step after `completed` was written.
    pub fn partially_applied(
        completed: impl Into<String>,
        failed: impl Into<String>,
        source: impl Into<ServiceError>,
    ) -> Self {
        ServiceError::PartiallyApplied {
            completed: completed.into(),
            failed: failed.into(),
            source: Box::new(source.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

/// Converts gateway errors.
///
/// ## Error Mapping
/// ```text
/// DbError::NotFound       → ServiceError::NotFound
/// DbError::Unauthorized   → ServiceError::Auth
/// everything else         → ServiceError::Persistence
/// ```
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::Unauthorized(reason) => {
                ServiceError::Auth(AuthError::Unauthorized(reason))
            }
            other => ServiceError::Persistence(other),
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ServiceError::not_found("Product", id),
            CoreError::RecordNotFound { entity, id } => ServiceError::NotFound { entity, id },
            CoreError::Export(message) => ServiceError::Export(message),
            CoreError::Validation(e) => ServiceError::Validation(e),
        }
    }
}

/// Result type for commands.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// API Error
// =============================================================================

/// What the frontend receives when a command fails.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PARTIALLY_APPLIED",
///   "message": "sale #12 was saved but receivable failed: ..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    DatabaseError,
    AuthError,
    PartiallyApplied,
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{entity} not found: {id}"))
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{field} '{value}' already exists"),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::Unauthorized(reason) => ApiError::new(ErrorCode::AuthError, reason),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(e) => ApiError::new(ErrorCode::ValidationError, e.to_string()),
            AuthError::Database(e) => ApiError::from(e),
            AuthError::Hash(e) => {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::new(ErrorCode::Internal, "Sign-in is unavailable")
            }
            other => ApiError::new(ErrorCode::AuthError, other.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::new(ErrorCode::ValidationError, e.to_string()),
            ServiceError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{entity} not found: {id}"))
            }
            ServiceError::Persistence(e) => ApiError::from(e),
            ServiceError::Auth(e) => ApiError::from(e),
            err @ ServiceError::PartiallyApplied { .. } => {
                ApiError::new(ErrorCode::PartiallyApplied, err.to_string())
            }
            ServiceError::Export(e) => {
                tracing::error!("Export failed: {}", e);
                ApiError::new(ErrorCode::Internal, "Export failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
