//! # Database Error Types
//!
//! Error types for gateway operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)    Memory gateway / column check           │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError (dashboard) ← May wrap as PartiallyApplied               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError ← Serialized for frontend                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Gateway operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Row not found.
    ///
    /// ## When This Occurs
    /// - `update` or `delete` affected zero rows
    /// - `find_by_id` returned nothing
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: i64 },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a second product with the same name
    /// - Inserting a second stock row for the same material
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Purchase referencing a supplier id that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool closed or exhausted
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A record or filter named a field that is not a column of the table.
    #[error("Unknown column '{column}' for table {table}")]
    UnknownColumn { table: String, column: String },

    /// A record could not be converted to or from its typed entity.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// The session is missing, expired or revoked.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id,
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        DbError::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Checks if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::ConnectionFailed
/// sqlx::Error::ColumnDecode   → DbError::Decode
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: 0,
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("Connection pool exhausted".to_string())
            }

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DbError::Decode(err.to_string())
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Decode(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(DbError::not_found("Receivable", 4).to_string(), "Receivable not found: 4");
        assert_eq!(
            DbError::unknown_column("products", "sku").to_string(),
            "Unknown column 'sku' for table products"
        );
        assert!(DbError::not_found("Product", 1).is_not_found());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }
}
