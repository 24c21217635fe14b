//! # Persistence Gateway
//!
//! The one seam between the dashboard and storage.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert(session, table, record)        → record with id                 │
//! │  update(session, table, id, partial)   → ()                             │
//! │  delete(session, table, id)            → ()                             │
//! │  query(session, table, Query)          → [record]                       │
//! │                                                                         │
//! │  Query = filters [{field, op ∈ eq|gte|lte|lt, value}]                   │
//! │          + order? + limit?                                              │
//! │                                                                         │
//! │  Every call:                                                            │
//! │    1. rejects a session expired by the gateway's Clock → Unauthorized   │
//! │    2. rejects unknown field names     → DbError::UnknownColumn          │
//! │    3. update/delete of a missing id   → DbError::NotFound               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are JSON objects. [`GatewayExt`] converts them to and from the
//! typed entities in `pembukuan-core`.
//!
//! ## Implementations
//! - [`crate::SqliteGateway`] - production, over the sqlx pool
//! - [`crate::MemoryGateway`] - tests and demos, with failure injection

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use pembukuan_core::{DateRange, Entity, NewRecord, Session, Table};

use crate::error::{DbError, DbResult};

/// A row as it crosses the gateway.
pub type Record = serde_json::Map<String, Value>;

// =============================================================================
// Query Model
// =============================================================================

/// Comparison used by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    Lt,
}

impl FilterOp {
    /// SQL operator text.
    pub const fn sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::Lt => "<",
        }
    }

    /// Whether a field comparing as `ordering` against the filter value passes.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
            FilterOp::Lt => ordering == Ordering::Less,
        }
    }
}

/// One `field op value` condition. Conditions in a [`Query`] are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub descending: bool,
}

/// Filtered read of one table.
///
/// Without an explicit order, rows come back by ascending id.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use pembukuan_db::Query;
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
/// let query = Query::new().on_date("date", today).order_by_desc("id").limit(20);
/// assert_eq!(query.filters.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn filter(mut self, field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Gte, value)
    }

    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Lte, value)
    }

    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Lt, value)
    }

    /// Rows whose date column equals `date`.
    pub fn on_date(self, field: &str, date: NaiveDate) -> Self {
        self.eq(field, date.to_string())
    }

    /// Rows whose date column falls within `range` (inclusive).
    pub fn within(self, field: &str, range: DateRange) -> Self {
        self.gte(field, range.start.to_string())
            .lte(field, range.end.to_string())
    }

    pub fn order_by(mut self, field: &str) -> Self {
        self.order = Some(Order {
            field: field.to_string(),
            descending: false,
        });
        self
    }

    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.order = Some(Order {
            field: field.to_string(),
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Checks every field name against the table's columns.
    pub fn check_columns(&self, table: Table) -> DbResult<()> {
        let fields = self
            .filters
            .iter()
            .map(|f| f.field.as_str())
            .chain(self.order.iter().map(|o| o.field.as_str()));

        for field in fields {
            check_column(table, field)?;
        }
        Ok(())
    }
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// Table-scoped CRUD plus filtered query.
///
/// The session is passed into every call; implementations never hold one.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Inserts `record` and returns it with its assigned `id`.
    ///
    /// Any `id` in `record` is ignored.
    async fn insert(&self, session: &Session, table: Table, record: Record) -> DbResult<Record>;

    /// Sets the fields in `partial` on row `id`.
    async fn update(&self, session: &Session, table: Table, id: i64, partial: Record)
        -> DbResult<()>;

    async fn delete(&self, session: &Session, table: Table, id: i64) -> DbResult<()>;

    async fn query(&self, session: &Session, table: Table, query: &Query) -> DbResult<Vec<Record>>;
}

/// Typed helpers over any [`Gateway`].
#[async_trait]
pub trait GatewayExt: Gateway {
    /// Inserts a typed payload and returns the stored entity.
    async fn insert_as<N: NewRecord>(&self, session: &Session, new: &N) -> DbResult<N::Stored> {
        let record = to_record(new)?;
        let stored = self.insert(session, <N::Stored as Entity>::TABLE, record).await?;
        from_record(stored)
    }

    /// Applies a serializable patch (`*Update` types, [`pembukuan_core::StatusUpdate`]).
    async fn update_with<P>(&self, session: &Session, table: Table, id: i64, patch: &P) -> DbResult<()>
    where
        P: Serialize + Sync,
    {
        let partial = to_record(patch)?;
        self.update(session, table, id, partial).await
    }

    async fn query_as<E: Entity>(&self, session: &Session, query: &Query) -> DbResult<Vec<E>> {
        self.query(session, E::TABLE, query)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    async fn find_by_id<E: Entity>(&self, session: &Session, id: i64) -> DbResult<Option<E>> {
        let query = Query::new().eq("id", id).limit(1);
        let mut rows: Vec<E> = self.query_as(session, &query).await?;
        Ok(rows.pop())
    }

    /// Like [`GatewayExt::find_by_id`] but a missing row is `NotFound`.
    async fn get_by_id<E: Entity>(&self, session: &Session, id: i64) -> DbResult<E> {
        self.find_by_id(session, id)
            .await?
            .ok_or_else(|| DbError::not_found(E::NAME, id))
    }
}

impl<G: Gateway + ?Sized> GatewayExt for G {}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Rejects a session that has expired as of `now`.
pub(crate) fn authorize(session: &Session, now: DateTime<Utc>) -> DbResult<()> {
    if session.access_token.is_empty() {
        return Err(DbError::Unauthorized("no active session".to_string()));
    }
    if session.is_expired_at(now) {
        return Err(DbError::Unauthorized("session expired".to_string()));
    }
    Ok(())
}

pub(crate) fn check_column(table: Table, field: &str) -> DbResult<()> {
    if table.has_column(field) {
        Ok(())
    } else {
        Err(DbError::unknown_column(table.name(), field))
    }
}

/// Checks every key of `record`.
pub(crate) fn check_record(table: Table, record: &Record) -> DbResult<()> {
    record.keys().try_for_each(|field| check_column(table, field))
}

/// Serializes a value that must become a JSON object.
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> DbResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DbError::Decode(format!("expected an object, got {other}"))),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> DbResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Orders two JSON values the way SQLite compares column values.
///
/// `None` when either side is null or the kinds differ; such a pair never
/// satisfies a filter.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn noon() -> DateTime<Utc> {
        "2026-10-19T12:00:00Z".parse().unwrap()
    }

    fn session(valid_for: Duration) -> Session {
        Session {
            user_id: 1,
            email: "putri@example.com".to_string(),
            access_token: "token".to_string(),
            expires_at: noon() + valid_for,
        }
    }

    #[test]
    fn test_filter_op_accepts() {
        assert!(FilterOp::Eq.accepts(Ordering::Equal));
        assert!(FilterOp::Gte.accepts(Ordering::Greater));
        assert!(!FilterOp::Lt.accepts(Ordering::Equal));
        assert!(FilterOp::Lte.accepts(Ordering::Equal));
    }

    #[test]
    fn test_query_checks_columns() {
        let ok = Query::new().eq("material_name", "Sagu").order_by("quantity");
        assert!(ok.check_columns(Table::MaterialStock).is_ok());

        let bad = Query::new().eq("name; DROP TABLE sales", 1);
        assert!(matches!(
            bad.check_columns(Table::Sales),
            Err(DbError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_within_builds_inclusive_bounds() {
        let end = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let query = Query::new().within("date", DateRange::trailing_week(end));
        assert_eq!(query.filters[0].value, json!("2026-10-13"));
        assert_eq!(query.filters[0].op, FilterOp::Gte);
        assert_eq!(query.filters[1].value, json!("2026-10-19"));
    }

    #[test]
    fn test_authorize_rejects_expired() {
        let live = session(Duration::hours(1));
        assert!(authorize(&live, noon()).is_ok());
        assert!(matches!(
            authorize(&live, noon() + Duration::hours(2)),
            Err(DbError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize(&session(Duration::hours(-1)), noon()),
            Err(DbError::Unauthorized(_))
        ));

        let mut signed_out = session(Duration::hours(1));
        signed_out.access_token.clear();
        assert!(authorize(&signed_out, noon()).is_err());
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&json!(3), &json!(10)), Some(Ordering::Less));
        assert_eq!(
            compare_values(&json!("2026-10-19"), &json!("2026-10-13")),
            Some(Ordering::Greater)
        );
        assert_eq!(compare_values(&json!(null), &json!(null)), None);
        assert_eq!(compare_values(&json!("1"), &json!(1)), None);
    }

    #[test]
    fn test_to_record_rejects_non_objects() {
        assert!(to_record(&json!({"name": "Sagu"})).is_ok());
        assert!(matches!(to_record(&5), Err(DbError::Decode(_))));
    }
}
