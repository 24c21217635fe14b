//! # In-Memory Gateway
//!
//! A [`Gateway`] over plain maps, for tests and demos.
//!
//! Mirrors the SQLite gateway's observable behaviour: ids ascend per table,
//! unique names are enforced, deleting a product or supplier clears the
//! reference on dependent rows, and missing ids are `NotFound`.
//!
//! ## Failure Injection
//! ```rust,ignore
//! let gateway = MemoryGateway::new();
//! gateway.fail_on(Table::Receivables, Operation::Insert).await;
//! // every receivable insert now returns DbError::QueryFailed
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use pembukuan_core::{Session, Table};

use crate::clock::{Clock, SystemClock};
use crate::error::{DbError, DbResult};
use crate::gateway::{authorize, check_record, compare_values, Gateway, Query, Record};

/// Gateway operation, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Update,
    Delete,
    Query,
}

#[derive(Debug, Default)]
struct Store {
    tables: HashMap<Table, BTreeMap<i64, Record>>,
    last_ids: HashMap<Table, i64>,
    failures: HashSet<(Table, Operation)>,
}

impl Store {
    fn check_failure(&self, table: Table, op: Operation) -> DbResult<()> {
        if self.failures.contains(&(table, op)) {
            return Err(DbError::QueryFailed(format!(
                "injected {op:?} failure on {table}"
            )));
        }
        Ok(())
    }

    fn rows(&mut self, table: Table) -> &mut BTreeMap<i64, Record> {
        self.tables.entry(table).or_default()
    }

    fn check_unique(&self, table: Table, id: Option<i64>, record: &Record) -> DbResult<()> {
        let Some(column) = unique_column(table) else {
            return Ok(());
        };
        let Some(value) = record.get(column) else {
            return Ok(());
        };

        let clash = self
            .tables
            .get(&table)
            .into_iter()
            .flat_map(|rows| rows.iter())
            .any(|(row_id, row)| Some(*row_id) != id && row.get(column) == Some(value));

        if clash {
            return Err(DbError::duplicate(
                format!("{table}.{column}"),
                value.as_str().unwrap_or_default(),
            ));
        }
        Ok(())
    }

    /// `ON DELETE SET NULL` for the two references in the schema.
    fn clear_references(&mut self, table: Table, id: i64) {
        let (child, column) = match table {
            Table::Products => (Table::Sales, "product_id"),
            Table::Suppliers => (Table::MaterialPurchases, "supplier_id"),
            _ => return,
        };

        for row in self.rows(child).values_mut() {
            if row.get(column).and_then(Value::as_i64) == Some(id) {
                row.insert(column.to_string(), Value::Null);
            }
        }
    }
}

fn unique_column(table: Table) -> Option<&'static str> {
    match table {
        Table::Products => Some("name"),
        Table::MaterialStock => Some("material_name"),
        _ => None,
    }
}

/// Gateway holding every table in memory.
#[derive(Debug)]
pub struct MemoryGateway {
    store: Mutex<Store>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        MemoryGateway {
            store: Mutex::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        MemoryGateway::default()
    }

    /// Checks session expiry against `clock` instead of the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Makes every later `op` on `table` fail until [`MemoryGateway::clear_failures`].
    pub async fn fail_on(&self, table: Table, op: Operation) {
        self.store.lock().await.failures.insert((table, op));
    }

    pub async fn clear_failures(&self) {
        self.store.lock().await.failures.clear();
    }

    /// Number of rows in `table`, bypassing the session check.
    pub async fn count(&self, table: Table) -> usize {
        self.store
            .lock()
            .await
            .tables
            .get(&table)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn insert(&self, session: &Session, table: Table, mut record: Record) -> DbResult<Record> {
        authorize(session, self.clock.now())?;
        record.remove("id");
        check_record(table, &record)?;

        let mut store = self.store.lock().await;
        store.check_failure(table, Operation::Insert)?;
        store.check_unique(table, None, &record)?;

        let id = {
            let last = store.last_ids.entry(table).or_insert(0);
            *last += 1;
            *last
        };

        // Absent columns read back as NULL, like SELECT *
        let mut stored = Record::new();
        for column in table.columns() {
            stored.insert(column.to_string(), Value::Null);
        }
        stored.extend(record);
        stored.insert("id".to_string(), Value::from(id));

        store.rows(table).insert(id, stored.clone());

        debug!(table = %table, id, "Inserted record");
        Ok(stored)
    }

    async fn update(
        &self,
        session: &Session,
        table: Table,
        id: i64,
        partial: Record,
    ) -> DbResult<()> {
        authorize(session, self.clock.now())?;
        check_record(table, &partial)?;
        if partial.contains_key("id") {
            return Err(DbError::QueryFailed(format!("{table}.id cannot be updated")));
        }

        let mut store = self.store.lock().await;
        store.check_failure(table, Operation::Update)?;
        if !store.rows(table).contains_key(&id) {
            return Err(DbError::not_found(table.name(), id));
        }
        store.check_unique(table, Some(id), &partial)?;

        if let Some(row) = store.rows(table).get_mut(&id) {
            row.extend(partial);
        }

        debug!(table = %table, id, "Updated record");
        Ok(())
    }

    async fn delete(&self, session: &Session, table: Table, id: i64) -> DbResult<()> {
        authorize(session, self.clock.now())?;

        let mut store = self.store.lock().await;
        store.check_failure(table, Operation::Delete)?;
        if store.rows(table).remove(&id).is_none() {
            return Err(DbError::not_found(table.name(), id));
        }
        store.clear_references(table, id);

        debug!(table = %table, id, "Deleted record");
        Ok(())
    }

    async fn query(&self, session: &Session, table: Table, query: &Query) -> DbResult<Vec<Record>> {
        authorize(session, self.clock.now())?;
        query.check_columns(table)?;

        let mut store = self.store.lock().await;
        store.check_failure(table, Operation::Query)?;

        let mut rows: Vec<Record> = store
            .rows(table)
            .values()
            .filter(|row| {
                query.filters.iter().all(|f| {
                    compare_values(field_of(row, &f.field), &f.value)
                        .is_some_and(|ord| f.op.accepts(ord))
                })
            })
            .cloned()
            .collect();

        if let Some(order) = &query.order {
            // NULLs first ascending and ties by id, as the SQL ORDER BY does
            rows.sort_by(|a, b| {
                let ord = match (field_of(a, &order.field), field_of(b, &order.field)) {
                    (Value::Null, Value::Null) => Ordering::Equal,
                    (Value::Null, _) => Ordering::Less,
                    (_, Value::Null) => Ordering::Greater,
                    (x, y) => compare_values(x, y).unwrap_or(Ordering::Equal),
                }
                .then_with(|| {
                    compare_values(field_of(a, "id"), field_of(b, "id")).unwrap_or(Ordering::Equal)
                });

                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }

        Ok(rows)
    }
}

fn field_of<'a>(row: &'a Record, field: &str) -> &'a Value {
    row.get(field).unwrap_or(&Value::Null)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::gateway::GatewayExt;
    use chrono::{Duration, NaiveDate, Utc};
    use pembukuan_core::{NewProduct, NewSupplier, Product, Supplier};
    use serde_json::json;

    fn session() -> Session {
        Session {
            user_id: 1,
            email: "putri@example.com".to_string(),
            access_token: "token".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    fn new_product(name: &str, price: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price,
            stock: 10,
        }
    }

    #[tokio::test]
    async fn test_ids_ascend_per_table() {
        let gw = MemoryGateway::new();
        let a: Product = gw.insert_as(&session(), &new_product("Lenjer", 5000)).await.unwrap();
        let b: Product = gw.insert_as(&session(), &new_product("Adaan", 6000)).await.unwrap();
        let s: Supplier = gw
            .insert_as(
                &session(),
                &NewSupplier {
                    name: "Toko Ikan Segar".to_string(),
                    contact: None,
                    address: None,
                    supplied_materials: None,
                },
            )
            .await
            .unwrap();

        assert_eq!((a.id, b.id, s.id), (1, 2, 1));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let gw = MemoryGateway::new();
        gw.fail_on(Table::Products, Operation::Insert).await;

        let err = gw
            .insert_as(&session(), &new_product("Lenjer", 5000))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));
        assert_eq!(gw.count(Table::Products).await, 0);

        gw.clear_failures().await;
        assert!(gw.insert_as(&session(), &new_product("Lenjer", 5000)).await.is_ok());
    }

    #[tokio::test]
    async fn test_filters_order_and_limit() {
        let gw = MemoryGateway::new();
        for (name, price) in [("Lenjer", 5000), ("Adaan", 6000), ("Kulit", 4000), ("Tahu", 6000)] {
            let _: Product = gw.insert_as(&session(), &new_product(name, price)).await.unwrap();
        }

        let rows: Vec<Product> = gw
            .query_as(&session(), &Query::new().gte("price", 5000).order_by_desc("price"))
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Tahu", "Adaan", "Lenjer"]);

        let rows: Vec<Product> = gw
            .query_as(&session(), &Query::new().order_by("name").limit(2))
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Adaan", "Kulit"]);
    }

    #[tokio::test]
    async fn test_unique_name_enforced() {
        let gw = MemoryGateway::new();
        let _: Product = gw.insert_as(&session(), &new_product("Lenjer", 5000)).await.unwrap();

        let err = gw
            .insert_as(&session(), &new_product("Lenjer", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_missing_id_not_found() {
        let gw = MemoryGateway::new();
        let mut partial = Record::new();
        partial.insert("price".to_string(), json!(1));

        assert!(gw
            .update(&session(), Table::Products, 7, partial)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(gw
            .delete(&session(), Table::Payables, 7)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_null_never_matches_filter() {
        let gw = MemoryGateway::new();
        let mut record = Record::new();
        record.insert("customer_name".to_string(), json!("Budi"));
        record.insert("amount".to_string(), json!(14000));
        record.insert("transaction_date".to_string(), json!("2026-10-19"));
        record.insert("status".to_string(), json!("Belum Bayar"));
        gw.insert(&session(), Table::Receivables, record).await.unwrap();

        let rows = gw
            .query(&session(), Table::Receivables, &Query::new().lte("due_date", "2026-12-31"))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_session_expiry_follows_injected_clock() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2020, 1, 6).unwrap());
        let gw = MemoryGateway::new().with_clock(Arc::new(clock));

        // Long expired by the wall clock, still live at the gateway's clock.
        let mut old = session();
        old.expires_at = clock.now() + Duration::hours(1);
        assert!(gw.query(&old, Table::Sales, &Query::new()).await.is_ok());

        old.expires_at = clock.now() - Duration::minutes(1);
        let err = gw.query(&old, Table::Sales, &Query::new()).await.unwrap_err();
        assert!(matches!(err, DbError::Unauthorized(_)));
    }
}
