//! # SQLite Gateway
//!
//! [`Gateway`] over the sqlx pool.
//!
//! ## Statement Building
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert  → INSERT INTO {table} ({cols}) VALUES (?, …) RETURNING *       │
//! │  update  → UPDATE {table} SET {col} = ?, … WHERE id = ?                 │
//! │  delete  → DELETE FROM {table} WHERE id = ?                             │
//! │  query   → SELECT * FROM {table} WHERE {col} {op} ? AND …               │
//! │            ORDER BY {col} [DESC] LIMIT n                                │
//! │                                                                         │
//! │  Table and column names come only from Table::name / Table::columns;    │
//! │  every value is a bound parameter.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Value Mapping
//! | JSON          | SQLite bind | SQLite read → JSON |
//! |---------------|-------------|--------------------|
//! | null          | NULL        | NULL → null        |
//! | integer       | INTEGER     | INTEGER → number   |
//! | float         | REAL        | REAL → number      |
//! | string        | TEXT        | TEXT → string      |
//! | bool          | INTEGER 0/1 | (read as number)   |

use async_trait::async_trait;
use serde_json::{Number, Value};
use std::sync::Arc;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};
use tracing::debug;

use pembukuan_core::{Session, Table};

use crate::clock::{Clock, SystemClock};
use crate::error::{DbError, DbResult};
use crate::gateway::{authorize, check_record, Gateway, Query, Record};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Gateway backed by the SQLite pool.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("pembukuan.db")).await?;
/// let gateway = SqliteGateway::new(db.pool().clone()).with_clock(clock);
/// let sales: Vec<SaleTransaction> = gateway.query_as(&session, &Query::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteGateway {
    /// A gateway checking sessions against the wall clock.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteGateway {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    /// Checks session expiry against `clock` instead.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn insert(&self, session: &Session, table: Table, mut record: Record) -> DbResult<Record> {
        authorize(session, self.clock.now())?;
        record.remove("id");
        check_record(table, &record)?;

        let sql = if record.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES RETURNING *")
        } else {
            let columns: Vec<&str> = record.keys().map(String::as_str).collect();
            let placeholders = vec!["?"; columns.len()].join(", ");
            format!(
                "INSERT INTO {table} ({}) VALUES ({placeholders}) RETURNING *",
                columns.join(", ")
            )
        };

        let query = record.values().fold(sqlx::query(&sql), bind_json);
        let row = query.fetch_one(&self.pool).await?;
        let stored = row_to_record(&row)?;

        debug!(
            table = %table,
            id = ?stored.get("id"),
            "Inserted record"
        );
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

        if partial.is_empty() {
            return self.ensure_exists(table, id).await;
        }

        let assignments: Vec<String> = partial.keys().map(|k| format!("{k} = ?")).collect();
        let sql = format!("UPDATE {table} SET {} WHERE id = ?", assignments.join(", "));

        let result = partial
            .values()
            .fold(sqlx::query(&sql), bind_json)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(table.name(), id));
        }

        debug!(table = %table, id, fields = partial.len(), "Updated record");
        Ok(())
    }

    async fn delete(&self, session: &Session, table: Table, id: i64) -> DbResult<()> {
        authorize(session, self.clock.now())?;

        let sql = format!("DELETE FROM {table} WHERE id = ?");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(table.name(), id));
        }

        debug!(table = %table, id, "Deleted record");
        Ok(())
    }

    async fn query(&self, session: &Session, table: Table, query: &Query) -> DbResult<Vec<Record>> {
        authorize(session, self.clock.now())?;
        query.check_columns(table)?;

        let mut sql = format!("SELECT * FROM {table}");
        if !query.filters.is_empty() {
            let conditions: Vec<String> = query
                .filters
                .iter()
                .map(|f| format!("{} {} ?", f.field, f.op.sql()))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        match &query.order {
            Some(order) => {
                let direction = if order.descending { "DESC" } else { "ASC" };
                sql.push_str(&format!(" ORDER BY {} {direction}, id {direction}", order.field));
            }
            None => sql.push_str(" ORDER BY id ASC"),
        }
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows = query
            .filters
            .iter()
            .map(|f| &f.value)
            .fold(sqlx::query(&sql), bind_json)
            .fetch_all(&self.pool)
            .await?;

        debug!(table = %table, count = rows.len(), "Queried records");
        rows.iter().map(row_to_record).collect()
    }
}

impl SqliteGateway {
    async fn ensure_exists(&self, table: Table, id: i64) -> DbResult<()> {
        let sql = format!("SELECT id FROM {table} WHERE id = ?");
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| DbError::not_found(table.name(), id))
    }
}

// =============================================================================
// Value Conversion
// =============================================================================

fn bind_json<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => query.bind(s.clone()),
        // Nested values are stored as their JSON text
        other => query.bind(other.to_string()),
    }
}

fn row_to_record(row: &SqliteRow) -> DbResult<Record> {
    let mut record = Record::new();

    for column in row.columns() {
        let ordinal = column.ordinal();
        let raw = row.try_get_raw(ordinal)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get::<i64, _>(ordinal)?),
                "REAL" => Number::from_f64(row.try_get::<f64, _>(ordinal)?)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                "TEXT" => Value::String(row.try_get::<String, _>(ordinal)?),
                other => {
                    return Err(DbError::Decode(format!(
                        "unsupported column type {other} for {}",
                        column.name()
                    )))
                }
            }
        };

        record.insert(column.name().to_string(), value);
    }

    Ok(record)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayExt;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, NaiveDate, Utc};
    use pembukuan_core::{
        MaterialStock, MaterialStockUpdate, NewMaterialStock, NewProduct, NewSale, PaymentMethod,
        Product, SaleTransaction,
    };
    use serde_json::json;

    async fn gateway() -> SqliteGateway {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.gateway()
    }

    fn session() -> Session {
        Session {
            user_id: 1,
            email: "putri@example.com".to_string(),
            access_token: "token".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn lenjer(gw: &SqliteGateway) -> Product {
        gw.insert_as(
            &session(),
            &NewProduct {
                name: "Pempek Lenjer".to_string(),
                price: 5000,
                stock: 40,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_round_trips() {
        let gw = gateway().await;
        let product = lenjer(&gw).await;

        assert!(product.id > 0);
        let found: Product = gw.get_by_id(&session(), product.id).await.unwrap();
        assert_eq!(found, product);
    }

    #[tokio::test]
    async fn test_sale_dates_and_enums_survive_storage() {
        let gw = gateway().await;
        let product = lenjer(&gw).await;
        let now = Utc::now();

        let sale: SaleTransaction = gw
            .insert_as(
                &session(),
                &NewSale {
                    date: date(2026, 10, 19),
                    product_id: Some(product.id),
                    quantity: 3,
                    unit_price: 5000,
                    total: 15000,
                    payment_method: PaymentMethod::NonCash,
                    note: Some("pedas".to_string()),
                    created_at: now,
                },
            )
            .await
            .unwrap();

        assert_eq!(sale.date, date(2026, 10, 19));
        assert_eq!(sale.payment_method, PaymentMethod::NonCash);
        assert_eq!(sale.total, Some(15000));
        assert_eq!(sale.created_at, now);
    }

    #[tokio::test]
    async fn test_query_filters_and_orders() {
        let gw = gateway().await;
        for (name, qty) in [("Tepung Sagu", 12), ("Cuka", 3), ("Ikan Tenggiri", 9)] {
            let _: MaterialStock = gw
                .insert_as(
                    &session(),
                    &NewMaterialStock {
                        material_name: name.to_string(),
                        quantity: qty,
                        unit: "Kg".to_string(),
                        updated_at: Utc::now(),
                    },
                )
                .await
                .unwrap();
        }

        let low: Vec<MaterialStock> = gw
            .query_as(&session(), &Query::new().lt("quantity", 10).order_by("material_name"))
            .await
            .unwrap();
        let names: Vec<&str> = low.iter().map(|s| s.material_name.as_str()).collect();
        assert_eq!(names, ["Cuka", "Ikan Tenggiri"]);

        let first: Vec<MaterialStock> = gw
            .query_as(&session(), &Query::new().order_by_desc("quantity").limit(1))
            .await
            .unwrap();
        assert_eq!(first[0].material_name, "Tepung Sagu");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_is_not_found() {
        let gw = gateway().await;
        let patch = MaterialStockUpdate {
            quantity: Some(5),
            ..Default::default()
        };

        let err = gw
            .update_with(&session(), Table::MaterialStock, 99, &patch)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = gw.delete(&session(), Table::Products, 99).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let gw = gateway().await;
        let product = lenjer(&gw).await;

        let mut partial = Record::new();
        partial.insert("price".to_string(), json!(6000));
        gw.update(&session(), Table::Products, product.id, partial)
            .await
            .unwrap();

        let updated: Product = gw.get_by_id(&session(), product.id).await.unwrap();
        assert_eq!(updated.price, 6000);
        assert_eq!(updated.stock, 40);
    }

    #[tokio::test]
    async fn test_duplicate_product_name_is_unique_violation() {
        let gw = gateway().await;
        lenjer(&gw).await;

        let mut record = Record::new();
        record.insert("name".to_string(), json!("Pempek Lenjer"));
        record.insert("price".to_string(), json!(1));
        record.insert("stock".to_string(), json!(0));

        let err = gw
            .insert(&session(), Table::Products, record)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_column_rejected() {
        let gw = gateway().await;
        let mut record = Record::new();
        record.insert("sku".to_string(), json!("X"));

        let err = gw
            .insert(&session(), Table::Products, record)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownColumn { .. }));
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let gw = gateway().await;
        let mut expired = session();
        expired.expires_at = Utc::now() - Duration::minutes(1);

        let err = gw
            .query(&expired, Table::Sales, &Query::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_deleting_product_keeps_sale() {
        let gw = gateway().await;
        let product = lenjer(&gw).await;
        let sale: SaleTransaction = gw
            .insert_as(
                &session(),
                &NewSale {
                    date: date(2026, 10, 19),
                    product_id: Some(product.id),
                    quantity: 1,
                    unit_price: 5000,
                    total: 5000,
                    payment_method: PaymentMethod::Cash,
                    note: None,
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        gw.delete(&session(), Table::Products, product.id).await.unwrap();

        let kept: SaleTransaction = gw.get_by_id(&session(), sale.id).await.unwrap();
        assert_eq!(kept.product_id, None);
        assert_eq!(kept.total, Some(5000));
    }
}
