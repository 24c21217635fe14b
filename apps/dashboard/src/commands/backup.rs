//! # Backup Command
//!
//! Dumps every table into one JSON document:
//!
//! ```text
//! {
//!   "backup_date": "2026-10-19T12:00:00+00:00",
//!   "data": { "products": [...], "sales_transactions": [...], ... }
//! }
//! ```
//!
//! Rows are written exactly as the gateway returns them.

use serde_json::{json, Map, Value};
use tracing::info;

use pembukuan_core::{Session, Table};
use pembukuan_db::{Gateway, Query, Record};

use crate::error::{ServiceError, ServiceResult};
use crate::state::AppContext;

use super::report::ExportFile;

pub async fn export_backup(ctx: &AppContext, session: &Session) -> ServiceResult<ExportFile> {
    let data = read_all_tables(ctx, session).await?;
    let rows: usize = data.values().filter_map(Value::as_array).map(Vec::len).sum();

    let document = json!({
        "backup_date": ctx.now().to_rfc3339(),
        "data": data,
    });
    let bytes =
        serde_json::to_vec_pretty(&document).map_err(|e| ServiceError::Export(e.to_string()))?;
    let filename = format!("backup-{}-{}.json", ctx.config().business_slug(), ctx.today());

    info!(filename = %filename, rows, "Backup exported");
    Ok(ExportFile { filename, bytes })
}

async fn read_all_tables(ctx: &AppContext, session: &Session) -> ServiceResult<Map<String, Value>> {
    let gateway = ctx.gateway();
    let all = Query::new();
    let [t0, t1, t2, t3, t4, t5, t6, t7] = Table::ALL;

    let tables = tokio::try_join!(
        gateway.query(session, t0, &all),
        gateway.query(session, t1, &all),
        gateway.query(session, t2, &all),
        gateway.query(session, t3, &all),
        gateway.query(session, t4, &all),
        gateway.query(session, t5, &all),
        gateway.query(session, t6, &all),
        gateway.query(session, t7, &all),
    )?;
    let (r0, r1, r2, r3, r4, r5, r6, r7) = tables;

    let mut data = Map::new();
    for (table, rows) in Table::ALL.into_iter().zip([r0, r1, r2, r3, r4, r5, r6, r7]) {
        data.insert(table.name().to_string(), rows_to_value(rows));
    }
    Ok(data)
}

fn rows_to_value(rows: Vec<Record>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}
