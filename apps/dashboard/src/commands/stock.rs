//! # Material Stock Commands
//!
//! Purchases add to stock automatically; everything else on this page is
//! manual, including decrements as material is used up.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pembukuan_core::ledger::{plan_material_stock, StockLevel};
use pembukuan_core::validation::{validate_material_name, validate_name, validate_stock};
use pembukuan_core::{MaterialStock, MaterialStockUpdate, Session, Table, LOW_STOCK_THRESHOLD};
use pembukuan_db::{Gateway, GatewayExt, Query};

use crate::error::ServiceResult;
use crate::state::AppContext;

/// What the stock form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInput {
    pub material_name: String,
    pub quantity: i64,
    pub unit: String,
}

/// A stock row with its badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub stock: MaterialStock,
    pub level: StockLevel,
}

/// All materials by name, each classified against the low-stock threshold.
pub async fn list_stock(ctx: &AppContext, session: &Session) -> ServiceResult<Vec<StockRow>> {
    let query = Query::new().order_by("material_name");
    let stocks: Vec<MaterialStock> = ctx.gateway().query_as(session, &query).await?;

    Ok(stocks
        .into_iter()
        .map(|stock| StockRow {
            level: StockLevel::classify(stock.quantity, LOW_STOCK_THRESHOLD),
            stock,
        })
        .collect())
}

pub async fn create_stock(
    ctx: &AppContext,
    session: &Session,
    input: StockInput,
) -> ServiceResult<MaterialStock> {
    let new = plan_material_stock(&input.material_name, input.quantity, &input.unit, ctx.now())?;
    let stock: MaterialStock = ctx.gateway().insert_as(session, &new).await?;

    info!(stock_id = stock.id, material = %stock.material_name, quantity = stock.quantity, "Stock row created");
    Ok(stock)
}

/// Applies a manual edit and stamps `updated_at`.
pub async fn update_stock(
    ctx: &AppContext,
    session: &Session,
    id: i64,
    mut update: MaterialStockUpdate,
) -> ServiceResult<()> {
    if let Some(name) = &update.material_name {
        update.material_name = Some(validate_material_name(name)?);
    }
    if let Some(quantity) = update.quantity {
        validate_stock("quantity", quantity)?;
    }
    if let Some(unit) = &update.unit {
        update.unit = Some(validate_name("unit", unit)?);
    }
    update.updated_at = Some(ctx.now());

    ctx.gateway()
        .update_with(session, Table::MaterialStock, id, &update)
        .await?;

    debug!(stock_id = id, quantity = ?update.quantity, "Stock updated");
    Ok(())
}

pub async fn delete_stock(ctx: &AppContext, session: &Session, id: i64) -> ServiceResult<()> {
    ctx.gateway().delete(session, Table::MaterialStock, id).await?;
    info!(stock_id = id, "Stock row deleted");
    Ok(())
}
