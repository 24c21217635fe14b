//! # Supplier Commands

use tracing::{debug, info};

use pembukuan_core::ledger::{plan_supplier, SupplierInput};
use pembukuan_core::validation::{normalize_optional, validate_name};
use pembukuan_core::{MaterialPurchase, Session, Supplier, SupplierUpdate, Table, SUPPLIER_RECENT_PURCHASES};
use pembukuan_db::{Gateway, GatewayExt, Query};

use crate::error::ServiceResult;
use crate::state::AppContext;

/// All suppliers, by name.
pub async fn list_suppliers(ctx: &AppContext, session: &Session) -> ServiceResult<Vec<Supplier>> {
    let query = Query::new().order_by("name");
    Ok(ctx.gateway().query_as(session, &query).await?)
}

pub async fn create_supplier(
    ctx: &AppContext,
    session: &Session,
    input: SupplierInput,
) -> ServiceResult<Supplier> {
    let new = plan_supplier(&input)?;
    let supplier: Supplier = ctx.gateway().insert_as(session, &new).await?;

    info!(supplier_id = supplier.id, name = %supplier.name, "Supplier created");
    Ok(supplier)
}

/// Applies a partial edit. A blank optional field is stored as empty text,
/// which clears it on the supplier card.
pub async fn update_supplier(
    ctx: &AppContext,
    session: &Session,
    id: i64,
    mut update: SupplierUpdate,
) -> ServiceResult<()> {
    if let Some(name) = &update.name {
        update.name = Some(validate_name("name", name)?);
    }
    for field in [&mut update.contact, &mut update.address, &mut update.supplied_materials] {
        if let Some(value) = field.as_deref() {
            *field = Some(normalize_optional(Some(value)).unwrap_or_default());
        }
    }

    ctx.gateway()
        .update_with(session, Table::Suppliers, id, &update)
        .await?;

    debug!(supplier_id = id, "Supplier updated");
    Ok(())
}

/// Deletes a supplier. Its purchases stay, with `supplier_id` cleared.
pub async fn delete_supplier(ctx: &AppContext, session: &Session, id: i64) -> ServiceResult<()> {
    ctx.gateway().delete(session, Table::Suppliers, id).await?;
    info!(supplier_id = id, "Supplier deleted");
    Ok(())
}

/// The most recent purchases from one supplier, newest first.
pub async fn recent_purchases(
    ctx: &AppContext,
    session: &Session,
    supplier_id: i64,
) -> ServiceResult<Vec<MaterialPurchase>> {
    let query = Query::new()
        .eq("supplier_id", supplier_id)
        .order_by_desc("id")
        .limit(SUPPLIER_RECENT_PURCHASES as u32);
    Ok(ctx.gateway().query_as(session, &query).await?)
}
