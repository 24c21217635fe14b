//! # Purchase Commands
//!
//! ## Record Flow
//! ```text
//! PurchaseInput
//!     │ plan_purchase (validate, total = qty × unit_price)
//!     ▼
//! insert material_purchases ──✗──► Persistence (nothing written)
//!     │ ✓
//!     ▼
//! find material_stock by name
//!     │ plan_stock_upsert
//!     ├── found   → update quantity += qty, updated_at = now
//!     └── missing → insert {qty, default unit}
//!     │
//!     ✗ anywhere here ──► PartiallyApplied (purchase row stays)
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use pembukuan_core::aggregation::sum_purchases;
use pembukuan_core::ledger::{plan_purchase, plan_stock_upsert, PurchaseInput, StockUpsert};
use pembukuan_core::{MaterialPurchase, MaterialStock, Money, Session, Table};
use pembukuan_db::{Gateway, GatewayExt, Query};

use crate::error::{ServiceError, ServiceResult};
use crate::state::AppContext;

/// What `record_purchase` wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPurchase {
    pub purchase: MaterialPurchase,
    /// The stock row after the purchase was applied.
    pub stock: MaterialStock,
}

/// The purchase history page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseList {
    pub purchases: Vec<MaterialPurchase>,
    /// Spend across `purchases`.
    pub total: Money,
}

/// Records a material purchase and adds it to stock.
///
/// ## Errors
/// - `Validation` on bad input (nothing written)
/// - `Persistence` if the purchase insert fails
/// - `PartiallyApplied` if the purchase was saved but stock was not updated
pub async fn record_purchase(
    ctx: &AppContext,
    session: &Session,
    input: PurchaseInput,
) -> ServiceResult<RecordedPurchase> {
    debug!(material = %input.material_name, quantity = input.quantity, "record_purchase command");

    let new = plan_purchase(&input, ctx.now())?;

    let purchase: MaterialPurchase = ctx
        .gateway()
        .insert_as(session, &new)
        .await
        .map_err(ServiceError::Persistence)?;

    let stock = match apply_to_stock(ctx, session, &purchase).await {
        Ok(stock) => stock,
        Err(e) => {
            warn!(purchase_id = purchase.id, error = %e, "Purchase saved, stock update failed");
            return Err(ServiceError::partially_applied(
                format!("purchase #{}", purchase.id),
                "stock update",
                e,
            ));
        }
    };

    info!(
        purchase_id = purchase.id,
        material = %purchase.material_name,
        quantity = purchase.quantity,
        stock = stock.quantity,
        "Purchase recorded"
    );

    Ok(RecordedPurchase { purchase, stock })
}

/// The stock half of a purchase.
async fn apply_to_stock(
    ctx: &AppContext,
    session: &Session,
    purchase: &MaterialPurchase,
) -> ServiceResult<MaterialStock> {
    let gateway = ctx.gateway();
    let now = ctx.now();

    let query = Query::new()
        .eq("material_name", purchase.material_name.as_str())
        .limit(1);
    let mut rows: Vec<MaterialStock> = gateway.query_as(session, &query).await?;
    let existing = rows.pop();

    let upsert = plan_stock_upsert(
        existing.as_ref(),
        &purchase.material_name,
        purchase.quantity,
        &ctx.config().default_unit,
        now,
    )?;

    match (upsert, existing) {
        (StockUpsert::Increment { id, update }, Some(mut stock)) => {
            gateway
                .update_with(session, Table::MaterialStock, id, &update)
                .await?;
            if let Some(quantity) = update.quantity {
                stock.quantity = quantity;
            }
            stock.updated_at = now;
            debug!(stock_id = id, quantity = stock.quantity, "Stock incremented");
            Ok(stock)
        }
        (StockUpsert::Create(new), _) => {
            let stock: MaterialStock = gateway.insert_as(session, &new).await?;
            debug!(stock_id = stock.id, "Stock row created");
            Ok(stock)
        }
        (StockUpsert::Increment { id, .. }, None) => Err(ServiceError::not_found("Material stock", id)),
    }
}

/// Purchases, newest first. With `date`, only that day's.
pub async fn list_purchases(
    ctx: &AppContext,
    session: &Session,
    date: Option<NaiveDate>,
) -> ServiceResult<PurchaseList> {
    let mut query = Query::new().order_by_desc("id");
    if let Some(date) = date {
        query = query.on_date("date", date);
    }

    let purchases: Vec<MaterialPurchase> = ctx.gateway().query_as(session, &query).await?;
    let total = sum_purchases(&purchases);

    Ok(PurchaseList { purchases, total })
}

/// Deletes a purchase record. Stock is left as it is.
pub async fn delete_purchase(ctx: &AppContext, session: &Session, id: i64) -> ServiceResult<()> {
    ctx.gateway().delete(session, Table::MaterialPurchases, id).await?;
    info!(purchase_id = id, "Purchase deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, today};
    use chrono::Days;
    use pembukuan_core::NewMaterialStock;
    use pembukuan_db::Operation;

    fn input(material: &str, quantity: i64, unit_price: i64) -> PurchaseInput {
        PurchaseInput {
            supplier_id: None,
            material_name: material.to_string(),
            quantity,
            unit_price,
            date: today(),
        }
    }

    #[tokio::test]
    async fn test_existing_material_is_incremented() {
        let (ctx, gw, session) = fixture();
        let sagu: MaterialStock = gw
            .insert_as(
                &session,
                &NewMaterialStock {
                    material_name: "Tepung Sagu".to_string(),
                    quantity: 5,
                    unit: "Karung".to_string(),
                    updated_at: ctx.now() - chrono::Duration::days(3),
                },
            )
            .await
            .unwrap();

        let recorded = record_purchase(&ctx, &session, input("Tepung Sagu", 10, 12000))
            .await
            .unwrap();
        assert_eq!(recorded.purchase.total, Some(120000));
        assert_eq!(recorded.stock.id, sagu.id);
        assert_eq!(recorded.stock.quantity, 15);

        let stored: MaterialStock = gw.get_by_id(&session, sagu.id).await.unwrap();
        assert_eq!(stored.quantity, 15);
        assert_eq!(stored.unit, "Karung");
        assert_eq!(stored.updated_at, ctx.now());
        assert_eq!(gw.count(Table::MaterialStock).await, 1);
    }

    #[tokio::test]
    async fn test_new_material_creates_row_with_default_unit() {
        let (ctx, gw, session) = fixture();

        let recorded = record_purchase(&ctx, &session, input("Ikan Tenggiri", 4, 80000))
            .await
            .unwrap();
        assert_eq!(recorded.stock.material_name, "Ikan Tenggiri");
        assert_eq!(recorded.stock.quantity, 4);
        assert_eq!(recorded.stock.unit, "Kg");
        assert_eq!(gw.count(Table::MaterialStock).await, 1);
    }

    #[tokio::test]
    async fn test_stock_failure_is_partially_applied() {
        let (ctx, gw, session) = fixture();
        gw.fail_on(Table::MaterialStock, Operation::Insert).await;

        let err = record_purchase(&ctx, &session, input("Telur", 2, 30000))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PartiallyApplied { .. }));
        assert_eq!(gw.count(Table::MaterialPurchases).await, 1);
        assert_eq!(gw.count(Table::MaterialStock).await, 0);
    }

    #[tokio::test]
    async fn test_invalid_purchase_writes_nothing() {
        let (ctx, gw, session) = fixture();

        for bad in [input("  ", 1, 1000), input("Telur", 0, 1000), input("Telur", 1, -1)] {
            let err = record_purchase(&ctx, &session, bad).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        assert_eq!(gw.count(Table::MaterialPurchases).await, 0);
    }

    #[tokio::test]
    async fn test_list_with_date_filter_and_total() {
        let (ctx, _gw, session) = fixture();
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();

        let mut old = input("Cuka", 2, 15000);
        old.date = yesterday;
        record_purchase(&ctx, &session, old).await.unwrap();
        record_purchase(&ctx, &session, input("Telur", 3, 30000)).await.unwrap();
        record_purchase(&ctx, &session, input("Cuka", 1, 15000)).await.unwrap();

        let all = list_purchases(&ctx, &session, None).await.unwrap();
        assert_eq!(all.purchases.len(), 3);
        assert_eq!(all.purchases[0].material_name, "Cuka");
        assert_eq!(all.total.rupiah(), 30000 + 90000 + 15000);

        let today_only = list_purchases(&ctx, &session, Some(today())).await.unwrap();
        assert_eq!(today_only.purchases.len(), 2);
        assert_eq!(today_only.total.rupiah(), 105000);
    }
}
