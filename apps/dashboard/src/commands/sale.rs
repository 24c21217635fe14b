//! # Sale Commands
//!
//! A credit sale is two independent writes: the sale, then a receivable.
//! They are not wrapped in a transaction. If the receivable insert fails
//! the sale stays and the caller gets `PartiallyApplied`.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use pembukuan_core::ledger::{plan_sale, SaleInput};
use pembukuan_core::{CoreError, Product, Receivable, SaleTransaction, Session, Table};
use pembukuan_db::{Gateway, GatewayExt, Query};

use crate::error::{ServiceError, ServiceResult};
use crate::state::AppContext;

/// What `record_sale` wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedSale {
    pub sale: SaleTransaction,
    /// Present for credit sales.
    pub receivable: Option<Receivable>,
}

/// Records a sale of one product, freezing its current price.
///
/// ## Errors
/// - `Validation` on bad input (nothing written)
/// - `NotFound` if the product does not exist
/// - `Persistence` if the sale insert fails
/// - `PartiallyApplied` if the sale was saved but its receivable was not
///
/// Product stock is not touched.
pub async fn record_sale(
    ctx: &AppContext,
    session: &Session,
    input: SaleInput,
) -> ServiceResult<RecordedSale> {
    debug!(product_id = input.product_id, quantity = input.quantity, "record_sale command");

    let gateway = ctx.gateway();
    let product: Product = gateway
        .find_by_id(session, input.product_id)
        .await?
        .ok_or(CoreError::ProductNotFound(input.product_id))?;

    let plan = plan_sale(&product, &input, ctx.today(), ctx.now())?;

    let sale: SaleTransaction = gateway
        .insert_as(session, &plan.sale)
        .await
        .map_err(ServiceError::Persistence)?;

    let receivable = match plan.receivable {
        Some(new) => {
            let result: Result<Receivable, _> = gateway.insert_as(session, &new).await;
            match result {
                Ok(receivable) => Some(receivable),
                Err(e) => {
                    warn!(sale_id = sale.id, error = %e, "Sale saved, receivable insert failed");
                    return Err(ServiceError::partially_applied(
                        format!("sale #{}", sale.id),
                        "receivable",
                        e,
                    ));
                }
            }
        }
        None => None,
    };

    info!(
        sale_id = sale.id,
        product = %product.name,
        total = sale.total().rupiah(),
        method = %sale.payment_method,
        "Sale recorded"
    );

    Ok(RecordedSale { sale, receivable })
}

/// Sales on `date`, newest first.
pub async fn list_sales(
    ctx: &AppContext,
    session: &Session,
    date: NaiveDate,
) -> ServiceResult<Vec<SaleTransaction>> {
    let query = Query::new().on_date("date", date).order_by_desc("id");
    Ok(ctx.gateway().query_as(session, &query).await?)
}

/// Deletes a sale. Any receivable it created is kept.
pub async fn delete_sale(ctx: &AppContext, session: &Session, id: i64) -> ServiceResult<()> {
    ctx.gateway().delete(session, Table::Sales, id).await?;
    info!(sale_id = id, "Sale deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, today};
    use pembukuan_core::aggregation::daily_totals;
    use pembukuan_core::{Expense, NewProduct, PaymentMethod, ProductUpdate, ReceivableStatus};
    use pembukuan_db::{MemoryGateway, Operation};

    async fn add_product(gw: &MemoryGateway, session: &Session, name: &str, price: i64) -> Product {
        gw.insert_as(
            session,
            &NewProduct {
                name: name.to_string(),
                price,
                stock: 40,
            },
        )
        .await
        .unwrap()
    }

    fn sale_input(product_id: i64, quantity: i64, method: PaymentMethod) -> SaleInput {
        SaleInput {
            product_id,
            quantity,
            payment_method: method,
            customer_name: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_cash_sale_round_trip() {
        let (ctx, gw, session) = fixture();
        let lenjer = add_product(&gw, &session, "Pempek Lenjer", 5000).await;

        let recorded = record_sale(&ctx, &session, sale_input(lenjer.id, 3, PaymentMethod::Cash))
            .await
            .unwrap();
        assert_eq!(recorded.sale.total, Some(15000));
        assert_eq!(recorded.sale.date, today());
        assert!(recorded.receivable.is_none());

        let sales = list_sales(&ctx, &session, today()).await.unwrap();
        let totals = daily_totals(&sales, &[] as &[Expense], today());
        assert_eq!(totals.sales_total.rupiah(), 15000);

        let after: Product = gw.get_by_id(&session, lenjer.id).await.unwrap();
        assert_eq!(after.stock, 40);
        assert_eq!(gw.count(Table::Receivables).await, 0);
    }

    #[tokio::test]
    async fn test_credit_sale_creates_receivable() {
        let (ctx, gw, session) = fixture();
        let kapal = add_product(&gw, &session, "Pempek Kapal Selam", 7000).await;

        let mut input = sale_input(kapal.id, 2, PaymentMethod::Credit);
        input.customer_name = Some("Budi".to_string());

        let recorded = record_sale(&ctx, &session, input).await.unwrap();
        let receivable = recorded.receivable.unwrap();
        assert_eq!(receivable.customer_name, "Budi");
        assert_eq!(receivable.amount, 14000);
        assert_eq!(receivable.status, ReceivableStatus::Unpaid);
        assert_eq!(receivable.transaction_date, today());
    }

    #[tokio::test]
    async fn test_price_edit_does_not_rewrite_history() {
        let (ctx, gw, session) = fixture();
        let lenjer = add_product(&gw, &session, "Pempek Lenjer", 5000).await;
        record_sale(&ctx, &session, sale_input(lenjer.id, 3, PaymentMethod::Cash))
            .await
            .unwrap();

        gw.update_with(
            &session,
            Table::Products,
            lenjer.id,
            &ProductUpdate {
                price: Some(6000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let sales = list_sales(&ctx, &session, today()).await.unwrap();
        assert_eq!(sales[0].unit_price, 5000);
        assert_eq!(sales[0].total, Some(15000));
    }

    #[tokio::test]
    async fn test_receivable_failure_is_partially_applied() {
        let (ctx, gw, session) = fixture();
        let kapal = add_product(&gw, &session, "Pempek Kapal Selam", 7000).await;
        gw.fail_on(Table::Receivables, Operation::Insert).await;

        let mut input = sale_input(kapal.id, 2, PaymentMethod::Credit);
        input.customer_name = Some("Budi".to_string());

        let err = record_sale(&ctx, &session, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::PartiallyApplied { .. }));
        assert_eq!(gw.count(Table::Sales).await, 1);
        assert_eq!(gw.count(Table::Receivables).await, 0);
    }

    #[tokio::test]
    async fn test_invalid_sale_writes_nothing() {
        let (ctx, gw, session) = fixture();
        let lenjer = add_product(&gw, &session, "Pempek Lenjer", 5000).await;

        let err = record_sale(&ctx, &session, sale_input(lenjer.id, 0, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = record_sale(&ctx, &session, sale_input(lenjer.id, 1, PaymentMethod::Credit))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert_eq!(gw.count(Table::Sales).await, 0);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let (ctx, gw, session) = fixture();

        let err = record_sale(&ctx, &session, sale_input(99, 1, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(gw.count(Table::Sales).await, 0);
    }

    #[tokio::test]
    async fn test_sale_insert_failure_is_persistence() {
        let (ctx, gw, session) = fixture();
        let lenjer = add_product(&gw, &session, "Pempek Lenjer", 5000).await;
        gw.fail_on(Table::Sales, Operation::Insert).await;

        let err = record_sale(&ctx, &session, sale_input(lenjer.id, 1, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() {
        let (ctx, gw, session) = fixture();
        let lenjer = add_product(&gw, &session, "Pempek Lenjer", 5000).await;
        for qty in 1..=3 {
            record_sale(&ctx, &session, sale_input(lenjer.id, qty, PaymentMethod::Cash))
                .await
                .unwrap();
        }

        let sales = list_sales(&ctx, &session, today()).await.unwrap();
        let quantities: Vec<i64> = sales.iter().map(|s| s.quantity).collect();
        assert_eq!(quantities, [3, 2, 1]);

        delete_sale(&ctx, &session, sales[0].id).await.unwrap();
        assert_eq!(list_sales(&ctx, &session, today()).await.unwrap().len(), 2);
        assert!(delete_sale(&ctx, &session, 99).await.unwrap_err().is_not_found());
    }
}
