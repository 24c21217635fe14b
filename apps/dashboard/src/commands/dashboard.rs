//! # Dashboard Command
//!
//! The landing page: today's money, the week's sales chart, stock to
//! reorder and the bell notifications. The reads are independent so they
//! run concurrently.

use serde::Serialize;
use tracing::debug;

use pembukuan_core::aggregation::{
    daily_totals, dashboard_notifications, low_stock_list, weekly_series, DailyTotals, SeriesPoint,
};
use pembukuan_core::{
    DateRange, Expense, MaterialStock, Payable, Receivable, SaleTransaction, Session,
    LOW_STOCK_THRESHOLD,
};
use pembukuan_db::{GatewayExt, Query};

use crate::error::ServiceResult;
use crate::state::AppContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today: DailyTotals,
    /// Seven points, oldest first, ending today.
    pub weekly: Vec<SeriesPoint>,
    pub low_stock: Vec<MaterialStock>,
    pub notifications: Vec<String>,
}

pub async fn load_dashboard(ctx: &AppContext, session: &Session) -> ServiceResult<DashboardSummary> {
    let gateway = ctx.gateway();
    let today = ctx.today();

    let week_query = Query::new().within("date", DateRange::trailing_week(today));
    let today_query = Query::new().on_date("date", today);
    let stock_query = Query::new().order_by("material_name");
    let all = Query::new();

    let (sales, expenses, stocks, receivables, payables): (
        Vec<SaleTransaction>,
        Vec<Expense>,
        Vec<MaterialStock>,
        Vec<Receivable>,
        Vec<Payable>,
    ) = tokio::try_join!(
        gateway.query_as(session, &week_query),
        gateway.query_as(session, &today_query),
        gateway.query_as(session, &stock_query),
        gateway.query_as(session, &all),
        gateway.query_as(session, &all),
    )?;

    debug!(
        sales = sales.len(),
        expenses = expenses.len(),
        stocks = stocks.len(),
        "Dashboard data loaded"
    );

    Ok(DashboardSummary {
        today: daily_totals(&sales, &expenses, today),
        weekly: weekly_series(&sales, today),
        low_stock: low_stock_list(&stocks, LOW_STOCK_THRESHOLD)
            .into_iter()
            .cloned()
            .collect(),
        notifications: dashboard_notifications(&receivables, &payables, &stocks, today),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::expense::record_expense;
    use crate::commands::obligation::create_receivable;
    use crate::commands::product::{create_product, ProductInput};
    use crate::commands::sale::record_sale;
    use crate::commands::stock::{create_stock, StockInput};
    use crate::testing::{fixture, today};
    use chrono::Days;
    use pembukuan_core::ledger::{ExpenseInput, ObligationInput, SaleInput};
    use pembukuan_core::PaymentMethod;

    #[tokio::test]
    async fn test_empty_dashboard() {
        let (ctx, _gw, session) = fixture();
        let summary = load_dashboard(&ctx, &session).await.unwrap();

        assert_eq!(summary.today, DailyTotals::default());
        assert_eq!(summary.weekly.len(), 7);
        assert!(summary.weekly.iter().all(|p| p.total.is_zero()));
        assert!(summary.low_stock.is_empty());
        assert!(summary.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_summary_of_a_busy_day() {
        let (ctx, _gw, session) = fixture();
        let lenjer = create_product(
            &ctx,
            &session,
            ProductInput {
                name: "Pempek Lenjer".to_string(),
                price: 5000,
                stock: 40,
            },
        )
        .await
        .unwrap();
        record_sale(
            &ctx,
            &session,
            SaleInput {
                product_id: lenjer.id,
                quantity: 3,
                payment_method: PaymentMethod::Cash,
                customer_name: None,
                note: None,
            },
        )
        .await
        .unwrap();
        record_expense(
            &ctx,
            &session,
            ExpenseInput {
                date: today(),
                category: "Gas".to_string(),
                description: None,
                amount: 20000,
            },
        )
        .await
        .unwrap();
        create_stock(
            &ctx,
            &session,
            StockInput {
                material_name: "Cuka".to_string(),
                quantity: 4,
                unit: "Botol".to_string(),
            },
        )
        .await
        .unwrap();
        create_receivable(
            &ctx,
            &session,
            ObligationInput {
                party: "Budi".to_string(),
                amount: 14000,
                date: None,
                due_date: today().checked_sub_days(Days::new(2)),
            },
        )
        .await
        .unwrap();

        let summary = load_dashboard(&ctx, &session).await.unwrap();

        assert_eq!(summary.today.sales_total.rupiah(), 15000);
        assert_eq!(summary.today.expenses_total.rupiah(), 20000);
        assert_eq!(summary.today.profit.rupiah(), -5000);
        assert_eq!(summary.weekly.last().map(|p| p.date), Some(today()));
        assert_eq!(summary.weekly[6].total.rupiah(), 15000);
        assert_eq!(summary.low_stock.len(), 1);
        assert_eq!(
            summary.notifications,
            ["1 piutang jatuh tempo", "1 bahan stok menipis"]
        );
    }
}
