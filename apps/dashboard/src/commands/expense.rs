//! # Expense Commands

use chrono::NaiveDate;
use tracing::info;

use pembukuan_core::ledger::{plan_expense, ExpenseInput};
use pembukuan_core::{Expense, Session, Table};
use pembukuan_db::{Gateway, GatewayExt, Query};

use crate::error::ServiceResult;
use crate::state::AppContext;

/// Expenses on `date`, newest first.
pub async fn list_expenses(
    ctx: &AppContext,
    session: &Session,
    date: NaiveDate,
) -> ServiceResult<Vec<Expense>> {
    let query = Query::new().on_date("date", date).order_by_desc("id");
    Ok(ctx.gateway().query_as(session, &query).await?)
}

pub async fn record_expense(
    ctx: &AppContext,
    session: &Session,
    input: ExpenseInput,
) -> ServiceResult<Expense> {
    let new = plan_expense(&input)?;
    let expense: Expense = ctx.gateway().insert_as(session, &new).await?;

    info!(
        expense_id = expense.id,
        category = %expense.category,
        amount = expense.amount,
        "Expense recorded"
    );
    Ok(expense)
}

pub async fn delete_expense(ctx: &AppContext, session: &Session, id: i64) -> ServiceResult<()> {
    ctx.gateway().delete(session, Table::Expenses, id).await?;
    info!(expense_id = id, "Expense deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::testing::{fixture, today};
    use chrono::Days;

    fn input(date: NaiveDate, category: &str, amount: i64) -> ExpenseInput {
        ExpenseInput {
            date,
            category: category.to_string(),
            description: None,
            amount,
        }
    }

    #[tokio::test]
    async fn test_list_only_that_day() {
        let (ctx, _gw, session) = fixture();
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();

        record_expense(&ctx, &session, input(today(), "Gas", 20000)).await.unwrap();
        record_expense(&ctx, &session, input(yesterday, "Sewa", 500000)).await.unwrap();
        record_expense(&ctx, &session, input(today(), "Minyak", 36000)).await.unwrap();

        let expenses = list_expenses(&ctx, &session, today()).await.unwrap();
        let categories: Vec<&str> = expenses.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, ["Minyak", "Gas"]);
    }

    #[tokio::test]
    async fn test_rejects_negative_amount() {
        let (ctx, gw, session) = fixture();
        let err = record_expense(&ctx, &session, input(today(), "Gas", -1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(gw.count(Table::Expenses).await, 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let (ctx, _gw, session) = fixture();
        let expense = record_expense(&ctx, &session, input(today(), "Gas", 20000)).await.unwrap();

        delete_expense(&ctx, &session, expense.id).await.unwrap();
        assert!(list_expenses(&ctx, &session, today()).await.unwrap().is_empty());
    }
}
