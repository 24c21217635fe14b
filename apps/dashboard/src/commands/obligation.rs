//! # Receivable and Payable Commands
//!
//! Piutang (money customers owe) and hutang (money the business owes) share
//! one lifecycle:
//!
//! ```text
//! create ──► Unpaid ──mark paid──► Paid
//!               │                   │
//!               └── due_date ≤ today: overdue (derived, never stored)
//! ```
//!
//! Marking a settled record again is a no-op reported as `AlreadyPaid`.

use serde::Serialize;
use tracing::{debug, info};

use pembukuan_core::aggregation::overdue_list;
use pembukuan_core::ledger::{mark_paid, plan_payable, plan_receivable, MarkPaid, ObligationInput};
use pembukuan_core::{
    Obligation, Payable, PayableStatus, Receivable, ReceivableStatus, Session, StatusUpdate, Table,
};
use pembukuan_db::{Gateway, GatewayExt, Query};

use crate::error::ServiceResult;
use crate::state::AppContext;

/// A record with its overdue flag as of today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObligationRow<O> {
    #[serde(flatten)]
    pub record: O,
    pub overdue: bool,
}

fn with_overdue<O: Obligation>(records: Vec<O>, ctx: &AppContext) -> Vec<ObligationRow<O>> {
    let today = ctx.today();
    records
        .into_iter()
        .map(|record| ObligationRow {
            overdue: !overdue_list(std::slice::from_ref(&record), today).is_empty(),
            record,
        })
        .collect()
}

// =============================================================================
// Receivables
// =============================================================================

/// All receivables, newest first.
pub async fn list_receivables(
    ctx: &AppContext,
    session: &Session,
) -> ServiceResult<Vec<ObligationRow<Receivable>>> {
    let query = Query::new().order_by_desc("id");
    let records: Vec<Receivable> = ctx.gateway().query_as(session, &query).await?;
    Ok(with_overdue(records, ctx))
}

/// Creates an unpaid receivable. A missing transaction date means today.
pub async fn create_receivable(
    ctx: &AppContext,
    session: &Session,
    input: ObligationInput,
) -> ServiceResult<Receivable> {
    let new = plan_receivable(&input, ctx.today())?;
    let receivable: Receivable = ctx.gateway().insert_as(session, &new).await?;

    info!(
        receivable_id = receivable.id,
        customer = %receivable.customer_name,
        amount = receivable.amount,
        "Receivable created"
    );
    Ok(receivable)
}

pub async fn mark_receivable_paid(
    ctx: &AppContext,
    session: &Session,
    id: i64,
) -> ServiceResult<MarkPaid> {
    let receivable: Receivable = ctx.gateway().get_by_id(session, id).await?;

    let outcome = mark_paid(&receivable);
    if outcome == MarkPaid::MarkedPaid {
        let update = StatusUpdate {
            status: ReceivableStatus::Paid,
        };
        ctx.gateway()
            .update_with(session, Table::Receivables, id, &update)
            .await?;
        info!(receivable_id = id, "Receivable settled");
    } else {
        debug!(receivable_id = id, "Receivable already settled");
    }

    Ok(outcome)
}

pub async fn delete_receivable(ctx: &AppContext, session: &Session, id: i64) -> ServiceResult<()> {
    ctx.gateway().delete(session, Table::Receivables, id).await?;
    info!(receivable_id = id, "Receivable deleted");
    Ok(())
}

// =============================================================================
// Payables
// =============================================================================

/// All payables, newest first.
pub async fn list_payables(
    ctx: &AppContext,
    session: &Session,
) -> ServiceResult<Vec<ObligationRow<Payable>>> {
    let query = Query::new().order_by_desc("id");
    let records: Vec<Payable> = ctx.gateway().query_as(session, &query).await?;
    Ok(with_overdue(records, ctx))
}

/// Creates an unpaid payable. A missing loan date means today.
pub async fn create_payable(
    ctx: &AppContext,
    session: &Session,
    input: ObligationInput,
) -> ServiceResult<Payable> {
    let new = plan_payable(&input, ctx.today())?;
    let payable: Payable = ctx.gateway().insert_as(session, &new).await?;

    info!(
        payable_id = payable.id,
        counterparty = %payable.counterparty_name,
        amount = payable.amount,
        "Payable created"
    );
    Ok(payable)
}

pub async fn mark_payable_paid(
    ctx: &AppContext,
    session: &Session,
    id: i64,
) -> ServiceResult<MarkPaid> {
    let payable: Payable = ctx.gateway().get_by_id(session, id).await?;

    let outcome = mark_paid(&payable);
    if outcome == MarkPaid::MarkedPaid {
        let update = StatusUpdate {
            status: PayableStatus::Paid,
        };
        ctx.gateway()
            .update_with(session, Table::Payables, id, &update)
            .await?;
        info!(payable_id = id, "Payable settled");
    } else {
        debug!(payable_id = id, "Payable already settled");
    }

    Ok(outcome)
}

pub async fn delete_payable(ctx: &AppContext, session: &Session, id: i64) -> ServiceResult<()> {
    ctx.gateway().delete(session, Table::Payables, id).await?;
    info!(payable_id = id, "Payable deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::testing::{fixture, today};
    use chrono::{Days, NaiveDate};

    fn input(party: &str, amount: i64, due_date: Option<NaiveDate>) -> ObligationInput {
        ObligationInput {
            party: party.to_string(),
            amount,
            date: None,
            due_date,
        }
    }

    #[tokio::test]
    async fn test_receivable_defaults_to_today_unpaid() {
        let (ctx, _gw, session) = fixture();
        let receivable = create_receivable(&ctx, &session, input("Budi", 14000, None))
            .await
            .unwrap();
        assert_eq!(receivable.transaction_date, today());
        assert_eq!(receivable.status, ReceivableStatus::Unpaid);
    }

    #[tokio::test]
    async fn test_mark_paid_once() {
        let (ctx, gw, session) = fixture();
        let receivable = create_receivable(&ctx, &session, input("Budi", 14000, None))
            .await
            .unwrap();

        let first = mark_receivable_paid(&ctx, &session, receivable.id).await.unwrap();
        assert_eq!(first, MarkPaid::MarkedPaid);

        let second = mark_receivable_paid(&ctx, &session, receivable.id).await.unwrap();
        assert_eq!(second, MarkPaid::AlreadyPaid);

        let stored: Receivable = gw.get_by_id(&session, receivable.id).await.unwrap();
        assert_eq!(stored.status, ReceivableStatus::Paid);
    }

    #[tokio::test]
    async fn test_mark_missing_is_not_found() {
        let (ctx, _gw, session) = fixture();
        let err = mark_payable_paid(&ctx, &session, 99).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_overdue_flags() {
        let (ctx, _gw, session) = fixture();
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();

        create_payable(&ctx, &session, input("UD Sagu Makmur", 750000, Some(yesterday)))
            .await
            .unwrap();
        create_payable(&ctx, &session, input("Koperasi", 200000, Some(today())))
            .await
            .unwrap();
        create_payable(&ctx, &session, input("Bank", 1000000, Some(tomorrow)))
            .await
            .unwrap();
        let settled = create_payable(&ctx, &session, input("Pak Anton", 50000, Some(yesterday)))
            .await
            .unwrap();
        mark_payable_paid(&ctx, &session, settled.id).await.unwrap();

        let flags: Vec<(String, bool)> = list_payables(&ctx, &session)
            .await
            .unwrap()
            .into_iter()
            .map(|row| (row.record.counterparty_name, row.overdue))
            .collect();

        assert_eq!(flags.len(), 4);
        for (name, overdue) in flags {
            let expected = matches!(name.as_str(), "UD Sagu Makmur" | "Koperasi");
            assert_eq!(overdue, expected, "{name}");
        }
    }

    #[tokio::test]
    async fn test_rejects_blank_party() {
        let (ctx, gw, session) = fixture();
        let err = create_receivable(&ctx, &session, input("   ", 1000, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(gw.count(Table::Receivables).await, 0);
    }
}
