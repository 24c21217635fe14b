//! # Report Commands
//!
//! The Laporan page and its CSV download. Reports are derived on every
//! request and never stored.

use serde::Serialize;
use tracing::{debug, info};

use pembukuan_core::aggregation::{margin_percent, period_report, PeriodReport};
use pembukuan_core::export::{export_filename, export_report};
use pembukuan_core::{Expense, Period, SaleTransaction, Session};
use pembukuan_db::{GatewayExt, Query};

use crate::error::ServiceResult;
use crate::state::AppContext;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(flatten)]
    pub report: PeriodReport,
    pub margin_percent: f64,
}

/// A downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

async fn build_report(
    ctx: &AppContext,
    session: &Session,
    period: &Period,
) -> ServiceResult<PeriodReport> {
    let gateway = ctx.gateway();
    let query = Query::new().within("date", period.range());

    let (sales, expenses): (Vec<SaleTransaction>, Vec<Expense>) = tokio::try_join!(
        gateway.query_as(session, &query),
        gateway.query_as(session, &query),
    )?;

    debug!(
        period = period.slug(),
        sales = sales.len(),
        expenses = expenses.len(),
        "Report data loaded"
    );
    Ok(period_report(&sales, &expenses, period))
}

pub async fn load_report(
    ctx: &AppContext,
    session: &Session,
    period: Period,
) -> ServiceResult<ReportView> {
    let report = build_report(ctx, session, &period).await?;
    let margin_percent = margin_percent(report.net, report.income);

    Ok(ReportView {
        report,
        margin_percent,
    })
}

/// Renders the report as CSV, named after the period and today's date.
pub async fn export_period_report(
    ctx: &AppContext,
    session: &Session,
    period: Period,
) -> ServiceResult<ExportFile> {
    let report = build_report(ctx, session, &period).await?;
    let bytes = export_report(&report, &period, &ctx.config().business_name)?;
    let filename = export_filename(&period, ctx.today());

    info!(filename = %filename, size = bytes.len(), "Report exported");
    Ok(ExportFile { filename, bytes })
}
