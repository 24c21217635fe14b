//! # Aggregation Engine
//!
//! Pure report math over already-loaded ledger rows.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gateway.query(...)  ──►  &[SaleTransaction], &[Expense], ...           │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │  daily_totals     weekly_series     period_report                 │ │
//! │  │  low_stock_list   overdue_list      margin_percent                │ │
//! │  │  dashboard_notifications            sum_purchases                 │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                  DailyTotals / SeriesPoint / PeriodReport               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - "Today" is always an argument; nothing here reads the clock
//! - Rows outside the requested window are ignored, so callers may pass
//!   over-fetched slices
//! - A sale or purchase without a stored `total` counts as zero

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;
use crate::period::{short_day_label, DateRange, Period};
use crate::types::{Expense, MaterialPurchase, MaterialStock, Obligation, SaleTransaction};
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Result Types
// =============================================================================

/// Money in and out for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyTotals {
    pub sales_total: Money,
    pub expenses_total: Money,
    /// `sales_total - expenses_total`; negative on a losing day.
    pub profit: Money,
}

/// One bar of the weekly sales chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SeriesPoint {
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Display only (`19 Okt`); never used as a key.
    pub label: String,
    pub total: Money,
}

/// Expense total for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Money,
}

/// Income and outgoing for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateTotals {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub income: Money,
    pub outgoing: Money,
}

impl DateTotals {
    fn empty(date: NaiveDate) -> Self {
        DateTotals {
            date,
            income: Money::zero(),
            outgoing: Money::zero(),
        }
    }
}

/// Breakdown rows of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "rows")]
#[ts(export)]
pub enum ReportRows {
    /// Daily reports: expenses per category, first-seen order.
    ByCategory(Vec<CategoryTotal>),
    /// Weekly and monthly reports: one row per active date, ascending.
    ByDate(Vec<DateTotals>),
}

impl ReportRows {
    pub fn is_empty(&self) -> bool {
        match self {
            ReportRows::ByCategory(rows) => rows.is_empty(),
            ReportRows::ByDate(rows) => rows.is_empty(),
        }
    }
}

/// A derived report. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodReport {
    pub income: Money,
    pub outgoing: Money,
    pub net: Money,
    pub rows: ReportRows,
}

// =============================================================================
// Daily & Weekly
// =============================================================================

/// Totals for `day`. Rows dated on other days are ignored.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use pembukuan_core::aggregation::daily_totals;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
/// let totals = daily_totals(&[], &[], day);
/// assert!(totals.profit.is_zero());
/// ```
pub fn daily_totals(
    sales: &[SaleTransaction],
    expenses: &[Expense],
    day: NaiveDate,
) -> DailyTotals {
    let sales_total: Money = sales
        .iter()
        .filter(|s| s.date == day)
        .map(SaleTransaction::total)
        .sum();
    let expenses_total: Money = expenses
        .iter()
        .filter(|e| e.date == day)
        .map(Expense::amount)
        .sum();

    DailyTotals {
        sales_total,
        expenses_total,
        profit: sales_total - expenses_total,
    }
}

/// Sales per day for the 7 days ending `today`, oldest first.
///
/// Always returns exactly 7 points; quiet days are zero.
pub fn weekly_series(sales: &[SaleTransaction], today: NaiveDate) -> Vec<SeriesPoint> {
    let range = DateRange::trailing_week(today);
    let mut by_day: BTreeMap<NaiveDate, Money> = range.days().map(|d| (d, Money::zero())).collect();

    for sale in sales.iter().filter(|s| range.contains(s.date)) {
        if let Some(total) = by_day.get_mut(&sale.date) {
            *total += sale.total();
        }
    }

    by_day
        .into_iter()
        .map(|(date, total)| SeriesPoint {
            date,
            label: short_day_label(date),
            total,
        })
        .collect()
}

// =============================================================================
// Period Report
// =============================================================================

/// Builds the report shown on the Laporan page and written by export.
pub fn period_report(
    sales: &[SaleTransaction],
    expenses: &[Expense],
    period: &Period,
) -> PeriodReport {
    let range = period.range();
    let sales: Vec<&SaleTransaction> = sales.iter().filter(|s| range.contains(s.date)).collect();
    let expenses: Vec<&Expense> = expenses.iter().filter(|e| range.contains(e.date)).collect();

    let income: Money = sales.iter().map(|s| s.total()).sum();
    let outgoing: Money = expenses.iter().map(|e| e.amount()).sum();

    let rows = match period {
        Period::Daily { .. } => ReportRows::ByCategory(group_by_category(&expenses)),
        Period::Weekly { .. } | Period::Monthly { .. } => {
            ReportRows::ByDate(group_by_date(&sales, &expenses))
        }
    };

    PeriodReport {
        income,
        outgoing,
        net: income - outgoing,
        rows,
    }
}

fn group_by_category(expenses: &[&Expense]) -> Vec<CategoryTotal> {
    let mut groups: Vec<CategoryTotal> = Vec::new();

    for expense in expenses {
        match groups.iter_mut().find(|g| g.category == expense.category) {
            Some(group) => group.amount += expense.amount(),
            None => groups.push(CategoryTotal {
                category: expense.category.clone(),
                amount: expense.amount(),
            }),
        }
    }

    groups
}

fn group_by_date(sales: &[&SaleTransaction], expenses: &[&Expense]) -> Vec<DateTotals> {
    let mut by_date: BTreeMap<NaiveDate, DateTotals> = BTreeMap::new();

    for sale in sales {
        by_date
            .entry(sale.date)
            .or_insert_with(|| DateTotals::empty(sale.date))
            .income += sale.total();
    }
    for expense in expenses {
        by_date
            .entry(expense.date)
            .or_insert_with(|| DateTotals::empty(expense.date))
            .outgoing += expense.amount();
    }

    by_date.into_values().collect()
}

/// Profit margin in percent, rounded to one decimal.
///
/// Returns `0.0` when there is no income.
///
/// ## Example
/// ```rust
/// use pembukuan_core::aggregation::margin_percent;
/// use pembukuan_core::Money;
///
/// assert_eq!(margin_percent(Money::from_rupiah(50), Money::from_rupiah(200)), 25.0);
/// assert_eq!(margin_percent(Money::from_rupiah(50), Money::zero()), 0.0);
/// ```
pub fn margin_percent(net: Money, income: Money) -> f64 {
    if !income.is_positive() {
        return 0.0;
    }

    let ratio = net.rupiah() as f64 / income.rupiah() as f64;
    (ratio * 1000.0).round() / 10.0
}

// =============================================================================
// Stock & Obligations
// =============================================================================

/// Materials with quantity strictly below `threshold`, in input order.
pub fn low_stock_list(stocks: &[MaterialStock], threshold: i64) -> Vec<&MaterialStock> {
    stocks.iter().filter(|s| s.quantity < threshold).collect()
}

/// Unpaid records whose due date is on or before `today`.
///
/// A record without a due date is never overdue.
pub fn overdue_list<O: Obligation>(records: &[O], today: NaiveDate) -> Vec<&O> {
    records
        .iter()
        .filter(|r| r.is_unpaid())
        .filter(|r| matches!(r.due_date(), Some(due) if due <= today))
        .collect()
}

/// Bell messages on the dashboard. Only non-zero counts produce a message.
pub fn dashboard_notifications<R, P>(
    receivables: &[R],
    payables: &[P],
    stocks: &[MaterialStock],
    today: NaiveDate,
) -> Vec<String>
where
    R: Obligation,
    P: Obligation,
{
    let counts = [
        (overdue_list(receivables, today).len(), "piutang jatuh tempo"),
        (overdue_list(payables, today).len(), "hutang jatuh tempo"),
        (low_stock_list(stocks, LOW_STOCK_THRESHOLD).len(), "bahan stok menipis"),
    ];

    counts
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, what)| format!("{count} {what}"))
        .collect()
}

/// Total spent across `purchases`.
pub fn sum_purchases(purchases: &[MaterialPurchase]) -> Money {
    purchases.iter().map(MaterialPurchase::total).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
