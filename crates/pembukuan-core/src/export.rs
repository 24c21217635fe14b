//! # Report Export
//!
//! Renders a [`PeriodReport`] as the CSV file users download from the
//! Laporan page.
//!
//! ## Layout
//! ```text
//! Laporan Keuangan Pempek Putri
//!
//! Periode,2026-10-19
//! Total Pemasukan,15000
//! Total Pengeluaran,25000
//! Laba Bersih,-10000
//!
//! Kategori,Pengeluaran                 ← daily
//! Gas,25000
//!
//! Tanggal,Pemasukan,Pengeluaran        ← weekly / monthly
//! 2026-10-19,15000,25000
//! ```
//!
//! Amounts are plain rupiah integers. Fields containing a comma, quote or
//! newline are quoted by the `csv` writer.

use chrono::NaiveDate;

use crate::aggregation::{PeriodReport, ReportRows};
use crate::error::{CoreError, CoreResult};
use crate::period::Period;

type BlockWriter<'a> = csv::Writer<&'a mut Vec<u8>>;

/// Writes the CSV bytes (UTF-8, `\n` line endings) for `report`.
///
/// Each block gets its own writer so the separator lines stay truly empty;
/// an empty csv record would be written as `""`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use pembukuan_core::aggregation::period_report;
/// use pembukuan_core::export::export_report;
/// use pembukuan_core::period::Period;
///
/// let period = Period::Daily { date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap() };
/// let report = period_report(&[], &[], &period);
/// let bytes = export_report(&report, &period, "Pempek Putri").unwrap();
/// assert!(String::from_utf8(bytes).unwrap().starts_with("Laporan Keuangan Pempek Putri\n"));
/// ```
pub fn export_report(
    report: &PeriodReport,
    period: &Period,
    business_name: &str,
) -> CoreResult<Vec<u8>> {
    let mut out = Vec::new();

    let title = format!("Laporan Keuangan {business_name}");
    write_block(&mut out, |wtr| wtr.write_record([title.as_str()]))?;
    out.push(b'\n');

    let descriptor = period.descriptor();
    let income = report.income.rupiah().to_string();
    let outgoing = report.outgoing.rupiah().to_string();
    let net = report.net.rupiah().to_string();
    write_block(&mut out, |wtr| {
        for (label, value) in [
            ("Periode", descriptor.as_str()),
            ("Total Pemasukan", income.as_str()),
            ("Total Pengeluaran", outgoing.as_str()),
            ("Laba Bersih", net.as_str()),
        ] {
            wtr.write_record([label, value])?;
        }
        Ok(())
    })?;
    out.push(b'\n');

    write_block(&mut out, |wtr| match &report.rows {
        ReportRows::ByCategory(rows) => {
            wtr.write_record(["Kategori", "Pengeluaran"])?;
            for row in rows {
                let amount = row.amount.rupiah().to_string();
                wtr.write_record([row.category.as_str(), amount.as_str()])?;
            }
            Ok(())
        }
        ReportRows::ByDate(rows) => {
            wtr.write_record(["Tanggal", "Pemasukan", "Pengeluaran"])?;
            for row in rows {
                wtr.write_record([
                    row.date.to_string(),
                    row.income.rupiah().to_string(),
                    row.outgoing.rupiah().to_string(),
                ])?;
            }
            Ok(())
        }
    })?;

    Ok(out)
}

/// Name of the downloaded file, e.g. `laporan-harian-2026-10-19.csv`.
pub fn export_filename(period: &Period, today: NaiveDate) -> String {
    format!("laporan-{}-{}.csv", period.slug(), today)
}

/// Runs `fill` against a fresh writer appending to `out`, then flushes it.
fn write_block<F>(out: &mut Vec<u8>, fill: F) -> CoreResult<()>
where
    F: FnOnce(&mut BlockWriter<'_>) -> csv::Result<()>,
{
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    fill(&mut wtr).map_err(|e| CoreError::Export(e.to_string()))?;
    wtr.flush().map_err(|e| CoreError::Export(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::period_report;
    use crate::period::YearMonth;
    use crate::types::{Expense, PaymentMethod, SaleTransaction};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(id: i64, on: NaiveDate, category: &str, amount: i64) -> Expense {
        Expense {
            id,
            date: on,
            category: category.to_string(),
            description: None,
            amount,
        }
    }

    fn sale(id: i64, on: NaiveDate, total: i64) -> SaleTransaction {
        SaleTransaction {
            id,
            date: on,
            product_id: Some(1),
            quantity: 1,
            unit_price: total,
            total: Some(total),
            payment_method: PaymentMethod::NonCash,
            note: None,
            created_at: "2026-10-19T03:00:00Z".parse().unwrap(),
        }
    }

    fn render(report: &PeriodReport, period: &Period, name: &str) -> String {
        String::from_utf8(export_report(report, period, name).unwrap()).unwrap()
    }

    #[test]
    fn test_daily_export_merges_categories() {
        let today = date(2026, 10, 19);
        let period = Period::Daily { date: today };
        let expenses = vec![expense(1, today, "Gas", 20000), expense(2, today, "Gas", 5000)];
        let report = period_report(&[], &expenses, &period);

        let expected = "Laporan Keuangan Pempek Putri\n\
                        \n\
                        Periode,2026-10-19\n\
                        Total Pemasukan,0\n\
                        Total Pengeluaran,25000\n\
                        Laba Bersih,-25000\n\
                        \n\
                        Kategori,Pengeluaran\n\
                        Gas,25000\n";
        assert_eq!(render(&report, &period, "Pempek Putri"), expected);
    }

    #[test]
    fn test_blank_lines_stay_empty_with_quoted_fields() {
        let today = date(2026, 10, 19);
        let period = Period::Daily { date: today };
        let expenses = vec![expense(1, today, "Gas, Elpiji", 20000)];
        let report = period_report(&[], &expenses, &period);

        let text = render(&report, &period, "Pempek Putri");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "");
        assert_eq!(lines[6], "");
        assert_eq!(lines.last(), Some(&"\"Gas, Elpiji\",20000"));
        assert!(!text.contains("\"\"\n"));
    }

    #[test]
    fn test_weekly_export_rows_use_iso_dates() {
        let end = date(2026, 10, 19);
        let period = Period::Weekly { end };
        let sales = vec![sale(1, date(2026, 10, 15), 15000)];
        let expenses = vec![expense(1, end, "Minyak", 35000)];
        let report = period_report(&sales, &expenses, &period);

        let text = render(&report, &period, "Pempek Putri");
        assert!(text.contains("Periode,7 Hari Terakhir\n"));
        assert!(text.ends_with(
            "Tanggal,Pemasukan,Pengeluaran\n2026-10-15,15000,0\n2026-10-19,0,35000\n"
        ));
    }

    #[test]
    fn test_monthly_descriptor() {
        let period = Period::Monthly {
            month: YearMonth::new(2026, 10).unwrap(),
        };
        let report = period_report(&[], &[], &period);

        let text = render(&report, &period, "Pempek Putri");
        assert!(text.contains("Periode,2026-10\n"));
        assert!(text.ends_with("Tanggal,Pemasukan,Pengeluaran\n"));
    }

    #[test]
    fn test_reserved_characters_are_quoted() {
        let today = date(2026, 10, 19);
        let period = Period::Daily { date: today };
        let expenses = vec![expense(1, today, "Listrik, Air", 150000)];
        let report = period_report(&[], &expenses, &period);

        let text = render(&report, &period, "Pempek \"Putri\"");
        assert!(text.starts_with("\"Laporan Keuangan Pempek \"\"Putri\"\"\"\n"));
        assert!(text.contains("\"Listrik, Air\",150000\n"));
    }

    #[test]
    fn test_export_filename() {
        let today = date(2026, 10, 19);
        assert_eq!(
            export_filename(&Period::Daily { date: today }, today),
            "laporan-harian-2026-10-19.csv"
        );
        assert_eq!(
            export_filename(&Period::Weekly { end: today }, today),
            "laporan-mingguan-2026-10-19.csv"
        );
        let month = Period::Monthly {
            month: YearMonth::new(2026, 9).unwrap(),
        };
        assert_eq!(export_filename(&month, today), "laporan-bulanan-2026-10-19.csv");
    }
}
