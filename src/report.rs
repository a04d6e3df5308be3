//! Plain-text sales report.
//!
//! [`SalesReport`] gathers everything the console report shows; the
//! `write_*` functions render it to any writer so the binary can print to
//! stdout and tests can render into a buffer.

use crate::analyser::frame::{column_names, preview_rows};
use crate::analyser::types::columns::{PRODUCT, REGION};
use crate::analyser::types::headers::{AVERAGE_SALE, NUMBER_OF_SALES, TOTAL_SALES};
use crate::analyser::types::{
    DailyTotal, Forecast, GroupedSales, NumericSummary, STAT_LABELS, SalesTotals, TrendSummary,
};
use crate::analyser::{self, timeseries};
use crate::error::Result;
use crate::utils::{fmt_currency, fmt_opt, render_table};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::io::Write;

const RULE_WIDTH: usize = 60;

/// Figures printed by the main report.
#[derive(Clone, Debug, Serialize)]
pub struct SalesReport {
    pub record_count: usize,
    pub columns: Vec<String>,
    pub head_rows: usize,
    pub preview: Vec<Vec<String>>,
    pub numeric: Vec<NumericSummary>,
    pub totals: Option<SalesTotals>,
    pub by_product: Option<GroupedSales>,
    pub by_region: Option<GroupedSales>,
}

impl SalesReport {
    /// Computes every report section from the loaded table.
    ///
    /// # Errors
    ///
    /// Returns an error if a polars query fails.
    pub fn build(df: &DataFrame, head_rows: usize) -> Result<Self> {
        Ok(Self {
            record_count: df.height(),
            columns: column_names(df),
            head_rows,
            preview: preview_rows(df, head_rows)?,
            numeric: analyser::describe_numeric(df)?,
            totals: analyser::sales_totals(df)?,
            by_product: analyser::group_sales_if_present(df, PRODUCT)?,
            by_region: analyser::group_sales_if_present(df, REGION)?,
        })
    }
}

/// Outcome of the time-series stage.
#[derive(Clone, Debug, Serialize)]
pub enum TimeSeriesReport {
    /// Required columns are absent.
    Skipped { missing: Vec<String> },
    Ready {
        daily: Vec<DailyTotal>,
        trend: Option<TrendSummary>,
    },
}

impl TimeSeriesReport {
    /// Builds the daily series and trend, or records which columns are missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the daily aggregation fails.
    pub fn build(df: &DataFrame) -> Result<Self> {
        let missing = timeseries::missing_inputs(df);
        if !missing.is_empty() {
            return Ok(Self::Skipped {
                missing: missing.into_iter().map(str::to_owned).collect(),
            });
        }
        let daily = analyser::daily_sales(df)?;
        let trend = analyser::trend_summary(&daily);
        Ok(Self::Ready { daily, trend })
    }

    pub fn daily(&self) -> &[DailyTotal] {
        match self {
            Self::Skipped { .. } => &[],
            Self::Ready { daily, .. } => daily,
        }
    }
}

fn banner(out: &mut impl Write, title: &str) -> std::io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "{rule}")
}

/// Writes the overview, statistics and grouped sales sections.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_report(out: &mut impl Write, report: &SalesReport) -> std::io::Result<()> {
    banner(out, "SALES DATA ANALYZER - SALES REPORT")?;
    writeln!(out)?;

    writeln!(out, "Dataset Overview:")?;
    writeln!(out, "  Total Records: {}", report.record_count)?;
    writeln!(out, "  Columns: {}", report.columns.join(", "))?;
    writeln!(out)?;

    writeln!(out, "Sample Data (first {} rows):", report.head_rows)?;
    write!(out, "{}", render_table(&report.columns, &report.preview))?;
    writeln!(out)?;

    writeln!(out, "Statistical Summary:")?;
    if report.numeric.is_empty() {
        writeln!(out, "  No numeric columns to summarize.")?;
    } else {
        write!(out, "{}", describe_table(&report.numeric))?;
    }
    writeln!(out)?;

    if let Some(totals) = &report.totals {
        writeln!(out, "Sales Analysis:")?;
        writeln!(out, "  Total Sales: {}", fmt_currency(totals.total))?;
        writeln!(out, "  Average Sale: {}", fmt_currency(totals.mean))?;
        writeln!(out, "  Highest Sale: {}", fmt_currency(totals.max))?;
        writeln!(out, "  Lowest Sale: {}", fmt_currency(totals.min))?;
        writeln!(out)?;
    }

    if let Some(products) = &report.by_product {
        writeln!(out, "Sales by Product:")?;
        write!(out, "{}", grouped_table(products))?;
        writeln!(out)?;
    }

    if let Some(regions) = &report.by_region {
        writeln!(out, "Sales by Region:")?;
        write!(out, "{}", grouped_table(regions))?;
        writeln!(out)?;
    }

    Ok(())
}

fn describe_table(summaries: &[NumericSummary]) -> String {
    let mut headers = vec![String::new()];
    headers.extend(summaries.iter().map(|s| s.name.clone()));

    let columns: Vec<[Option<f64>; 8]> = summaries.iter().map(NumericSummary::values).collect();
    let rows: Vec<Vec<String>> = STAT_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mut row = vec![(*label).to_owned()];
            row.extend(columns.iter().map(|values| fmt_opt(values[i])));
            row
        })
        .collect();

    render_table(&headers, &rows)
}

fn grouped_table(sales: &GroupedSales) -> String {
    let headers = vec![
        sales.key_column.clone(),
        TOTAL_SALES.to_owned(),
        NUMBER_OF_SALES.to_owned(),
        AVERAGE_SALE.to_owned(),
    ];
    let rows: Vec<Vec<String>> = sales
        .groups
        .iter()
        .map(|g| {
            vec![
                g.key.clone(),
                format!("{:.2}", g.total),
                g.count.to_string(),
                format!("{:.2}", g.mean),
            ]
        })
        .collect();
    render_table(&headers, &rows)
}

/// Writes the time-series section, or the reason it was skipped.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_time_series(out: &mut impl Write, report: &TimeSeriesReport) -> std::io::Result<()> {
    writeln!(out, "Time Series Analysis:")?;
    match report {
        TimeSeriesReport::Skipped { missing } => {
            writeln!(
                out,
                "  Skipped: requires 'Date' and 'Amount' columns (missing: {}).",
                missing.join(", ")
            )?;
        }
        TimeSeriesReport::Ready { daily, trend } => {
            let Some(trend) = trend else {
                writeln!(out, "  No dated sales found.")?;
                writeln!(out)?;
                return Ok(());
            };
            writeln!(out, "  Days with sales: {}", daily.len())?;
            writeln!(out, "  Average Daily Sales: {}", fmt_currency(trend.mean_daily))?;
            writeln!(
                out,
                "  Best Day: {} ({})",
                trend.peak.date,
                fmt_currency(trend.peak.total)
            )?;
            writeln!(
                out,
                "  Worst Day: {} ({})",
                trend.lowest.date,
                fmt_currency(trend.lowest.total)
            )?;
            if daily.len() > 1 {
                match trend.pct_change {
                    Some(pct) => writeln!(out, "  Overall Change: {pct:+.2}%")?,
                    None => writeln!(out, "  Overall Change: n/a (first day total is zero)")?,
                }
            }
        }
    }
    writeln!(out)
}

/// Writes the forecast section. `None` means there was too little history.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_forecast(
    out: &mut impl Write,
    forecast: Option<&Forecast>,
    series: &TimeSeriesReport,
) -> std::io::Result<()> {
    writeln!(out, "Sales Forecast:")?;
    match (series, forecast) {
        (TimeSeriesReport::Skipped { .. }, _) => {
            writeln!(out, "  Skipped: requires 'Date' and 'Amount' columns.")?;
        }
        (TimeSeriesReport::Ready { .. }, None) => {
            writeln!(
                out,
                "  Insufficient data for forecasting (need at least 2 days of sales)."
            )?;
        }
        (TimeSeriesReport::Ready { .. }, Some(fc)) => {
            writeln!(
                out,
                "  Method: {}-day moving average ({})",
                fc.window,
                fmt_currency(fc.moving_average)
            )?;
            let headers = vec!["Date".to_owned(), "Forecast".to_owned()];
            let rows: Vec<Vec<String>> = fc
                .points
                .iter()
                .map(|p| vec![p.date.to_string(), format!("{:.2}", p.total)])
                .collect();
            write!(out, "{}", render_table(&headers, &rows))?;
        }
    }
    writeln!(out)
}

/// Writes the closing banner.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_footer(out: &mut impl Write) -> std::io::Result<()> {
    banner(out, "Analysis Complete!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn render(report: &SalesReport) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, report).expect("writing to a Vec cannot fail");
        String::from_utf8(buf).expect("report is UTF-8")
    }

    #[test]
    fn test_report_sections() -> Result<()> {
        let df = df!(
            "Product" => &["A", "A", "B"],
            "Region" => &["East", "West", "East"],
            "Amount" => &[100.0, 50.0, 200.0]
        )?;
        let report = SalesReport::build(&df, 5)?;
        let text = render(&report);

        assert!(text.contains("Total Records: 3"), "{text}");
        assert!(text.contains("Columns: Product, Region, Amount"), "{text}");
        assert!(text.contains("Total Sales: $350.00"), "{text}");
        assert!(text.contains("Highest Sale: $200.00"), "{text}");
        assert!(text.contains("Lowest Sale: $50.00"), "{text}");
        assert!(text.contains("Sales by Product:"), "{text}");
        assert!(text.contains("Sales by Region:"), "{text}");

        let start = text.find("Sales by Product:").expect("product section");
        let section = &text[start..];
        let b = section.find("  B ").expect("product B row");
        let a = section.find("  A ").expect("product A row");
        assert!(b < a, "B (200) is listed before A (150)");
        Ok(())
    }

    #[test]
    fn test_optional_blocks_are_skipped() -> Result<()> {
        let df = df!("Name" => &["x", "y"])?;
        let report = SalesReport::build(&df, 5)?;
        let text = render(&report);

        assert!(text.contains("Total Records: 2"));
        assert!(text.contains("No numeric columns to summarize."));
        assert!(!text.contains("Sales Analysis:"));
        assert!(!text.contains("Sales by Product:"));
        assert!(!text.contains("Sales by Region:"));
        Ok(())
    }

    #[test]
    fn test_time_series_skip_message() -> Result<()> {
        let df = df!("Amount" => &[1.0, 2.0])?;
        let series = TimeSeriesReport::build(&df)?;
        assert!(series.daily().is_empty());

        let mut buf = Vec::new();
        write_time_series(&mut buf, &series)?;
        write_forecast(&mut buf, None, &series)?;
        let text = String::from_utf8(buf).expect("UTF-8");
        assert!(text.contains("missing: Date"), "{text}");
        assert!(text.contains("Sales Forecast:\n  Skipped"), "{text}");
        Ok(())
    }
}
