//! Integration tests for the full analysis workflow
//!
//! These tests load the fixture files in `testdata/` and verify the
//! aggregates, time series and exported workbook end to end.

use chrono::NaiveDate;
use polars::prelude::DataType;
use sales_analyzer::analyser::{self, forecast, forecast_window};
use sales_analyzer::error::AnalyzerError;
use sales_analyzer::export::{WorkbookContent, export_workbook};
use sales_analyzer::report::{SalesReport, TimeSeriesReport, write_report};
use std::path::Path;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_sales_csv_aggregates() -> anyhow::Result<()> {
    let df = analyser::load_df(Path::new("testdata/sales.csv"))?;
    assert_eq!(df.height(), 12, "Should have 12 rows");
    assert_eq!(df.column("Date")?.dtype(), &DataType::Date);

    let totals = analyser::sales_totals(&df)?.expect("Amount column present");
    assert!(close(totals.total, 1401.0), "total {}", totals.total);
    assert!(close(totals.max, 200.0));
    assert!(close(totals.min, 45.75));

    let products = analyser::group_sales(&df, "Product")?;
    assert_eq!(products.keys(), ["Gizmo", "Widget", "Gadget"]);
    assert!(close(products.grand_total(), totals.total));
    let widget = products.get("Widget").expect("Widget group");
    assert!(close(widget.total, 505.25));
    assert_eq!(widget.count, 4);

    let regions = analyser::group_sales(&df, "Region")?;
    assert_eq!(regions.keys(), ["East", "North", "West", "South"]);
    assert!(close(regions.grand_total(), totals.total));
    Ok(())
}

#[test]
fn test_sales_csv_time_series() -> anyhow::Result<()> {
    let df = analyser::load_df(Path::new("testdata/sales.csv"))?;
    let daily = analyser::daily_sales(&df)?;

    assert_eq!(daily.len(), 10, "Should have 10 distinct days");
    assert_eq!(daily[0].date, date(2024, 1, 1));
    assert!(close(daily[0].total, 200.5));
    let sum: f64 = daily.iter().map(|d| d.total).sum();
    assert!(close(sum, 1401.0));

    let trend = analyser::trend_summary(&daily).expect("trend for ten days");
    assert_eq!(trend.peak.date, date(2024, 1, 1));
    assert_eq!(trend.lowest.date, date(2024, 1, 5));
    let pct = trend.pct_change.expect("first day is non-zero");
    assert!((pct - (185.75 - 200.5) / 200.5 * 100.0).abs() < 1e-9);

    assert_eq!(forecast_window(daily.len(), 7), 5);
    let fc = forecast(&daily, 7, 7).expect("enough history");
    assert_eq!(fc.window, 5);
    assert!(close(fc.moving_average, 138.2));
    assert_eq!(fc.points.first().map(|p| p.date), Some(date(2024, 1, 11)));
    assert_eq!(fc.points.last().map(|p| p.date), Some(date(2024, 1, 17)));
    assert!(fc.points.iter().all(|p| close(p.total, 138.2)));
    Ok(())
}

#[test]
fn test_minimal_csv_report() -> anyhow::Result<()> {
    let df = analyser::load_df(Path::new("testdata/minimal.csv"))?;
    let report = SalesReport::build(&df, 5)?;

    let products = report.by_product.as_ref().expect("Product column present");
    assert_eq!(products.keys(), ["B", "A"]);
    let a = products.get("A").expect("product A");
    assert!(close(a.total, 150.0) && a.count == 2 && close(a.mean, 75.0));
    let b = products.get("B").expect("product B");
    assert!(close(b.total, 200.0) && b.count == 1 && close(b.mean, 200.0));

    let regions = report.by_region.as_ref().expect("Region column present");
    assert!(close(regions.get("East").map_or(0.0, |g| g.total), 300.0));
    assert!(close(regions.get("West").map_or(0.0, |g| g.total), 50.0));

    let mut out = Vec::new();
    write_report(&mut out, &report)?;
    let text = String::from_utf8(out)?;
    assert!(text.contains("Total Records: 3"), "{text}");

    let series = TimeSeriesReport::build(&df)?;
    assert!(matches!(series, TimeSeriesReport::Skipped { .. }));
    Ok(())
}

#[test]
fn test_json_and_tsv_inputs() -> anyhow::Result<()> {
    let df = analyser::load_df(Path::new("testdata/sales.json"))?;
    assert_eq!(df.height(), 3);
    let daily = analyser::daily_sales(&df)?;
    assert_eq!(daily.len(), 2);
    assert!(close(daily[0].total, 140.0));

    let df = analyser::load_df(Path::new("testdata/sales.tsv"))?;
    let daily = analyser::daily_sales(&df)?;
    assert_eq!(
        daily.iter().map(|d| d.date).collect::<Vec<_>>(),
        [date(2024, 1, 15), date(2024, 1, 16)]
    );
    Ok(())
}

#[test]
fn test_loader_errors() {
    let err = analyser::load_df(Path::new("testdata/missing.csv")).expect_err("missing file");
    assert!(matches!(err, AnalyzerError::NotFound(_)));

    let err = analyser::load_df(Path::new("testdata/empty.csv")).expect_err("header only");
    assert!(matches!(err, AnalyzerError::EmptyData(_)), "{err}");

    for blank in ["testdata/blank.csv", "testdata/blank.jsonl"] {
        let err = analyser::load_df(Path::new(blank)).expect_err("whitespace only");
        assert!(matches!(err, AnalyzerError::EmptyData(_)), "{blank}: {err}");
        assert!(err.to_string().ends_with("is empty."), "{err}");
    }

    let err = analyser::load_df(Path::new("testdata/notes.txt")).expect_err("text file");
    assert!(matches!(err, AnalyzerError::UnsupportedFormat(ref ext) if ext == "txt"));

    let err = analyser::load_df(Path::new("testdata/bad_dates.csv")).expect_err("bad date");
    match err {
        AnalyzerError::DateParse { value, row } => {
            assert_eq!(value, "sometime soon");
            assert_eq!(row, 2);
        }
        other => panic!("expected a date error, got {other}"),
    }
}

#[test]
fn test_workbook_reloads_as_spreadsheet() -> anyhow::Result<()> {
    let df = analyser::load_df(Path::new("testdata/sales.csv"))?;
    let report = SalesReport::build(&df, 5)?;
    let daily = analyser::daily_sales(&df)?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sales_analysis.xlsx");
    let sheets = export_workbook(
        &path,
        &WorkbookContent {
            raw: &df,
            summary: &report.numeric,
            by_product: report.by_product.as_ref(),
            by_region: report.by_region.as_ref(),
            daily: &daily,
        },
    )?;
    assert_eq!(
        sheets,
        [
            "Raw Data",
            "Summary Statistics",
            "Product Analysis",
            "Region Analysis",
            "Daily Sales"
        ]
    );

    // The first sheet holds the raw rows, so the workbook is itself a valid input.
    let reloaded = analyser::load_df(&path)?;
    assert_eq!(reloaded.shape(), df.shape());
    assert_eq!(reloaded.column("Date")?.dtype(), &DataType::Date);
    let totals = analyser::sales_totals(&reloaded)?.expect("Amount column present");
    assert!(close(totals.total, 1401.0));
    Ok(())
}

#[test]
fn test_undated_input_skips_time_series() -> anyhow::Result<()> {
    let df = analyser::load_df(Path::new("testdata/no_dates.csv"))?;
    match TimeSeriesReport::build(&df)? {
        TimeSeriesReport::Skipped { missing } => assert_eq!(missing, ["Date"]),
        TimeSeriesReport::Ready { .. } => panic!("no Date column, nothing to build"),
    }

    let samples = analyser::quantity_by_product(&df)?;
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].product, "A");
    assert_eq!(samples[0].values, [2.0, 3.0]);
    Ok(())
}
