//! A complete analyzer run over one input file.
//!
//! Stages run strictly in order: load, report, time series, then the
//! optional forecast, charts (and PDF) and workbook. Report text goes to
//! the supplied writer; progress and skipped stages go to `tracing`.
//!
//! ```no_run
//! use sales_analyzer::config::AnalyzerSettings;
//! use sales_analyzer::pipeline::{RunOptions, run};
//! use std::path::Path;
//!
//! let summary = run(
//!     Path::new("sales.csv"),
//!     &AnalyzerSettings::default(),
//!     RunOptions::all(),
//!     &mut std::io::stdout(),
//! )?;
//! assert!(summary.workbook.is_some());
//! # Ok::<(), sales_analyzer::error::AnalyzerError>(())
//! ```

use crate::analyser::frame::has_column;
use crate::analyser::types::columns::{AMOUNT, PRODUCT, QUANTITY, REGION};
use crate::analyser::types::Forecast;
use crate::analyser::{self, pivot_sales, quantity_by_product};
use crate::config::AnalyzerSettings;
use crate::error::Result;
use crate::export::{self, WorkbookContent};
use crate::render::{self, ChartData, PdfSummary, RenderedChart};
use crate::report::{self, SalesReport, TimeSeriesReport};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Optional stages to run after the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub visualize: bool,
    pub export_excel: bool,
    pub export_pdf: bool,
    pub forecast: bool,
}

impl RunOptions {
    pub fn all() -> Self {
        Self {
            visualize: true,
            export_excel: true,
            export_pdf: true,
            forecast: true,
        }
    }
}

/// What a run produced.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunSummary {
    pub record_count: usize,
    pub forecast: Option<Forecast>,
    pub charts: Vec<PathBuf>,
    pub workbook: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

/// Loads `input`, writes the report to `out` and produces the requested artifacts.
///
/// # Errors
///
/// Returns the loader's error for a missing, empty or unreadable input, and
/// any failure while aggregating, rendering or exporting.
pub fn run(
    input: &Path,
    settings: &AnalyzerSettings,
    options: RunOptions,
    out: &mut impl Write,
) -> Result<RunSummary> {
    settings.validate()?;
    tracing::info!(?options, "Analyzing {}", input.display());

    let df = analyser::load_df(input)?;
    let report = SalesReport::build(&df, settings.head_rows)?;
    report::write_report(out, &report)?;

    let series = TimeSeriesReport::build(&df)?;
    report::write_time_series(out, &series)?;

    let mut summary = RunSummary {
        record_count: df.height(),
        ..Default::default()
    };

    if options.forecast {
        summary.forecast = analyser::forecast(
            series.daily(),
            settings.forecast_periods,
            settings.max_forecast_window,
        );
        report::write_forecast(out, summary.forecast.as_ref(), &series)?;
    }

    if options.visualize || options.export_pdf {
        let charts = draw_charts(&df, &report, &series, summary.forecast.as_ref(), settings)?;
        writeln!(
            out,
            "Charts saved to {} ({} files)",
            settings.output_dir.display(),
            charts.len()
        )?;

        if options.export_pdf {
            let pdf_path = settings.pdf_path();
            let pdf_summary = PdfSummary {
                source: input.display().to_string(),
                record_count: report.record_count,
                total_sales: report.totals.map(|t| t.total),
                generated: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
            };
            render::write_pdf_report(&pdf_path, &pdf_summary, &charts)?;
            writeln!(out, "PDF report saved to {}", pdf_path.display())?;
            summary.pdf = Some(pdf_path);
        }
        summary.charts = charts.into_iter().map(|c| c.path).collect();
    }

    if options.export_excel {
        let path = settings.workbook_path();
        let sheets = export::export_workbook(
            &path,
            &WorkbookContent {
                raw: &df,
                summary: &report.numeric,
                by_product: report.by_product.as_ref(),
                by_region: report.by_region.as_ref(),
                daily: series.daily(),
            },
        )?;
        writeln!(
            out,
            "Excel report saved to {} (sheets: {})",
            path.display(),
            sheets.join(", ")
        )?;
        summary.workbook = Some(path);
    }

    writeln!(out)?;
    report::write_footer(out)?;
    Ok(summary)
}

fn draw_charts(
    df: &DataFrame,
    report: &SalesReport,
    series: &TimeSeriesReport,
    forecast: Option<&Forecast>,
    settings: &AnalyzerSettings,
) -> Result<Vec<RenderedChart>> {
    let quantities = if has_column(df, PRODUCT) && has_column(df, QUANTITY) {
        Some(quantity_by_product(df)?)
    } else {
        None
    };
    let pivot = if [PRODUCT, REGION, AMOUNT].iter().all(|c| has_column(df, c)) {
        Some(pivot_sales(df)?)
    } else {
        None
    };

    let data = ChartData {
        by_product: report.by_product.as_ref(),
        by_region: report.by_region.as_ref(),
        daily: series.daily(),
        forecast,
        quantities: quantities.as_deref(),
        pivot: pivot.as_ref(),
    };
    render::render_charts(&data, &settings.output_dir, settings.chart_size())
}
