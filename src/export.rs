//! Excel workbook export.
//!
//! Every sheet is a polars frame written cell by cell: a bold header row,
//! numbers as numbers, dates as ISO strings and nulls as empty cells.

use crate::analyser::frame::cell_text;
use crate::analyser::types::columns::{AMOUNT, DATE};
use crate::analyser::types::{DailyTotal, GroupedSales, NumericSummary};
use crate::analyser::{describe_frame, grouped_frame};
use crate::error::{AnalyzerError, Result, ResultExt as _};
use crate::utils::{date_from_days, days_since_epoch};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

pub const RAW_DATA_SHEET: &str = "Raw Data";
pub const SUMMARY_SHEET: &str = "Summary Statistics";
pub const PRODUCT_SHEET: &str = "Product Analysis";
pub const REGION_SHEET: &str = "Region Analysis";
pub const DAILY_SHEET: &str = "Daily Sales";

const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Everything the workbook can contain. Absent aggregates produce no sheet.
#[derive(Clone, Copy, Debug)]
pub struct WorkbookContent<'a> {
    pub raw: &'a DataFrame,
    pub summary: &'a [NumericSummary],
    pub by_product: Option<&'a GroupedSales>,
    pub by_region: Option<&'a GroupedSales>,
    pub daily: &'a [DailyTotal],
}

/// Writes the sales workbook and returns the names of the sheets it contains.
///
/// # Errors
///
/// Returns an error if a sheet frame cannot be built or the file cannot be saved.
pub fn export_workbook(path: &Path, content: &WorkbookContent<'_>) -> Result<Vec<String>> {
    let summary = describe_frame(content.summary)?;
    let mut sheets: Vec<(&str, DataFrame)> = vec![(SUMMARY_SHEET, summary)];
    if let Some(products) = content.by_product {
        sheets.push((PRODUCT_SHEET, grouped_frame(products)?));
    }
    if let Some(regions) = content.by_region {
        sheets.push((REGION_SHEET, grouped_frame(regions)?));
    }
    if !content.daily.is_empty() {
        sheets.push((DAILY_SHEET, daily_frame(content.daily)?));
    }

    let mut ordered: Vec<(&str, &DataFrame)> = vec![(RAW_DATA_SHEET, content.raw)];
    ordered.extend(sheets.iter().map(|(name, df)| (*name, df)));
    write_workbook(path, &ordered)?;

    Ok(ordered.iter().map(|(name, _)| (*name).to_owned()).collect())
}

/// Daily totals as a two-column frame: `Date` and `Amount`.
///
/// # Errors
///
/// Returns an error if the `Date` cast fails.
pub fn daily_frame(daily: &[DailyTotal]) -> Result<DataFrame> {
    let days: Vec<i32> = daily.iter().map(|d| days_since_epoch(d.date)).collect();
    let totals: Vec<f64> = daily.iter().map(|d| d.total).collect();
    let dates = Column::new(DATE.into(), days).cast(&DataType::Date)?;
    Ok(DataFrame::new(vec![dates, Column::new(AMOUNT.into(), totals)])?)
}

/// Writes one sheet per `(name, frame)` pair, creating parent directories.
///
/// # Errors
///
/// Returns [`AnalyzerError::Export`] if a sheet name is invalid, a frame
/// exceeds the sheet limits, or the file cannot be written.
pub fn write_workbook(path: &Path, sheets: &[(&str, &DataFrame)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    for (name, df) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        write_frame(sheet, df, &header)?;
        tracing::debug!("Sheet '{name}': {} rows x {} columns", df.height(), df.width());
    }

    workbook.save(path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

fn row_index(i: usize) -> Result<u32> {
    if i >= MAX_ROWS {
        return Err(AnalyzerError::Export(format!(
            "{i} rows exceed the worksheet limit of {MAX_ROWS}"
        )));
    }
    u32::try_from(i).map_err(|e| AnalyzerError::Export(e.to_string()))
}

fn col_index(i: usize) -> Result<u16> {
    if i >= MAX_COLS {
        return Err(AnalyzerError::Export(format!(
            "{i} columns exceed the worksheet limit of {MAX_COLS}"
        )));
    }
    u16::try_from(i).map_err(|e| AnalyzerError::Export(e.to_string()))
}

fn write_frame(sheet: &mut Worksheet, df: &DataFrame, header: &Format) -> Result<()> {
    // Header row plus data rows.
    row_index(df.height())?;

    for (c, column) in df.get_columns().iter().enumerate() {
        let col = col_index(c)?;
        sheet.write_string_with_format(0, col, column.name().as_str(), header)?;

        let series = column.as_materialized_series().rechunk();
        for (r, value) in series.iter().enumerate() {
            write_cell(sheet, row_index(r + 1)?, col, &value)?;
        }
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &AnyValue<'_>) -> Result<()> {
    match value {
        AnyValue::Null => {}
        AnyValue::Boolean(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        AnyValue::String(s) => {
            sheet.write_string(row, col, *s)?;
        }
        AnyValue::StringOwned(s) => {
            sheet.write_string(row, col, s.as_str())?;
        }
        AnyValue::Date(days) => {
            let text = date_from_days(*days)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| days.to_string());
            sheet.write_string(row, col, text)?;
        }
        v if v.dtype().is_primitive_numeric() => match v.extract::<f64>() {
            Some(x) if x.is_finite() => {
                sheet.write_number(row, col, x)?;
            }
            // Excel has no NaN or infinity.
            _ => {
                sheet.write_string(row, col, cell_text(v))?;
            }
        },
        other => {
            sheet.write_string(row, col, cell_text(other))?;
        }
    }
    Ok(())
}
