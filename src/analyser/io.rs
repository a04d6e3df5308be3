//! Loading sales tables from disk.
//!
//! The reader is picked from the file extension. Every reader produces a
//! polars `DataFrame`; afterwards the `Date` column, when present, is
//! normalised to a polars `Date` column so the time-series code can group
//! by calendar day regardless of the source format.

use super::types::columns::DATE;
use crate::error::{AnalyzerError, Result};
use crate::utils::days_since_epoch;
use calamine::{Data, DataType as _, Reader as _, open_workbook_auto};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::Path;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Input formats the loader understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    Spreadsheet,
    Json,
    JsonLines,
    Parquet,
}

impl InputFormat {
    /// Picks the reader for a path from its (case-insensitive) extension.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::UnsupportedFormat`] for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Spreadsheet),
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "parquet" => Ok(Self::Parquet),
            _ => Err(AnalyzerError::UnsupportedFormat(ext)),
        }
    }

    /// Formats read as plain text, where a whitespace-only file has no records.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Csv | Self::Tsv | Self::Json | Self::JsonLines)
    }
}

/// Loads a sales table and parses its `Date` column.
///
/// # Errors
///
/// - [`AnalyzerError::NotFound`] when the path does not exist
/// - [`AnalyzerError::UnsupportedFormat`] for unknown extensions
/// - [`AnalyzerError::EmptyData`] when the file holds no rows
/// - [`AnalyzerError::Format`] / [`AnalyzerError::DateParse`] when decoding fails
pub fn load_df(path: &Path) -> Result<DataFrame> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(AnalyzerError::NotFound(shown));
    }

    let format = InputFormat::from_path(path)?;
    if std::fs::metadata(path)?.len() == 0 {
        return Err(AnalyzerError::EmptyData(shown));
    }
    if format.is_text() && is_blank_text(path)? {
        return Err(AnalyzerError::EmptyData(shown));
    }

    tracing::debug!(?format, path = %shown, "Reading input file");
    let df = match format {
        InputFormat::Csv => {
            read_delimited(path, b',').map_err(|e| decode_error(e, "CSV", &shown))
        }
        InputFormat::Tsv => {
            read_delimited(path, b'\t').map_err(|e| decode_error(e, "TSV", &shown))
        }
        InputFormat::Spreadsheet => read_spreadsheet(path),
        InputFormat::Json => JsonReader::new(std::fs::File::open(path)?)
            .finish()
            .map_err(|e| decode_error(e, "JSON", &shown)),
        InputFormat::JsonLines => JsonLineReader::from_path(path)
            .and_then(|reader| reader.finish())
            .map_err(|e| decode_error(e, "JSON Lines", &shown)),
        InputFormat::Parquet => ParquetReader::new(std::fs::File::open(path)?)
            .finish()
            .map_err(|e| decode_error(e, "Parquet", &shown)),
    }?;

    if df.height() == 0 {
        return Err(AnalyzerError::EmptyData(shown));
    }

    let df = parse_date_column(df)?;
    tracing::info!(
        rows = df.height(),
        columns = df.width(),
        "Loaded {shown}"
    );
    Ok(df)
}

/// Readers report "no data" for inputs without a single record; that is an
/// empty file, not a malformed one.
pub(super) fn decode_error(err: PolarsError, reader: &str, path: &str) -> AnalyzerError {
    match err {
        PolarsError::NoData(_) => AnalyzerError::EmptyData(path.to_owned()),
        other => AnalyzerError::Format(format!("{reader}: {other}")),
    }
}

/// True when a text input holds nothing but whitespace.
fn is_blank_text(path: &Path) -> Result<bool> {
    let bytes = std::fs::read(path)?;
    Ok(bytes.iter().all(u8::is_ascii_whitespace))
}

fn read_delimited(path: &Path, separator: u8) -> PolarsResult<DataFrame> {
    LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_has_header(true)
        .with_separator(separator)
        .finish()
        .and_then(LazyFrame::collect)
}

/// Reads the first worksheet. The first row holds the column names.
fn read_spreadsheet(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalyzerError::EmptyData(path.display().to_string()))??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let body: Vec<&[Data]> = rows.collect();

    let columns = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell.to_string();
            let name = if name.trim().is_empty() {
                format!("column_{}", i + 1)
            } else {
                name.trim().to_owned()
            };
            let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(i)).collect();
            spreadsheet_column(&name, &cells)
        })
        .collect::<Result<Vec<Column>>>()?;

    DataFrame::new(columns).map_err(|e| AnalyzerError::Format(format!("spreadsheet: {e}")))
}

fn is_blank(cell: Option<&Data>) -> bool {
    match cell {
        None | Some(Data::Empty) => true,
        Some(Data::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Types a worksheet column from its non-blank cells: integers, floats,
/// dates, or text as the fallback.
fn spreadsheet_column(name: &str, cells: &[Option<&Data>]) -> Result<Column> {
    let filled: Vec<&Data> = cells
        .iter()
        .filter(|c| !is_blank(**c))
        .filter_map(|c| *c)
        .collect();

    let all_int = filled.iter().all(|c| matches!(c, Data::Int(_)));
    let all_numeric = filled
        .iter()
        .all(|c| matches!(c, Data::Int(_) | Data::Float(_)));
    let all_dates = filled
        .iter()
        .all(|c| matches!(c, Data::DateTime(_) | Data::DateTimeIso(_)));

    let series = if filled.is_empty() {
        let values: Vec<Option<String>> = vec![None; cells.len()];
        Series::new(name.into(), values)
    } else if all_int {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| c.filter(|d| !is_blank(Some(*d))).and_then(|d| d.as_i64()))
            .collect();
        Series::new(name.into(), values)
    } else if all_numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| c.filter(|d| !is_blank(Some(*d))).and_then(|d| d.as_f64()))
            .collect();
        Series::new(name.into(), values)
    } else if all_dates {
        let values: Vec<Option<i32>> = cells
            .iter()
            .map(|c| c.and_then(|d| d.as_date()).map(days_since_epoch))
            .collect();
        Series::new(name.into(), values).cast(&DataType::Date)?
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|c| {
                if is_blank(*c) {
                    None
                } else {
                    c.map(|d| d.to_string())
                }
            })
            .collect();
        Series::new(name.into(), values)
    };

    Ok(Column::from(series))
}

/// Converts the `Date` column (if any) into a polars `Date` column.
///
/// Datetimes are truncated to their calendar day; strings are parsed with
/// the accepted formats. Blank strings become nulls, anything else that does
/// not parse fails the load.
///
/// # Errors
///
/// Returns [`AnalyzerError::DateParse`] for the first malformed value and
/// [`AnalyzerError::Format`] when the column has a non-date, non-text type.
pub fn parse_date_column(mut df: DataFrame) -> Result<DataFrame> {
    let dtype = df.column(DATE).ok().map(|column| column.dtype().clone());
    let Some(dtype) = dtype else {
        return Ok(df);
    };

    let parsed = match dtype {
        DataType::Date => return Ok(df),
        DataType::Datetime(_, _) => df
            .column(DATE)?
            .as_materialized_series()
            .cast(&DataType::Date)?,
        DataType::String => parse_date_strings(df.column(DATE)?.as_materialized_series())?,
        other => {
            return Err(AnalyzerError::Format(format!(
                "column '{DATE}' has type {other} and cannot be read as dates"
            )));
        }
    };

    df.replace(DATE, parsed)?;
    Ok(df)
}

fn parse_date_strings(series: &Series) -> Result<Series> {
    let ca = series.str()?;
    let mut days: Vec<Option<i32>> = Vec::with_capacity(ca.len());

    for (row, value) in ca.into_iter().enumerate() {
        match value.map(str::trim) {
            None | Some("") => days.push(None),
            Some(text) => {
                let date = parse_date(text).ok_or_else(|| AnalyzerError::DateParse {
                    value: text.to_owned(),
                    row: row + 1,
                })?;
                days.push(Some(days_since_epoch(date)));
            }
        }
    }

    Ok(Series::new(series.name().clone(), days).cast(&DataType::Date)?)
}

/// Parses a single date value using the accepted date and datetime formats.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
