//! Small helpers for pulling typed values out of polars frames.

use crate::error::Result;
use crate::utils::date_from_days;
use polars::prelude::*;

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Names from `required` that the frame does not have.
pub fn missing_columns<'a>(df: &DataFrame, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|name| !has_column(df, name))
        .collect()
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

/// Values of a column cast to `f64`; non-numeric cells become `None`.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

pub fn u64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<u64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;
    Ok(series.u64()?.into_iter().collect())
}

pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}

/// Text shown for a single cell in previews and tables.
pub fn cell_text(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => (*s).to_owned(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Date(days) => date_from_days(*days)
            .map(|d| d.to_string())
            .unwrap_or_else(|| days.to_string()),
        AnyValue::Float64(v) => format_float(*v),
        AnyValue::Float32(v) => format_float(f64::from(*v)),
        other => other.to_string(),
    }
}

fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// The first `n` rows rendered as cell text, one inner vector per row.
pub fn preview_rows(df: &DataFrame, n: usize) -> Result<Vec<Vec<String>>> {
    let head = df.head(Some(n));
    let mut rows = Vec::with_capacity(head.height());
    for i in 0..head.height() {
        let row = head
            .get_columns()
            .iter()
            .map(|c| c.get(i).map(|v| cell_text(&v)))
            .collect::<PolarsResult<Vec<_>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns() -> Result<()> {
        let df = df!(
            "Product" => &["A", "B"],
            "Amount" => &[1.0, 2.0]
        )?;
        assert!(has_column(&df, "Amount"));
        assert_eq!(missing_columns(&df, &["Date", "Amount", "Region"]), vec!["Date", "Region"]);
        assert_eq!(column_names(&df), vec!["Product", "Amount"]);
        Ok(())
    }

    #[test]
    fn test_typed_values() -> Result<()> {
        let df = df!(
            "Amount" => &[Some(10i64), None, Some(5)],
            "Region" => &[Some("East"), Some("West"), None]
        )?;
        assert_eq!(f64_values(&df, "Amount")?, vec![Some(10.0), None, Some(5.0)]);
        assert_eq!(
            string_values(&df, "Region")?,
            vec![Some("East".to_owned()), Some("West".to_owned()), None]
        );
        Ok(())
    }

    #[test]
    fn test_preview_rows_limits_and_formats() -> Result<()> {
        let df = df!(
            "Product" => &["A", "B", "C"],
            "Amount" => &[100.0, 50.5, 200.0]
        )?;
        let rows = preview_rows(&df, 2)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["A".to_owned(), "100.0".to_owned()]);
        assert_eq!(rows[1], vec!["B".to_owned(), "50.5".to_owned()]);
        Ok(())
    }
}
