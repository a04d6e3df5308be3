//! Daily sales totals, trend figures and the moving-average forecast.
//!
//! The forecast is deliberately naive: it averages the trailing window of
//! daily totals and repeats that single value for every future day.

use super::frame::{f64_values, missing_columns};
use super::types::columns::{AMOUNT, DATE};
use super::types::headers::TOTAL_SALES;
use super::types::{DailyTotal, Forecast, TrendSummary};
use crate::error::Result;
use crate::utils::date_from_days;
use chrono::Days;
use polars::prelude::*;

/// Largest trailing window the forecast averages over.
pub const DEFAULT_MAX_WINDOW: usize = 7;

/// Columns the time-series analysis needs that the frame lacks.
pub fn missing_inputs(df: &DataFrame) -> Vec<&'static str> {
    missing_columns(df, &[DATE, AMOUNT])
}

/// Sum of `Amount` per calendar day, ascending by date. Rows without a date are ignored.
///
/// # Errors
///
/// Returns an error if `Date` or `Amount` is missing or not convertible.
pub fn daily_sales(df: &DataFrame) -> Result<Vec<DailyTotal>> {
    let daily = df
        .clone()
        .lazy()
        .filter(col(DATE).is_not_null())
        .group_by([col(DATE).cast(DataType::Date)])
        .agg([col(AMOUNT).cast(DataType::Float64).sum().alias(TOTAL_SALES)])
        .sort_by_exprs([col(DATE)], SortMultipleOptions::default())
        .collect()?;

    let days = daily
        .column(DATE)?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    let totals = f64_values(&daily, TOTAL_SALES)?;

    Ok(days
        .i32()?
        .into_iter()
        .zip(totals)
        .filter_map(|(day, total)| {
            Some(DailyTotal {
                date: date_from_days(day?)?,
                total: total.unwrap_or(0.0),
            })
        })
        .collect())
}

/// Mean daily total, best and worst day, and first-to-last change.
///
/// Returns `None` for an empty series. On ties the earliest day wins.
pub fn trend_summary(daily: &[DailyTotal]) -> Option<TrendSummary> {
    let first = daily.first()?;
    let last = daily.last()?;

    let mut peak = *first;
    let mut lowest = *first;
    for day in daily {
        if day.total > peak.total {
            peak = *day;
        }
        if day.total < lowest.total {
            lowest = *day;
        }
    }

    let pct_change = if daily.len() > 1 && first.total != 0.0 {
        Some((last.total - first.total) / first.total * 100.0)
    } else {
        None
    };

    Some(TrendSummary {
        days: daily.len(),
        mean_daily: daily.iter().map(|d| d.total).sum::<f64>() / daily.len() as f64,
        peak,
        lowest,
        pct_change,
    })
}

/// `min(max_window, distinct_days / 2)`.
pub fn forecast_window(distinct_days: usize, max_window: usize) -> usize {
    max_window.min(distinct_days / 2)
}

/// Repeats the trailing moving average for `periods` days after the last date.
///
/// Returns `None` when the window would be empty (fewer than two days) or
/// no periods were requested.
pub fn forecast(daily: &[DailyTotal], periods: usize, max_window: usize) -> Option<Forecast> {
    let window = forecast_window(daily.len(), max_window);
    if window == 0 || periods == 0 {
        return None;
    }

    let last = daily.last()?;
    let trailing = daily.get(daily.len() - window..)?;
    let moving_average = trailing.iter().map(|d| d.total).sum::<f64>() / window as f64;

    let points = (1..=periods as u64)
        .filter_map(|offset| last.date.checked_add_days(Days::new(offset)))
        .map(|date| DailyTotal {
            date,
            total: moving_average,
        })
        .collect();

    Some(Forecast {
        window,
        moving_average,
        points,
    })
}
