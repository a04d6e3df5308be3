//! Descriptive statistics and grouped aggregates of the `Amount` column.

use super::frame::{f64_values, has_column, string_values, u64_values};
use super::types::columns::{AMOUNT, PRODUCT, QUANTITY, REGION};
use super::types::headers::{AVERAGE_SALE, NUMBER_OF_SALES, STATISTIC, TOTAL_SALES};
use super::types::{
    GroupAggregate, GroupedSales, NumericSummary, QuantitySample, STAT_LABELS, SalesPivot,
    SalesTotals,
};
use crate::error::Result;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Count, mean, sample std, min, quartiles and max for every numeric column.
///
/// # Errors
///
/// Returns an error if a numeric column cannot be cast to `f64`.
pub fn describe_numeric(df: &DataFrame) -> Result<Vec<NumericSummary>> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype().is_primitive_numeric())
        .map(summarize_numeric)
        .collect()
}

fn summarize_numeric(column: &Column) -> Result<NumericSummary> {
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let ca = series.f64()?;

    Ok(NumericSummary {
        name: column.name().to_string(),
        count: ca.len() - ca.null_count(),
        mean: ca.mean(),
        std_dev: ca.std(1),
        min: ca.min(),
        q1: ca.quantile(0.25, QuantileMethod::Linear)?,
        median: ca.quantile(0.5, QuantileMethod::Linear)?,
        q3: ca.quantile(0.75, QuantileMethod::Linear)?,
        max: ca.max(),
    })
}

/// Lays the summaries out like a `describe()` table: one row per statistic,
/// one column per numeric input column.
///
/// # Errors
///
/// Returns an error if the frame cannot be assembled.
pub fn describe_frame(summaries: &[NumericSummary]) -> Result<DataFrame> {
    let mut columns = vec![Column::new(STATISTIC.into(), STAT_LABELS.to_vec())];
    for summary in summaries {
        columns.push(Column::new(
            summary.name.as_str().into(),
            summary.values().to_vec(),
        ));
    }
    Ok(DataFrame::new(columns)?)
}

/// Total, mean, max and min of `Amount`; `None` without a usable `Amount` column.
///
/// # Errors
///
/// Returns an error if `Amount` cannot be cast to `f64`.
pub fn sales_totals(df: &DataFrame) -> Result<Option<SalesTotals>> {
    if !has_column(df, AMOUNT) {
        return Ok(None);
    }
    let amounts: Vec<f64> = f64_values(df, AMOUNT)?.into_iter().flatten().collect();
    if amounts.is_empty() {
        return Ok(None);
    }

    let total: f64 = amounts.iter().sum();
    Ok(Some(SalesTotals {
        total,
        mean: total / amounts.len() as f64,
        max: amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min: amounts.iter().copied().fold(f64::INFINITY, f64::min),
    }))
}

/// Groups rows by `key`, reducing `Amount` to sum, count and mean.
///
/// Rows with a null key are dropped. The result is ordered by descending
/// total; equal totals keep ascending label order.
///
/// # Errors
///
/// Returns an error if either column is missing or the query fails.
pub fn group_sales(df: &DataFrame, key: &str) -> Result<GroupedSales> {
    let amount = col(AMOUNT).cast(DataType::Float64);
    let grouped = df
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by([col(key).cast(DataType::String)])
        .agg([
            amount.clone().sum().alias(TOTAL_SALES),
            amount.clone().count().alias(NUMBER_OF_SALES),
            amount.mean().alias(AVERAGE_SALE),
        ])
        .sort_by_exprs(
            [col(TOTAL_SALES), col(key)],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false])
                .with_maintain_order(true),
        )
        .collect()?;

    let keys = string_values(&grouped, key)?;
    let totals = f64_values(&grouped, TOTAL_SALES)?;
    let counts = u64_values(&grouped, NUMBER_OF_SALES)?;
    let means = f64_values(&grouped, AVERAGE_SALE)?;

    let groups = keys
        .into_iter()
        .zip(totals)
        .zip(counts)
        .zip(means)
        .filter_map(|(((key, total), count), mean)| {
            Some(GroupAggregate {
                key: key?,
                total: total.unwrap_or(0.0),
                count: count.unwrap_or(0) as usize,
                mean: mean.unwrap_or(f64::NAN),
            })
        })
        .collect();

    Ok(GroupedSales {
        key_column: key.to_owned(),
        groups,
    })
}

/// `group_sales` when both the key column and `Amount` are present.
///
/// # Errors
///
/// Propagates failures from [`group_sales`].
pub fn group_sales_if_present(df: &DataFrame, key: &str) -> Result<Option<GroupedSales>> {
    if has_column(df, key) && has_column(df, AMOUNT) {
        group_sales(df, key).map(Some)
    } else {
        Ok(None)
    }
}

/// Renames a grouped aggregate to display headers:
/// key, `Total Sales`, `Number of Sales`, `Average Sale`.
///
/// # Errors
///
/// Returns an error if the frame cannot be assembled.
pub fn grouped_frame(sales: &GroupedSales) -> Result<DataFrame> {
    let keys: Vec<&str> = sales.keys();
    let totals: Vec<f64> = sales.groups.iter().map(|g| g.total).collect();
    let counts: Vec<u64> = sales.groups.iter().map(|g| g.count as u64).collect();
    let means: Vec<f64> = sales.groups.iter().map(|g| g.mean).collect();

    Ok(DataFrame::new(vec![
        Column::new(sales.key_column.as_str().into(), keys),
        Column::new(TOTAL_SALES.into(), totals),
        Column::new(NUMBER_OF_SALES.into(), counts),
        Column::new(AVERAGE_SALE.into(), means),
    ])?)
}

/// Summed `Amount` for every product × region combination, labels sorted ascending.
///
/// # Errors
///
/// Returns an error if `Product`, `Region` or `Amount` is missing.
pub fn pivot_sales(df: &DataFrame) -> Result<SalesPivot> {
    let grouped = df
        .clone()
        .lazy()
        .filter(col(PRODUCT).is_not_null().and(col(REGION).is_not_null()))
        .group_by([
            col(PRODUCT).cast(DataType::String),
            col(REGION).cast(DataType::String),
        ])
        .agg([col(AMOUNT).cast(DataType::Float64).sum().alias(TOTAL_SALES)])
        .collect()?;

    let products = string_values(&grouped, PRODUCT)?;
    let regions = string_values(&grouped, REGION)?;
    let totals = f64_values(&grouped, TOTAL_SALES)?;

    let mut cells: BTreeMap<(String, String), f64> = BTreeMap::new();
    for ((product, region), total) in products.into_iter().zip(regions).zip(totals) {
        if let (Some(product), Some(region)) = (product, region) {
            *cells.entry((product, region)).or_default() += total.unwrap_or(0.0);
        }
    }

    let mut product_labels: Vec<String> = cells.keys().map(|(p, _)| p.clone()).collect();
    product_labels.dedup();
    let mut region_labels: Vec<String> = cells.keys().map(|(_, r)| r.clone()).collect();
    region_labels.sort();
    region_labels.dedup();

    let values = product_labels
        .iter()
        .map(|p| {
            region_labels
                .iter()
                .map(|r| {
                    cells
                        .get(&(p.clone(), r.clone()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect();

    Ok(SalesPivot {
        products: product_labels,
        regions: region_labels,
        values,
    })
}

/// Non-null `Quantity` values per product, products sorted ascending.
///
/// # Errors
///
/// Returns an error if `Product` or `Quantity` is missing.
pub fn quantity_by_product(df: &DataFrame) -> Result<Vec<QuantitySample>> {
    let products = string_values(df, PRODUCT)?;
    let quantities = f64_values(df, QUANTITY)?;

    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (product, quantity) in products.into_iter().zip(quantities) {
        if let (Some(product), Some(quantity)) = (product, quantity) {
            samples.entry(product).or_default().push(quantity);
        }
    }

    Ok(samples
        .into_iter()
        .map(|(product, values)| QuantitySample { product, values })
        .collect())
}
