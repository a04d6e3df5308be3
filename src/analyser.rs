//! Loading and analysing sales tables.
//!
//! - [`io`]: format dispatch and `Date` parsing
//! - [`aggregation`]: descriptive statistics, grouped totals, pivots
//! - [`timeseries`]: daily totals, trend and forecast
//! - [`frame`]: typed access to polars columns
//! - [`types`]: result types shared by the report, renderer and exporter

pub mod aggregation;
pub mod frame;
pub mod io;
pub mod timeseries;
pub mod types;

pub use aggregation::{
    describe_frame, describe_numeric, group_sales, group_sales_if_present, grouped_frame,
    pivot_sales, quantity_by_product, sales_totals,
};
pub use io::load_df;
pub use timeseries::{daily_sales, forecast, forecast_window, trend_summary};
pub use types::{
    DailyTotal, Forecast, GroupAggregate, GroupedSales, NumericSummary, QuantitySample,
    SalesPivot, SalesTotals, TrendSummary,
};
