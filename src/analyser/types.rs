use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Well-known column names the analyzer reacts to.
pub mod columns {
    pub const AMOUNT: &str = "Amount";
    pub const PRODUCT: &str = "Product";
    pub const REGION: &str = "Region";
    pub const DATE: &str = "Date";
    pub const QUANTITY: &str = "Quantity";
}

/// Display headers used for grouped aggregates in the report and workbook.
pub mod headers {
    pub const TOTAL_SALES: &str = "Total Sales";
    pub const NUMBER_OF_SALES: &str = "Number of Sales";
    pub const AVERAGE_SALE: &str = "Average Sale";
    pub const STATISTIC: &str = "statistic";
}

/// Row labels of the descriptive statistics table, in display order.
pub const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NumericSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    /// Values in [`STAT_LABELS`] order.
    pub fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std_dev,
            self.min,
            self.q1,
            self.median,
            self.q3,
            self.max,
        ]
    }
}

/// Overall figures for the `Amount` column.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct SalesTotals {
    pub total: f64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GroupAggregate {
    pub key: String,
    pub total: f64,
    pub count: usize,
    pub mean: f64,
}

/// Aggregates of `Amount` keyed by one column, ordered by descending total.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GroupedSales {
    pub key_column: String,
    pub groups: Vec<GroupAggregate>,
}

impl GroupedSales {
    pub fn get(&self, key: &str) -> Option<&GroupAggregate> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.key.as_str()).collect()
    }

    pub fn grand_total(&self) -> f64 {
        self.groups.iter().map(|g| g.total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TrendSummary {
    pub days: usize,
    pub mean_daily: f64,
    pub peak: DailyTotal,
    pub lowest: DailyTotal,
    /// `None` with a single day, or when the first day's total is zero.
    pub pct_change: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Forecast {
    pub window: usize,
    pub moving_average: f64,
    pub points: Vec<DailyTotal>,
}

/// Summed `Amount` by product (rows) and region (columns).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SalesPivot {
    pub products: Vec<String>,
    pub regions: Vec<String>,
    /// `values[product][region]`; missing combinations are zero.
    pub values: Vec<Vec<f64>>,
}

impl SalesPivot {
    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(0.0_f64, f64::max)
    }
}

/// `Quantity` observations for one product, used by the box plot.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuantitySample {
    pub product: String,
    pub values: Vec<f64>,
}
