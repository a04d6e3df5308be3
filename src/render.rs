//! PNG charts and the PDF report.
//!
//! Charts are drawn with `plotters` onto bitmap backends; the PDF embeds
//! a subset of the written PNGs with `printpdf`.

pub mod charts;
pub mod pdf;

use crate::analyser::types::{DailyTotal, Forecast, GroupedSales, QuantitySample, SalesPivot};
use crate::error::Result;
use std::path::{Path, PathBuf};

pub use pdf::{PdfSummary, write_pdf_report};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    ProductBar,
    RegionPie,
    DailyLine,
    QuantityBox,
    SalesHeatmap,
}

impl ChartKind {
    pub const ALL: [Self; 5] = [
        Self::ProductBar,
        Self::RegionPie,
        Self::DailyLine,
        Self::QuantityBox,
        Self::SalesHeatmap,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::ProductBar => "sales_by_product.png",
            Self::RegionPie => "sales_by_region.png",
            Self::DailyLine => "daily_sales.png",
            Self::QuantityBox => "quantity_distribution.png",
            Self::SalesHeatmap => "sales_heatmap.png",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ProductBar => "Total Sales by Product",
            Self::RegionPie => "Sales Distribution by Region",
            Self::DailyLine => "Daily Sales Trend",
            Self::QuantityBox => "Quantity Distribution by Product",
            Self::SalesHeatmap => "Sales Heatmap: Product vs Region",
        }
    }

    /// Whether the chart gets its own page in the PDF report.
    pub fn in_pdf(self) -> bool {
        matches!(self, Self::ProductBar | Self::RegionPie | Self::DailyLine)
    }
}

/// Aggregates the charts are drawn from. `None` or empty means the inputs were absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChartData<'a> {
    pub by_product: Option<&'a GroupedSales>,
    pub by_region: Option<&'a GroupedSales>,
    pub daily: &'a [DailyTotal],
    pub forecast: Option<&'a Forecast>,
    pub quantities: Option<&'a [QuantitySample]>,
    pub pivot: Option<&'a SalesPivot>,
}

impl ChartData<'_> {
    pub fn is_available(&self, kind: ChartKind) -> bool {
        match kind {
            ChartKind::ProductBar => self.by_product.is_some_and(|g| !g.is_empty()),
            ChartKind::RegionPie => self.by_region.is_some_and(|g| !g.is_empty()),
            ChartKind::DailyLine => !self.daily.is_empty(),
            ChartKind::QuantityBox => self
                .quantities
                .is_some_and(|q| q.iter().any(|s| !s.values.is_empty())),
            ChartKind::SalesHeatmap => self
                .pivot
                .is_some_and(|p| !p.products.is_empty() && !p.regions.is_empty()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub path: PathBuf,
}

/// Draws every chart whose inputs are present into `dir`.
///
/// Charts without data are skipped. A chart that fails to draw is logged
/// and left out of the result.
///
/// # Errors
///
/// Returns an error if `dir` cannot be created.
pub fn render_charts(
    data: &ChartData<'_>,
    dir: &Path,
    size: (u32, u32),
) -> Result<Vec<RenderedChart>> {
    std::fs::create_dir_all(dir)?;

    let mut rendered = Vec::new();
    for kind in ChartKind::ALL {
        if !data.is_available(kind) {
            tracing::info!("Skipping {}: required columns are missing", kind.file_name());
            continue;
        }
        let path = dir.join(kind.file_name());
        match charts::draw(kind, data, &path, size) {
            Ok(()) => {
                tracing::info!("Wrote {}", path.display());
                rendered.push(RenderedChart { kind, path });
            }
            Err(err) => {
                tracing::warn!("Failed to render {}: {err:#}", kind.file_name());
            }
        }
    }
    Ok(rendered)
}
