use super::{ChartData, ChartKind};
use crate::analyser::types::{DailyTotal, Forecast, GroupedSales, QuantitySample, SalesPivot};
use crate::utils::{date_from_days, days_since_epoch};
use anyhow::{Context as _, Result, anyhow};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const FONT: &str = "sans-serif";

const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

const HEAT_LOW: (u8, u8, u8) = (255, 255, 255);
const HEAT_HIGH: (u8, u8, u8) = (178, 24, 43);

fn plot_err(err: impl std::fmt::Display) -> anyhow::Error {
    anyhow!("{err}")
}

fn color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

/// Draws one chart to a PNG at `path`.
pub(super) fn draw(
    kind: ChartKind,
    data: &ChartData<'_>,
    path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let title = kind.title();
    match kind {
        ChartKind::ProductBar => {
            bar_chart(&root, title, data.by_product.context("no product totals")?)?;
        }
        ChartKind::RegionPie => {
            pie_chart(&root, title, data.by_region.context("no region totals")?)?;
        }
        ChartKind::DailyLine => line_chart(&root, title, data.daily, data.forecast)?,
        ChartKind::QuantityBox => {
            box_plot(&root, title, data.quantities.context("no quantity samples")?)?;
        }
        ChartKind::SalesHeatmap => heatmap(&root, title, data.pivot.context("no pivot")?)?,
    }

    root.present()
        .map_err(plot_err)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Axis range that centres `n` categories on the integers `0..n`.
fn category_range(n: usize) -> Range<f64> {
    -0.5..(n as f64 - 0.5)
}

/// Tick label for a category axis; non-integer ticks stay blank.
fn category_label(labels: &[&str], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels
        .get(i as usize)
        .map(|s| (*s).to_owned())
        .unwrap_or_default()
}

/// Value axis covering zero and every value, with headroom above.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi - lo <= f64::EPSILON {
        return (lo, lo + 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { lo }, hi + pad)
}

/// White for zero, deep red for `max`.
pub(crate) fn heat_color(value: f64, max: f64) -> RGBColor {
    let t = if max > 0.0 && value.is_finite() {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    RGBColor(
        mix(HEAT_LOW.0, HEAT_HIGH.0),
        mix(HEAT_LOW.1, HEAT_HIGH.1),
        mix(HEAT_LOW.2, HEAT_HIGH.2),
    )
}

fn bar_chart(root: &Area<'_>, title: &str, sales: &GroupedSales) -> Result<()> {
    let labels = sales.keys();
    let n = labels.len();
    let (y_min, y_max) = value_range(sales.groups.iter().map(|g| g.total));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(category_range(n), y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc(sales.key_column.as_str())
        .y_desc("Total Sales")
        .y_label_formatter(&|y| format!("{y:.0}"))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(sales.groups.iter().enumerate().map(|(i, g)| {
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, g.total)], color(i).filled())
        }))
        .map_err(plot_err)?;
    Ok(())
}

fn pie_chart(root: &Area<'_>, title: &str, sales: &GroupedSales) -> Result<()> {
    let area = root.titled(title, (FONT, 28)).map_err(plot_err)?;
    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);

    // Shares are only meaningful for positive totals.
    let slices: Vec<_> = sales.groups.iter().filter(|g| g.total > 0.0).collect();
    if slices.is_empty() {
        let style = TextStyle::from((FONT, 20).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new("No positive sales to chart", center, style))
            .map_err(plot_err)?;
        return Ok(());
    }

    let sizes: Vec<f64> = slices.iter().map(|g| g.total).collect();
    let labels: Vec<String> = slices.iter().map(|g| g.key.clone()).collect();
    let colors: Vec<RGBColor> = (0..slices.len()).map(color).collect();
    let radius = f64::from(w.min(h)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style((FONT, 18).into_font().color(&BLACK));
    pie.percentages((FONT, 16).into_font().color(&WHITE));
    area.draw(&pie).map_err(plot_err)?;
    Ok(())
}

fn line_chart(
    root: &Area<'_>,
    title: &str,
    daily: &[DailyTotal],
    forecast: Option<&Forecast>,
) -> Result<()> {
    let first = daily.first().context("no daily totals")?;
    let base = days_since_epoch(first.date);
    let offset = |d: &DailyTotal| (days_since_epoch(d.date) - base, d.total);

    let actual: Vec<(i32, f64)> = daily.iter().map(offset).collect();
    let projected: Vec<(i32, f64)> = forecast
        .map(|f| f.points.iter().map(offset).collect())
        .unwrap_or_default();

    let last_x = projected.last().or(actual.last()).map_or(0, |p| p.0);
    let x_range = if last_x == 0 { -1..1 } else { 0..last_x };
    let (y_min, y_max) = value_range(actual.iter().chain(&projected).map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|d| {
            date_from_days(base + *d)
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .x_desc("Date")
        .y_desc("Sales")
        .y_label_formatter(&|y| format!("{y:.0}"))
        .draw()
        .map_err(plot_err)?;

    let line = color(0);
    chart
        .draw_series(LineSeries::new(actual.iter().copied(), line.stroke_width(2)))
        .map_err(plot_err)?
        .label("Daily Sales")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line));
    chart
        .draw_series(actual.iter().map(|&p| Circle::new(p, 3, line.filled())))
        .map_err(plot_err)?;

    if let (Some(fc), Some(&last)) = (forecast, actual.last())
        && !projected.is_empty()
    {
        let ahead = color(1);
        let path: Vec<(i32, f64)> = std::iter::once(last).chain(projected).collect();
        chart
            .draw_series(LineSeries::new(path, ahead.stroke_width(2)))
            .map_err(plot_err)?
            .label(format!("Forecast ({}-day moving average)", fc.window))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ahead));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;
    }
    Ok(())
}

fn box_plot(root: &Area<'_>, title: &str, samples: &[QuantitySample]) -> Result<()> {
    let samples: Vec<&QuantitySample> = samples.iter().filter(|s| !s.values.is_empty()).collect();
    let labels: Vec<&str> = samples.iter().map(|s| s.product.as_str()).collect();
    let quartiles: Vec<Quartiles> = samples.iter().map(|s| Quartiles::new(&s.values)).collect();

    let (lo, hi) = samples
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let pad = ((hi - lo) * 0.1).max(1.0);
    let y_range = (lo - pad) as f32..(hi + pad) as f32;

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(category_range(labels.len()), y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc("Product")
        .y_desc("Quantity")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(quartiles.iter().enumerate().map(|(i, q)| {
            Boxplot::new_vertical(i as f64, q)
                .width(30)
                .whisker_width(0.5)
                .style(color(i))
        }))
        .map_err(plot_err)?;
    Ok(())
}

fn heatmap(root: &Area<'_>, title: &str, pivot: &SalesPivot) -> Result<()> {
    let regions: Vec<&str> = pivot.regions.iter().map(String::as_str).collect();
    let products: Vec<&str> = pivot.products.iter().map(String::as_str).collect();
    let max = pivot.max_value();

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(120)
        .build_cartesian_2d(category_range(regions.len()), category_range(products.len()))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(regions.len() + 1)
        .y_labels(products.len() + 1)
        .x_label_formatter(&|x| category_label(&regions, *x))
        .y_label_formatter(&|y| category_label(&products, *y))
        .x_desc("Region")
        .y_desc("Product")
        .draw()
        .map_err(plot_err)?;

    let cells: Vec<(f64, f64, f64)> = pivot
        .values
        .iter()
        .enumerate()
        .flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(move |(j, &v)| (j as f64, i as f64, v))
        })
        .collect();

    chart
        .draw_series(cells.iter().map(|&(x, y, v)| {
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                heat_color(v, max).filled(),
            )
        }))
        .map_err(plot_err)?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    chart
        .draw_series(cells.iter().map(|&(x, y, v)| {
            let style = TextStyle::from((FONT, 16).into_font()).pos(centered);
            Text::new(format!("{v:.0}"), (x, y), style)
        }))
        .map_err(plot_err)?;
    Ok(())
}
