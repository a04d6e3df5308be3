use super::RenderedChart;
use crate::error::{AnalyzerError, Result};
use crate::utils::fmt_currency;
use anyhow::{Context as _, anyhow};
use printpdf::image_crate::ImageDecoder as _;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument, PdfLayerReference};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// A4 landscape.
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 15.0;
const TITLE_BAND_MM: f32 = 20.0;
const LAYER: &str = "Layer 1";

/// Figures shown on the PDF title page.
#[derive(Clone, Debug, Serialize)]
pub struct PdfSummary {
    pub source: String,
    pub record_count: usize,
    pub total_sales: Option<f64>,
    pub generated: String,
}

impl PdfSummary {
    fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Source: {}", self.source),
            format!("Total Records: {}", self.record_count),
        ];
        if let Some(total) = self.total_sales {
            lines.push(format!("Total Sales: {}", fmt_currency(total)));
        }
        lines.push(format!("Generated: {}", self.generated));
        lines
    }
}

fn pdf_err(err: impl std::fmt::Debug) -> anyhow::Error {
    anyhow!("{err:?}")
}

/// Writes a title page followed by one page per product, region and daily chart.
///
/// # Errors
///
/// Returns [`AnalyzerError::Render`] if a chart image cannot be embedded or
/// the document cannot be written.
pub fn write_pdf_report(
    path: &Path,
    summary: &PdfSummary,
    charts: &[RenderedChart],
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    build_document(path, summary, charts)
        .map_err(|err| AnalyzerError::Render(format!("{err:#}")))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

fn build_document(
    path: &Path,
    summary: &PdfSummary,
    charts: &[RenderedChart],
) -> anyhow::Result<()> {
    let (doc, page, layer) = PdfDocument::new(
        "Sales Analysis Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER,
    );
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;

    let cover = doc.get_page(page).get_layer(layer);
    cover.use_text("Sales Analysis Report", 28.0, Mm(MARGIN_MM), Mm(170.0), &bold);
    for (i, line) in summary.lines().iter().enumerate() {
        let y = 150.0 - 10.0 * i as f32;
        cover.use_text(line.as_str(), 14.0, Mm(MARGIN_MM), Mm(y), &regular);
    }

    for chart in charts.iter().filter(|c| c.kind.in_pdf()) {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER);
        let layer = doc.get_page(page).get_layer(layer);
        layer.use_text(
            chart.kind.title(),
            20.0,
            Mm(MARGIN_MM),
            Mm(PAGE_HEIGHT_MM - MARGIN_MM - 5.0),
            &bold,
        );
        embed_png(layer, &chart.path)?;
        tracing::debug!("Added PDF page for {}", chart.path.display());
    }

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_err)
}

fn embed_png(layer: PdfLayerReference, png: &Path) -> anyhow::Result<()> {
    let file = File::open(png).with_context(|| format!("Failed to open {}", png.display()))?;
    let decoder = PngDecoder::new(BufReader::new(file))
        .with_context(|| format!("Failed to decode {}", png.display()))?;
    let (width, height) = decoder.dimensions();
    let image = Image::try_from(decoder)
        .with_context(|| format!("Failed to embed {}", png.display()))?;

    let placement = fit_image(width, height);
    image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(placement.x)),
            translate_y: Some(Mm(placement.y)),
            dpi: Some(placement.dpi),
            ..Default::default()
        },
    );
    Ok(())
}

#[derive(Debug, PartialEq)]
struct Placement {
    x: f32,
    y: f32,
    dpi: f32,
}

/// Scales an image of `width` × `height` pixels to fit below the page title, centred.
fn fit_image(width: u32, height: u32) -> Placement {
    let box_w = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let box_h = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - TITLE_BAND_MM;
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let mm_per_px = (box_w / w).min(box_h / h);
    Placement {
        x: MARGIN_MM + (box_w - w * mm_per_px) / 2.0,
        y: MARGIN_MM + (box_h - h * mm_per_px) / 2.0,
        dpi: 25.4 / mm_per_px,
    }
}
