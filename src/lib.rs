//! # Sales Analyzer
//!
//! Loads a table of sales records and reports descriptive statistics,
//! per-product and per-region aggregates, daily trends and a naive
//! moving-average forecast. Optionally renders charts, a PDF report and
//! an Excel workbook.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sales_analyzer::analyser;
//! use std::path::Path;
//!
//! let df = analyser::load_df(Path::new("sales.csv"))?;
//! let products = analyser::group_sales(&df, "Product")?;
//! for group in &products.groups {
//!     println!("{}: {:.2} over {} sales", group.key, group.total, group.count);
//! }
//! # Ok::<(), sales_analyzer::error::AnalyzerError>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`analyser`]: loading, aggregation and time-series analysis
//! - [`report`]: the plain-text console report
//! - [`render`]: PNG charts and the PDF report
//! - [`export`]: the Excel workbook
//! - [`pipeline`]: one end-to-end run over an input file
//! - [`config`]: run settings and their JSON form
//! - [`error`]: error types and handling utilities

#![warn(clippy::all, rust_2018_idioms)]

pub mod analyser;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod utils;
