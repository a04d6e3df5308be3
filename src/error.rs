//! Centralized error handling for the sales analyzer.
//!
//! Every failure the pipeline can surface is an [`AnalyzerError`]. The
//! loader distinguishes the three user-facing kinds (missing file, empty
//! input, unparseable input) so the binary can print a one-line message;
//! everything else is carried as a category plus message.
//!
//! ```
//! use sales_analyzer::error::AnalyzerError;
//!
//! let err = AnalyzerError::NotFound("sales.csv".into());
//! assert_eq!(err.to_string(), "File 'sales.csv' not found.");
//! assert_eq!(err.exit_code(), 1);
//! ```
//!
//! The `ResultExt` trait adds `.context()` to any result whose error
//! converts into [`AnalyzerError`]. The original error is kept as the
//! `source()` of an [`AnalyzerError::Context`]:
//!
//! ```no_run
//! use sales_analyzer::error::ResultExt as _;
//!
//! fn read_settings() -> sales_analyzer::error::Result<String> {
//!     std::fs::read_to_string("settings.json").context("Failed to read settings")
//! }
//! ```

use std::fmt;

/// Main error type for analyzer operations.
#[derive(Debug)]
pub enum AnalyzerError {
    /// Input path does not exist
    NotFound(String),

    /// Input parsed to zero rows
    EmptyData(String),

    /// File extension has no reader
    UnsupportedFormat(String),

    /// A `Date` cell that matches none of the accepted formats
    DateParse { value: String, row: usize },

    /// Input could be opened but not decoded
    Format(String),

    /// I/O errors (file operations)
    Io(std::io::Error),

    /// Dataframe errors (Polars)
    DataProcessing(String),

    /// Chart or PDF rendering failures
    Render(String),

    /// Workbook export failures
    Export(String),

    /// Configuration errors
    Config(String),

    /// Another analyzer error with a description of what was being attempted
    Context {
        context: String,
        source: Box<AnalyzerError>,
    },

    /// Generic error
    Other(String),
}

impl AnalyzerError {
    /// Process exit code for this error. All failures terminate with 1.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// The message with every run of whitespace, line breaks included,
    /// collapsed to a single space.
    pub fn one_line(&self) -> String {
        single_line(&self.to_string())
    }

    /// True for the failure kinds the loader reports about the input file itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::EmptyData(_)
                | Self::UnsupportedFormat(_)
                | Self::DateParse { .. }
                | Self::Format(_)
        )
    }
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "File '{path}' not found."),
            Self::EmptyData(path) => write!(f, "File '{path}' is empty."),
            Self::UnsupportedFormat(ext) => write!(
                f,
                "Unsupported format: '.{ext}' (expected csv, tsv, xlsx, xls, json, jsonl or parquet)"
            ),
            Self::DateParse { value, row } => {
                write!(f, "Failed to parse Date value '{value}' in row {row}")
            }
            Self::Format(msg) => write!(f, "Failed to parse input: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Render(msg) => write!(f, "Rendering error: {msg}"),
            Self::Export(msg) => write!(f, "Export error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Context { context, source } => write!(f, "{context}: {source}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Context { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for AnalyzerError {
    fn from(err: anyhow::Error) -> Self {
        // Keep the full context chain on one line.
        Self::Other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for AnalyzerError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<calamine::Error> for AnalyzerError {
    fn from(err: calamine::Error) -> Self {
        Self::Format(format!("spreadsheet: {err}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AnalyzerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}

/// Joins a possibly multi-line message into one line.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Result type alias for analyzer operations.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AnalyzerError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalyzerError::Context {
            context: msg.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AnalyzerError::Context {
            context: f(),
            source: Box::new(e.into()),
        })
    }
}
