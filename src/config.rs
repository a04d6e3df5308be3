use crate::analyser::timeseries::DEFAULT_MAX_WINDOW;
use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_FORECAST_PERIODS: usize = 7;
pub const DEFAULT_HEAD_ROWS: usize = 5;

/// Tunables for a single analyzer run.
///
/// Every field has a default, so a settings file only needs the keys it
/// changes. CLI flags are applied on top of whatever the file provides.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Directory for charts, the workbook and the PDF
    pub output_dir: PathBuf,
    /// Number of future days the forecast covers
    pub forecast_periods: usize,
    /// Upper bound for the moving-average window
    pub max_forecast_window: usize,
    /// Rows shown in the sample preview
    pub head_rows: usize,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Workbook file name, relative to `output_dir` unless absolute
    pub workbook_name: String,
    /// PDF file name, relative to `output_dir` unless absolute
    pub pdf_name: String,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            forecast_periods: DEFAULT_FORECAST_PERIODS,
            max_forecast_window: DEFAULT_MAX_WINDOW,
            head_rows: DEFAULT_HEAD_ROWS,
            chart_width: 1000,
            chart_height: 600,
            workbook_name: "sales_analysis.xlsx".to_owned(),
            pdf_name: "sales_report.pdf".to_owned(),
        }
    }
}

impl AnalyzerSettings {
    /// Reads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Config`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalyzerError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let settings: Self = serde_json::from_str(&content)?;
        tracing::debug!(?settings, "Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Rejects values that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.forecast_periods == 0 {
            return Err(AnalyzerError::Config(
                "forecast_periods must be at least 1".to_owned(),
            ));
        }
        if self.max_forecast_window == 0 {
            return Err(AnalyzerError::Config(
                "max_forecast_window must be at least 1".to_owned(),
            ));
        }
        if self.head_rows == 0 {
            return Err(AnalyzerError::Config("head_rows must be at least 1".to_owned()));
        }
        if self.chart_width < 200 || self.chart_height < 200 {
            return Err(AnalyzerError::Config(format!(
                "chart size {}x{} is too small (minimum 200x200)",
                self.chart_width, self.chart_height
            )));
        }
        Ok(())
    }

    pub fn chart_size(&self) -> (u32, u32) {
        (self.chart_width, self.chart_height)
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.output_dir.join(&self.workbook_name)
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.output_dir.join(&self.pdf_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AnalyzerSettings::default();
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.forecast_periods, 7);
        assert_eq!(settings.max_forecast_window, 7);
        assert_eq!(settings.head_rows, 5);
        assert_eq!(settings.workbook_path(), Path::new("output/sales_analysis.xlsx"));
        assert_eq!(settings.pdf_path(), Path::new("output/sales_report.pdf"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "forecast_periods": 14, "output_dir": "reports" }"#)?;

        let settings = AnalyzerSettings::load(&path)?;
        assert_eq!(settings.forecast_periods, 14);
        assert_eq!(settings.output_dir, PathBuf::from("reports"));
        assert_eq!(settings.head_rows, 5);
        Ok(())
    }

    #[test]
    fn test_invalid_settings() {
        let settings = AnalyzerSettings {
            forecast_periods: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(AnalyzerError::Config(_))));

        let settings = AnalyzerSettings {
            chart_width: 50,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_config_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json")?;
        assert!(matches!(
            AnalyzerSettings::load(&path),
            Err(AnalyzerError::Config(_))
        ));
        assert!(matches!(
            AnalyzerSettings::load(&dir.path().join("absent.json")),
            Err(AnalyzerError::Config(_))
        ));
        Ok(())
    }
}
