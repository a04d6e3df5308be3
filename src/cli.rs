use clap::{ArgAction, Parser};
use sales_analyzer::config::AnalyzerSettings;
use sales_analyzer::error::Result;
use sales_analyzer::pipeline::RunOptions;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sales-analyzer",
    version,
    about = "Analyze sales data: statistics, grouped totals, trends and a naive forecast"
)]
pub struct Cli {
    /// Sales data file (CSV, TSV, Excel, JSON, JSON Lines or Parquet)
    pub file: PathBuf,

    /// Write PNG charts to the output directory
    #[arg(long)]
    pub visualize: bool,

    /// Write the Excel workbook
    #[arg(long)]
    pub export_excel: bool,

    /// Write the PDF report (renders charts as needed)
    #[arg(long)]
    pub export_pdf: bool,

    /// Print a moving-average forecast
    #[arg(long)]
    pub forecast: bool,

    /// Enable visualize, export-excel, export-pdf and forecast
    #[arg(long)]
    pub all: bool,

    /// Directory for charts and reports [default: output]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Days to forecast [default: 7]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub forecast_periods: Option<u32>,

    /// Rows shown in the sample preview [default: 5]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub head_rows: Option<u32>,

    /// JSON settings file; command-line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            visualize: self.all || self.visualize,
            export_excel: self.all || self.export_excel,
            export_pdf: self.all || self.export_pdf,
            forecast: self.all || self.forecast,
        }
    }

    /// Settings from `--config` (or defaults) with flag overrides applied.
    ///
    /// # Errors
    ///
    /// Returns error if the settings file cannot be read or parsed.
    pub fn settings(&self) -> Result<AnalyzerSettings> {
        let mut settings = match &self.config {
            Some(path) => AnalyzerSettings::load(path)?,
            None => AnalyzerSettings::default(),
        };
        if let Some(dir) = &self.output_dir {
            settings.output_dir.clone_from(dir);
        }
        if let Some(periods) = self.forecast_periods {
            settings.forecast_periods = periods as usize;
        }
        if let Some(rows) = self.head_rows {
            settings.head_rows = rows as usize;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_all_enables_every_stage() {
        let cli = Cli::parse_from(["sales-analyzer", "sales.csv", "--all"]);
        assert_eq!(cli.options(), RunOptions::all());

        let cli = Cli::parse_from(["sales-analyzer", "sales.csv", "--forecast"]);
        let options = cli.options();
        assert!(options.forecast);
        assert!(!options.visualize && !options.export_excel && !options.export_pdf);
    }

    #[test]
    fn test_flag_overrides() -> Result<()> {
        let cli = Cli::parse_from([
            "sales-analyzer",
            "sales.csv",
            "--output-dir",
            "reports",
            "--forecast-periods",
            "14",
            "-vv",
        ]);
        let settings = cli.settings()?;
        assert_eq!(settings.output_dir, PathBuf::from("reports"));
        assert_eq!(settings.forecast_periods, 14);
        assert_eq!(settings.head_rows, 5);
        assert_eq!(cli.verbose, 2);
        Ok(())
    }

    #[test]
    fn test_zero_forecast_periods_rejected() {
        let result =
            Cli::try_parse_from(["sales-analyzer", "sales.csv", "--forecast-periods", "0"]);
        assert!(result.is_err());
    }
}
