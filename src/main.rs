//! # Sales Analyzer Entry Point
//!
//! ```text
//! main()
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Initialize logging (stderr, optional rolling file)
//!   ├─> Resolve settings (--config, then flag overrides)
//!   └─> Run the pipeline, printing the report to stdout
//! ```
//!
//! Any failure prints `Error: <message>` to stderr and exits with code 1.

#![expect(clippy::print_stderr)] // Errors are reported on stderr

mod cli;

use clap::Parser as _;
use sales_analyzer::error::{AnalyzerError, Result, single_line};
use sales_analyzer::{logging, pipeline};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    if let Err(err) = logging::init(cli.verbose, cli.log_dir.as_deref()) {
        eprintln!("Warning: {err:#}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = err.one_line();
            tracing::error!(input = err.is_input_error(), "{message}");
            eprintln!("Error: {message}");
            if !err.is_input_error() {
                for cause in causes(&err) {
                    // Context messages already embed their cause's text.
                    if !message.contains(&cause) {
                        eprintln!("  caused by: {cause}");
                    }
                }
            }
            ExitCode::from(err.exit_code())
        }
    }
}

/// One-line messages for the `source()` chain below `err`.
fn causes(err: &AnalyzerError) -> Vec<String> {
    let mut lines = Vec::new();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        lines.push(single_line(&cause.to_string()));
        source = cause.source();
    }
    lines
}

fn run(cli: &cli::Cli) -> Result<()> {
    let settings = cli.settings()?;
    let mut stdout = std::io::stdout().lock();
    let summary = pipeline::run(&cli.file, &settings, cli.options(), &mut stdout)?;
    tracing::info!(
        records = summary.record_count,
        charts = summary.charts.len(),
        "Run finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_analyzer::error::ResultExt as _;

    #[test]
    fn test_missing_file_is_reported() {
        let cli = cli::Cli::parse_from(["sales-analyzer", "definitely-missing.csv"]);
        let err = run(&cli).expect_err("missing input");
        assert!(matches!(err, AnalyzerError::NotFound(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_causes_follow_the_source_chain() {
        let io: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access\ndenied",
        ));
        let err = io
            .context("Failed to create output")
            .expect_err("wrapped error");
        assert_eq!(
            causes(&err),
            ["I/O error: access denied".to_owned(), "access denied".to_owned()]
        );
        assert!(err.one_line().contains("Failed to create output: I/O error: access denied"));
    }
}
