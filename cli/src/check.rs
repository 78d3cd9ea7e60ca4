#![deny(missing_docs)]

//! # Check Command
//!
//! Validates every enabled endpoint and prints the report. Never binds or
//! serves anything; exits non-zero when any endpoint fails.

use crate::error::CliResult;
use crate::settings::ConfigArgs;
use trellis_core::{validate_features, AppError, PipelineStats, ValidationReport};

/// Report rendering.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Arguments for the check command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Features location and routing options.
    #[clap(flatten)]
    pub config: ConfigArgs,

    /// Output format of the report.
    #[clap(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Executes the check.
///
/// Returns the rendered report on success so callers can inspect it; fails
/// with `ValidationFailed` once the report has been printed.
pub fn execute(args: &CheckArgs) -> CliResult<String> {
    let config = args.config.resolve()?;
    let mut stats = PipelineStats::new();
    let pass = validate_features(&config, &mut stats)?;
    stats.log_summary();

    let results = pass.results();
    let report = ValidationReport::new(&results);
    let rendered = match args.format {
        ReportFormat::Text => report.to_text(),
        ReportFormat::Json => format!("{}\n", report.to_json()?),
    };
    print!("{}", rendered);

    if !report.all_valid() {
        return Err(AppError::ValidationFailed(report.summary.failed).into());
    }
    Ok(rendered)
}
