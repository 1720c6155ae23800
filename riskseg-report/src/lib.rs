#![warn(missing_docs)]
//! riskseg Report - Output Formats
//!
//! Turns a battery run into:
//! - JSON (machine-readable)
//! - Human-readable terminal text

mod human;
mod json;
mod report;

pub use human::{format_human_output, format_missing_table};
pub use json::generate_json_report;
pub use report::{
    REPORT_SCHEMA_VERSION, Report, ReportMeta, ReportSummary, ScenarioEntry, build_report,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Render a report in the requested format
pub fn render(report: &Report, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => generate_json_report(report),
        OutputFormat::Human => Ok(format_human_output(report)),
    }
}
