//! Human-Readable Output
//!
//! Terminal rendering of a report:
//! - One block per scenario with a status icon and the formatted result
//! - Effect size for mean difference tests
//! - Decision summary
//! - Missing-value table

use crate::report::Report;
use riskseg_core::OutcomeStatus;
use riskseg_stats::{Interpretation, interpret_effect_size};

/// Format a report for terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Segment Hypothesis Tests\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "rows: {}  alpha: {}  generated: {}\n\n",
        report.meta.rows,
        report.meta.alpha,
        report.meta.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for entry in &report.scenarios {
        let icon = match (entry.status, entry.interpretation) {
            (OutcomeStatus::Completed, Some(Interpretation::Reject)) => "✗",
            (OutcomeStatus::Completed, _) => "✓",
            (OutcomeStatus::Skipped, _) => "⊘",
            (OutcomeStatus::Unavailable, _) => "!",
        };
        output.push_str(&format!("{} {}\n", icon, entry.title));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for line in entry.text.lines() {
            output.push_str(&format!("  {}\n", line));
        }
        if let Some(df) = entry.degrees_of_freedom.filter(|df| df.is_finite()) {
            output.push_str(&format!("  degrees of freedom: {}\n", df));
        }
        if let Some(d) = entry.effect_size.filter(|d| d.is_finite()) {
            output.push_str(&format!(
                "  effect size (Cohen's d): {:.3} ({})\n",
                d,
                interpret_effect_size(d)
            ));
        }
        output.push('\n');
    }

    let summary = &report.summary;
    output.push_str(&format!(
        "Summary: {} scenarios, {} rejected, {} not rejected, {} skipped, {} unavailable\n",
        summary.total, summary.rejected, summary.not_rejected, summary.skipped, summary.unavailable
    ));

    if !report.missing.is_empty() {
        output.push('\n');
        output.push_str(&format_missing_table(&report.missing));
    }

    output
}

/// Format the missing-value table on its own
pub fn format_missing_table(missing: &[riskseg_core::MissingColumn]) -> String {
    let mut output = String::new();
    output.push_str("Missing Values\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');

    if missing.is_empty() {
        output.push_str("  no missing values\n");
        return output;
    }

    let width = missing
        .iter()
        .map(|m| m.column.len())
        .max()
        .unwrap_or(6)
        .max("Column".len());
    output.push_str(&format!(
        "  {:<width$}  {:>10}  {:>10}\n",
        "Column",
        "Missing",
        "Percent",
        width = width
    ));
    for m in missing {
        output.push_str(&format!(
            "  {:<width$}  {:>10}  {:>9.2}%\n",
            m.column,
            m.missing_count,
            m.percentage,
            width = width
        ));
    }
    output
}
