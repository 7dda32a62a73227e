//! Markdown report formatter.

use super::{Report, ReportFormatter};
use chrono::SecondsFormat;
use std::io::Write;

/// Formats the report as one Markdown table per section.
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Create a new Markdown formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep free text inside a single table cell.
fn cell(text: &str) -> String {
    text.replace('|', "/").replace(['\r', '\n'], " ")
}

impl ReportFormatter for MarkdownFormatter {
    fn file_name(&self) -> &'static str {
        "readiness.md"
    }

    fn format<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# Homelab Readiness Report")?;
        writeln!(
            writer,
            "Generated: {}",
            report
                .generated_at()
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        if report.dry_run() {
            writeln!(writer, "Mode: dry-run")?;
        }
        writeln!(writer)?;
        writeln!(writer, "**Summary:** {}", report.summary())?;
        writeln!(writer)?;

        for section in report.sections() {
            writeln!(writer, "## {}", section.name)?;
            writeln!(writer, "| Check | Status | Message | Fix Hint |")?;
            writeln!(writer, "|---|---|---|---|")?;
            for entry in &section.entries {
                let level = entry.outcome.level();
                writeln!(
                    writer,
                    "| `{}` | {} {} | {} | {} |",
                    cell(&entry.name),
                    level.badge(),
                    level,
                    cell(entry.outcome.message()),
                    cell(entry.outcome.fix())
                )?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}
