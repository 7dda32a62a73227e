//! JSON report formatter.
//!
//! Produces `{generated_at, dry_run, summary, sections}` where `sections`
//! maps each section name to its ordered `{check, level, message, fix}`
//! records.

use super::{Report, ReportFormatter};
use std::io::Write;

/// Formats the report as pretty-printed JSON.
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn file_name(&self) -> &'static str {
        "readiness.json"
    }

    fn format<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, report).map_err(std::io::Error::other)?;
        writeln!(writer)?;
        Ok(())
    }
}
