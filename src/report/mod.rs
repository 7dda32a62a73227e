//! Report aggregation and rendering.
//!
//! Sections are folded into a [`Summary`] and an immutable [`Report`],
//! which the formatters render without modification.
//!
//! - [`JsonFormatter`] - full-fidelity JSON document
//! - [`MarkdownFormatter`] - one table per section with badge glyphs

pub mod json;
pub mod markdown;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{AuditError, Result};
use crate::status::{Level, Section};

/// Entry count per level. All four keys are always serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(rename = "PASS")]
    pub pass: usize,
    #[serde(rename = "WARN")]
    pub warn: usize,
    #[serde(rename = "FAIL")]
    pub fail: usize,
    #[serde(rename = "SKIP")]
    pub skip: usize,
}

impl Summary {
    pub fn count(&self, level: Level) -> usize {
        match level {
            Level::Pass => self.pass,
            Level::Warn => self.warn,
            Level::Fail => self.fail,
            Level::Skip => self.skip,
        }
    }

    fn record(&mut self, level: Level) {
        match level {
            Level::Pass => self.pass += 1,
            Level::Warn => self.warn += 1,
            Level::Fail => self.fail += 1,
            Level::Skip => self.skip += 1,
        }
    }

    pub fn total(&self) -> usize {
        Level::ALL.iter().map(|&l| self.count(l)).sum()
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}  {} {}  {} {}  {} {}",
            Level::Pass.badge(),
            self.pass,
            Level::Warn.badge(),
            self.warn,
            Level::Fail.badge(),
            self.fail,
            Level::Skip.badge(),
            self.skip
        )
    }
}

/// Count every entry's level across every section.
pub fn summarize(sections: &[Section]) -> Summary {
    let mut summary = Summary::default();
    for entry in sections.iter().flat_map(|s| &s.entries) {
        summary.record(entry.outcome.level());
    }
    summary
}

/// The aggregate result of one audit run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    generated_at: DateTime<Utc>,
    dry_run: bool,
    summary: Summary,
    #[serde(serialize_with = "serialize_sections")]
    sections: Vec<Section>,
}

impl Report {
    /// Assemble a report with an explicit timestamp.
    pub fn new(
        sections: Vec<Section>,
        summary: Summary,
        dry_run: bool,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            dry_run,
            summary,
            sections,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Build a report stamped with the current time.
pub fn build_report(sections: Vec<Section>, summary: Summary, dry_run: bool) -> Report {
    Report::new(sections, summary, dry_run, Utc::now())
}

#[derive(Serialize)]
struct CheckRecord<'a> {
    check: &'a str,
    level: Level,
    message: &'a str,
    fix: &'a str,
}

/// Sections as an ordered map of name to check records.
fn serialize_sections<S: Serializer>(
    sections: &[Section],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(sections.len()))?;
    for section in sections {
        let records: Vec<_> = section
            .entries
            .iter()
            .map(|entry| CheckRecord {
                check: &entry.name,
                level: entry.outcome.level(),
                message: entry.outcome.message(),
                fix: entry.outcome.fix(),
            })
            .collect();
        map.serialize_entry(&section.name, &records)?;
    }
    map.end()
}

/// Which report files to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Md,
    #[default]
    Both,
}

impl OutputFormat {
    pub fn includes_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }

    pub fn includes_markdown(self) -> bool {
        matches!(self, Self::Md | Self::Both)
    }
}

/// Trait for rendering a report.
pub trait ReportFormatter {
    /// File name used inside the output directory.
    fn file_name(&self) -> &'static str;

    /// Render the report to the given writer.
    fn format<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()>;
}

/// Write the requested report files into `out_dir`, creating it if needed.
///
/// Returns the written paths in JSON, Markdown order.
pub fn write_reports(
    report: &Report,
    out_dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).map_err(|source| AuditError::ReportWrite {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    if format.includes_json() {
        written.push(write_one(report, out_dir, &JsonFormatter::new())?);
    }
    if format.includes_markdown() {
        written.push(write_one(report, out_dir, &MarkdownFormatter::new())?);
    }
    Ok(written)
}

fn write_one<F: ReportFormatter>(
    report: &Report,
    out_dir: &Path,
    formatter: &F,
) -> Result<PathBuf> {
    let path = out_dir.join(formatter.file_name());
    let to_error = |source| AuditError::ReportWrite {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    formatter.format(report, &mut writer).map_err(to_error)?;
    writer.flush().map_err(to_error)?;

    tracing::debug!(path = %path.display(), "report written");
    Ok(path)
}
