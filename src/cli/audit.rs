//! The audit command.
//!
//! Resolves configuration, runs every section, writes the requested report
//! files and maps the summary to an exit code.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;

use crate::cli::args::Cli;
use crate::cli::theme::Theme;
use crate::config;
use crate::error::Result;
use crate::exit::decide_exit;
use crate::probe::System;
use crate::report::{write_reports, Summary};

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    fn from_exit_code(exit_code: i32) -> Self {
        Self {
            success: exit_code == 0,
            exit_code,
        }
    }
}

/// One audit run, configured from the command line.
pub struct AuditCommand {
    args: Cli,
    theme: Theme,
}

impl AuditCommand {
    pub fn new(args: Cli) -> Self {
        Self {
            args,
            theme: Theme::plain(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Run the audit against `system`, writing the summary to `out`.
    ///
    /// Only configuration and report-writing failures are errors; every
    /// probe failure ends up inside the report.
    pub fn execute(&self, system: &dyn System, out: &mut dyn Write) -> Result<CommandResult> {
        let config = config::load(self.args.config.as_deref())?;
        let catalog = config.catalog();

        tracing::info!(
            dry_run = self.args.dry_run,
            tools = catalog.tools.len(),
            ports = catalog.ports.len(),
            "starting audit"
        );
        let report = crate::run_audit(system, &catalog, config.timeouts(), self.args.dry_run);
        let written = write_reports(&report, &self.args.out, self.args.format)?;

        let summary = report.summary();
        if !self.args.quiet {
            self.print_summary(&summary, &written, out)
                .context("Failed to print audit summary")?;
        }

        Ok(CommandResult::from_exit_code(decide_exit(
            &summary,
            self.args.strict,
        )))
    }

    fn print_summary(
        &self,
        summary: &Summary,
        written: &[PathBuf],
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(out, "{}", self.theme.format_summary(summary))?;
        for path in written {
            writeln!(out, "{} {}", self.theme.dim.apply_to("wrote"), path.display())?;
        }
        out.flush()
    }
}
