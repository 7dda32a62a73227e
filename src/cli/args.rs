//! CLI argument definitions.
//!
//! The entry point is the [`Cli`] struct, parsed with clap's derive macros.

use clap::Parser;
use std::path::PathBuf;

use crate::report::OutputFormat;

/// Readiness audit for a self-hosted cluster platform.
#[derive(Debug, Clone, Parser)]
#[command(name = "readyaudit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output directory for report files
    #[arg(long, env = "READYAUDIT_OUT", default_value = "tools/audit/reports")]
    pub out: PathBuf,

    /// Report format to write
    #[arg(long, value_enum, default_value_t = OutputFormat::Both)]
    pub format: OutputFormat,

    /// Exit non-zero if any check FAILs
    #[arg(long)]
    pub strict: bool,

    /// Simulate checks without executing external commands
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a YAML config file overriding catalog and timeouts
    #[arg(short, long, env = "READYAUDIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Do not print the summary to stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
