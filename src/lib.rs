//! Readyaudit - readiness audit for a self-hosted cluster platform.
//!
//! Probes the local host and a running cluster, evaluates a fixed catalog
//! of checks, and writes a JSON and/or Markdown report with a PASS, WARN,
//! FAIL or SKIP verdict and a remediation hint per check.
//!
//! # Modules
//!
//! - [`status`] - Check levels and outcomes
//! - [`probe`] - Time-limited external commands and the dry-run gate
//! - [`catalog`] - Tools, ports and detection tables
//! - [`sections`] - The four section runners
//! - [`report`] - Summary, report model and formatters
//! - [`exit`] - Exit-code policy
//! - [`config`] - Optional YAML overrides
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use readyaudit::catalog::Catalog;
//! use readyaudit::probe::{HostSystem, Timeouts};
//!
//! // Dry-run never spawns a process.
//! let catalog = Catalog::builtin();
//! let report = readyaudit::run_audit(&HostSystem::new(), &catalog, Timeouts::default(), true);
//! let ports = report.section("Host Ports").unwrap();
//! assert_eq!(ports.entries.len(), 25);
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod exit;
pub mod probe;
pub mod report;
pub mod sections;
pub mod status;

pub use error::{AuditError, Result};

use catalog::Catalog;
use probe::{Probe, System, Timeouts};
use report::{build_report, summarize, Report};
use sections::{default_runners, run_all, AuditContext};

/// Run every section against `system` and assemble the report.
pub fn run_audit(
    system: &dyn System,
    catalog: &Catalog,
    timeouts: Timeouts,
    dry_run: bool,
) -> Report {
    let ctx = AuditContext::new(Probe::new(system, dry_run), catalog, timeouts);
    let sections = run_all(&default_runners(), &ctx);
    let summary = summarize(&sections);
    build_report(sections, summary, dry_run)
}
