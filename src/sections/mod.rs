//! Section runners.
//!
//! A [`SectionRunner`] turns probe results into an ordered list of
//! [`CheckEntry`] values for one domain. Runners share nothing mutable, so
//! [`run_all`] evaluates them concurrently and reassembles the sections in
//! registration order.
//!
//! # Runners
//!
//! - [`OsRunner`] - platform, init system, CPU virtualization, install dirs
//! - [`ToolsRunner`] - presence and version of every catalog tool
//! - [`ClusterRunner`] - cluster reachability and installed components
//! - [`PortsRunner`] - catalog ports bound on the host

pub mod cluster;
pub mod os;
pub mod ports;
pub mod tools;

pub use cluster::ClusterRunner;
pub use os::OsRunner;
pub use ports::PortsRunner;
pub use tools::ToolsRunner;

use std::thread;

use crate::catalog::Catalog;
use crate::probe::{Probe, Timeouts, DRY_RUN_SENTINEL};
use crate::status::{CheckEntry, Outcome, Section};

/// Everything a runner may read. Shared by reference across threads.
#[derive(Clone, Copy)]
pub struct AuditContext<'a> {
    pub probe: Probe<'a>,
    pub catalog: &'a Catalog,
    pub timeouts: Timeouts,
}

impl<'a> AuditContext<'a> {
    pub fn new(probe: Probe<'a>, catalog: &'a Catalog, timeouts: Timeouts) -> Self {
        Self {
            probe,
            catalog,
            timeouts,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.probe.is_dry_run()
    }
}

/// One independent group of checks.
pub trait SectionRunner: Send + Sync {
    /// Section title as it appears in reports.
    fn name(&self) -> &'static str;

    /// Evaluate every check in this section.
    ///
    /// In dry-run mode the returned entries have the same names and order as
    /// a live run, with skipped probes reported as [`dry_run_skip`].
    fn run(&self, ctx: &AuditContext<'_>) -> Vec<CheckEntry>;
}

/// The standard runners in report order.
pub fn default_runners() -> Vec<Box<dyn SectionRunner>> {
    vec![
        Box::new(OsRunner),
        Box::new(ToolsRunner),
        Box::new(ClusterRunner),
        Box::new(PortsRunner),
    ]
}

/// Evaluate all runners concurrently, returning sections in runner order.
///
/// A runner that panics yields a section with a single FAIL entry instead
/// of tearing down the whole audit.
pub fn run_all(runners: &[Box<dyn SectionRunner>], ctx: &AuditContext<'_>) -> Vec<Section> {
    thread::scope(|scope| {
        let handles: Vec<_> = runners
            .iter()
            .map(|runner| {
                let handle = scope.spawn(move || runner.run(ctx));
                (runner.name(), handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(name, handle)| {
                let entries = handle.join().unwrap_or_else(|_| {
                    tracing::error!(section = name, "section runner panicked");
                    vec![CheckEntry::new(
                        "runner",
                        Outcome::fail(
                            "section runner crashed",
                            "Re-run with --debug and report the log",
                        ),
                    )]
                });
                tracing::info!(section = name, entries = entries.len(), "section complete");
                Section::new(name, entries)
            })
            .collect()
    })
}

/// The SKIP outcome used for every probe suppressed by dry-run mode.
pub fn dry_run_skip() -> Outcome {
    Outcome::skip(DRY_RUN_SENTINEL)
}
