//! Probe execution against the local host.
//!
//! Every external observation a section runner makes goes through a
//! [`Probe`], which wraps a [`System`] (the real host, or a scripted fake
//! in tests) and enforces dry-run mode: when dry-run is on, no process is
//! spawned and the caller gets the [`DRY_RUN_SENTINEL`] result instead.
//!
//! Probes never return errors. Missing binaries, timeouts and non-zero
//! exits all come back as [`ProbeResult::Failure`].
//!
//! # Modules
//!
//! - [`path`] - PATH parsing and executable resolution
//! - [`process`] - Time-limited process execution

pub mod path;
pub mod process;

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Output returned for every command skipped by dry-run mode.
pub const DRY_RUN_SENTINEL: &str = "(dry-run skipped)";

/// Default timeout for a single tool invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for cluster API queries.
pub const CLUSTER_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-probe time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Tool invocations and listener probes.
    pub tool: Duration,
    /// Cluster API queries.
    pub cluster: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TIMEOUT,
            cluster: CLUSTER_TIMEOUT,
        }
    }
}

/// Result of one external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// Exit code 0; trimmed combined stdout/stderr.
    Success(String),
    /// Spawn error, timeout or non-zero exit. The host always reports code 1.
    Failure { code: i32, output: String },
}

impl ProbeResult {
    pub fn failure(code: i32, output: impl Into<String>) -> Self {
        Self::Failure {
            code,
            output: output.into(),
        }
    }

    /// The sentinel result produced in dry-run mode.
    pub fn dry_run() -> Self {
        Self::Success(DRY_RUN_SENTINEL.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Conventional return code: 0 on success.
    pub fn code(&self) -> i32 {
        match self {
            Self::Success(_) => 0,
            Self::Failure { code, .. } => *code,
        }
    }

    pub fn output(&self) -> &str {
        match self {
            Self::Success(output) => output,
            Self::Failure { output, .. } => output,
        }
    }

    /// First line of output, if there is any output at all.
    pub fn first_line(&self) -> Option<&str> {
        self.output().lines().next()
    }

    /// Output of a successful probe, `None` on failure.
    pub fn success_output(&self) -> Option<&str> {
        match self {
            Self::Success(output) => Some(output),
            Self::Failure { .. } => None,
        }
    }
}

/// Host capabilities the audit reads from.
///
/// Implementations must be shareable across the section threads.
pub trait System: Send + Sync {
    /// Run a command with a timeout. Never panics, never returns an error.
    fn execute(&self, command: &[String], timeout: Duration) -> ProbeResult;

    /// Resolve an executable on the search path.
    fn which(&self, program: &str) -> Option<PathBuf>;

    /// Whether a filesystem path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read a small text file, `None` if unreadable.
    fn read_file(&self, path: &Path) -> Option<String>;
}

/// The real host: processes, `PATH`, and the local filesystem.
#[derive(Debug, Clone)]
pub struct HostSystem {
    search_path: Vec<PathBuf>,
}

impl HostSystem {
    /// Capture the current `PATH`.
    pub fn new() -> Self {
        Self {
            search_path: path::parse_system_path(),
        }
    }

    /// Use an explicit search path instead of `PATH`.
    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }
}

impl Default for HostSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for HostSystem {
    fn execute(&self, command: &[String], timeout: Duration) -> ProbeResult {
        process::run_with_timeout(command, timeout)
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        path::resolve_tool_path(program, &self.search_path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

/// Run `command` through `system` unless `dry_run` is set.
///
/// In dry-run mode this returns the sentinel immediately without touching
/// the environment. Every probe a runner makes passes through here.
pub fn run<S: AsRef<str>>(
    system: &dyn System,
    command: &[S],
    timeout: Duration,
    dry_run: bool,
) -> ProbeResult {
    if dry_run {
        tracing::debug!(command = %join(command), "dry-run: not executed");
        return ProbeResult::dry_run();
    }
    let command: Vec<String> = command.iter().map(|s| s.as_ref().to_string()).collect();
    let result = system.execute(&command, timeout);
    tracing::debug!(command = %command.join(" "), code = result.code(), "probe finished");
    result
}

/// Dry-run aware view of a [`System`], handed to every section runner.
#[derive(Clone, Copy)]
pub struct Probe<'a> {
    system: &'a dyn System,
    dry_run: bool,
}

impl<'a> Probe<'a> {
    pub fn new(system: &'a dyn System, dry_run: bool) -> Self {
        Self { system, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run an external command, or return the sentinel in dry-run mode.
    pub fn run<S: AsRef<str>>(&self, command: &[S], timeout: Duration) -> ProbeResult {
        run(self.system, command, timeout, self.dry_run)
    }

    /// Whether `program` is reachable on the search path.
    ///
    /// This is a local lookup and runs in dry-run mode too.
    pub fn which(&self, program: &str) -> Option<PathBuf> {
        self.system.which(program)
    }

    /// Whether `path` exists. Local, runs in dry-run mode too.
    pub fn exists(&self, path: &Path) -> bool {
        self.system.exists(path)
    }

    /// Read a local file. Runs in dry-run mode too.
    pub fn read_file(&self, path: &Path) -> Option<String> {
        self.system.read_file(path)
    }
}

fn join<S: AsRef<str>>(command: &[S]) -> String {
    command
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}
