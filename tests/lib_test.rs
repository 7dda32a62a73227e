//! Library integration tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use readyaudit::catalog::{Catalog, ToolSpec};
use readyaudit::exit::decide_exit;
use readyaudit::probe::{ProbeResult, System, Timeouts, DRY_RUN_SENTINEL};
use readyaudit::report::{JsonFormatter, ReportFormatter};
use readyaudit::status::{Level, Outcome};
use readyaudit::AuditError;

/// A host with nothing installed and no files.
struct EmptyHost;

impl System for EmptyHost {
    fn execute(&self, command: &[String], _timeout: Duration) -> ProbeResult {
        panic!("unexpected command: {}", command.join(" "))
    }

    fn which(&self, _program: &str) -> Option<PathBuf> {
        None
    }

    fn exists(&self, _path: &Path) -> bool {
        false
    }

    fn read_file(&self, _path: &Path) -> Option<String> {
        None
    }
}

/// A host where every tool is installed.
struct FullHost;

impl System for FullHost {
    fn execute(&self, command: &[String], _timeout: Duration) -> ProbeResult {
        panic!("unexpected command: {}", command.join(" "))
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/bin").join(program))
    }

    fn exists(&self, _path: &Path) -> bool {
        true
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        (path == Path::new("/proc/cpuinfo")).then(|| "flags : fpu svm".to_string())
    }
}

#[test]
fn error_types_are_public() {
    let err = AuditError::ConfigValidationError {
        message: "bad".into(),
    };
    assert!(err.to_string().contains("bad"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> readyaudit::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn outcome_precedence_is_public() {
    assert_eq!(Outcome::new(Some(true), true, "m", "", true).level(), Level::Skip);
    assert_eq!(Outcome::new(None, true, "m", "", false).level(), Level::Warn);
}

#[test]
fn dry_run_on_empty_host() {
    let report = readyaudit::run_audit(&EmptyHost, &Catalog::builtin(), Timeouts::default(), true);

    assert!(report.dry_run());
    let names: Vec<_> = report.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["OS & Platform", "CLI Tooling", "Kubernetes", "Host Ports"]);

    let kubernetes = report.section("Kubernetes").unwrap();
    assert_eq!(kubernetes.entries.len(), 1);
    assert_eq!(kubernetes.entries[0].outcome.level(), Level::Fail);

    let tools = report.section("CLI Tooling").unwrap();
    assert_eq!(tools.entries.len(), 22);
    assert!(tools
        .entries
        .iter()
        .all(|e| e.outcome.level() == Level::Fail));

    assert_eq!(report.summary().total(), 4 + 22 + 1 + 25);
    assert_eq!(decide_exit(&report.summary(), true), 2);
}

#[test]
fn dry_run_skips_every_external_probe() {
    let report = readyaudit::run_audit(&FullHost, &Catalog::builtin(), Timeouts::default(), true);

    for name in ["CLI Tooling", "Kubernetes", "Host Ports"] {
        let section = report.section(name).unwrap();
        for entry in &section.entries {
            assert_eq!(entry.outcome.level(), Level::Skip, "{name}/{}", entry.name);
            assert_eq!(entry.outcome.message(), DRY_RUN_SENTINEL);
        }
    }

    let os = report.section("OS & Platform").unwrap();
    assert_eq!(os.entry("systemd").unwrap().outcome.level(), Level::Skip);
    assert_eq!(os.entry("virtualization").unwrap().outcome.level(), Level::Pass);
    assert_eq!(os.entry("k3s-install").unwrap().outcome.message(), "found 3/3 dirs");

    let kubernetes = report.section("Kubernetes").unwrap();
    assert!(kubernetes.entry("rdctl-node").is_some());
}

#[test]
fn custom_catalog_drives_sections() {
    let catalog = Catalog {
        tools: vec![ToolSpec::new("git", &["git", "--version"])],
        ports: [(8443, "Kong TLS".to_string())].into_iter().collect(),
        ..Catalog::builtin()
    };

    let report = readyaudit::run_audit(&FullHost, &catalog, Timeouts::default(), true);

    assert_eq!(report.section("CLI Tooling").unwrap().entries.len(), 1);
    let ports = report.section("Host Ports").unwrap();
    assert_eq!(ports.entries.len(), 1);
    assert_eq!(ports.entries[0].name, "port:8443");
}

#[test]
fn json_formatter_is_public() {
    let report = readyaudit::run_audit(&EmptyHost, &Catalog::builtin(), Timeouts::default(), true);
    let mut output = Vec::new();
    JsonFormatter::new().format(&report, &mut output).unwrap();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["summary"]["FAIL"].as_u64().unwrap() as usize, report.summary().fail);
    assert_eq!(parsed["sections"]["Kubernetes"][0]["check"], "kubectl");
}
