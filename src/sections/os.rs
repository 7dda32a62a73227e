//! OS & Platform section.
//!
//! Everything here except the init-system probe is local file
//! introspection, which is safe to perform in dry-run mode.

use std::path::Path;
use std::time::Duration;

use super::{dry_run_skip, AuditContext, SectionRunner};
use crate::probe::Probe;
use crate::status::{CheckEntry, Outcome};

const SYSTEMD_TIMEOUT: Duration = Duration::from_secs(5);

const PROC_VERSION: &str = "/proc/version";
const PROC_OSRELEASE: &str = "/proc/sys/kernel/osrelease";
const PROC_CPUINFO: &str = "/proc/cpuinfo";
const OS_RELEASE: &str = "/etc/os-release";

/// Platform string, init system, CPU virtualization and runtime install dirs.
pub struct OsRunner;

impl SectionRunner for OsRunner {
    fn name(&self) -> &'static str {
        "OS & Platform"
    }

    fn run(&self, ctx: &AuditContext<'_>) -> Vec<CheckEntry> {
        vec![
            CheckEntry::new(
                "OS",
                Outcome::pass(format!(
                    "{} (WSL2={})",
                    platform_string(&ctx.probe),
                    is_wsl(&ctx.probe)
                )),
            ),
            CheckEntry::new("systemd", check_systemd(&ctx.probe)),
            CheckEntry::new("virtualization", check_virtualization(&ctx.probe)),
            CheckEntry::new("k3s-install", check_install_dirs(ctx)),
        ]
    }
}

/// `<os> <kernel> <arch>`, followed by the distribution name when known.
pub fn platform_string(probe: &Probe<'_>) -> String {
    let mut platform = std::env::consts::OS.to_string();
    if let Some(kernel) = probe
        .read_file(Path::new(PROC_OSRELEASE))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        platform.push(' ');
        platform.push_str(&kernel);
    }
    platform.push(' ');
    platform.push_str(std::env::consts::ARCH);

    if let Some(pretty) = probe
        .read_file(Path::new(OS_RELEASE))
        .as_deref()
        .and_then(pretty_name)
    {
        platform.push_str(&format!(" [{pretty}]"));
    }
    platform
}

fn pretty_name(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find(|l| l.starts_with("PRETTY_NAME="))
        .map(|l| l.trim_start_matches("PRETTY_NAME=").trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
}

/// Whether the kernel was built for the Windows Subsystem for Linux.
pub fn is_wsl(probe: &Probe<'_>) -> bool {
    probe
        .read_file(Path::new(PROC_VERSION))
        .map(|v| v.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

fn check_systemd(probe: &Probe<'_>) -> Outcome {
    if probe.which("systemctl").is_none() {
        return Outcome::warn(
            "systemctl not found",
            "Enable systemd in WSL or proceed without it",
        );
    }
    if probe.is_dry_run() {
        return dry_run_skip();
    }

    let result = probe.run(&["systemctl", "is-system-running"], SYSTEMD_TIMEOUT);
    match result.success_output() {
        Some(out) if out.contains("running") => Outcome::pass("systemd active"),
        _ => Outcome::warn(
            format!("systemd not fully running ({})", result.output()),
            "Enable systemd in /etc/wsl.conf and restart WSL",
        ),
    }
}

fn check_virtualization(probe: &Probe<'_>) -> Outcome {
    let Some(cpuinfo) = probe.read_file(Path::new(PROC_CPUINFO)) else {
        return Outcome::warn("Could not read /proc/cpuinfo", "");
    };
    let present = cpuinfo
        .to_lowercase()
        .split_whitespace()
        .any(|flag| flag == "vmx" || flag == "svm");
    Outcome::check(
        present,
        if present {
            "VMX/SVM present"
        } else {
            "No VMX/SVM flags"
        },
        "Enable virtualization in BIOS/UEFI",
    )
}

fn check_install_dirs(ctx: &AuditContext<'_>) -> Outcome {
    let dirs = &ctx.catalog.install_dirs;
    let present = dirs.iter().filter(|d| ctx.probe.exists(d)).count();
    let message = if present > 0 {
        format!("found {}/{} dirs", present, dirs.len())
    } else {
        "k3s dirs missing".to_string()
    };
    Outcome::check(
        present > 0,
        message,
        "Install k3s via rancher installer or verify permissions",
    )
}
