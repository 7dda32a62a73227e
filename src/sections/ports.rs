//! Host Ports section.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{dry_run_skip, AuditContext, SectionRunner};
use crate::status::{CheckEntry, Outcome};

/// `:<port>` followed by a word boundary, as printed by ss, netstat and lsof.
static PORT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\d+)\b").expect("PORT_REGEX must compile"));

/// One entry per catalog port, ascending, WARN when bound on the host.
pub struct PortsRunner;

impl SectionRunner for PortsRunner {
    fn name(&self) -> &'static str {
        "Host Ports"
    }

    fn run(&self, ctx: &AuditContext<'_>) -> Vec<CheckEntry> {
        let ports = &ctx.catalog.ports;
        if ctx.is_dry_run() {
            return ports
                .keys()
                .map(|port| CheckEntry::new(format!("port:{port}"), dry_run_skip()))
                .collect();
        }

        let table = listening_table(ctx).unwrap_or_default();
        if table.trim().is_empty() {
            tracing::warn!("no listening-socket tool produced output");
            return vec![CheckEntry::new(
                "ports",
                Outcome::warn(
                    "Could not list listening ports",
                    "Install ss or netstat or lsof",
                ),
            )];
        }

        let bound = bound_ports(&table);
        ports
            .iter()
            .map(|(port, purpose)| {
                let outcome = if bound.contains(port) {
                    Outcome::warn(
                        format!("Listening on host: {purpose}"),
                        "If this should be cluster-only, remove host binds and expose via Traefik",
                    )
                } else {
                    Outcome::pass("no host bind detected")
                };
                CheckEntry::new(format!("port:{port}"), outcome)
            })
            .collect()
    }
}

/// Output of the first listener probe that is installed and succeeds.
fn listening_table(ctx: &AuditContext<'_>) -> Option<String> {
    ctx.catalog.listeners.iter().find_map(|command| {
        let program = command.first()?;
        ctx.probe.which(program)?;
        let result = ctx.probe.run(command, ctx.timeouts.tool);
        if !result.is_success() {
            tracing::debug!(
                program = %program,
                code = result.code(),
                "listener probe failed, trying next"
            );
        }
        result.success_output().map(str::to_string)
    })
}

/// Every port number that appears after a colon in a socket table.
///
/// Matches on whole numbers, so `:443` is not found inside `:4433`.
pub fn bound_ports(table: &str) -> BTreeSet<u16> {
    PORT_REGEX
        .captures_iter(table)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}
