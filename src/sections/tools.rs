//! CLI Tooling section.

use super::{dry_run_skip, AuditContext, SectionRunner};
use crate::catalog::ToolSpec;
use crate::status::{CheckEntry, Outcome};

/// One entry per catalog tool, in catalog order.
pub struct ToolsRunner;

impl SectionRunner for ToolsRunner {
    fn name(&self) -> &'static str {
        "CLI Tooling"
    }

    fn run(&self, ctx: &AuditContext<'_>) -> Vec<CheckEntry> {
        ctx.catalog
            .tools
            .iter()
            .map(|tool| CheckEntry::new(tool.name.clone(), check_tool(ctx, tool)))
            .collect()
    }
}

fn check_tool(ctx: &AuditContext<'_>, tool: &ToolSpec) -> Outcome {
    if ctx.probe.which(tool.program()).is_none() {
        return Outcome::fail(
            "not installed",
            format!("Install {} and ensure it is on PATH", tool.name),
        );
    }
    if ctx.is_dry_run() {
        return dry_run_skip();
    }

    let result = ctx.probe.run(&tool.command, ctx.timeouts.tool);
    let message = result.first_line().unwrap_or("ok").to_string();
    Outcome::check(result.is_success(), message, "")
}
