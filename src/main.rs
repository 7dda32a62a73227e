//! Readyaudit CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use readyaudit::cli::{should_use_colors, AuditCommand, Cli, Theme};
use readyaudit::probe::HostSystem;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("readyaudit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("readyaudit=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("readyaudit starting with args: {:?}", cli);

    let theme = if should_use_colors(cli.no_color) {
        Theme::new()
    } else {
        Theme::plain()
    };
    let command = AuditCommand::new(cli).with_theme(theme);
    let system = HostSystem::new();

    match command.execute(&system, &mut std::io::stdout()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
