//! Command-line interface.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`audit`] - The audit command
//! - [`theme`] - Terminal styling for the summary line

pub mod args;
pub mod audit;
pub mod theme;

pub use args::Cli;
pub use audit::{AuditCommand, CommandResult};
pub use theme::{should_use_colors, Theme};
