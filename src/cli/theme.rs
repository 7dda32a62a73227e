//! Terminal styling for the run summary.

use console::Style;

use crate::report::Summary;
use crate::status::Level;

/// Styles for each check level.
#[derive(Debug, Clone)]
pub struct Theme {
    pub pass: Style,
    pub warn: Style,
    pub fail: Style,
    pub skip: Style,
    pub dim: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    pub fn new() -> Self {
        Self {
            pass: Style::new().green(),
            warn: Style::new().color256(208),
            fail: Style::new().red().bold(),
            skip: Style::new().dim(),
            dim: Style::new().dim(),
        }
    }

    /// A theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            pass: Style::new(),
            warn: Style::new(),
            fail: Style::new(),
            skip: Style::new(),
            dim: Style::new(),
        }
    }

    pub fn level(&self, level: Level) -> &Style {
        match level {
            Level::Pass => &self.pass,
            Level::Warn => &self.warn,
            Level::Fail => &self.fail,
            Level::Skip => &self.skip,
        }
    }

    /// `PASS 12  WARN 3  FAIL 1  SKIP 0`, each count in its level's style.
    pub fn format_summary(&self, summary: &Summary) -> String {
        Level::ALL
            .iter()
            .map(|&level| {
                self.level(level)
                    .apply_to(format!("{} {}", level, summary.count(level)))
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors(no_color: bool) -> bool {
    if no_color || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::Term::stdout().is_term()
}
