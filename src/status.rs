//! Check outcome types.
//!
//! Every evaluated check produces an [`Outcome`] carrying exactly one
//! [`Level`]. Outcomes are only built through [`Outcome::new`] (the helper
//! constructors delegate to it), so severity derivation lives in one place.

use serde::Serialize;

/// Severity of a single check.
///
/// `Pass < Warn < Fail` for reporting purposes. `Skip` means the check was
/// not evaluated and sits outside that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Pass,
    Warn,
    Fail,
    Skip,
}

impl Level {
    /// All levels in report order.
    pub const ALL: [Level; 4] = [Level::Pass, Level::Warn, Level::Fail, Level::Skip];

    /// Upper-case label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Pass => "PASS",
            Level::Warn => "WARN",
            Level::Fail => "FAIL",
            Level::Skip => "SKIP",
        }
    }

    /// Badge glyph used in the Markdown report.
    pub fn badge(self) -> &'static str {
        match self {
            Level::Pass => "✅",
            Level::Warn => "⚠️",
            Level::Fail => "❌",
            Level::Skip => "⏭️",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verdict for one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    level: Level,
    message: String,
    fix: String,
}

impl Outcome {
    /// Derive an outcome from the raw check signals.
    ///
    /// Precedence:
    /// 1. `skip` forces [`Level::Skip`]
    /// 2. `pass: None` with `warn` yields [`Level::Warn`]
    /// 3. `pass: Some(true)` yields [`Level::Pass`]
    /// 4. anything else yields [`Level::Fail`]
    pub fn new(
        pass: Option<bool>,
        warn: bool,
        message: impl Into<String>,
        fix: impl Into<String>,
        skip: bool,
    ) -> Self {
        let level = if skip {
            Level::Skip
        } else {
            match (pass, warn) {
                (None, true) => Level::Warn,
                (Some(true), _) => Level::Pass,
                _ => Level::Fail,
            }
        };
        Self {
            level,
            message: message.into(),
            fix: fix.into(),
        }
    }

    /// PASS with no fix hint.
    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(Some(true), false, message, "", false)
    }

    /// FAIL with a fix hint.
    pub fn fail(message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self::new(Some(false), false, message, fix, false)
    }

    /// WARN with a fix hint.
    pub fn warn(message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self::new(None, true, message, fix, false)
    }

    /// SKIP with no fix hint.
    pub fn skip(message: impl Into<String>) -> Self {
        Self::new(None, false, message, "", true)
    }

    /// PASS when `ok`, FAIL with `fix` otherwise.
    pub fn check(ok: bool, message: impl Into<String>, fix: impl Into<String>) -> Self {
        let fix = if ok { String::new() } else { fix.into() };
        Self::new(Some(ok), false, message, fix, false)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Remediation hint, empty when none applies.
    pub fn fix(&self) -> &str {
        &self.fix
    }
}

/// A named check and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    pub name: String,
    pub outcome: Outcome,
}

impl CheckEntry {
    pub fn new(name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }
}

/// A named, ordered group of checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<CheckEntry>,
}

impl Section {
    pub fn new(name: impl Into<String>, entries: Vec<CheckEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Look up an entry by check name (first match).
    pub fn entry(&self, name: &str) -> Option<&CheckEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_wins_over_everything() {
        for pass in [None, Some(true), Some(false)] {
            for warn in [false, true] {
                let outcome = Outcome::new(pass, warn, "m", "f", true);
                assert_eq!(outcome.level(), Level::Skip, "pass={pass:?} warn={warn}");
            }
        }
    }

    #[test]
    fn explicit_pass_ignores_warn_flag() {
        assert_eq!(Outcome::new(Some(true), true, "", "", false).level(), Level::Pass);
        assert_eq!(Outcome::new(Some(false), true, "", "", false).level(), Level::Fail);
    }

    #[test]
    fn warn_requires_undecided_pass() {
        assert_eq!(Outcome::new(None, true, "", "", false).level(), Level::Warn);
    }

    #[test]
    fn undecided_without_warn_is_fail() {
        assert_eq!(Outcome::new(None, false, "", "", false).level(), Level::Fail);
    }

    #[test]
    fn helpers_route_through_constructor() {
        assert_eq!(Outcome::pass("ok").level(), Level::Pass);
        assert_eq!(Outcome::fail("no", "fix it").level(), Level::Fail);
        assert_eq!(Outcome::warn("hmm", "").level(), Level::Warn);
        assert_eq!(Outcome::skip("later").level(), Level::Skip);
        assert_eq!(Outcome::check(true, "ok", "hint").fix(), "");
        assert_eq!(Outcome::check(false, "no", "hint").fix(), "hint");
        assert_eq!(Outcome::pass("ok").fix(), "");
    }

    #[test]
    fn level_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"WARN\"");
        assert_eq!(Level::Skip.to_string(), "SKIP");
    }

    #[test]
    fn section_entry_lookup() {
        let section = Section::new(
            "Host Ports",
            vec![
                CheckEntry::new("port:80", Outcome::pass("no host bind detected")),
                CheckEntry::new("port:443", Outcome::warn("bound", "")),
            ],
        );
        assert_eq!(section.entry("port:443").unwrap().outcome.level(), Level::Warn);
        assert!(section.entry("port:22").is_none());
    }
}
