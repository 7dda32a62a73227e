//! Exit-policy gate.

use crate::report::Summary;

/// Exit code for a normal run.
pub const EXIT_OK: i32 = 0;

/// Exit code when strict mode finds at least one FAIL.
pub const EXIT_STRICT_FAILURE: i32 = 2;

/// Map the summary to a process exit code.
///
/// Only FAIL entries matter, and only under `strict`. WARN and SKIP never
/// change the exit code.
pub fn decide_exit(summary: &Summary, strict: bool) -> i32 {
    if strict && summary.fail > 0 {
        EXIT_STRICT_FAILURE
    } else {
        EXIT_OK
    }
}
