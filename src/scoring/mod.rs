//! Readiness scoring and result aggregation
//!
//! # Scoring Formula
//!
//! ```text
//! Score = clamp(round_half_even(100 - 5·B - 2·W - 0.5·I), 0, 100)
//!
//! Where:
//!   B = blocker issues
//!   W = warning issues
//!   I = info issues
//! ```
//!
//! Rounding is half-to-even, so 99.5 rounds to 100 and 98.5 to 98.
//!
//! The score is not compositional: two partial runs cannot be scored
//! separately and combined. Merge the runs first, then score once.
//!
//! # Example
//!
//! One blocker, three warnings and five infos:
//! 100 - 5 - 6 - 2.5 = 86.5, which rounds to 86.

use crate::checks::base::CategoryTracker;
use crate::models::{ConsistencyResult, Issue, Severity};

/// Score from severity counts
pub fn score(blockers: usize, warnings: usize, infos: usize) -> u8 {
    let penalty = blockers as f64 * Severity::Blocker.weight()
        + warnings as f64 * Severity::Warning.weight()
        + infos as f64 * Severity::Info.weight();
    (100.0 - penalty).round_ties_even().clamp(0.0, 100.0) as u8
}

/// Score a list of issues by severity
pub fn score_issues(issues: &[Issue]) -> u8 {
    let (mut blockers, mut warnings, mut infos) = (0, 0, 0);
    for issue in issues {
        match issue.severity {
            Severity::Blocker => blockers += 1,
            Severity::Warning => warnings += 1,
            Severity::Info => infos += 1,
        }
    }
    score(blockers, warnings, infos)
}

/// Build the final result from the issues of a complete run.
///
/// Issue order is preserved in `issues` and within each severity list.
pub fn aggregate(
    total_checks: usize,
    issues: Vec<Issue>,
    tracker: CategoryTracker,
) -> ConsistencyResult {
    let mut blockers = Vec::new();
    let mut warnings = Vec::new();
    let mut infos = Vec::new();
    for issue in &issues {
        match issue.severity {
            Severity::Blocker => blockers.push(issue.clone()),
            Severity::Warning => warnings.push(issue.clone()),
            Severity::Info => infos.push(issue.clone()),
        }
    }

    let score = score(blockers.len(), warnings.len(), infos.len());
    ConsistencyResult {
        total_checks,
        pass_count: total_checks.saturating_sub(issues.len()),
        issues,
        blockers,
        warnings,
        infos,
        score,
        category_summary: tracker.into_map(),
    }
}
