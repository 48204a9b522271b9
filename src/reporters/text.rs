//! Text (terminal) reporter with colors and formatting

use crate::models::{ConsistencyResult, Issue, Severity};
use anyhow::Result;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: &str) -> &'static str {
    match grade {
        "A" => "\x1b[32m", // Green
        "B" => "\x1b[92m", // Light green
        "C" => "\x1b[33m", // Yellow
        "D" => "\x1b[91m", // Light red
        "F" => "\x1b[31m", // Red
        _ => "\x1b[0m",
    }
}

/// Severity colors
fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Blocker => "\x1b[31m", // Red
        Severity::Warning => "\x1b[33m", // Yellow
        Severity::Info => "\x1b[90m",    // Gray
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Issues listed per severity before truncation
const MAX_LISTED: usize = 15;

/// Render result as formatted terminal output
pub fn render(result: &ConsistencyResult) -> Result<String> {
    let mut out = String::new();

    // Header
    let grade = result.grade();
    let grade_c = grade_color(grade);
    out.push_str(&format!("\n{BOLD}Branch Go-Live Audit{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{}/100{RESET}  Grade: {grade_c}{BOLD}{}{RESET}  ",
        result.score, grade
    ));
    out.push_str(&format!(
        "Checks: {}  Passed: {}\n",
        result.total_checks, result.pass_count
    ));
    if result.is_go_live_ready() {
        out.push_str("\x1b[32mNo blockers: ready for go-live review\x1b[0m\n\n");
    } else {
        out.push_str(&format!(
            "\x1b[31m{} blocker(s) must be resolved before go-live{RESET}\n\n",
            result.blockers.len()
        ));
    }

    // Category summary, only categories that ran
    out.push_str(&format!("{BOLD}CATEGORIES{RESET}\n"));
    for (category, stats) in result
        .category_summary
        .iter()
        .filter(|(_, stats)| stats.checks > 0)
    {
        let marker = if stats.issues == 0 { "\x1b[32m✓" } else { "\x1b[33m!" };
        out.push_str(&format!(
            "  {marker}{RESET} {:<20} {DIM}{} check(s){RESET}  {} issue(s)\n",
            category.as_str(),
            stats.checks,
            stats.issues
        ));
    }
    out.push('\n');

    // Issues by severity
    out.push_str(&format!(
        "{BOLD}ISSUES{RESET} ({} total)\n",
        result.issues.len()
    ));
    let mut summary_parts = Vec::new();
    if !result.blockers.is_empty() {
        summary_parts.push(format!("\x1b[31m{} blocker{RESET}", result.blockers.len()));
    }
    if !result.warnings.is_empty() {
        summary_parts.push(format!("\x1b[33m{} warning{RESET}", result.warnings.len()));
    }
    if !result.infos.is_empty() {
        summary_parts.push(format!("\x1b[90m{} info{RESET}", result.infos.len()));
    }
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n\n", summary_parts.join(" | ")));
    }

    for (severity, issues) in [
        (Severity::Blocker, &result.blockers),
        (Severity::Warning, &result.warnings),
        (Severity::Info, &result.infos),
    ] {
        render_section(&mut out, severity, issues);
    }

    if result.issues.is_empty() {
        out.push_str(&format!("{DIM}No configuration issues found.{RESET}\n"));
    }

    Ok(out)
}

fn render_section(out: &mut String, severity: Severity, issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }
    let sev_c = severity_color(severity);
    out.push_str(&format!("{sev_c}{BOLD}{}{RESET}\n", severity));
    for issue in issues.iter().take(MAX_LISTED) {
        out.push_str(&format!(
            "  {sev_c}{:<18}{RESET} {}{}\n",
            issue.id.to_string(),
            issue.title,
            format_count(issue)
        ));
        if !issue.details.is_empty() {
            out.push_str(&format!("  {:<18} {DIM}{}{RESET}\n", "", issue.details));
        }
        if !issue.fix_hint.is_empty() {
            out.push_str(&format!("  {:<18} {DIM}fix: {}{RESET}\n", "", issue.fix_hint));
        }
    }
    let remaining = issues.len().saturating_sub(MAX_LISTED);
    if remaining > 0 {
        out.push_str(&format!(
            "  {DIM}...and {} more (use --format json for the full list){RESET}\n",
            remaining
        ));
    }
    out.push('\n');
}

fn format_count(issue: &Issue) -> String {
    match issue.count {
        Some(n) if n > 1 => format!(" {DIM}(x{}){RESET}", n),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_text_render_contains_sections() {
        let out = render(&test_result()).expect("render text");
        assert!(out.contains("Branch Go-Live Audit"));
        assert!(out.contains("92/100"));
        assert!(out.contains("UNIT-001-icu-1"));
        assert!(out.contains("BLOCKER"));
        assert!(out.contains("1 blocker(s) must be resolved"));
        assert!(out.contains("(x3)"));
    }

    #[test]
    fn test_text_render_skips_idle_categories() {
        let out = render(&test_result()).expect("render text");
        assert!(out.contains("PHARMACY"));
        assert!(out.contains("BRANCH"));
        assert!(!out.contains("TARIFF_PLAN"));
    }

    #[test]
    fn test_text_render_clean_result() {
        let mut result = test_result();
        result.issues.clear();
        result.blockers.clear();
        result.warnings.clear();
        result.infos.clear();
        let out = render(&result).expect("render text");
        assert!(out.contains("No configuration issues found."));
        assert!(out.contains("ready for go-live review"));
    }
}
