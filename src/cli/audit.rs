//! `audit` command: load a snapshot, run the catalog, report

use crate::checks::CheckEngine;
use crate::config::{load_audit_config, load_config_file};
use crate::models::ConsistencyResult;
use crate::reporters;
use crate::snapshot::BranchSnapshot;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Parsed `audit` arguments
#[derive(Debug)]
pub(super) struct AuditOptions {
    pub snapshot: PathBuf,
    pub config: Option<PathBuf>,
    pub format: String,
    pub output: Option<PathBuf>,
    pub scope: String,
    pub split: bool,
    pub fail_on: Option<String>,
}

pub(super) fn run(opts: AuditOptions) -> Result<()> {
    let snapshot = BranchSnapshot::from_path(&opts.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", opts.snapshot.display()))?;

    // An explicit --config must load; the implicit one degrades to defaults
    let (config, base_dir) = match &opts.config {
        Some(path) => {
            let config = load_config_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            (config, parent_dir(path))
        }
        None => {
            let dir = parent_dir(&opts.snapshot);
            (load_audit_config(&dir), dir)
        }
    };
    debug!("Using thresholds: {:?}", config.thresholds);

    let reference = config.reference.resolve(&base_dir);
    let engine = engine_for_scope(&opts.scope)
        .with_thresholds(config.thresholds)
        .with_reference(reference);

    info!(
        "Auditing {} with {} checks (scope: {})",
        opts.snapshot.display(),
        engine.check_count(),
        opts.scope
    );
    let result = if opts.split {
        engine.run_split(&snapshot)
    } else {
        engine.run(&snapshot)
    };

    let output = reporters::report(&result, &opts.format)?;
    match &opts.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("Report written to: {}", path.display());
        }
        None => println!("{}", output),
    }

    if should_fail(opts.fail_on.as_deref(), &result) {
        if let Some(threshold) = &opts.fail_on {
            eprintln!("Failing due to --fail-on={} threshold", threshold);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn engine_for_scope(scope: &str) -> CheckEngine {
    match scope {
        "infrastructure" => CheckEngine::infrastructure(),
        "pharmacy" => CheckEngine::pharmacy(),
        _ => CheckEngine::full(),
    }
}

/// Directory containing `path`, or `.` for a bare file name
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// True when the result has issues at or above the threshold severity
fn should_fail(fail_on: Option<&str>, result: &ConsistencyResult) -> bool {
    match fail_on.map(str::to_lowercase).as_deref() {
        Some("blocker") => !result.blockers.is_empty(),
        Some("warning") => !result.blockers.is_empty() || !result.warnings.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CategoryTracker;
    use crate::models::{Category, Issue, IssueId, Severity};
    use crate::scoring;

    fn result_with(severity: Severity) -> ConsistencyResult {
        let issue = Issue::new(IssueId::new("BR-006"), Category::Branch, severity, "t");
        scoring::aggregate(8, vec![issue], CategoryTracker::new())
    }

    #[test]
    fn test_should_fail_thresholds() {
        assert!(should_fail(Some("blocker"), &result_with(Severity::Blocker)));
        assert!(!should_fail(Some("blocker"), &result_with(Severity::Warning)));
        assert!(should_fail(Some("warning"), &result_with(Severity::Warning)));
        assert!(!should_fail(Some("warning"), &result_with(Severity::Info)));
        assert!(!should_fail(None, &result_with(Severity::Blocker)));
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("snap.json")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/tmp/x/snap.json")), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_scope_selects_catalog() {
        assert_eq!(engine_for_scope("all").check_count(), 72);
        assert_eq!(engine_for_scope("infrastructure").check_count(), 59);
        assert_eq!(engine_for_scope("pharmacy").check_count(), 13);
    }
}
