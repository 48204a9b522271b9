//! Base check trait and types
//!
//! This module defines the core abstractions for configuration auditing:
//! - `Check` trait that every rule implements
//! - `Rule`, the table-driven implementation used by the catalog
//! - `CheckContext`, the read-only view a check evaluates against
//! - `CheckResult` / `CheckRun` for capturing execution results
//! - `CategoryTracker` for per-category counters

use crate::config::Thresholds;
use crate::hierarchy::{flatten, flatten_with_parent, ParentedNode};
use crate::models::{Category, CategoryStats, Issue, IssueId};
use crate::reference::ReferenceData;
use crate::snapshot::{BranchSnapshot, HierarchyNode};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use tracing::warn;

/// Everything a check may read during one run.
///
/// The location forest is flattened once when the context is built and
/// shared by every location check.
pub struct CheckContext<'a> {
    pub snapshot: &'a BranchSnapshot,
    /// Every location node, each once
    pub nodes: Vec<&'a HierarchyNode>,
    /// Every location node with its parent id
    pub parented: Vec<ParentedNode<'a>>,
    pub thresholds: &'a Thresholds,
    pub reference: &'a ReferenceData,
    /// Instant used by time-relative checks; fixed for the whole run
    pub now: DateTime<Utc>,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        snapshot: &'a BranchSnapshot,
        thresholds: &'a Thresholds,
        reference: &'a ReferenceData,
        now: DateTime<Utc>,
    ) -> Self {
        let tree = &snapshot.location.tree;
        Self {
            snapshot,
            nodes: flatten(tree),
            parented: flatten_with_parent(tree),
            thresholds,
            reference,
            now,
        }
    }

    pub fn branch_id(&self) -> &'a str {
        &self.snapshot.branch.id
    }

    /// True when the location forest has at least one node
    pub fn has_locations(&self) -> bool {
        !self.nodes.is_empty()
    }
}

/// Trait for all configuration checks
///
/// A check reads the context and returns the issues it found. It must not
/// keep state between calls; the runner owns all counters.
pub trait Check: Send + Sync {
    /// Stable rule identifier (e.g. "LOC-004")
    fn id(&self) -> &'static str;

    /// Category the check is counted under
    fn category(&self) -> Category;

    /// Human-readable description of what this check verifies
    fn description(&self) -> &'static str;

    /// Evaluate the check
    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Vec<Issue>>;
}

/// Signature of a catalog rule body
pub type RuleFn = fn(&CheckContext<'_>) -> Vec<Issue>;

/// A catalog entry: metadata plus a plain function
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub eval: RuleFn,
}

impl Rule {
    pub const fn new(
        id: &'static str,
        category: Category,
        description: &'static str,
        eval: RuleFn,
    ) -> Self {
        Self {
            id,
            category,
            description,
            eval,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("category", &self.category)
            .finish()
    }
}

impl Check for Rule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn category(&self) -> Category {
        self.category
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Vec<Issue>> {
        Ok((self.eval)(ctx))
    }
}

/// Result from running a single check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub check_id: &'static str,
    pub category: Category,
    pub issues: Vec<Issue>,
    /// Execution time in microseconds
    pub duration_us: u64,
    pub success: bool,
    pub error: Option<String>,
}

impl CheckResult {
    pub fn success(check: &dyn Check, issues: Vec<Issue>, duration_us: u64) -> Self {
        Self {
            check_id: check.id(),
            category: check.category(),
            issues,
            duration_us,
            success: true,
            error: None,
        }
    }

    /// A failed check still counts as run, with no issues
    pub fn failure(check: &dyn Check, error: String, duration_us: u64) -> Self {
        Self {
            check_id: check.id(),
            category: check.category(),
            issues: Vec::new(),
            duration_us,
            success: false,
            error: Some(error),
        }
    }
}

/// Per-category check and issue counters.
///
/// Every category is present from construction, so the summary always
/// lists all of them even when zero checks ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTracker {
    stats: BTreeMap<Category, CategoryStats>,
}

impl Default for CategoryTracker {
    fn default() -> Self {
        Self {
            stats: Category::ALL
                .iter()
                .map(|&c| (c, CategoryStats::default()))
                .collect(),
        }
    }
}

impl CategoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one executed check and the issues it appended
    pub fn record(&mut self, category: Category, issues: usize) {
        let entry = self.stats.entry(category).or_default();
        entry.checks += 1;
        entry.issues += issues;
    }

    /// Take back one issue counted for `category`
    fn discount(&mut self, category: Category) {
        if let Some(entry) = self.stats.get_mut(&category) {
            entry.issues = entry.issues.saturating_sub(1);
        }
    }

    pub fn merge(&mut self, other: &CategoryTracker) {
        for (category, stats) in &other.stats {
            let entry = self.stats.entry(*category).or_default();
            entry.checks += stats.checks;
            entry.issues += stats.issues;
        }
    }

    pub fn get(&self, category: Category) -> CategoryStats {
        self.stats.get(&category).copied().unwrap_or_default()
    }

    /// Number of checks recorded across all categories
    pub fn total_checks(&self) -> usize {
        self.stats.values().map(|s| s.checks).sum()
    }

    pub fn as_map(&self) -> &BTreeMap<Category, CategoryStats> {
        &self.stats
    }

    pub fn into_map(self) -> BTreeMap<Category, CategoryStats> {
        self.stats
    }
}

/// Accumulated, unscored output of a sequence of checks
#[derive(Debug, Clone, Default)]
pub struct CheckRun {
    pub issues: Vec<Issue>,
    pub tracker: CategoryTracker,
    pub checks_failed: usize,
    seen: FxHashSet<IssueId>,
}

impl CheckRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one check's result.
    ///
    /// Issues whose id was already emitted in this run are dropped and do
    /// not count toward the check's category.
    pub fn add_result(&mut self, result: CheckResult) {
        let before = self.issues.len();
        for issue in result.issues {
            if self.seen.insert(issue.id.clone()) {
                self.issues.push(issue);
            } else {
                warn!(
                    "Check {} emitted duplicate issue id {}, dropping",
                    result.check_id, issue.id
                );
            }
        }
        if !result.success {
            self.checks_failed += 1;
        }
        self.tracker
            .record(result.category, self.issues.len() - before);
    }

    /// Concatenate another run after this one.
    ///
    /// Issues from `other` whose id this run already emitted are dropped
    /// and taken off their category's issue count.
    pub fn merge(&mut self, other: CheckRun) {
        self.tracker.merge(&other.tracker);
        self.checks_failed += other.checks_failed;
        for issue in other.issues {
            if self.seen.insert(issue.id.clone()) {
                self.issues.push(issue);
            } else {
                warn!("Merged run repeats issue id {}, dropping", issue.id);
                self.tracker.discount(issue.category);
            }
        }
    }

    pub fn total_checks(&self) -> usize {
        self.tracker.total_checks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn issue(id: IssueId) -> Issue {
        Issue::new(id, Category::Unit, Severity::Warning, "test")
    }

    fn noop(_: &CheckContext<'_>) -> Vec<Issue> {
        Vec::new()
    }

    const NOOP: Rule = Rule::new("UNIT-999", Category::Unit, "noop", noop);

    #[test]
    fn test_tracker_prepopulated() {
        let tracker = CategoryTracker::new();
        assert_eq!(tracker.as_map().len(), Category::ALL.len());
        assert_eq!(tracker.get(Category::Pharmacy), CategoryStats::default());
        assert_eq!(tracker.total_checks(), 0);
    }

    #[test]
    fn test_tracker_record_and_merge() {
        let mut a = CategoryTracker::new();
        a.record(Category::Room, 2);
        a.record(Category::Room, 0);
        let mut b = CategoryTracker::new();
        b.record(Category::Room, 1);
        b.record(Category::Pharmacy, 3);

        a.merge(&b);
        assert_eq!(a.get(Category::Room), CategoryStats { checks: 3, issues: 3 });
        assert_eq!(a.get(Category::Pharmacy), CategoryStats { checks: 1, issues: 3 });
        assert_eq!(a.total_checks(), 4);
    }

    #[test]
    fn test_check_result_failure_has_no_issues() {
        let result = CheckResult::failure(&NOOP, "boom".to_string(), 5);
        assert!(!result.success);
        assert!(result.issues.is_empty());
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert_eq!(result.check_id, "UNIT-999");
    }

    #[test]
    fn test_run_drops_duplicate_ids() {
        let mut run = CheckRun::new();
        run.add_result(CheckResult::success(
            &NOOP,
            vec![
                issue(IssueId::scoped("UNIT-001", "u1")),
                issue(IssueId::scoped("UNIT-001", "u1")),
                issue(IssueId::scoped("UNIT-001", "u2")),
            ],
            1,
        ));
        assert_eq!(run.issues.len(), 2);
        assert_eq!(run.tracker.get(Category::Unit), CategoryStats { checks: 1, issues: 2 });
    }

    #[test]
    fn test_failed_check_still_counts() {
        let mut run = CheckRun::new();
        run.add_result(CheckResult::failure(&NOOP, "boom".into(), 1));
        assert_eq!(run.total_checks(), 1);
        assert_eq!(run.checks_failed, 1);
        assert!(run.issues.is_empty());
    }

    #[test]
    fn test_merge_drops_ids_already_emitted() {
        let mut first = CheckRun::new();
        first.add_result(CheckResult::success(
            &NOOP,
            vec![issue(IssueId::scoped("UNIT-001", "u1"))],
            1,
        ));
        let mut second = CheckRun::new();
        second.add_result(CheckResult::success(
            &NOOP,
            vec![
                issue(IssueId::scoped("UNIT-001", "u1")),
                issue(IssueId::scoped("UNIT-001", "u3")),
            ],
            1,
        ));

        first.merge(second);
        let ids: Vec<String> = first.issues.iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["UNIT-001-u1", "UNIT-001-u3"]);
        assert_eq!(first.total_checks(), 2);
        assert_eq!(first.tracker.get(Category::Unit), CategoryStats { checks: 2, issues: 2 });
    }
}
