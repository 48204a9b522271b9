//! Check execution engine
//!
//! The CheckEngine orchestrates the execution of every registered check:
//! - Builds the shared `CheckContext` once per run
//! - Runs checks sequentially in registration order
//! - Contains errors and panics per check
//! - Collects issues and category counters, then scores once
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      CheckEngine                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Register checks (catalog order)                     │
//! │  2. Flatten the location forest into the context        │
//! │  3. Evaluate each check, catching panics                │
//! │  4. Record issue deltas per category                    │
//! │  5. Score the union and build the result                │
//! └─────────────────────────────────────────────────────────┘
//! ```

use crate::checks::base::{Check, CheckContext, CheckResult, CheckRun};
use crate::config::Thresholds;
use crate::models::{Category, ConsistencyResult};
use crate::reference::ReferenceData;
use crate::scoring;
use crate::snapshot::BranchSnapshot;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs an ordered catalog of checks against snapshots
pub struct CheckEngine {
    /// Registered checks, in execution order
    checks: Vec<Arc<dyn Check>>,
    thresholds: Thresholds,
    reference: ReferenceData,
    /// Fixed evaluation instant; wall clock when unset
    clock: Option<DateTime<Utc>>,
}

impl CheckEngine {
    /// Create an engine with no checks, default thresholds and empty reference data
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            thresholds: Thresholds::default(),
            reference: ReferenceData::empty(),
            clock: None,
        }
    }

    /// Every infrastructure, financial and pharmacy check
    pub fn full() -> Self {
        CheckEngineBuilder::new()
            .checks(crate::checks::all_checks())
            .reference(ReferenceData::builtin())
            .build()
    }

    /// Branch, location, department, unit, room, resource and financial checks
    pub fn infrastructure() -> Self {
        CheckEngineBuilder::new()
            .checks(crate::checks::infrastructure_checks())
            .build()
    }

    /// Pharmacy go-live checks
    pub fn pharmacy() -> Self {
        CheckEngineBuilder::new()
            .checks(crate::checks::pharmacy_checks())
            .reference(ReferenceData::builtin())
            .build()
    }

    /// Evaluate time-relative checks against a fixed instant
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = reference;
        self
    }

    /// Register a check at the end of the catalog
    pub fn register(&mut self, check: Arc<dyn Check>) {
        debug!("Registering check: {}", check.id());
        self.checks.push(check);
    }

    /// Register multiple checks at once
    pub fn register_all(&mut self, checks: impl IntoIterator<Item = Arc<dyn Check>>) {
        for check in checks {
            self.register(check);
        }
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Ids of all registered checks, in execution order
    pub fn check_ids(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.id()).collect()
    }

    pub fn checks(&self) -> &[Arc<dyn Check>] {
        &self.checks
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }

    /// Run every check and return the scored result
    pub fn run(&self, snapshot: &BranchSnapshot) -> ConsistencyResult {
        let start = Instant::now();
        let run = self.run_checks(snapshot);
        let result = scoring::aggregate(run.total_checks(), run.issues, run.tracker);

        info!(
            "Audit complete: {} issues from {} checks ({} failed), score {} in {:?}",
            result.issues.len(),
            result.total_checks,
            run.checks_failed,
            result.score,
            start.elapsed()
        );
        result
    }

    /// Run every check without scoring
    pub fn run_checks(&self, snapshot: &BranchSnapshot) -> CheckRun {
        let ctx = CheckContext::new(snapshot, &self.thresholds, &self.reference, self.now());
        info!(
            "Starting audit of branch {} with {} checks ({} location nodes)",
            ctx.branch_id(),
            self.checks.len(),
            ctx.nodes.len()
        );
        self.run_sequence(&self.checks, &ctx)
    }

    /// Run the pharmacy checks and the remaining checks in parallel.
    ///
    /// Both halves share one context. Issues are concatenated (non-pharmacy
    /// first) and scored once over the union.
    pub fn run_split(&self, snapshot: &BranchSnapshot) -> ConsistencyResult {
        let ctx = CheckContext::new(snapshot, &self.thresholds, &self.reference, self.now());
        let (pharmacy, infrastructure): (Vec<_>, Vec<_>) = self
            .checks
            .iter()
            .cloned()
            .partition(|c| c.category() == Category::Pharmacy);

        info!(
            "Starting split audit of branch {}: {} infrastructure, {} pharmacy checks",
            ctx.branch_id(),
            infrastructure.len(),
            pharmacy.len()
        );

        let (mut run, pharmacy_run) = rayon::join(
            || self.run_sequence(&infrastructure, &ctx),
            || self.run_sequence(&pharmacy, &ctx),
        );
        run.merge(pharmacy_run);

        scoring::aggregate(run.total_checks(), run.issues, run.tracker)
    }

    fn run_sequence(&self, checks: &[Arc<dyn Check>], ctx: &CheckContext<'_>) -> CheckRun {
        let mut run = CheckRun::new();
        for check in checks {
            let result = self.run_single_check(check.as_ref(), ctx);
            if let Some(err) = &result.error {
                warn!("Check {} failed: {}", result.check_id, err);
            }
            run.add_result(result);
        }
        run
    }

    /// Run a single check with error handling and timing
    fn run_single_check(&self, check: &dyn Check, ctx: &CheckContext<'_>) -> CheckResult {
        let start = Instant::now();
        debug!("Running check: {}", check.id());

        // Wrap in catch_unwind to handle panics
        let outcome =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| check.evaluate(ctx)));
        let duration = start.elapsed().as_micros() as u64;

        match outcome {
            Ok(Ok(issues)) => {
                debug!(
                    "Check {} found {} issues in {}us",
                    check.id(),
                    issues.len(),
                    duration
                );
                CheckResult::success(check, issues, duration)
            }
            Ok(Err(e)) => CheckResult::failure(check, e.to_string(), duration),
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                error!("Check {} panicked: {}", check.id(), panic_msg);
                CheckResult::failure(check, format!("Panic: {}", panic_msg), duration)
            }
        }
    }
}

impl Default for CheckEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for CheckEngine with fluent API
pub struct CheckEngineBuilder {
    checks: Vec<Arc<dyn Check>>,
    thresholds: Thresholds,
    reference: ReferenceData,
    clock: Option<DateTime<Utc>>,
}

impl CheckEngineBuilder {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            thresholds: Thresholds::default(),
            reference: ReferenceData::empty(),
            clock: None,
        }
    }

    /// Add a check
    pub fn check(mut self, check: Arc<dyn Check>) -> Self {
        self.checks.push(check);
        self
    }

    /// Add multiple checks
    pub fn checks(mut self, checks: impl IntoIterator<Item = Arc<dyn Check>>) -> Self {
        self.checks.extend(checks);
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn reference(mut self, reference: ReferenceData) -> Self {
        self.reference = reference;
        self
    }

    pub fn clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    /// Build the engine
    pub fn build(self) -> CheckEngine {
        let mut engine = CheckEngine::new()
            .with_thresholds(self.thresholds)
            .with_reference(self.reference);
        if let Some(now) = self.clock {
            engine = engine.with_clock(now);
        }
        engine.register_all(self.checks);
        engine
    }
}

impl Default for CheckEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Issue, IssueId, Severity};
    use anyhow::Result;

    // Mock check for testing
    struct MockCheck {
        id: &'static str,
        category: Category,
        issues: usize,
    }

    impl Check for MockCheck {
        fn id(&self) -> &'static str {
            self.id
        }

        fn category(&self) -> Category {
            self.category
        }

        fn description(&self) -> &'static str {
            "Mock check for testing"
        }

        fn evaluate(&self, _ctx: &CheckContext<'_>) -> Result<Vec<Issue>> {
            Ok((0..self.issues)
                .map(|i| {
                    Issue::new(
                        IssueId::scoped(self.id, i.to_string()),
                        self.category,
                        Severity::Warning,
                        format!("Issue {}", i),
                    )
                })
                .collect())
        }
    }

    struct PanickingCheck;

    impl Check for PanickingCheck {
        fn id(&self) -> &'static str {
            "ROOM-900"
        }

        fn category(&self) -> Category {
            Category::Room
        }

        fn description(&self) -> &'static str {
            "Always panics"
        }

        fn evaluate(&self, _ctx: &CheckContext<'_>) -> Result<Vec<Issue>> {
            panic!("room index out of range")
        }
    }

    struct FailingCheck;

    impl Check for FailingCheck {
        fn id(&self) -> &'static str {
            "RES-900"
        }

        fn category(&self) -> Category {
            Category::Resource
        }

        fn description(&self) -> &'static str {
            "Always errors"
        }

        fn evaluate(&self, _ctx: &CheckContext<'_>) -> Result<Vec<Issue>> {
            anyhow::bail!("summary unavailable")
        }
    }

    fn mock(id: &'static str, category: Category, issues: usize) -> Arc<dyn Check> {
        Arc::new(MockCheck {
            id,
            category,
            issues,
        })
    }

    #[test]
    fn test_engine_creation() {
        let engine = CheckEngine::new();
        assert_eq!(engine.check_count(), 0);
        let result = engine.run(&BranchSnapshot::default());
        assert_eq!(result.total_checks, 0);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_register_checks() {
        let mut engine = CheckEngine::new();
        engine.register(mock("UNIT-901", Category::Unit, 1));
        engine.register(mock("ROOM-901", Category::Room, 0));
        assert_eq!(engine.check_count(), 2);
        assert_eq!(engine.check_ids(), vec!["UNIT-901", "ROOM-901"]);
    }

    #[test]
    fn test_category_deltas() {
        let engine = CheckEngineBuilder::new()
            .check(mock("UNIT-901", Category::Unit, 2))
            .check(mock("UNIT-902", Category::Unit, 0))
            .check(mock("ROOM-901", Category::Room, 3))
            .build();

        let result = engine.run(&BranchSnapshot::default());
        assert_eq!(result.total_checks, 3);
        assert_eq!(result.issues.len(), 5);
        assert_eq!(result.category_summary[&Category::Unit].checks, 2);
        assert_eq!(result.category_summary[&Category::Unit].issues, 2);
        assert_eq!(result.category_summary[&Category::Room].issues, 3);
        assert_eq!(result.category_summary[&Category::Branch].checks, 0);
    }

    #[test]
    fn test_panicking_check_is_contained() {
        let engine = CheckEngineBuilder::new()
            .check(mock("UNIT-901", Category::Unit, 1))
            .check(Arc::new(PanickingCheck))
            .check(Arc::new(FailingCheck))
            .check(mock("UNIT-902", Category::Unit, 1))
            .build();

        let run = engine.run_checks(&BranchSnapshot::default());
        assert_eq!(run.total_checks(), 4);
        assert_eq!(run.checks_failed, 2);
        assert_eq!(run.issues.len(), 2);
        assert_eq!(run.tracker.get(Category::Room).checks, 1);
        assert_eq!(run.tracker.get(Category::Room).issues, 0);
    }

    #[test]
    fn test_split_matches_sequential() {
        let engine = CheckEngineBuilder::new()
            .check(mock("UNIT-901", Category::Unit, 2))
            .check(mock("PH-901", Category::Pharmacy, 3))
            .check(mock("ROOM-901", Category::Room, 1))
            .build();

        let snapshot = BranchSnapshot::default();
        let sequential = engine.run(&snapshot);
        let split = engine.run_split(&snapshot);

        assert_eq!(split.total_checks, sequential.total_checks);
        assert_eq!(split.score, sequential.score);
        assert_eq!(split.category_summary, sequential.category_summary);
        let mut a: Vec<String> = sequential.issues.iter().map(|i| i.id.to_string()).collect();
        let mut b: Vec<String> = split.issues.iter().map(|i| i.id.to_string()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
