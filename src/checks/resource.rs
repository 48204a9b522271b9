//! Resource checks (RES-*)
//!
//! Works from the per-unit resource histograms. RES-005 and RES-006 need
//! per-resource detail that older collectors do not provide; they pass
//! when no unit carries it.

use crate::checks::base::{CheckContext, Rule};
use crate::duplicates::{duplicate_total, CodeCase};
use crate::models::{Category, Issue, IssueId, Severity};

/// States counted as unavailable by RES-004
const UNAVAILABLE_STATES: &[&str] = &["MAINTENANCE", "BLOCKED", "INACTIVE"];

pub const RULES: &[Rule] = &[
    Rule::new("RES-001", Category::Resource, "No active resources in inactive units", inactive_units),
    Rule::new("RES-002", Category::Resource, "Blocked resources are documented", blocked),
    Rule::new("RES-003", Category::Resource, "Reserved resources are documented", reserved),
    Rule::new(
        "RES-004",
        Category::Resource,
        "Unavailable resource share stays below the limit",
        unavailable_ratio,
    ),
    Rule::new("RES-005", Category::Resource, "Resource codes are unique within a unit", duplicate_codes),
    Rule::new("RES-006", Category::Resource, "Beds are assigned to rooms", unassigned_beds),
    Rule::new("RES-007", Category::Resource, "Resources exist for active units", any_resources),
];

fn resource_issue(id: &'static str, severity: Severity, title: String) -> Issue {
    Issue::new(IssueId::new(id), Category::Resource, severity, title)
}

fn active_total(ctx: &CheckContext<'_>) -> u64 {
    ctx.snapshot.active_units().map(|u| u.resources.total()).sum()
}

fn active_in_state(ctx: &CheckContext<'_>, state: &str) -> u64 {
    ctx.snapshot
        .active_units()
        .map(|u| u.resources.in_state(state))
        .sum()
}

fn inactive_units(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count: u64 = ctx.snapshot.inactive_units().map(|u| u.resources.total()).sum();
    if count == 0 {
        return Vec::new();
    }
    vec![resource_issue(
        "RES-001",
        Severity::Warning,
        format!("{} active resource(s) in inactive units", count),
    )
    .details("These resources can't be used since their parent unit is deactivated.")
    .fix_hint("Deactivate these resources or reactivate their parent units.")
    .count(count as usize)]
}

fn blocked(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count = active_in_state(ctx, "BLOCKED");
    if count == 0 {
        return Vec::new();
    }
    vec![resource_issue(
        "RES-002",
        Severity::Info,
        format!("{} BLOCKED resource(s) -- verify blockedReason is documented", count),
    )
    .details("Blocked resources should have a reason documented for auditing.")
    .fix_hint("Add blockedReason to each blocked resource.")
    .count(count as usize)]
}

fn reserved(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count = active_in_state(ctx, "RESERVED");
    if count == 0 {
        return Vec::new();
    }
    vec![resource_issue(
        "RES-003",
        Severity::Info,
        format!("{} RESERVED resource(s) -- verify reservedReason is documented", count),
    )
    .details("Reserved resources should document who/why they're reserved.")
    .fix_hint("Add reservedReason to each reserved resource.")
    .count(count as usize)]
}

fn unavailable_ratio(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let total = active_total(ctx);
    if total == 0 || total < ctx.thresholds.min_resources_for_ratio {
        return Vec::new();
    }
    let unavailable: u64 = UNAVAILABLE_STATES
        .iter()
        .map(|state| active_in_state(ctx, state))
        .sum();
    let pct = (unavailable as f64 / total as f64 * 100.0).round_ties_even() as u64;
    if pct <= u64::from(ctx.thresholds.unavailable_resource_pct) {
        return Vec::new();
    }
    vec![resource_issue(
        "RES-004",
        Severity::Warning,
        format!(
            "{}% of resources are MAINTENANCE/BLOCKED/INACTIVE ({}/{})",
            pct, unavailable, total
        ),
    )
    .details("A high percentage of unavailable resources reduces operational capacity.")
    .fix_hint("Review blocked/maintenance resources and return them to AVAILABLE where possible.")]
}

fn duplicate_codes(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let duplicates = duplicate_total(
        ctx.snapshot.active_units().flat_map(|u| {
            u.resources
                .codes
                .iter()
                .flatten()
                .map(move |code| (u.id.as_str(), Some(code.as_str())))
        }),
        CodeCase::Upper,
    );
    if duplicates == 0 {
        return Vec::new();
    }
    vec![resource_issue(
        "RES-005",
        Severity::Warning,
        format!("{} resource(s) share a code within their unit", duplicates),
    )
    .details("Resource codes must be unique within a unit for bed boards and allocation.")
    .fix_hint("Rename duplicate resource codes within each unit.")
    .count(duplicates)]
}

fn unassigned_beds(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let count: u64 = ctx
        .snapshot
        .active_units()
        .filter_map(|u| u.resources.unassigned_beds)
        .map(u64::from)
        .sum();
    if count == 0 {
        return Vec::new();
    }
    vec![resource_issue(
        "RES-006",
        Severity::Info,
        format!("{} bed(s) not assigned to a room", count),
    )
    .details("Beds without a room cannot be priced by room tier or shown on the bed board.")
    .fix_hint("Assign each bed resource to its room.")
    .count(count as usize)]
}

fn any_resources(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if active_total(ctx) > 0 || ctx.snapshot.active_units().next().is_none() {
        return Vec::new();
    }
    vec![resource_issue(
        "RES-007",
        Severity::Warning,
        "No resources (beds, chairs, bays, etc.) created across all units".to_string(),
    )
    .details("Units need resources for patient allocation and scheduling.")
    .fix_hint("Add resources to units -- at minimum, add beds to IPD units.")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{ids, run_rules};
    use crate::snapshot::{BranchSnapshot, ResourceSummary, Unit};

    fn unit(id: &str, by_type: &[(&str, u32)], by_state: &[(&str, u32)]) -> Unit {
        Unit {
            id: id.into(),
            name: id.into(),
            type_code: "WARD".into(),
            resources: ResourceSummary {
                by_type: by_type.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                by_state: by_state.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn snapshot(units: Vec<Unit>) -> BranchSnapshot {
        BranchSnapshot {
            units,
            ..Default::default()
        }
    }

    #[test]
    fn test_healthy_resources_pass() {
        let units = vec![unit("w1", &[("BED", 10)], &[("AVAILABLE", 10)])];
        assert!(run_rules(RULES, &snapshot(units)).is_empty());
    }

    #[test]
    fn test_no_resources_with_active_units() {
        let issues = run_rules(RULES, &snapshot(vec![unit("w1", &[], &[])]));
        assert_eq!(ids(&issues), vec!["RES-007"]);
        assert!(run_rules(RULES, &BranchSnapshot::default()).is_empty());
    }

    #[test]
    fn test_state_hygiene_and_ratio() {
        let units = vec![unit(
            "w1",
            &[("BED", 10)],
            &[("AVAILABLE", 5), ("BLOCKED", 2), ("RESERVED", 1), ("MAINTENANCE", 2)],
        )];
        let issues = run_rules(RULES, &snapshot(units));
        assert_eq!(ids(&issues), vec!["RES-002", "RES-003", "RES-004"]);
        assert_eq!(issues[2].title, "40% of resources are MAINTENANCE/BLOCKED/INACTIVE (4/10)");
    }

    #[test]
    fn test_ratio_needs_minimum_population() {
        let units = vec![unit("w1", &[("BED", 4)], &[("MAINTENANCE", 4)])];
        assert!(run_rules(RULES, &snapshot(units)).is_empty());
    }

    #[test]
    fn test_inactive_unit_resources() {
        let mut closed = unit("old", &[("CHAIR", 3)], &[]);
        closed.is_active = false;
        let units = vec![unit("w1", &[("BED", 5)], &[]), closed];
        let issues = run_rules(RULES, &snapshot(units));
        assert_eq!(ids(&issues), vec!["RES-001"]);
        assert_eq!(issues[0].count, Some(3));
    }

    #[test]
    fn test_collected_detail() {
        let mut a = unit("a", &[("BED", 3)], &[]);
        a.resources.codes = Some(vec!["B-1".into(), "b-1".into(), "B-2".into()]);
        a.resources.unassigned_beds = Some(2);
        let mut b = unit("b", &[("BED", 2)], &[]);
        b.resources.codes = Some(vec!["B-1".into(), "B-2".into()]);

        let issues = run_rules(RULES, &snapshot(vec![a, b]));
        assert_eq!(ids(&issues), vec!["RES-005", "RES-006"]);
        assert_eq!(issues[0].count, Some(2));
        assert_eq!(issues[1].count, Some(2));
    }
}
