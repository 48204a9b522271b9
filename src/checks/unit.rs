//! Unit checks (UNIT-*)
//!
//! Bed and room coverage, location and department links, code uniqueness
//! and the branch bed-count sync. Only active units are considered.

use crate::checks::base::{CheckContext, Rule};
use crate::duplicates::{duplicate_total, CodeCase};
use crate::models::{Category, EntityType, Issue, IssueId, Severity};

pub const RULES: &[Rule] = &[
    Rule::new("UNIT-001", Category::Unit, "Bed-based units have beds", beds_present),
    Rule::new("UNIT-002", Category::Unit, "Room-using units have rooms", rooms_present),
    Rule::new("UNIT-003", Category::Unit, "Units are linked to a location node", location_links),
    Rule::new("UNIT-004", Category::Unit, "Unit codes are unique", duplicate_codes),
    Rule::new("UNIT-005", Category::Unit, "Branch bed count matches bed resources", bed_count_sync),
    Rule::new("UNIT-007", Category::Unit, "Units are linked to a department", department_links),
];

fn beds_present(ctx: &CheckContext<'_>) -> Vec<Issue> {
    ctx.snapshot
        .active_units()
        .filter(|u| u.is_bed_based() && u.resources.beds() == 0)
        .map(|u| {
            Issue::new(
                IssueId::scoped("UNIT-001", u.id.as_str()),
                Category::Unit,
                Severity::Blocker,
                format!("{} unit \"{}\" has no beds", u.type_code, u.name),
            )
            .details("Bed-based unit requires at least one active BED resource for admissions.")
            .fix_hint(format!(
                "Navigate to Units -> \"{}\" -> Resources and add BED resources.",
                u.name
            ))
            .entity(EntityType::Unit, u.id.as_str())
        })
        .collect()
}

fn rooms_present(ctx: &CheckContext<'_>) -> Vec<Issue> {
    ctx.snapshot
        .active_units()
        .filter(|u| u.uses_rooms && u.rooms.is_empty())
        .map(|u| {
            Issue::new(
                IssueId::scoped("UNIT-002", u.id.as_str()),
                Category::Unit,
                Severity::Warning,
                format!("Unit \"{}\" ({}) uses rooms but has none", u.name, u.type_code),
            )
            .details("This unit is configured to use rooms, but zero rooms have been created.")
            .fix_hint(format!(
                "Add rooms to unit \"{}\" or set usesRooms = false if not needed.",
                u.name
            ))
            .entity(EntityType::Unit, u.id.as_str())
        })
        .collect()
}

fn location_links(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let unlinked = ctx
        .snapshot
        .active_units()
        .filter(|u| u.location_node_id.as_deref().map_or(true, str::is_empty))
        .count();
    if unlinked == 0 {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("UNIT-003"),
        Category::Unit,
        Severity::Info,
        format!("{} unit(s) not linked to a location node", unlinked),
    )
    .details("Units should be mapped to location nodes for wayfinding and spatial tracking.")
    .fix_hint("Edit each unit and assign the appropriate location node.")
    .count(unlinked)]
}

fn duplicate_codes(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let duplicates = duplicate_total(
        ctx.snapshot.active_units().map(|u| ((), u.code.as_deref())),
        CodeCase::Upper,
    );
    if duplicates == 0 {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("UNIT-004"),
        Category::Unit,
        Severity::Warning,
        format!("{} units share duplicate codes", duplicates),
    )
    .details("Unit codes must be unique within a branch.")
    .fix_hint("Rename duplicate unit codes.")
    .count(duplicates)]
}

/// Emits UNIT-005 on a mismatch, or UNIT-006 when the count is unset
fn bed_count_sync(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let actual: u64 = ctx.snapshot.active_units().map(|u| u.resources.beds()).sum();
    let branch_id = ctx.branch_id();

    match ctx.snapshot.branch.bed_count {
        Some(declared) => {
            let diff = declared.abs_diff(actual as i64);
            if diff == 0 {
                return Vec::new();
            }
            let severity = if actual == 0 {
                Severity::Blocker
            } else {
                Severity::Warning
            };
            vec![Issue::new(
                IssueId::new("UNIT-005"),
                Category::Unit,
                severity,
                format!(
                    "Branch bed count ({}) does not match actual bed resources ({})",
                    declared, actual
                ),
            )
            .details(format!(
                "Branch profile says {} beds but {} active BED resources exist.",
                declared, actual
            ))
            .fix_hint("Sync: either update Branch.bedCount or add/remove bed resources to match.")
            .entity(EntityType::Branch, branch_id)
            .count(diff as usize)]
        }
        None if actual > 0 => vec![Issue::new(
            IssueId::new("UNIT-006"),
            Category::Unit,
            Severity::Info,
            format!("Branch bedCount is not set but {} bed resource(s) exist", actual),
        )
        .details("Setting the branch bed count helps with reporting and NABH readiness checks.")
        .fix_hint("Set the bed count in Branch Profile.")
        .entity(EntityType::Branch, branch_id)],
        None => Vec::new(),
    }
}

fn department_links(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let unlinked = ctx
        .snapshot
        .active_units()
        .filter(|u| u.department_id.as_deref().map_or(true, str::is_empty))
        .count();
    if unlinked == 0 {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("UNIT-007"),
        Category::Unit,
        Severity::Info,
        format!("{} unit(s) not linked to a department", unlinked),
    )
    .details("Units without a department are missing from departmental staffing and reports.")
    .fix_hint("Edit each unit and assign its owning department.")
    .count(unlinked)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{ids, run_rules};
    use crate::snapshot::{BranchProfile, BranchSnapshot, Room, Unit};

    fn unit(id: &str, type_code: &str, beds: u32) -> Unit {
        let mut u = Unit {
            id: id.into(),
            code: Some(id.to_uppercase()),
            name: format!("{} unit", id),
            type_code: type_code.into(),
            department_id: Some("d1".into()),
            location_node_id: Some("n1".into()),
            rooms: vec![Room {
                id: format!("{}-r1", id),
                ..Default::default()
            }],
            ..Default::default()
        };
        if beds > 0 {
            u.resources.by_type.insert("BED".into(), beds);
        }
        u
    }

    fn snapshot(units: Vec<Unit>, bed_count: Option<i64>) -> BranchSnapshot {
        BranchSnapshot {
            branch: BranchProfile {
                id: "br-1".into(),
                bed_count,
                ..Default::default()
            },
            units,
            ..Default::default()
        }
    }

    #[test]
    fn test_bed_based_unit_without_beds() {
        let issues = run_rules(RULES, &snapshot(vec![unit("icu1", "ICU", 0)], None));
        assert_eq!(ids(&issues), vec!["UNIT-001-icu1"]);
        assert_eq!(issues[0].severity, Severity::Blocker);
        assert_eq!(issues[0].title, "ICU unit \"icu1 unit\" has no beds");
    }

    #[test]
    fn test_outpatient_unit_needs_no_beds() {
        assert!(run_rules(RULES, &snapshot(vec![unit("opd1", "OPD", 0)], None)).is_empty());
    }

    #[test]
    fn test_bed_count_mismatch_without_beds_is_blocker() {
        let issues = run_rules(RULES, &snapshot(vec![unit("opd1", "OPD", 0)], Some(50)));
        assert_eq!(ids(&issues), vec!["UNIT-005"]);
        assert_eq!(issues[0].severity, Severity::Blocker);
        assert_eq!(issues[0].count, Some(50));
        assert_eq!(issues[0].entity_id.as_deref(), Some("br-1"));
    }

    #[test]
    fn test_bed_count_mismatch_with_beds_is_warning() {
        let issues = run_rules(RULES, &snapshot(vec![unit("w1", "WARD", 20)], Some(24)));
        assert_eq!(ids(&issues), vec!["UNIT-005"]);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].count, Some(4));
    }

    #[test]
    fn test_bed_count_unset() {
        let issues = run_rules(RULES, &snapshot(vec![unit("w1", "WARD", 20)], None));
        assert_eq!(ids(&issues), vec!["UNIT-006"]);
        assert!(run_rules(RULES, &snapshot(vec![unit("w1", "WARD", 20)], Some(20))).is_empty());
    }

    #[test]
    fn test_rooms_links_and_codes() {
        let mut roomless = unit("a", "OPD", 0);
        roomless.rooms.clear();
        let mut opt_out = unit("b", "OPD", 0);
        opt_out.rooms.clear();
        opt_out.uses_rooms = false;
        let mut unlinked = unit("c", "OPD", 0);
        unlinked.location_node_id = None;
        unlinked.department_id = None;
        unlinked.code = Some("A".into());
        let mut inactive = unit("d", "OPD", 0);
        inactive.is_active = false;
        inactive.code = Some("a".into());

        let issues = run_rules(RULES, &snapshot(vec![roomless, opt_out, unlinked, inactive], None));
        assert_eq!(ids(&issues), vec!["UNIT-002-a", "UNIT-003", "UNIT-004", "UNIT-007"]);
        assert_eq!(issues[2].count, Some(2));
    }
}
