//! Enabled unit type checks (UT-*)

use crate::checks::base::{CheckContext, Rule};
use crate::models::{Category, EntityType, Issue, IssueId, Severity};

pub const RULES: &[Rule] = &[
    Rule::new("UT-001", Category::UnitType, "At least one unit type is enabled", any_enabled),
    Rule::new("UT-002", Category::UnitType, "Every enabled unit type has units", unused_types),
];

fn any_enabled(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.snapshot.unit_types.is_empty() {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("UT-001"),
        Category::UnitType,
        Severity::Blocker,
        "No unit types enabled for this branch",
    )
    .details("You must enable at least one unit type (e.g., OPD, WARD, ICU) to create units.")
    .fix_hint("Enable unit types in Branch -> Unit Types.")]
}

fn unused_types(ctx: &CheckContext<'_>) -> Vec<Issue> {
    ctx.snapshot
        .unit_types
        .iter()
        .filter(|t| t.unit_count == 0)
        .map(|t| {
            let name = t.display_name();
            Issue::new(
                IssueId::scoped("UT-002", t.code.as_str()),
                Category::UnitType,
                Severity::Warning,
                format!("Unit type \"{}\" is enabled but has no units", name),
            )
            .details(format!(
                "{} is enabled for this branch but zero units have been created.",
                t.code
            ))
            .fix_hint(format!(
                "Create at least one {} unit, or disable this unit type if not needed.",
                name
            ))
            .entity_type(EntityType::BranchUnitType)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{ids, run_rules};
    use crate::snapshot::{BranchSnapshot, EnabledUnitType};

    #[test]
    fn test_nothing_enabled_is_blocker() {
        let issues = run_rules(RULES, &BranchSnapshot::default());
        assert_eq!(ids(&issues), vec!["UT-001"]);
        assert_eq!(issues[0].severity, Severity::Blocker);
    }

    #[test]
    fn test_one_issue_per_empty_type() {
        let snapshot = BranchSnapshot {
            unit_types: vec![
                EnabledUnitType {
                    code: "WARD".into(),
                    name: Some("General Ward".into()),
                    unit_count: 3,
                },
                EnabledUnitType {
                    code: "ICU".into(),
                    name: None,
                    unit_count: 0,
                },
                EnabledUnitType {
                    code: "NICU".into(),
                    name: Some("Neonatal ICU".into()),
                    unit_count: 0,
                },
            ],
            ..Default::default()
        };
        let issues = run_rules(RULES, &snapshot);
        assert_eq!(ids(&issues), vec!["UT-002-ICU", "UT-002-NICU"]);
        assert_eq!(issues[0].title, "Unit type \"ICU\" is enabled but has no units");
        assert_eq!(issues[1].entity_type, Some(EntityType::BranchUnitType));
        assert!(issues[1].entity_id.is_none());
    }
}
