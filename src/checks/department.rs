//! Department checks (DEPT-*)

use crate::checks::base::{CheckContext, Rule};
use crate::duplicates::{duplicate_total, CodeCase};
use crate::models::{Category, EntityType, Issue, IssueId, Severity};
use rustc_hash::FxHashSet;

pub const RULES: &[Rule] = &[
    Rule::new("DEPT-001", Category::Department, "At least one department exists", any_departments),
    Rule::new("DEPT-002", Category::Department, "Every department has a head", heads),
    Rule::new(
        "DEPT-003",
        Category::Department,
        "Every department has at least one active unit",
        departments_without_units,
    ),
    Rule::new(
        "DEPT-004",
        Category::Department,
        "Every department is mapped to a location",
        location_mapping,
    ),
    Rule::new("DEPT-005", Category::Department, "Department codes are unique", duplicate_codes),
];

fn any_departments(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.snapshot.departments.is_empty() {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("DEPT-001"),
        Category::Department,
        Severity::Warning,
        "No departments created",
    )
    .details("Departments organize units, staff, and services. At least one is needed.")
    .fix_hint("Create departments in the Department setup.")]
}

fn heads(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let missing = ctx.snapshot.departments.iter().filter(|d| !d.has_head).count();
    if missing == 0 {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("DEPT-002"),
        Category::Department,
        Severity::Info,
        format!("{} department(s) without a designated head", missing),
    )
    .details("NABH requires each department to have an identifiable head for accountability.")
    .fix_hint("Assign a department head in Department settings.")
    .count(missing)]
}

fn departments_without_units(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let staffed: FxHashSet<&str> = ctx
        .snapshot
        .active_units()
        .filter_map(|u| u.department_id.as_deref())
        .collect();

    ctx.snapshot
        .departments
        .iter()
        .filter(|d| !staffed.contains(d.id.as_str()))
        .map(|d| {
            Issue::new(
                IssueId::scoped("DEPT-003", d.id.as_str()),
                Category::Department,
                Severity::Info,
                format!("Department \"{}\" has no active units", d.name),
            )
            .details(format!(
                "Department {} exists but no units are assigned to it.",
                d.code.as_deref().unwrap_or(&d.name)
            ))
            .fix_hint(format!(
                "Create units under department \"{}\" or reassign existing units.",
                d.name
            ))
            .entity(EntityType::Department, d.id.as_str())
        })
        .collect()
}

fn location_mapping(ctx: &CheckContext<'_>) -> Vec<Issue> {
    // Departments whose mapping was not collected are not judged.
    let unmapped = ctx
        .snapshot
        .departments
        .iter()
        .filter(|d| matches!(&d.location_node_ids, Some(ids) if ids.is_empty()))
        .count();
    if unmapped == 0 {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("DEPT-004"),
        Category::Department,
        Severity::Info,
        format!("{} department(s) not mapped to a location", unmapped),
    )
    .details("Department location mapping drives wayfinding and departmental reporting.")
    .fix_hint("Map each department to its location nodes in Department settings.")
    .count(unmapped)]
}

fn duplicate_codes(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let duplicates = duplicate_total(
        ctx.snapshot
            .departments
            .iter()
            .map(|d| ((), d.code.as_deref())),
        CodeCase::Upper,
    );
    if duplicates == 0 {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("DEPT-005"),
        Category::Department,
        Severity::Warning,
        format!("{} departments share duplicate codes", duplicates),
    )
    .details("Department codes should be unique for unambiguous identification.")
    .fix_hint("Rename duplicate department codes.")
    .count(duplicates)]
}
