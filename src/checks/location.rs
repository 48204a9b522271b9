//! Location hierarchy checks (LOC-*)
//!
//! LOC-001 always runs. The remaining checks only evaluate when the
//! forest has at least one node; on an empty forest they still count as
//! run and report nothing.

use crate::checks::base::{CheckContext, Rule};
use crate::duplicates::{duplicate_total, CodeCase};
use crate::hierarchy::count_rank_violations;
use crate::models::{Category, Issue, IssueId, Severity};
use crate::snapshot::LocationKind;

pub const RULES: &[Rule] = &[
    Rule::new("LOC-001", Category::Location, "At least one location node exists", any_nodes),
    Rule::new("LOC-002", Category::Location, "A CAMPUS root node exists", campus_root),
    Rule::new("LOC-003", Category::Location, "No orphaned location nodes", orphaned_nodes),
    Rule::new(
        "LOC-004",
        Category::Location,
        "Child kinds are deeper than their parent's kind",
        kind_hierarchy,
    ),
    Rule::new(
        "LOC-005",
        Category::Location,
        "Every node has an active revision",
        active_revisions,
    ),
    Rule::new(
        "LOC-006",
        Category::Location,
        "Buildings and floors carry a fire zone",
        fire_zones,
    ),
    Rule::new(
        "LOC-007",
        Category::Location,
        "At least one emergency exit is marked",
        emergency_exits,
    ),
    Rule::new(
        "LOC-008",
        Category::Location,
        "Wheelchair-accessible nodes are marked",
        wheelchair_access,
    ),
    Rule::new(
        "LOC-009",
        Category::Location,
        "Campus and building nodes have GPS coordinates",
        gps_coordinates,
    ),
    Rule::new(
        "LOC-010",
        Category::Location,
        "Sibling location codes are unique",
        duplicate_sibling_codes,
    ),
];

fn location_issue(id: &'static str, severity: Severity, title: impl Into<String>) -> Issue {
    Issue::new(IssueId::new(id), Category::Location, severity, title)
}

fn any_nodes(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if ctx.has_locations() {
        return Vec::new();
    }
    vec![location_issue("LOC-001", Severity::Warning, "No location nodes defined")
        .details("The location hierarchy (Campus -> Building -> Floor -> Zone -> Area) is empty.")
        .fix_hint("Create a Campus node, then add Buildings and Floors beneath it.")]
}

fn campus_root(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.has_locations() {
        return Vec::new();
    }
    let roots = &ctx.snapshot.location.tree;
    if roots.iter().any(|n| n.kind == LocationKind::Campus) {
        return Vec::new();
    }
    vec![location_issue("LOC-002", Severity::Warning, "No CAMPUS root node found")
        .details(format!(
            "Found {} root node(s) but none are of kind CAMPUS.",
            roots.len()
        ))
        .fix_hint("Create a top-level CAMPUS location node as the root of the hierarchy.")]
}

fn orphaned_nodes(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.has_locations() {
        return Vec::new();
    }
    let orphans = match ctx.snapshot.location.orphaned_nodes {
        Some(n) if n > 0 => n as usize,
        _ => return Vec::new(),
    };
    vec![location_issue(
        "LOC-003",
        Severity::Warning,
        format!("{} orphaned location node(s)", orphans),
    )
    .details("These nodes reference a parent that does not exist in the hierarchy.")
    .fix_hint("Re-parent each orphaned node under a valid location.")
    .count(orphans)]
}

fn kind_hierarchy(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.has_locations() {
        return Vec::new();
    }
    let violations = count_rank_violations(&ctx.parented);
    if violations == 0 {
        return Vec::new();
    }
    vec![location_issue(
        "LOC-004",
        Severity::Warning,
        format!("{} location hierarchy violation(s)", violations),
    )
    .details(
        "Child nodes should be a deeper kind than their parent \
         (e.g., FLOOR under BUILDING, not BUILDING under FLOOR).",
    )
    .fix_hint("Review and correct the parent-child kind assignments.")
    .count(violations)]
}

fn active_revisions(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.has_locations() {
        return Vec::new();
    }
    let missing = ctx.nodes.iter().filter(|n| !n.has_active_revision).count();
    if missing == 0 {
        return Vec::new();
    }
    vec![location_issue(
        "LOC-005",
        Severity::Warning,
        format!("{} location node(s) without an active revision", missing),
    )
    .details("Each location node needs at least one active revision for its code, name, and attributes.")
    .fix_hint("Edit each affected node to create or activate a revision.")
    .count(missing)]
}

fn fire_zones(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.has_locations() {
        return Vec::new();
    }
    let missing = ctx
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, LocationKind::Building | LocationKind::Floor))
        .filter(|n| n.fire_zone.is_none())
        .count();
    if missing == 0 {
        return Vec::new();
    }
    vec![location_issue(
        "LOC-006",
        Severity::Warning,
        format!("{} building/floor node(s) without fire zone designation", missing),
    )
    .details("Fire zone mapping is required for NABH fire safety and emergency evacuation compliance.")
    .fix_hint("Edit each Building/Floor node and set its fire zone.")
    .count(missing)]
}

fn emergency_exits(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.has_locations() || ctx.nodes.iter().any(|n| n.emergency_exit) {
        return Vec::new();
    }
    vec![location_issue(
        "LOC-007",
        Severity::Warning,
        "No emergency exits marked in the location tree",
    )
    .details("At least one node should be flagged as an emergency exit for evacuation planning.")
    .fix_hint("Mark appropriate location nodes as emergency exits in Location settings.")]
}

fn wheelchair_access(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if ctx.nodes.len() < ctx.thresholds.min_nodes_for_accessibility.max(1)
        || ctx.nodes.iter().any(|n| n.wheelchair_accessible)
    {
        return Vec::new();
    }
    vec![location_issue("LOC-008", Severity::Info, "No wheelchair-accessible nodes marked")
        .details(
            "Marking wheelchair-accessible paths helps with patient navigation \
             and NABH accessibility compliance.",
        )
        .fix_hint("Flag wheelchair-accessible nodes in Location settings.")]
}

fn gps_coordinates(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.has_locations() {
        return Vec::new();
    }
    let missing = match ctx.snapshot.location.nodes_missing_gps {
        Some(n) if n > 0 => n as usize,
        _ => return Vec::new(),
    };
    vec![location_issue(
        "LOC-009",
        Severity::Info,
        format!("{} campus/building node(s) without GPS coordinates", missing),
    )
    .details("GPS coordinates enable maps, ambulance routing, and patient directions.")
    .fix_hint("Set latitude and longitude on each Campus and Building node.")
    .count(missing)]
}

fn duplicate_sibling_codes(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !ctx.has_locations() {
        return Vec::new();
    }
    let duplicates = duplicate_total(
        ctx.parented
            .iter()
            .map(|(node, parent)| (*parent, node.code.as_deref())),
        CodeCase::Preserve,
    );
    if duplicates == 0 {
        return Vec::new();
    }
    vec![location_issue(
        "LOC-010",
        Severity::Warning,
        format!("{} duplicate location code(s) among sibling nodes", duplicates),
    )
    .details("Sibling location nodes should have unique codes for unambiguous reference.")
    .fix_hint("Rename location codes to be unique within each parent level.")
    .count(duplicates)]
}
