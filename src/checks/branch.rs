//! Branch profile checks (BR-*)
//!
//! Statutory identifiers, address, contact and configuration state of the
//! branch itself. Every issue points at the branch entity.

use crate::checks::base::{CheckContext, Rule};
use crate::models::{Category, EntityType, Issue, IssueId, Severity};
use crate::snapshot::is_blank;

pub const RULES: &[Rule] = &[
    Rule::new("BR-001", Category::Branch, "Legal entity name is set", legal_entity_name),
    Rule::new("BR-002", Category::Branch, "GSTIN is configured", gstin),
    Rule::new("BR-003", Category::Branch, "PAN is configured", pan),
    Rule::new("BR-004", Category::Branch, "Address, PIN code and state are complete", address),
    Rule::new("BR-005", Category::Branch, "A contact phone or email exists", contact),
    Rule::new(
        "BR-006",
        Category::Branch,
        "Clinical establishment registration number is set",
        clinical_registration,
    ),
    Rule::new("BR-007", Category::Branch, "Working hours are configured", working_hours),
    Rule::new(
        "BR-008",
        Category::Branch,
        "Infrastructure configuration has been initialized",
        infra_config,
    ),
];

fn branch_issue(
    ctx: &CheckContext<'_>,
    id: &'static str,
    severity: Severity,
    title: &str,
) -> Issue {
    Issue::new(IssueId::new(id), Category::Branch, severity, title)
        .entity(EntityType::Branch, ctx.branch_id())
}

fn legal_entity_name(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !is_blank(&ctx.snapshot.branch.legal_entity_name) {
        return Vec::new();
    }
    vec![branch_issue(ctx, "BR-001", Severity::Warning, "Legal entity name not set")
        .details("Required on invoices, tax filings, and official documents.")
        .fix_hint("Set the legal entity name in Branch Profile.")]
}

fn gstin(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !is_blank(&ctx.snapshot.branch.gst_number) {
        return Vec::new();
    }
    vec![branch_issue(ctx, "BR-002", Severity::Warning, "GSTIN not configured")
        .details("GSTIN is needed for tax invoicing and GST return filing.")
        .fix_hint("Enter the 15-character GSTIN in Branch Profile.")]
}

fn pan(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !is_blank(&ctx.snapshot.branch.pan_number) {
        return Vec::new();
    }
    vec![branch_issue(ctx, "BR-003", Severity::Warning, "PAN not configured")
        .details("PAN is required for TDS compliance and statutory reporting.")
        .fix_hint("Enter the PAN in Branch Profile.")]
}

fn address(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let branch = &ctx.snapshot.branch;
    let missing: Vec<&str> = [
        (&branch.address, "address"),
        (&branch.pin_code, "PIN code"),
        (&branch.state, "state"),
    ]
    .into_iter()
    .filter(|(value, _)| is_blank(value))
    .map(|(_, label)| label)
    .collect();

    if missing.is_empty() {
        return Vec::new();
    }
    vec![branch_issue(ctx, "BR-004", Severity::Warning, "Branch address incomplete")
        .details(format!(
            "Missing: {}. Full address is required for invoicing and NABH.",
            missing.join(", ")
        ))
        .fix_hint("Complete all address fields in Branch Profile.")]
}

fn contact(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let branch = &ctx.snapshot.branch;
    if !is_blank(&branch.contact_phone) || !is_blank(&branch.contact_email) {
        return Vec::new();
    }
    vec![branch_issue(ctx, "BR-005", Severity::Warning, "No contact information set")
        .details("At least one phone number or email is needed for correspondence.")
        .fix_hint("Add contact phone or email in Branch Profile.")]
}

fn clinical_registration(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if !is_blank(&ctx.snapshot.branch.clinical_est_reg_number) {
        return Vec::new();
    }
    vec![branch_issue(
        ctx,
        "BR-006",
        Severity::Info,
        "Clinical Establishment Registration number not set",
    )
    .details("Required under the Clinical Establishments Act in applicable states.")
    .fix_hint("Enter the registration number in Branch Profile.")]
}

fn working_hours(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if ctx.snapshot.branch.has_working_hours() {
        return Vec::new();
    }
    vec![branch_issue(ctx, "BR-007", Severity::Info, "Working hours not configured")
        .details("Working hours help with scheduling, OPD slot generation, and reporting.")
        .fix_hint("Set working hours in Branch Settings.")]
}

fn infra_config(ctx: &CheckContext<'_>) -> Vec<Issue> {
    // None: not collected, nothing to judge.
    if ctx.snapshot.branch.infra_config_initialized != Some(false) {
        return Vec::new();
    }
    vec![branch_issue(
        ctx,
        "BR-008",
        Severity::Warning,
        "Infrastructure configuration not initialized",
    )
    .details("Branch-level infrastructure defaults have never been set up.")
    .fix_hint("Open Infrastructure settings for this branch and save the defaults.")]
}
