//! Service catalog and billing checks
//!
//! Each billing module is mandatory for go-live, so these checks fire
//! independently of one another.

use crate::checks::base::{CheckContext, Rule};
use crate::models::{Category, Issue, IssueId, Severity};
use crate::snapshot::ServiceCatalogSnapshot;

pub const RULES: &[Rule] = &[
    Rule::new("SVC-001", Category::ServiceCatalog, "Service items exist", service_items),
    Rule::new("SVC-002", Category::ServiceCatalog, "Services have a base price", unpriced_services),
    Rule::new("CHG-001", Category::ChargeMaster, "Charge master items exist", charge_master),
    Rule::new(
        "MAP-001",
        Category::ServiceMapping,
        "Services are mapped to charges",
        service_mapping,
    ),
    Rule::new("TAX-001", Category::TaxCode, "GST tax codes exist", tax_codes),
    Rule::new("TAR-001", Category::TariffPlan, "Tariff plans exist", tariff_plans),
    Rule::new("PAY-001", Category::Payer, "Payers exist", payers),
    Rule::new("PAY-002", Category::Payer, "A CASH payer exists", cash_payer),
    Rule::new("CON-001", Category::Contract, "Payer contracts exist", contracts),
    Rule::new("CON-002", Category::Contract, "No expired contracts", expired_contracts),
    Rule::new("GOV-001", Category::GovScheme, "Government schemes exist", gov_schemes),
    Rule::new("TIER-001", Category::PricingTier, "Patient pricing tiers exist", pricing_tiers),
    Rule::new("PRICE-001", Category::PriceHistory, "Price history is recorded", price_history),
    Rule::new(
        "CAT-001",
        Category::ServiceCatalogue,
        "A service catalogue can be built",
        catalogue_readiness,
    ),
];

fn sc<'a>(ctx: &CheckContext<'a>) -> &'a ServiceCatalogSnapshot {
    &ctx.snapshot.service_catalog
}

/// A single issue when `missing` holds
fn when(
    missing: bool,
    id: &'static str,
    category: Category,
    severity: Severity,
    title: &str,
    details: &str,
    fix_hint: &str,
) -> Vec<Issue> {
    if !missing {
        return Vec::new();
    }
    vec![Issue::new(IssueId::new(id), category, severity, title)
        .details(details)
        .fix_hint(fix_hint)]
}

fn service_items(ctx: &CheckContext<'_>) -> Vec<Issue> {
    when(
        sc(ctx).total_service_items == 0,
        "SVC-001",
        Category::ServiceCatalog,
        Severity::Warning,
        "No service items configured",
        "Service items are required for ordering and billing.",
        "Go to Service Items and create services.",
    )
}

fn unpriced_services(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let unpriced = sc(ctx).without_base_price;
    if unpriced <= ctx.thresholds.max_unpriced_services {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("SVC-002"),
        Category::ServiceCatalog,
        Severity::Warning,
        format!("{} service(s) have no base price", unpriced),
    )
    .details("Services without prices cannot be billed correctly.")
    .fix_hint("Set base prices for all active services.")
    .count(unpriced as usize)]
}

fn charge_master(ctx: &CheckContext<'_>) -> Vec<Issue> {
    when(
        sc(ctx).total_charge_master == 0,
        "CHG-001",
        Category::ChargeMaster,
        Severity::Warning,
        "No charge master items configured",
        "The charge master defines billable line items for revenue capture.",
        "Go to Charge Master and create items (lab tests, procedures, supplies, etc.).",
    )
}

/// Emits MAP-001 when mapping is impossible, else MAP-002 on a large gap
fn service_mapping(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let sc = sc(ctx);
    if sc.total_service_items == 0 || sc.total_charge_master == 0 {
        return when(
            true,
            "MAP-001",
            Category::ServiceMapping,
            Severity::Warning,
            "Service-to-Charge mapping not possible yet",
            "Both service items and charge master items are needed for mapping.",
            "Set up Service Items and Charge Master first, then create mappings.",
        );
    }

    let unmapped = sc.active_charge_master.abs_diff(sc.active_service_items);
    if unmapped <= ctx.thresholds.max_mapping_gap {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("MAP-002"),
        Category::ServiceMapping,
        Severity::Warning,
        format!("~{} items may lack service-to-charge mapping", unmapped),
    )
    .details("Unmapped items cannot be ordered or billed correctly.")
    .fix_hint("Go to Service <-> Charge Mapping and link services to charges.")
    .count(unmapped as usize)]
}

fn tax_codes(ctx: &CheckContext<'_>) -> Vec<Issue> {
    when(
        sc(ctx).total_tax_codes == 0,
        "TAX-001",
        Category::TaxCode,
        Severity::Warning,
        "No GST tax codes configured",
        "Tax codes are needed for GST-compliant billing.",
        "Go to Tax Codes (GST) and configure rates (5%, 12%, 18%, exempt).",
    )
}

fn tariff_plans(ctx: &CheckContext<'_>) -> Vec<Issue> {
    when(
        sc(ctx).total_tariff_plans == 0,
        "TAR-001",
        Category::TariffPlan,
        Severity::Warning,
        "No tariff plans configured",
        "Tariff plans define negotiated rates for payers and patient categories.",
        "Go to Tariff Plans & Rates and create at least one plan.",
    )
}

fn payers(ctx: &CheckContext<'_>) -> Vec<Issue> {
    when(
        sc(ctx).total_payers == 0,
        "PAY-001",
        Category::Payer,
        Severity::Warning,
        "No payers configured",
        "Payers are needed for insurance billing and self-pay.",
        "Go to Payer Management and create payers (start with CASH payer).",
    )
}

fn cash_payer(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let sc = sc(ctx);
    when(
        sc.total_payers > 0 && !sc.has_cash_payer,
        "PAY-002",
        Category::Payer,
        Severity::Warning,
        "No CASH payer configured",
        "Self-pay patients need a CASH billing path.",
        "Create a payer with kind=CASH.",
    )
}

fn contracts(ctx: &CheckContext<'_>) -> Vec<Issue> {
    when(
        sc(ctx).total_contracts == 0,
        "CON-001",
        Category::Contract,
        Severity::Warning,
        "No payer contracts configured",
        "Contracts define negotiated rates and coverage terms per payer.",
        "Go to Payer Contracts and create contracts.",
    )
}

fn expired_contracts(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let expired = sc(ctx).expired_contracts;
    if expired == 0 {
        return Vec::new();
    }
    vec![Issue::new(
        IssueId::new("CON-002"),
        Category::Contract,
        Severity::Info,
        format!("{} contract(s) expired", expired),
    )
    .details("Expired contracts should be renewed or terminated.")
    .fix_hint("Review expired contracts in Payer Contracts.")
    .count(expired as usize)]
}

fn gov_schemes(ctx: &CheckContext<'_>) -> Vec<Issue> {
    when(
        sc(ctx).total_gov_schemes == 0,
        "GOV-001",
        Category::GovScheme,
        Severity::Warning,
        "No government schemes configured",
        "Set up PMJAY, CGHS, ECHS, or state schemes for government-insured patients.",
        "Go to Government Schemes and add scheme configurations.",
    )
}

fn pricing_tiers(ctx: &CheckContext<'_>) -> Vec<Issue> {
    when(
        sc(ctx).total_pricing_tiers == 0,
        "TIER-001",
        Category::PricingTier,
        Severity::Warning,
        "No patient pricing tiers configured",
        "Pricing tiers (General, BPL, Staff, Senior Citizen, etc.) enable differential pricing.",
        "Go to Pricing Tiers and create tier configurations.",
    )
}

fn price_history(ctx: &CheckContext<'_>) -> Vec<Issue> {
    when(
        sc(ctx).price_change_count == 0,
        "PRICE-001",
        Category::PriceHistory,
        Severity::Info,
        "No price change history recorded",
        "Price history helps audit rate changes over time.",
        "Price history is auto-tracked when service prices change.",
    )
}

fn catalogue_readiness(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let sc = sc(ctx);
    when(
        sc.total_service_items == 0 && sc.total_charge_master == 0,
        "CAT-001",
        Category::ServiceCatalogue,
        Severity::Warning,
        "No service catalogue can be built yet",
        "Service items and charge master items are needed before creating catalogues.",
        "Set up Service Items and Charge Master first.",
    )
}
