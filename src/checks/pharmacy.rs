//! Pharmacy go-live checks (PH-*)
//!
//! When neither stores nor drugs exist the module is treated as not set
//! up: PH-001 reports a single advisory and PH-002..PH-013 report nothing.
//! The LASA and specialty gap checks depend on reference data and are
//! silent when their table is empty.

use crate::checks::base::{CheckContext, Rule};
use crate::models::{Category, EntityType, Issue, IssueId, Severity};
use crate::snapshot::{PharmacySnapshot, PharmacyStore};
use chrono::{DateTime, Duration, Utc};
use rustc_hash::FxHashSet;
use tracing::warn;

/// Store codes listed in details before truncation
const MAX_LISTED_STORES: usize = 5;
const MAX_LISTED_LASA_PAIRS: usize = 5;
const MAX_LISTED_SPECIALTIES: usize = 3;
const MAX_LISTED_DRUGS: usize = 3;

pub const RULES: &[Rule] = &[
    Rule::new("PH-001", Category::Pharmacy, "Pharmacy stores are configured", stores_configured),
    Rule::new("PH-002", Category::Pharmacy, "An ACTIVE main store exists", main_store),
    Rule::new("PH-003", Category::Pharmacy, "ACTIVE stores hold a drug license", store_licenses),
    Rule::new(
        "PH-004",
        Category::Pharmacy,
        "ACTIVE stores have a pharmacist-in-charge",
        store_pharmacists,
    ),
    Rule::new("PH-005", Category::Pharmacy, "Drug master is large enough", drug_master_size),
    Rule::new("PH-006", Category::Pharmacy, "A dispensing store exists", dispensing_store),
    Rule::new("PH-007", Category::Pharmacy, "A formulary is published", formulary),
    Rule::new("PH-008", Category::Pharmacy, "Drug interaction data exists", interactions),
    Rule::new(
        "PH-009",
        Category::Pharmacy,
        "Narcotic drugs have a narcotics vault",
        narcotics_vault,
    ),
    Rule::new("PH-010", Category::Pharmacy, "Suppliers are configured", suppliers),
    Rule::new(
        "PH-011",
        Category::Pharmacy,
        "Drug licenses are not about to expire",
        license_expiry,
    ),
    Rule::new("PH-012", Category::Pharmacy, "Known LASA pairs are flagged", lasa_gaps),
    Rule::new(
        "PH-013",
        Category::Pharmacy,
        "Essential drugs exist for active specialties",
        specialty_gaps,
    ),
];

fn pharmacy_issue(id: &'static str, severity: Severity, title: impl Into<String>) -> Issue {
    Issue::new(IssueId::new(id), Category::Pharmacy, severity, title)
}

/// The pharmacy snapshot, if the module has been set up at all
fn configured<'a>(ctx: &CheckContext<'a>) -> Option<&'a PharmacySnapshot> {
    let pharmacy = &ctx.snapshot.pharmacy;
    pharmacy.is_configured().then_some(pharmacy)
}

fn store_codes<'a>(stores: impl IntoIterator<Item = &'a PharmacyStore>) -> String {
    stores
        .into_iter()
        .take(MAX_LISTED_STORES)
        .map(|s| s.store_code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn stores_configured(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return vec![pharmacy_issue("PH-001", Severity::Info, "Pharmacy module not configured")
            .details("No pharmacy stores or drugs have been set up for this branch.")
            .fix_hint("Navigate to Infrastructure -> Pharmacy to begin setup.")];
    };
    if !pharmacy.stores.is_empty() {
        return Vec::new();
    }
    vec![pharmacy_issue("PH-001", Severity::Blocker, "No pharmacy stores configured")
        .details("At least one pharmacy store is required before go-live.")
        .fix_hint("Create a pharmacy store (MAIN type) under Infrastructure -> Pharmacy -> Stores.")]
}

fn main_store(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    if pharmacy.stores.is_empty()
        || pharmacy
            .active_stores()
            .any(|s| s.store_type.eq_ignore_ascii_case("MAIN"))
    {
        return Vec::new();
    }
    vec![pharmacy_issue("PH-002", Severity::Blocker, "No ACTIVE main pharmacy store")
        .details("A store of type MAIN must be in ACTIVE status for dispensing.")
        .fix_hint("Set your main pharmacy store status to ACTIVE, or create one.")]
}

fn store_licenses(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    let unlicensed: Vec<&PharmacyStore> = pharmacy
        .active_stores()
        .filter(|s| crate::snapshot::is_blank(&s.drug_license_number))
        .collect();
    if unlicensed.is_empty() {
        return Vec::new();
    }
    vec![pharmacy_issue("PH-003", Severity::Blocker, "ACTIVE store(s) missing drug license")
        .details(format!(
            "{} ACTIVE store(s) have no drug license number: {}.",
            unlicensed.len(),
            store_codes(unlicensed.iter().copied())
        ))
        .fix_hint("Add drug license numbers to all ACTIVE pharmacy stores.")
        .count(unlicensed.len())]
}

fn store_pharmacists(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    let unstaffed: Vec<&PharmacyStore> = pharmacy
        .active_stores()
        .filter(|s| crate::snapshot::is_blank(&s.pharmacist_in_charge_id))
        .collect();
    if unstaffed.is_empty() {
        return Vec::new();
    }
    let mut issue = pharmacy_issue(
        "PH-004",
        Severity::Blocker,
        "ACTIVE store(s) missing pharmacist-in-charge",
    )
    .details(format!(
        "{} ACTIVE store(s) have no pharmacist assigned: {}.",
        unstaffed.len(),
        store_codes(unstaffed.iter().copied())
    ))
    .fix_hint("Assign a pharmacist-in-charge to all ACTIVE pharmacy stores.")
    .count(unstaffed.len());
    if let [only] = unstaffed.as_slice() {
        issue = issue.entity(EntityType::PharmacyStore, only.id.as_str());
    }
    vec![issue]
}

fn drug_master_size(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    let active = pharmacy.active_drugs().count();
    let required = ctx.thresholds.min_active_drugs;
    if active >= required {
        return Vec::new();
    }
    vec![pharmacy_issue(
        "PH-005",
        Severity::Blocker,
        format!("Drug master has fewer than {} active drugs", required),
    )
    .details(format!(
        "Only {} active drug(s) found. At least {} are required for go-live.",
        active, required
    ))
    .fix_hint("Import drugs via bulk import or add them individually in Drug Master.")
    .count(active)]
}

fn dispensing_store(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    if pharmacy.stores.is_empty() || pharmacy.active_stores().any(|s| s.can_dispense) {
        return Vec::new();
    }
    vec![pharmacy_issue("PH-006", Severity::Blocker, "No dispensing-enabled store")
        .details("At least one ACTIVE store must have canDispense=true for patient dispensing.")
        .fix_hint("Enable dispensing on your main pharmacy store.")]
}

fn formulary(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    let published = pharmacy
        .formulary_status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("PUBLISHED"));
    if published {
        return Vec::new();
    }
    vec![pharmacy_issue("PH-007", Severity::Warning, "No published formulary")
        .details("Publish a formulary to define which drugs are approved for use.")
        .fix_hint("Go to Formulary -> publish the current draft version.")]
}

fn interactions(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    if pharmacy.interaction_count > 0 || pharmacy.drugs.is_empty() {
        return Vec::new();
    }
    vec![pharmacy_issue("PH-008", Severity::Warning, "No drug interactions configured")
        .details("Drug interaction checking cannot work without interaction data.")
        .fix_hint("Import a drug interaction database or add interactions manually.")]
}

fn narcotics_vault(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    let narcotics = pharmacy.drugs.iter().filter(|d| d.is_narcotic).count();
    let has_vault = pharmacy
        .stores
        .iter()
        .any(|s| s.store_type.eq_ignore_ascii_case("NARCOTICS_VAULT"));
    if narcotics == 0 || has_vault {
        return Vec::new();
    }
    vec![pharmacy_issue("PH-009", Severity::Warning, "Narcotic drugs without narcotics vault")
        .details(format!(
            "{} narcotic drug(s) found but no NARCOTICS_VAULT store configured.",
            narcotics
        ))
        .fix_hint("Create a pharmacy store of type NARCOTICS_VAULT for NDPS compliance.")
        .count(narcotics)]
}

fn suppliers(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    if pharmacy.supplier_count > 0 || pharmacy.drugs.is_empty() {
        return Vec::new();
    }
    vec![pharmacy_issue("PH-010", Severity::Warning, "No active suppliers configured")
        .details("At least one supplier is needed for procurement and indent workflows.")
        .fix_hint("Add suppliers under Infrastructure -> Pharmacy -> Suppliers.")]
}

fn license_expiry(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    let window_days = ctx.thresholds.license_expiry_days;
    let horizon = expiry_horizon(ctx.now, window_days);
    let expiring: Vec<&PharmacyStore> = pharmacy
        .active_stores()
        .filter(|s| s.drug_license_expiry.is_some_and(|exp| exp <= horizon))
        .collect();
    if expiring.is_empty() {
        return Vec::new();
    }

    let listed = expiring
        .iter()
        .take(MAX_LISTED_STORES)
        .filter_map(|s| {
            s.drug_license_expiry
                .map(|exp| format!("{} (exp {})", s.store_code, exp.format("%Y-%m-%d")))
        })
        .collect::<Vec<_>>()
        .join(", ");

    vec![pharmacy_issue(
        "PH-011",
        Severity::Warning,
        format!("Drug license(s) expiring within {} days", window_days),
    )
    .details(format!(
        "{} store(s) with license expiring soon: {}.",
        expiring.len(),
        listed
    ))
    .fix_hint("Renew drug licenses before expiry to maintain compliance.")
    .count(expiring.len())]
}

/// `now + window_days`, saturating at the representable date range
fn expiry_horizon(now: DateTime<Utc>, window_days: i64) -> DateTime<Utc> {
    Duration::try_days(window_days)
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or_else(|| {
            warn!(
                "license_expiry_days = {} is out of range, clamping the PH-011 window",
                window_days
            );
            if window_days < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            }
        })
}

/// Pairs where both drugs are active but not both are flagged LASA
pub fn unflagged_lasa_pairs<'a>(
    pairs: &'a [(String, String)],
    pharmacy: &PharmacySnapshot,
) -> Vec<(&'a str, &'a str)> {
    if pairs.is_empty() {
        return Vec::new();
    }
    let mut present: FxHashSet<String> = FxHashSet::default();
    let mut flagged: FxHashSet<String> = FxHashSet::default();
    for drug in pharmacy.active_drugs() {
        let name = drug.generic_name.to_lowercase();
        if drug.is_lasa {
            flagged.insert(name.clone());
        }
        present.insert(name);
    }

    pairs
        .iter()
        .filter(|(a, b)| present.contains(a) && present.contains(b))
        .filter(|(a, b)| !(flagged.contains(a) && flagged.contains(b)))
        .map(|(a, b)| (a.as_str(), b.as_str()))
        .collect()
}

fn lasa_gaps(ctx: &CheckContext<'_>) -> Vec<Issue> {
    let Some(pharmacy) = configured(ctx) else {
        return Vec::new();
    };
    let gaps = unflagged_lasa_pairs(&ctx.reference.lasa_pairs, pharmacy);
    if gaps.is_empty() {
        return Vec::new();
    }
    let sample = gaps
        .iter()
        .take(MAX_LISTED_LASA_PAIRS)
        .map(|(a, b)| format!("{}/{}", a, b))
        .collect::<Vec<_>>()
        .join(", ");
    vec![pharmacy_issue("PH-012", Severity::Info, "LASA pairs not flagged")
        .details(format!(
            "{} known LASA pair(s) found but not all flagged: {}.",
            gaps.len(),
            sample
        ))
        .fix_hint("Mark both drugs in each LASA pair with isLasa=true in Drug Master.")
        .count(gaps.len())]
}

/// One rendered group per active specialty with missing essential drugs
pub fn specialty_gap_groups(ctx: &CheckContext<'_>) -> Vec<String> {
    if ctx.reference.specialty_drugs.is_empty() {
        return Vec::new();
    }
    let active_specialties: FxHashSet<String> = ctx
        .snapshot
        .specialties
        .iter()
        .filter(|s| s.is_active)
        .map(|s| s.code.to_uppercase())
        .collect();
    let generics: FxHashSet<String> = ctx
        .snapshot
        .pharmacy
        .active_drugs()
        .map(|d| d.generic_name.to_lowercase())
        .collect();

    ctx.reference
        .specialty_drugs
        .iter()
        .filter(|(code, _)| active_specialties.contains(code.to_uppercase().as_str()))
        .filter_map(|(code, expected)| {
            let missing: Vec<&str> = expected
                .iter()
                .filter(|name| !generics.contains(name.as_str()))
                .map(String::as_str)
                .collect();
            if missing.is_empty() {
                return None;
            }
            let mut group = format!(
                "{}: {}",
                code,
                missing
                    .iter()
                    .take(MAX_LISTED_DRUGS)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            if missing.len() > MAX_LISTED_DRUGS {
                group.push_str(&format!(" +{} more", missing.len() - MAX_LISTED_DRUGS));
            }
            Some(group)
        })
        .collect()
}

fn specialty_gaps(ctx: &CheckContext<'_>) -> Vec<Issue> {
    if configured(ctx).is_none() {
        return Vec::new();
    }
    let groups = specialty_gap_groups(ctx);
    if groups.is_empty() {
        return Vec::new();
    }
    let sample = groups
        .iter()
        .take(MAX_LISTED_SPECIALTIES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ");
    vec![pharmacy_issue("PH-013", Severity::Warning, "Missing drugs for configured specialties")
        .details(format!("Essential drugs missing for specialties: {}.", sample))
        .fix_hint("Review specialty drug requirements and add missing drugs to Drug Master.")
        .count(groups.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{fixed_now, ids, run_rules, run_rules_with};
    use crate::config::Thresholds;
    use crate::reference::ReferenceData;
    use crate::snapshot::{BranchSnapshot, Drug, Specialty};
    use chrono::TimeZone;

    fn store(code: &str, store_type: &str) -> PharmacyStore {
        PharmacyStore {
            id: code.to_lowercase(),
            store_code: code.into(),
            store_type: store_type.into(),
            status: "ACTIVE".into(),
            drug_license_number: Some(format!("DL-{}", code)),
            drug_license_expiry: None,
            pharmacist_in_charge_id: Some("staff-1".into()),
            can_dispense: true,
        }
    }

    fn drug(name: &str) -> Drug {
        Drug {
            id: name.to_lowercase(),
            generic_name: name.into(),
            status: "ACTIVE".into(),
            ..Default::default()
        }
    }

    fn ready_pharmacy() -> PharmacySnapshot {
        PharmacySnapshot {
            stores: vec![store("MAIN-01", "MAIN")],
            drugs: (0..120).map(|i| drug(&format!("Drug{}", i))).collect(),
            supplier_count: 3,
            interaction_count: 500,
            formulary_status: Some("PUBLISHED".into()),
        }
    }

    fn snapshot(pharmacy: PharmacySnapshot) -> BranchSnapshot {
        BranchSnapshot {
            pharmacy,
            ..Default::default()
        }
    }

    #[test]
    fn test_unconfigured_pharmacy_is_single_info() {
        let issues = run_rules(RULES, &BranchSnapshot::default());
        assert_eq!(ids(&issues), vec!["PH-001"]);
        assert_eq!(issues[0].severity, Severity::Info);
    }

    #[test]
    fn test_ready_pharmacy_passes() {
        assert!(run_rules(RULES, &snapshot(ready_pharmacy())).is_empty());
    }

    #[test]
    fn test_drugs_without_stores() {
        let mut pharmacy = ready_pharmacy();
        pharmacy.stores.clear();
        let issues = run_rules(RULES, &snapshot(pharmacy));
        assert_eq!(ids(&issues), vec!["PH-001"]);
        assert_eq!(issues[0].severity, Severity::Blocker);
    }

    #[test]
    fn test_store_staffing_and_licensing() {
        let mut pharmacy = ready_pharmacy();
        let mut satellite = store("SAT-01", "SATELLITE");
        satellite.drug_license_number = None;
        satellite.pharmacist_in_charge_id = None;
        let mut closed = store("OLD-01", "MAIN");
        closed.status = "INACTIVE".into();
        closed.drug_license_number = None;
        pharmacy.stores.push(satellite);
        pharmacy.stores.push(closed);

        let issues = run_rules(RULES, &snapshot(pharmacy));
        assert_eq!(ids(&issues), vec!["PH-003", "PH-004"]);
        assert_eq!(issues[0].details, "1 ACTIVE store(s) have no drug license number: SAT-01.");
        assert_eq!(issues[1].entity_id.as_deref(), Some("sat-01"));
    }

    #[test]
    fn test_main_store_and_dispensing() {
        let mut pharmacy = ready_pharmacy();
        pharmacy.stores[0].status = "INACTIVE".into();
        pharmacy.stores.push({
            let mut s = store("SAT-01", "SATELLITE");
            s.can_dispense = false;
            s
        });
        let issues = run_rules(RULES, &snapshot(pharmacy));
        assert_eq!(ids(&issues), vec!["PH-002", "PH-006"]);
    }

    #[test]
    fn test_small_drug_master() {
        let mut pharmacy = ready_pharmacy();
        pharmacy.drugs.truncate(40);
        pharmacy.drugs[0].status = "DISCONTINUED".into();
        let issues = run_rules(RULES, &snapshot(pharmacy));
        assert_eq!(ids(&issues), vec!["PH-005"]);
        assert_eq!(issues[0].count, Some(39));
    }

    #[test]
    fn test_formulary_interactions_suppliers_vault() {
        let mut pharmacy = ready_pharmacy();
        pharmacy.formulary_status = Some("DRAFT".into());
        pharmacy.interaction_count = 0;
        pharmacy.supplier_count = 0;
        pharmacy.drugs[0].is_narcotic = true;
        pharmacy.drugs[1].is_narcotic = true;
        let issues = run_rules(RULES, &snapshot(pharmacy));
        assert_eq!(ids(&issues), vec!["PH-007", "PH-008", "PH-009", "PH-010"]);
        assert_eq!(issues[2].count, Some(2));
    }

    #[test]
    fn test_license_expiry_window() {
        let now = fixed_now();
        let mut pharmacy = ready_pharmacy();
        pharmacy.stores[0].drug_license_expiry = Some(now + Duration::days(30));
        let mut far = store("SAT-01", "SATELLITE");
        far.drug_license_expiry = Some(now + Duration::days(400));
        pharmacy.stores.push(far);
        let mut lapsed = store("SAT-02", "SATELLITE");
        lapsed.drug_license_expiry = Some(chrono::Utc.with_ymd_and_hms(2020, 1, 31, 0, 0, 0).unwrap());
        pharmacy.stores.push(lapsed);

        let issues = run_rules(RULES, &snapshot(pharmacy));
        assert_eq!(ids(&issues), vec!["PH-011"]);
        assert_eq!(issues[0].count, Some(2));
        assert!(issues[0].details.contains("SAT-02 (exp 2020-01-31)"));
    }

    #[test]
    fn test_extreme_license_window_saturates() {
        let mut pharmacy = ready_pharmacy();
        pharmacy.stores[0].drug_license_expiry = Some(fixed_now() + Duration::days(400));
        let snapshot = snapshot(pharmacy);
        let reference = ReferenceData::empty();

        let wide = Thresholds {
            license_expiry_days: i64::MAX,
            ..Thresholds::default()
        };
        let ctx = CheckContext::new(&snapshot, &wide, &reference, fixed_now());
        let issues = license_expiry(&ctx);
        assert_eq!(ids(&issues), vec!["PH-011"]);
        assert_eq!(issues[0].count, Some(1));

        let negative = Thresholds {
            license_expiry_days: i64::MIN,
            ..Thresholds::default()
        };
        let ctx = CheckContext::new(&snapshot, &negative, &reference, fixed_now());
        assert!(license_expiry(&ctx).is_empty());
    }

    #[test]
    fn test_lasa_gap() {
        let mut pharmacy = ready_pharmacy();
        pharmacy.drugs.push(drug("Hydralazine"));
        pharmacy.drugs.push(Drug {
            is_lasa: true,
            ..drug("Hydroxyzine")
        });
        pharmacy.drugs.push(Drug {
            is_lasa: true,
            ..drug("Dopamine")
        });
        pharmacy.drugs.push(Drug {
            is_lasa: true,
            ..drug("Dobutamine")
        });
        let reference = ReferenceData::empty().with_lasa_pairs([
            ("Hydralazine", "Hydroxyzine"),
            ("Dopamine", "Dobutamine"),
            ("Quinine", "Quinidine"),
        ]);

        let issues = run_rules_with(RULES, &snapshot(pharmacy), &reference);
        assert_eq!(ids(&issues), vec!["PH-012"]);
        assert_eq!(issues[0].count, Some(1));
        assert!(issues[0].details.ends_with("hydralazine/hydroxyzine."));
    }

    #[test]
    fn test_specialty_gap() {
        let mut snap = snapshot(ready_pharmacy());
        snap.pharmacy.drugs.push(drug("Aspirin"));
        snap.specialties = vec![
            Specialty {
                code: "cardiology".into(),
                is_active: true,
            },
            Specialty {
                code: "NEPHROLOGY".into(),
                is_active: false,
            },
        ];
        let reference = ReferenceData::empty()
            .with_specialty(
                "CARDIOLOGY",
                &["Aspirin", "Clopidogrel", "Heparin", "Atorvastatin", "Metoprolol"],
            )
            .with_specialty("NEPHROLOGY", &["Sevelamer"]);

        let issues = run_rules_with(RULES, &snap, &reference);
        assert_eq!(ids(&issues), vec!["PH-013"]);
        assert_eq!(issues[0].count, Some(1));
        assert_eq!(
            issues[0].details,
            "Essential drugs missing for specialties: CARDIOLOGY: clopidogrel, heparin, atorvastatin +1 more."
        );
    }

    #[test]
    fn test_empty_reference_disables_gap_checks() {
        let mut snap = snapshot(ready_pharmacy());
        snap.pharmacy.drugs.push(drug("Hydralazine"));
        snap.pharmacy.drugs.push(drug("Hydroxyzine"));
        snap.specialties = vec![Specialty {
            code: "CARDIOLOGY".into(),
            is_active: true,
        }];
        assert!(run_rules_with(RULES, &snap, &ReferenceData::empty()).is_empty());
    }
}
