//! Configuration checks
//!
//! The catalog is a fixed, ordered list of rules grouped by area. Each
//! area module exposes a `RULES` table; the functions here assemble them
//! into the infrastructure, pharmacy and full catalogs the engine runs.
//!
//! The catalog size is constant: a rule that has nothing to evaluate
//! (missing data, gated on an empty hierarchy) still counts as executed.

pub mod base;
pub mod engine;

pub mod branch;
pub mod department;
pub mod financial;
pub mod location;
pub mod pharmacy;
pub mod resource;
pub mod room;
pub mod unit;
pub mod unit_type;

pub use base::{Check, CheckContext, CheckResult, CheckRun, CategoryTracker, Rule, RuleFn};
pub use engine::{CheckEngine, CheckEngineBuilder};

use std::sync::Arc;

/// Rule tables of the infrastructure catalog, in execution order
const INFRASTRUCTURE_TABLES: &[&[Rule]] = &[
    branch::RULES,
    location::RULES,
    department::RULES,
    unit_type::RULES,
    unit::RULES,
    room::RULES,
    resource::RULES,
    financial::RULES,
];

fn to_checks<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> Vec<Arc<dyn Check>> {
    rules
        .into_iter()
        .map(|rule| Arc::new(*rule) as Arc<dyn Check>)
        .collect()
}

/// Branch, location, department, unit, room, resource and billing checks
pub fn infrastructure_checks() -> Vec<Arc<dyn Check>> {
    to_checks(INFRASTRUCTURE_TABLES.iter().flat_map(|table| table.iter()))
}

/// Pharmacy go-live checks
pub fn pharmacy_checks() -> Vec<Arc<dyn Check>> {
    to_checks(pharmacy::RULES)
}

/// The full catalog: infrastructure followed by pharmacy
pub fn all_checks() -> Vec<Arc<dyn Check>> {
    let mut checks = infrastructure_checks();
    checks.extend(pharmacy_checks());
    checks
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(infrastructure_checks().len(), 59);
        assert_eq!(pharmacy_checks().len(), 13);
        assert_eq!(all_checks().len(), 72);
    }

    #[test]
    fn test_check_ids_unique() {
        let checks = all_checks();
        let ids: FxHashSet<&str> = checks.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), checks.len());
    }

    #[test]
    fn test_pharmacy_partition() {
        assert!(pharmacy_checks()
            .iter()
            .all(|c| c.category() == Category::Pharmacy));
        assert!(infrastructure_checks()
            .iter()
            .all(|c| c.category() != Category::Pharmacy));
    }

    #[test]
    fn test_per_area_counts() {
        assert_eq!(branch::RULES.len(), 8);
        assert_eq!(location::RULES.len(), 10);
        assert_eq!(department::RULES.len(), 5);
        assert_eq!(unit_type::RULES.len(), 2);
        assert_eq!(unit::RULES.len(), 6);
        assert_eq!(room::RULES.len(), 7);
        assert_eq!(resource::RULES.len(), 7);
        assert_eq!(financial::RULES.len(), 14);
    }
}
