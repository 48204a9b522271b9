//! Core data models for branch auditing
//!
//! These models describe the defects a check reports and the final
//! result handed back to callers.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Severity levels for issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Go-live stopper
    Blocker,
    /// Compliance or operational risk
    Warning,
    /// Advisory
    Info,
}

impl Severity {
    /// Fixed score deduction per issue of this severity
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Blocker => 5.0,
            Severity::Warning => 2.0,
            Severity::Info => 0.5,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Blocker => write!(f, "BLOCKER"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Subject area a check belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Branch,
    Location,
    Department,
    UnitType,
    Unit,
    Room,
    Resource,
    ServiceCatalog,
    ChargeMaster,
    ServiceMapping,
    TaxCode,
    TariffPlan,
    Payer,
    Contract,
    GovScheme,
    PricingTier,
    PriceHistory,
    ServiceCatalogue,
    Pharmacy,
}

impl Category {
    pub const ALL: [Category; 19] = [
        Category::Branch,
        Category::Location,
        Category::Department,
        Category::UnitType,
        Category::Unit,
        Category::Room,
        Category::Resource,
        Category::ServiceCatalog,
        Category::ChargeMaster,
        Category::ServiceMapping,
        Category::TaxCode,
        Category::TariffPlan,
        Category::Payer,
        Category::Contract,
        Category::GovScheme,
        Category::PricingTier,
        Category::PriceHistory,
        Category::ServiceCatalogue,
        Category::Pharmacy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Branch => "BRANCH",
            Category::Location => "LOCATION",
            Category::Department => "DEPARTMENT",
            Category::UnitType => "UNIT_TYPE",
            Category::Unit => "UNIT",
            Category::Room => "ROOM",
            Category::Resource => "RESOURCE",
            Category::ServiceCatalog => "SERVICE_CATALOG",
            Category::ChargeMaster => "CHARGE_MASTER",
            Category::ServiceMapping => "SERVICE_MAPPING",
            Category::TaxCode => "TAX_CODE",
            Category::TariffPlan => "TARIFF_PLAN",
            Category::Payer => "PAYER",
            Category::Contract => "CONTRACT",
            Category::GovScheme => "GOV_SCHEME",
            Category::PricingTier => "PRICING_TIER",
            Category::PriceHistory => "PRICE_HISTORY",
            Category::ServiceCatalogue => "SERVICE_CATALOGUE",
            Category::Pharmacy => "PHARMACY",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable issue identifier.
///
/// Kept as a `(base, entity)` pair so that two keys only compare equal when
/// both parts match, even if an entity id itself contains the `-` separator.
/// The rendered form is `BASE` or `BASE-ENTITY`, which is identical across
/// runs on unchanged data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueId {
    base: &'static str,
    entity: Option<String>,
}

impl IssueId {
    pub fn new(base: &'static str) -> Self {
        Self { base, entity: None }
    }

    pub fn scoped(base: &'static str, entity: impl Into<String>) -> Self {
        Self {
            base,
            entity: Some(entity.into()),
        }
    }

    pub fn base(&self) -> &'static str {
        self.base
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(f, "{}-{}", self.base, entity),
            None => f.write_str(self.base),
        }
    }
}

impl Serialize for IssueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Kind of entity an issue points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Branch,
    Department,
    Unit,
    BranchUnitType,
    PharmacyStore,
}

/// A configuration defect raised by one check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    pub category: Category,
    pub severity: Severity,
    pub title: String,
    pub details: String,
    pub fix_hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Issue {
    pub fn new(
        id: IssueId,
        category: Category,
        severity: Severity,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category,
            severity,
            title: title.into(),
            details: String::new(),
            fix_hint: String::new(),
            entity_type: None,
            entity_id: None,
            count: None,
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = hint.into();
        self
    }

    pub fn entity(mut self, entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type);
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Per-category check and issue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub checks: usize,
    pub issues: usize,
}

/// Complete outcome of one audit run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyResult {
    pub total_checks: usize,
    pub pass_count: usize,
    pub issues: Vec<Issue>,
    pub blockers: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub infos: Vec<Issue>,
    pub score: u8,
    pub category_summary: BTreeMap<Category, CategoryStats>,
}

impl ConsistencyResult {
    /// Readiness grade derived from the score
    pub fn grade(&self) -> &'static str {
        match self.score {
            s if s >= 90 => "A",
            s if s >= 80 => "B",
            s if s >= 70 => "C",
            s if s >= 60 => "D",
            _ => "F",
        }
    }

    pub fn is_go_live_ready(&self) -> bool {
        self.blockers.is_empty()
    }
}
