//! Branch configuration snapshot
//!
//! An immutable, pre-collected view of one branch's configuration. The
//! collector that builds it lives outside this crate; here it is only
//! deserialized and read.
//!
//! Optional counters and lists use `None` for "not collected", which is
//! different from "collected and empty". Checks backed by such a field
//! stay in the catalog and pass when the data is missing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Resource types that count as beds
pub const BED_RESOURCE_TYPES: &[&str] = &["BED", "GENERAL_BED", "ICU_BED", "NICU_INCUBATOR", "CRIB"];

/// Unit type codes that admit patients to beds
pub const BED_BASED_UNIT_TYPES: &[&str] = &[
    "WARD",
    "ICU",
    "HDU",
    "NICU",
    "PICU",
    "CCU",
    "ER",
    "EMERGENCY",
    "IPD",
    "OBSERVATION",
    "DAYCARE",
    "BIRTHING",
    "BURN",
    "DIALYSIS",
    "REHAB",
    "ISOLATION",
];

/// Unit type codes treated as critical care
pub const CRITICAL_CARE_UNIT_TYPES: &[&str] = &["ICU", "HDU", "NICU", "PICU", "CCU"];

/// Errors raised while loading a snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything the engine knows about one branch
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchSnapshot {
    pub branch: BranchProfile,
    pub location: LocationSnapshot,
    pub departments: Vec<Department>,
    pub unit_types: Vec<EnabledUnitType>,
    pub units: Vec<Unit>,
    pub specialties: Vec<Specialty>,
    pub service_catalog: ServiceCatalogSnapshot,
    pub pharmacy: PharmacySnapshot,
}

impl BranchSnapshot {
    /// Parse a snapshot. Nesting depth is not limited by the JSON parser;
    /// deep location trees grow the stack on the heap instead.
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let snapshot = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(snapshot)
    }

    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Units with `isActive = true`
    pub fn active_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_active)
    }

    /// Units with `isActive = false`
    pub fn inactive_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| !u.is_active)
    }
}

/// Branch profile scalars
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchProfile {
    pub id: String,
    pub name: Option<String>,
    pub legal_entity_name: Option<String>,
    pub gst_number: Option<String>,
    pub pan_number: Option<String>,
    pub address: Option<String>,
    pub pin_code: Option<String>,
    pub state: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub clinical_est_reg_number: Option<String>,
    pub working_hours: Option<serde_json::Value>,
    pub bed_count: Option<i64>,
    pub infra_config_initialized: Option<bool>,
}

/// True when the value is absent or only whitespace
pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl BranchProfile {
    pub fn has_working_hours(&self) -> bool {
        match &self.working_hours {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Object(map)) => !map.is_empty(),
            Some(serde_json::Value::Array(items)) => !items.is_empty(),
            Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }
}

/// Physical location hierarchy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationSnapshot {
    pub tree: Vec<HierarchyNode>,
    /// Nodes whose declared parent could not be resolved
    pub orphaned_nodes: Option<u32>,
    /// CAMPUS/BUILDING nodes without GPS coordinates
    pub nodes_missing_gps: Option<u32>,
}

/// Kind of a location node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocationKind {
    Campus,
    Building,
    Floor,
    Zone,
    Area,
    Other(String),
}

/// Rank for kinds outside the known hierarchy
pub const UNRANKED: u8 = 99;

impl LocationKind {
    /// Depth of this kind in CAMPUS < BUILDING < FLOOR < ZONE < AREA
    pub fn rank(&self) -> u8 {
        match self {
            LocationKind::Campus => 0,
            LocationKind::Building => 1,
            LocationKind::Floor => 2,
            LocationKind::Zone => 3,
            LocationKind::Area => 4,
            LocationKind::Other(_) => UNRANKED,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LocationKind::Campus => "CAMPUS",
            LocationKind::Building => "BUILDING",
            LocationKind::Floor => "FLOOR",
            LocationKind::Zone => "ZONE",
            LocationKind::Area => "AREA",
            LocationKind::Other(kind) => kind,
        }
    }
}

impl From<String> for LocationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CAMPUS" => LocationKind::Campus,
            "BUILDING" => LocationKind::Building,
            "FLOOR" => LocationKind::Floor,
            "ZONE" => LocationKind::Zone,
            "AREA" => LocationKind::Area,
            _ => LocationKind::Other(value),
        }
    }
}

impl From<LocationKind> for String {
    fn from(value: LocationKind) -> Self {
        value.as_str().to_string()
    }
}

impl Default for LocationKind {
    fn default() -> Self {
        LocationKind::Other(String::new())
    }
}

/// One node of the location forest; owns its children.
///
/// Drop and clone walk the subtree with an explicit stack so forest depth
/// is bounded by memory, not by the call stack. A node missing
/// `hasActiveRevision` in the snapshot is treated as revised.
// Field-level defaults: a container default would move out of a `Drop` type
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub kind: LocationKind,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub fire_zone: Option<String>,
    #[serde(default)]
    pub wheelchair_accessible: bool,
    #[serde(default)]
    pub emergency_exit: bool,
    #[serde(default = "default_revised")]
    pub has_active_revision: bool,
    #[serde(default)]
    pub children: Vec<HierarchyNode>,
}

fn default_revised() -> bool {
    true
}

impl Default for HierarchyNode {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: LocationKind::default(),
            code: None,
            fire_zone: None,
            wheelchair_accessible: false,
            emergency_exit: false,
            has_active_revision: default_revised(),
            children: Vec::new(),
        }
    }
}

impl Drop for HierarchyNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

impl Clone for HierarchyNode {
    fn clone(&self) -> Self {
        // Pre-order copy without children, then reattach bottom-up
        let mut copies: Vec<(Option<usize>, HierarchyNode)> = Vec::new();
        let mut stack: Vec<(Option<usize>, &HierarchyNode)> = vec![(None, self)];
        while let Some((parent, node)) = stack.pop() {
            let index = copies.len();
            copies.push((parent, node.without_children()));
            stack.extend(node.children.iter().rev().map(|child| (Some(index), child)));
        }

        let mut root = None;
        while let Some((parent, mut node)) = copies.pop() {
            // Descendants come later in pre-order, so children arrived last-first
            node.children.reverse();
            match parent {
                Some(index) => copies[index].1.children.push(node),
                None => root = Some(node),
            }
        }
        root.unwrap_or_default()
    }
}

impl HierarchyNode {
    pub fn new(id: impl Into<String>, kind: LocationKind) -> Self {
        let mut node = Self::default();
        node.id = id.into();
        node.kind = kind;
        node
    }

    fn without_children(&self) -> Self {
        Self {
            id: self.id.clone(),
            kind: self.kind.clone(),
            code: self.code.clone(),
            fire_zone: self.fire_zone.clone(),
            wheelchair_accessible: self.wheelchair_accessible,
            emergency_exit: self.emergency_exit,
            has_active_revision: self.has_active_revision,
            children: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_child(mut self, child: HierarchyNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Department {
    pub id: String,
    pub code: Option<String>,
    pub name: String,
    pub has_head: bool,
    /// Location nodes the department is mapped to
    pub location_node_ids: Option<Vec<String>>,
}

/// A unit type enabled for the branch
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnabledUnitType {
    pub code: String,
    pub name: Option<String>,
    pub unit_count: u32,
}

impl EnabledUnitType {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Unit {
    pub id: String,
    pub code: Option<String>,
    pub name: String,
    pub type_code: String,
    pub is_active: bool,
    pub uses_rooms: bool,
    pub department_id: Option<String>,
    pub location_node_id: Option<String>,
    pub rooms: Vec<Room>,
    pub resources: ResourceSummary,
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            id: String::new(),
            code: None,
            name: String::new(),
            type_code: String::new(),
            is_active: true,
            uses_rooms: true,
            department_id: None,
            location_node_id: None,
            rooms: Vec::new(),
            resources: ResourceSummary::default(),
        }
    }
}

impl Unit {
    pub fn is_bed_based(&self) -> bool {
        let code = self.type_code.to_ascii_uppercase();
        BED_BASED_UNIT_TYPES.contains(&code.as_str())
    }

    pub fn is_critical_care(&self) -> bool {
        let code = self.type_code.to_ascii_uppercase();
        CRITICAL_CARE_UNIT_TYPES.contains(&code.as_str())
    }

    pub fn is_type(&self, code: &str) -> bool {
        self.type_code.eq_ignore_ascii_case(code)
    }
}

/// Active room inside a unit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    pub id: String,
    pub code: Option<String>,
    pub room_type: Option<String>,
    pub pricing_tier: Option<String>,
    pub max_occupancy: Option<u32>,
    pub has_oxygen: bool,
    pub has_suction: bool,
}

/// Histogram of a unit's active resources
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceSummary {
    pub by_type: BTreeMap<String, u32>,
    pub by_state: BTreeMap<String, u32>,
    /// Beds with no room assignment
    pub unassigned_beds: Option<u32>,
    /// Resource codes within the unit
    pub codes: Option<Vec<String>>,
}

impl ResourceSummary {
    pub fn total(&self) -> u64 {
        self.by_type.values().map(|&n| u64::from(n)).sum()
    }

    pub fn beds(&self) -> u64 {
        self.by_type
            .iter()
            .filter(|(kind, _)| BED_RESOURCE_TYPES.contains(&kind.to_ascii_uppercase().as_str()))
            .map(|(_, &n)| u64::from(n))
            .sum()
    }

    pub fn in_state(&self, state: &str) -> u64 {
        self.by_state.get(state).copied().map_or(0, u64::from)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Specialty {
    pub code: String,
    pub is_active: bool,
}

/// Aggregate counters for billing and catalog setup
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceCatalogSnapshot {
    pub total_service_items: u32,
    pub active_service_items: u32,
    pub without_base_price: u32,
    pub total_charge_master: u32,
    pub active_charge_master: u32,
    pub total_tax_codes: u32,
    pub total_tariff_plans: u32,
    pub total_payers: u32,
    pub has_cash_payer: bool,
    pub total_contracts: u32,
    pub expired_contracts: u32,
    pub total_gov_schemes: u32,
    pub total_pricing_tiers: u32,
    pub price_change_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PharmacySnapshot {
    pub stores: Vec<PharmacyStore>,
    pub drugs: Vec<Drug>,
    pub supplier_count: u32,
    pub interaction_count: u32,
    pub formulary_status: Option<String>,
}

impl PharmacySnapshot {
    /// False when neither stores nor drugs have been set up
    pub fn is_configured(&self) -> bool {
        !self.stores.is_empty() || !self.drugs.is_empty()
    }

    pub fn active_stores(&self) -> impl Iterator<Item = &PharmacyStore> {
        self.stores.iter().filter(|s| s.is_active())
    }

    pub fn active_drugs(&self) -> impl Iterator<Item = &Drug> {
        self.drugs.iter().filter(|d| d.is_active())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PharmacyStore {
    pub id: String,
    pub store_code: String,
    pub store_type: String,
    pub status: String,
    pub drug_license_number: Option<String>,
    pub drug_license_expiry: Option<DateTime<Utc>>,
    pub pharmacist_in_charge_id: Option<String>,
    pub can_dispense: bool,
}

impl PharmacyStore {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("ACTIVE")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Drug {
    pub id: String,
    pub generic_name: String,
    pub status: String,
    pub is_narcotic: bool,
    pub is_lasa: bool,
}

impl Drug {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("ACTIVE")
    }
}
