//! Audit configuration support
//!
//! Loads thresholds and reference-data locations from `branch-audit.toml`.
//! Every field is optional; a missing or broken file falls back to defaults.
//!
//! # Configuration Format
//!
//! ```toml
//! # branch-audit.toml
//!
//! [thresholds]
//! min_active_drugs = 100
//! license_expiry_days = 90
//! max_unpriced_services = 5
//! max_mapping_gap = 5
//! unavailable_resource_pct = 30
//! min_resources_for_ratio = 5
//! min_nodes_for_accessibility = 3
//!
//! [reference]
//! lasa_pairs = "data/lasa-pairs.json"
//! specialty_drugs = "data/specialty-drugs.json"
//! ```

use crate::reference::ReferenceData;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up by [`load_audit_config`]
pub const CONFIG_FILE_NAME: &str = "branch-audit.toml";

/// Top-level audit configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub reference: ReferencePaths,
}

/// Numeric limits used by the rule catalog
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Thresholds {
    /// PH-005 fires below this many active drugs
    #[serde(default = "default_min_active_drugs")]
    pub min_active_drugs: usize,

    /// PH-011 look-ahead window
    #[serde(default = "default_license_expiry_days")]
    pub license_expiry_days: i64,

    /// SVC-002 fires above this many unpriced services
    #[serde(default = "default_max_unpriced_services")]
    pub max_unpriced_services: u32,

    /// MAP-002 tolerance between active charges and active services
    #[serde(default = "default_max_mapping_gap")]
    pub max_mapping_gap: u32,

    /// RES-004 fires above this percentage of unavailable resources
    #[serde(default = "default_unavailable_resource_pct")]
    pub unavailable_resource_pct: u32,

    #[serde(default = "default_min_resources_for_ratio")]
    pub min_resources_for_ratio: u64,

    #[serde(default = "default_min_nodes_for_accessibility")]
    pub min_nodes_for_accessibility: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_active_drugs: default_min_active_drugs(),
            license_expiry_days: default_license_expiry_days(),
            max_unpriced_services: default_max_unpriced_services(),
            max_mapping_gap: default_max_mapping_gap(),
            unavailable_resource_pct: default_unavailable_resource_pct(),
            min_resources_for_ratio: default_min_resources_for_ratio(),
            min_nodes_for_accessibility: default_min_nodes_for_accessibility(),
        }
    }
}

fn default_min_active_drugs() -> usize {
    100
}
fn default_license_expiry_days() -> i64 {
    90
}
fn default_max_unpriced_services() -> u32 {
    5
}
fn default_max_mapping_gap() -> u32 {
    5
}
fn default_unavailable_resource_pct() -> u32 {
    30
}
fn default_min_resources_for_ratio() -> u64 {
    5
}
fn default_min_nodes_for_accessibility() -> usize {
    3
}

/// Locations of the reference tables; bundled tables are used when unset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferencePaths {
    #[serde(default)]
    pub lasa_pairs: Option<PathBuf>,

    #[serde(default)]
    pub specialty_drugs: Option<PathBuf>,
}

impl ReferencePaths {
    /// Resolve the tables, reading files relative to `base_dir`.
    ///
    /// Only overriding both paths replaces the bundled tables entirely; a
    /// single override keeps the bundled data for the other table.
    pub fn resolve(&self, base_dir: &Path) -> ReferenceData {
        let builtin = ReferenceData::builtin();
        if self.lasa_pairs.is_none() && self.specialty_drugs.is_none() {
            return builtin;
        }

        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base_dir.join(p)
            }
        };

        let mut data = ReferenceData::empty();
        match &self.lasa_pairs {
            Some(path) => {
                data.lasa_pairs = ReferenceData::load_lasa_pairs(&join(path));
            }
            None => data.lasa_pairs = builtin.lasa_pairs,
        }
        match &self.specialty_drugs {
            Some(path) => {
                data.specialty_drugs = ReferenceData::load_specialty_drugs(&join(path));
            }
            None => data.specialty_drugs = builtin.specialty_drugs,
        }
        data
    }
}

/// Load `branch-audit.toml` from a directory, falling back to defaults
pub fn load_audit_config(dir: &Path) -> AuditConfig {
    let toml_path = dir.join(CONFIG_FILE_NAME);
    if toml_path.exists() {
        match load_config_file(&toml_path) {
            Ok(config) => {
                debug!("Loaded audit config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    debug!("No audit config found, using defaults");
    AuditConfig::default()
}

/// Load configuration from an explicit TOML file
pub fn load_config_file(path: &Path) -> anyhow::Result<AuditConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AuditConfig = toml::from_str(&content)?;
    Ok(config)
}
