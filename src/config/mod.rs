//! Configuration module for branch audits
//!
//! This module handles:
//! - Audit configuration (branch-audit.toml)
//! - Threshold overrides for the rule catalog
//! - Reference data locations

mod audit_config;

pub use audit_config::{
    load_audit_config, load_config_file, AuditConfig, ReferencePaths, Thresholds,
    CONFIG_FILE_NAME,
};
