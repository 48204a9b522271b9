//! Branch audit - go-live readiness checks for hospital branch configuration
//!
//! Runs a fixed, ordered catalog of consistency checks over an immutable
//! [`snapshot::BranchSnapshot`] and returns a scored
//! [`models::ConsistencyResult`].
//!
//! ```no_run
//! use branch_audit::checks::CheckEngine;
//! use branch_audit::snapshot::BranchSnapshot;
//!
//! let snapshot = BranchSnapshot::from_path("snapshot.json".as_ref())?;
//! let result = CheckEngine::full().run(&snapshot);
//! println!("score {} ({} blockers)", result.score, result.blockers.len());
//! # Ok::<(), branch_audit::snapshot::SnapshotError>(())
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod hierarchy;
pub mod models;
pub mod reference;
pub mod reporters;
pub mod scoring;
pub mod snapshot;
