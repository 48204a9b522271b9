//! Read-only reference tables for the pharmacy gap checks
//!
//! - LASA pairs: `{ "pairs": [ { "a": "...", "b": "..." } ] }`
//! - Specialty essentials: `{ "specialties": { "CODE": ["generic", ...] } }`
//!
//! Names are compared case-insensitively and stored lowercase. A missing or
//! unparsable file yields an empty table, which disables the matching check.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

const BUILTIN_LASA_PAIRS: &str = include_str!("../data/lasa-pairs.json");
const BUILTIN_SPECIALTY_DRUGS: &str = include_str!("../data/specialty-drugs.json");

/// Errors raised while reading a reference table
#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct LasaFile {
    #[serde(default)]
    pairs: Vec<LasaEntry>,
}

#[derive(Debug, Deserialize)]
struct LasaEntry {
    a: String,
    b: String,
}

#[derive(Debug, Deserialize)]
struct SpecialtyFile {
    #[serde(default)]
    specialties: BTreeMap<String, Vec<String>>,
}

/// Lookup tables consumed by the LASA and specialty-drug checks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    /// Look-alike/sound-alike generic name pairs, lowercase
    pub lasa_pairs: Vec<(String, String)>,
    /// Specialty code (uppercase) to expected generic names (lowercase)
    pub specialty_drugs: BTreeMap<String, Vec<String>>,
}

impl ReferenceData {
    /// Empty tables; both gap checks become no-ops
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tables bundled with the crate
    pub fn builtin() -> Self {
        Self {
            lasa_pairs: parse_lasa_pairs(BUILTIN_LASA_PAIRS, "builtin lasa-pairs.json")
                .unwrap_or_else(degrade),
            specialty_drugs: parse_specialty_drugs(
                BUILTIN_SPECIALTY_DRUGS,
                "builtin specialty-drugs.json",
            )
            .unwrap_or_else(degrade),
        }
    }

    /// Load tables from files, falling back to empty tables on any failure
    pub fn load(lasa_path: &Path, specialty_path: &Path) -> Self {
        Self {
            lasa_pairs: Self::load_lasa_pairs(lasa_path),
            specialty_drugs: Self::load_specialty_drugs(specialty_path),
        }
    }

    /// LASA pairs from a file; empty on any failure
    pub fn load_lasa_pairs(path: &Path) -> Vec<(String, String)> {
        read_file(path)
            .and_then(|content| parse_lasa_pairs(&content, &path.display().to_string()))
            .unwrap_or_else(degrade)
    }

    /// Specialty essentials from a file; empty on any failure
    pub fn load_specialty_drugs(path: &Path) -> BTreeMap<String, Vec<String>> {
        read_file(path)
            .and_then(|content| parse_specialty_drugs(&content, &path.display().to_string()))
            .unwrap_or_else(degrade)
    }

    pub fn with_lasa_pairs<I, A, B>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        self.lasa_pairs = pairs
            .into_iter()
            .map(|(a, b)| (a.as_ref().to_lowercase(), b.as_ref().to_lowercase()))
            .collect();
        self
    }

    pub fn with_specialty(mut self, code: &str, drugs: &[&str]) -> Self {
        self.specialty_drugs.insert(
            code.to_uppercase(),
            drugs.iter().map(|d| d.to_lowercase()).collect(),
        );
        self
    }
}

fn degrade<T: Default>(err: ReferenceDataError) -> T {
    warn!("Reference data unavailable, check disabled: {}", err);
    T::default()
}

fn read_file(path: &Path) -> Result<String, ReferenceDataError> {
    std::fs::read_to_string(path).map_err(|source| ReferenceDataError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parse a LASA pairs document
pub fn parse_lasa_pairs(
    content: &str,
    name: &str,
) -> Result<Vec<(String, String)>, ReferenceDataError> {
    let file: LasaFile = serde_json::from_str(content).map_err(|source| ReferenceDataError::Parse {
        name: name.to_string(),
        source,
    })?;
    debug!("Loaded {} LASA pairs from {}", file.pairs.len(), name);
    Ok(file
        .pairs
        .into_iter()
        .map(|p| (p.a.to_lowercase(), p.b.to_lowercase()))
        .collect())
}

/// Parse a specialty essential-drugs document
pub fn parse_specialty_drugs(
    content: &str,
    name: &str,
) -> Result<BTreeMap<String, Vec<String>>, ReferenceDataError> {
    let file: SpecialtyFile =
        serde_json::from_str(content).map_err(|source| ReferenceDataError::Parse {
            name: name.to_string(),
            source,
        })?;
    debug!("Loaded {} specialty drug lists from {}", file.specialties.len(), name);
    Ok(file
        .specialties
        .into_iter()
        .map(|(code, drugs)| {
            (
                code.to_uppercase(),
                drugs.into_iter().map(|d| d.to_lowercase()).collect(),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_tables_parse() {
        let data = ReferenceData::builtin();
        assert!(!data.lasa_pairs.is_empty());
        assert!(data.specialty_drugs.contains_key("CARDIOLOGY"));
        assert!(data
            .lasa_pairs
            .iter()
            .all(|(a, b)| a == &a.to_lowercase() && b == &b.to_lowercase()));
    }

    #[test]
    fn test_missing_files_degrade_to_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let data = ReferenceData::load(&dir.path().join("nope.json"), &dir.path().join("nada.json"));
        assert_eq!(data, ReferenceData::empty());
    }

    #[test]
    fn test_unparsable_file_degrades_only_that_table() {
        let dir = tempfile::tempdir().expect("temp dir");
        let lasa = dir.path().join("lasa.json");
        let specialty = dir.path().join("specialty.json");
        std::fs::File::create(&lasa)
            .and_then(|mut f| f.write_all(b"{ this is not json"))
            .expect("write lasa");
        std::fs::write(&specialty, r#"{"specialties": {"cardiology": ["Aspirin"]}}"#).expect("write specialty");

        let data = ReferenceData::load(&lasa, &specialty);
        assert!(data.lasa_pairs.is_empty());
        assert_eq!(data.specialty_drugs["CARDIOLOGY"], vec!["aspirin".to_string()]);
    }

    #[test]
    fn test_wrong_shape_is_a_parse_error() {
        let err = parse_lasa_pairs(r#"{"pairs": [{"a": 1}]}"#, "inline").expect_err("bad shape");
        assert!(matches!(err, ReferenceDataError::Parse { .. }));
    }
}
