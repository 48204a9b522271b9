//! Duplicate code detection
//!
//! Groups codes under a key (parent node, unit, or a single branch-wide
//! key) and totals the occurrences of every code that appears more than
//! once in its group. Three siblings sharing a code contribute 3.

use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::hash::Hash;

/// How codes are normalized before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCase {
    /// Compare codes exactly as entered
    Preserve,
    /// Compare codes case-insensitively (ASCII uppercase)
    Upper,
}

impl CodeCase {
    fn normalize<'a>(&self, code: &'a str) -> Cow<'a, str> {
        match self {
            CodeCase::Preserve => Cow::Borrowed(code),
            CodeCase::Upper => Cow::Owned(code.to_ascii_uppercase()),
        }
    }
}

/// Total occurrences of codes that repeat within their group.
///
/// Blank or missing codes are ignored.
pub fn duplicate_total<'a, K, I>(pairs: I, case: CodeCase) -> usize
where
    K: Eq + Hash,
    I: IntoIterator<Item = (K, Option<&'a str>)>,
{
    let mut groups: FxHashMap<K, FxHashMap<Cow<'a, str>, usize>> = FxHashMap::default();

    for (key, code) in pairs {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            continue;
        };
        *groups
            .entry(key)
            .or_default()
            .entry(case.normalize(code))
            .or_insert(0) += 1;
    }

    groups
        .values()
        .flat_map(|codes| codes.values())
        .filter(|&&count| count > 1)
        .sum()
}
