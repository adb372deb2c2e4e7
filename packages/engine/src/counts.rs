//! Expected number of top-level subpoints per section.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::section::{child_parts, SectionKey};

/// Map from section to the number of lettered subpoints the source defines.
///
/// A missing or zero entry means the source sets no structural expectation
/// for that section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpectedCounts(BTreeMap<SectionKey, usize>);

impl ExpectedCounts {
    /// Expected subpoint count for `key` (0 when unknown).
    #[must_use]
    pub fn get(&self, key: SectionKey) -> usize {
        self.0.get(&key).copied().unwrap_or(0)
    }

    /// Set the expectation for one section.
    pub fn insert(&mut self, key: SectionKey, count: usize) {
        self.0.insert(key, count);
    }

    /// Whether no section carries an expectation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|c| *c == 0)
    }

    /// Iterate non-zero expectations in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, usize)> + '_ {
        self.0.iter().filter(|(_, c)| **c > 0).map(|(k, c)| (*k, *c))
    }
}

impl FromIterator<(SectionKey, usize)> for ExpectedCounts {
    fn from_iter<I: IntoIterator<Item = (SectionKey, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Count the exact `AnnexIV.<N>.<letter>` codes per section.
///
/// Parent codes and anything nested deeper than one letter are skipped.
/// The same letter appearing twice for a section is counted once.
pub fn expected_counts<'a, I>(codes: I) -> ExpectedCounts
where
    I: IntoIterator<Item = &'a str>,
{
    let mut letters: BTreeMap<SectionKey, BTreeSet<char>> = BTreeMap::new();
    for code in codes {
        let Some((index, letter)) = child_parts(code) else {
            continue;
        };
        if let Some(key) = SectionKey::from_index(index) {
            letters.entry(key).or_default().insert(letter);
        }
    }

    letters
        .into_iter()
        .map(|(key, set)| (key, set.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_exact_children_only() {
        let counts = expected_counts([
            "AnnexIV.1",
            "AnnexIV.1.a",
            "AnnexIV.1.b",
            "AnnexIV.1.a.extra",
            "AnnexIV.1.c1",
            "AnnexIV.2.a",
        ]);
        assert_eq!(counts.get(SectionKey::SystemOverview), 2);
        assert_eq!(counts.get(SectionKey::DevelopmentProcess), 1);
        assert_eq!(counts.get(SectionKey::SystemMonitoring), 0);
    }

    #[test]
    fn test_out_of_range_and_foreign_codes_ignored() {
        let counts = expected_counts(["AnnexIV.10.a", "AnnexIII.1.a", "AnnexIV.0.a"]);
        assert!(counts.is_empty());
        assert_eq!(counts.iter().count(), 0);
    }

    #[test]
    fn test_duplicate_letters_count_once() {
        let counts = expected_counts(["AnnexIV.3.a", "annexiv.3.A", "AnnexIV.3.b"]);
        assert_eq!(counts.get(SectionKey::SystemMonitoring), 2);
    }
}
