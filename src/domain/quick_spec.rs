//! Compact specification summary used for trim disambiguation
//!
//! A detail page advertises a short list of characteristics (engine
//! descriptor, power, gearbox, drive). After normalization the summary
//! becomes a [`QuickSpecSet`] whose values are compared against the candidate
//! blocks of a generation page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw quick-spec values exactly as read from a detail page, before any
/// normalization. Absent values stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuickSpecs {
    /// Combined engine descriptor, e.g. "бензин, 2.0 л" or "электро".
    pub engine: String,
    /// Power with the unit marker, e.g. "150 л.с.".
    pub power: String,
    pub gearbox: String,
    pub drive: String,
}

/// Fixed vocabulary of normalized quick-spec keys.
///
/// The engine descriptor splits into up to three independently-keyed
/// sub-tokens because the trim-candidate table lists fuel, displacement and
/// the hybrid marker as separate cells rather than one combined string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum QuickSpecKey {
    EngineFuel,
    EngineDisplacement,
    EngineHybrid,
    Power,
    Gearbox,
    Drive,
}

/// Normalized key→value map compared against trim candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickSpecSet {
    entries: BTreeMap<QuickSpecKey, String>,
}

impl QuickSpecSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: QuickSpecKey, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.entries.insert(key, value);
        }
    }

    pub fn get(&self, key: QuickSpecKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// Subset match: true iff every key present here has an equal value in
    /// `candidate`. The candidate may carry extra keys.
    pub fn matches(&self, candidate: &QuickSpecSet) -> bool {
        self.entries
            .iter()
            .all(|(key, value)| candidate.entries.get(key) == Some(value))
    }

    /// Number of values textually contained in `text`.
    pub fn coverage_in(&self, text: &str) -> usize {
        self.values().filter(|value| text.contains(value)).count()
    }

    /// True iff every value is textually contained in `text`. This is the
    /// selection criterion on generation pages: full coverage, not best-effort.
    pub fn fully_covered_by(&self, text: &str) -> bool {
        self.coverage_in(text) == self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(QuickSpecKey, &str)]) -> QuickSpecSet {
        let mut specs = QuickSpecSet::new();
        for (key, value) in entries {
            specs.insert(*key, *value);
        }
        specs
    }

    #[test]
    fn subset_match_ignores_extra_candidate_keys() {
        let vehicle = set(&[
            (QuickSpecKey::EngineFuel, "бензин"),
            (QuickSpecKey::Gearbox, "АКПП"),
        ]);
        let candidate = set(&[
            (QuickSpecKey::EngineFuel, "бензин"),
            (QuickSpecKey::Gearbox, "АКПП"),
            (QuickSpecKey::Drive, "полный"),
        ]);
        assert!(vehicle.matches(&candidate));
        assert!(!candidate.matches(&vehicle));
    }

    #[test]
    fn coverage_counts_contained_values() {
        let specs = set(&[
            (QuickSpecKey::EngineFuel, "бензин"),
            (QuickSpecKey::EngineDisplacement, "2.0"),
            (QuickSpecKey::Power, "150"),
        ]);
        let block = "2.0 л, 150 л.с., бензин, АКПП, передний привод";
        assert_eq!(specs.coverage_in(block), 3);
        assert!(specs.fully_covered_by(block));
        assert!(!specs.fully_covered_by("дизель 3.0"));
    }

    #[test]
    fn empty_values_are_not_stored() {
        let mut specs = QuickSpecSet::new();
        specs.insert(QuickSpecKey::Power, "");
        assert!(specs.is_empty());
    }
}
