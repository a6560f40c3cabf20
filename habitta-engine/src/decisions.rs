//! Decision events and generation transitions
//!
//! A decision event is an immutable record of what the homeowner chose
//! to do about a system. `replace_now` is special: it starts a new
//! logical generation of the record, with risk back to baseline and
//! confidence dropped to the unverified level. The previous generation's
//! history is retained by the caller; nothing is hard-deleted.

use crate::authority::UpdateSource;
use crate::fields::ProvenanceMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Confidence assigned to a freshly replaced, not-yet-verified system.
pub const UNVERIFIED_CONFIDENCE: f64 = 0.3;

/// What the homeowner decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    ReplaceNow,
    DeferWithDate,
    ScheduleInspection,
    NoAction,
}

impl DecisionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "replace_now" => Some(DecisionType::ReplaceNow),
            "defer_with_date" => Some(DecisionType::DeferWithDate),
            "schedule_inspection" => Some(DecisionType::ScheduleInspection),
            "no_action" => Some(DecisionType::NoAction),
            _ => None,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            DecisionType::ReplaceNow => "replace_now",
            DecisionType::DeferWithDate => "defer_with_date",
            DecisionType::ScheduleInspection => "schedule_inspection",
            DecisionType::NoAction => "no_action",
        }
    }

    /// Only replacement starts a new record generation.
    pub fn starts_new_generation(&self) -> bool {
        matches!(self, DecisionType::ReplaceNow)
    }
}

/// State a canonical record resets to when a replacement decision lands.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReset {
    pub generation: i64,
    pub install_year: Option<i32>,
    pub install_source: UpdateSource,
    pub confidence: f64,
    pub provenance: ProvenanceMap,
    pub photo_hashes: BTreeSet<String>,
}

/// Compute the post-replacement state for a canonical record.
///
/// The new generation starts from the decision's declared install year
/// (if the homeowner supplied one) at unverified confidence, with all
/// field provenance and photo credit cleared. Evidence for the new
/// equipment re-accumulates from scratch.
pub fn replacement_reset(current_generation: i64, new_install_year: Option<i32>) -> GenerationReset {
    GenerationReset {
        generation: current_generation + 1,
        install_year: new_install_year,
        install_source: UpdateSource::UserConfirmed,
        confidence: UNVERIFIED_CONFIDENCE,
        provenance: ProvenanceMap::new(),
        photo_hashes: BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_round_trip() {
        for decision in [
            DecisionType::ReplaceNow,
            DecisionType::DeferWithDate,
            DecisionType::ScheduleInspection,
            DecisionType::NoAction,
        ] {
            assert_eq!(DecisionType::from_str(decision.as_db_str()), Some(decision));
        }
        assert_eq!(DecisionType::from_str("sell_house"), None);
    }

    #[test]
    fn test_only_replacement_starts_generation() {
        assert!(DecisionType::ReplaceNow.starts_new_generation());
        assert!(!DecisionType::DeferWithDate.starts_new_generation());
        assert!(!DecisionType::ScheduleInspection.starts_new_generation());
        assert!(!DecisionType::NoAction.starts_new_generation());
    }

    #[test]
    fn test_replacement_reset_clears_state() {
        let reset = replacement_reset(2, Some(2026));
        assert_eq!(reset.generation, 3);
        assert_eq!(reset.install_year, Some(2026));
        assert_eq!(reset.confidence, UNVERIFIED_CONFIDENCE);
        assert!(reset.provenance.is_empty());
        assert!(reset.photo_hashes.is_empty());
    }

    #[test]
    fn test_replacement_without_install_year() {
        let reset = replacement_reset(0, None);
        assert_eq!(reset.generation, 1);
        assert_eq!(reset.install_year, None);
    }
}
