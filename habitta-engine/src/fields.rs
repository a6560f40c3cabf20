//! System fields and per-field provenance
//!
//! The engine tracks a closed set of identifying fields per system
//! (brand, model, manufacture year, serial, capacity rating, fuel type).
//! Each field carries provenance: which source last set it, with what
//! confidence, and when. Provenance is owned by its parent system record
//! and is the input to the weighted confidence score.

use crate::authority::UpdateSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Identifying fields tracked per system.
///
/// Closed enum: unknown field names fail validation when provenance is
/// deserialized from storage rather than being carried as opaque keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SystemField {
    Brand,
    Model,
    ManufactureYear,
    Serial,
    CapacityRating,
    FuelType,
}

impl SystemField {
    /// Weight of this field in the system confidence score.
    ///
    /// Weights sum to 1.0 across all fields, so a fully attested record
    /// with confidence 1.0 on every field scores exactly 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            SystemField::Brand => 0.25,
            SystemField::Model => 0.25,
            SystemField::ManufactureYear => 0.20,
            SystemField::Serial => 0.15,
            SystemField::CapacityRating => 0.10,
            SystemField::FuelType => 0.05,
        }
    }

    /// Parse canonical database string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "brand" => Some(SystemField::Brand),
            "model" => Some(SystemField::Model),
            "manufacture_year" => Some(SystemField::ManufactureYear),
            "serial" => Some(SystemField::Serial),
            "capacity_rating" => Some(SystemField::CapacityRating),
            "fuel_type" => Some(SystemField::FuelType),
            _ => None,
        }
    }

    /// Canonical database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            SystemField::Brand => "brand",
            SystemField::Model => "model",
            SystemField::ManufactureYear => "manufacture_year",
            SystemField::Serial => "serial",
            SystemField::CapacityRating => "capacity_rating",
            SystemField::FuelType => "fuel_type",
        }
    }

    /// All variants in canonical order.
    pub fn all_variants() -> &'static [SystemField] {
        &[
            SystemField::Brand,
            SystemField::Model,
            SystemField::ManufactureYear,
            SystemField::Serial,
            SystemField::CapacityRating,
            SystemField::FuelType,
        ]
    }
}

impl std::fmt::Display for SystemField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// A field value as reported by an evidence source, with the source's
/// confidence in that specific extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedValue {
    pub value: String,
    /// Extraction confidence (0.0-1.0), clamped on construction
    pub confidence: f64,
}

impl ObservedValue {
    pub fn new(value: impl Into<String>, confidence: f64) -> Self {
        Self {
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Per-field record of which source last set a value, with what
/// confidence, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub source: UpdateSource,
    pub confidence: f64,
    pub updated_at: DateTime<Utc>,
}

/// Provenance for every attested field of one system record.
///
/// Newtype over a sorted map so serialized JSON is stable and storage
/// round-trips are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvenanceMap(BTreeMap<SystemField, FieldProvenance>);

/// Provenance JSON failed validation against the closed field set.
#[derive(Debug, Error)]
#[error("invalid provenance record: {0}")]
pub struct ProvenanceError(String);

impl ProvenanceMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, field: &SystemField) -> Option<&FieldProvenance> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: SystemField, provenance: FieldProvenance) {
        self.0.insert(field, provenance);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SystemField, &FieldProvenance)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialize from the JSON stored in the systems table.
    ///
    /// Unknown field names or malformed source strings are an error:
    /// they indicate a broken writer, not missing data.
    pub fn from_json(json: &str) -> Result<Self, ProvenanceError> {
        serde_json::from_str(json).map_err(|e| ProvenanceError(e.to_string()))
    }

    /// Serialize for storage. Keys are canonical field names.
    pub fn to_json(&self) -> String {
        // Serialization of a string-keyed map cannot fail
        serde_json::to_string(self).expect("provenance map serializes")
    }
}

impl FromIterator<(SystemField, FieldProvenance)> for ProvenanceMap {
    fn from_iter<T: IntoIterator<Item = (SystemField, FieldProvenance)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provenance(source: UpdateSource, confidence: f64) -> FieldProvenance {
        FieldProvenance {
            source,
            confidence,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = SystemField::all_variants().iter().map(|f| f.weight()).sum();
        assert!((total - 1.0).abs() < 1e-9, "weights sum to {}", total);
    }

    #[test]
    fn test_field_round_trip() {
        for field in SystemField::all_variants() {
            assert_eq!(SystemField::from_str(field.as_db_str()), Some(*field));
        }
        assert_eq!(SystemField::from_str("install_year"), None);
    }

    #[test]
    fn test_observed_value_clamps_confidence() {
        assert_eq!(ObservedValue::new("Carrier", 1.7).confidence, 1.0);
        assert_eq!(ObservedValue::new("Carrier", -0.2).confidence, 0.0);
    }

    #[test]
    fn test_provenance_json_round_trip() {
        let mut map = ProvenanceMap::new();
        map.insert(
            SystemField::Brand,
            provenance(UpdateSource::PhotoAnalysis, 0.85),
        );
        map.insert(
            SystemField::Serial,
            provenance(UpdateSource::UserConfirmed, 0.95),
        );

        let json = map.to_json();
        let back = ProvenanceMap::from_json(&json).unwrap();
        assert_eq!(map, back);
    }

    #[test]
    fn test_provenance_rejects_unknown_field() {
        let json = r#"{"paint_color":{"source":"inferred","confidence":0.2,"updated_at":"2025-01-01T00:00:00Z"}}"#;
        assert!(ProvenanceMap::from_json(json).is_err());
    }

    #[test]
    fn test_provenance_rejects_unknown_source() {
        let json = r#"{"brand":{"source":"psychic","confidence":0.2,"updated_at":"2025-01-01T00:00:00Z"}}"#;
        assert!(ProvenanceMap::from_json(json).is_err());
    }
}
