//! Field update resolver
//!
//! Resolves one incoming evidence payload against a system record's
//! existing field values and provenance. Each candidate field is
//! accepted, held for confirmation, or ignored based purely on the
//! authority model:
//!
//! - no existing provenance, or incoming rank higher: accept
//! - equal rank with a differing value: hold for human confirmation
//! - otherwise: ignore
//!
//! Held conflicts are a terminal state here. They are never resolved by
//! recency; only a later update from a higher-authority source writes
//! the field.

use crate::authority::UpdateSource;
use crate::confidence::system_confidence;
use crate::fields::{FieldProvenance, ObservedValue, ProvenanceMap, SystemField};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One evidence payload: a source, the fields it extracted, and when.
#[derive(Debug, Clone)]
pub struct FieldUpdate {
    pub source: UpdateSource,
    pub extracted: BTreeMap<SystemField, ObservedValue>,
    pub observed_at: DateTime<Utc>,
}

/// Equal-authority conflict preserved for human confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldField {
    pub field: SystemField,
    pub current_value: String,
    pub incoming_value: String,
    pub source: UpdateSource,
}

/// Full result of resolving one update against existing state.
///
/// `updated_fields` / `updated_provenance` are the complete post-update
/// sets (not diffs); callers persist them wholesale. `fields_updated`
/// and `fields_held` list what actually changed or conflicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub update_applied: bool,
    pub was_overwrite: bool,
    pub requires_confirmation: bool,
    pub updated_fields: BTreeMap<SystemField, String>,
    pub updated_provenance: ProvenanceMap,
    pub fields_updated: Vec<SystemField>,
    pub fields_held: Vec<HeldField>,
    pub confidence_delta: f64,
    pub new_confidence: f64,
}

/// Resolve `update` against the current field values and provenance.
///
/// Pure and idempotent: applying the same update to its own output
/// produces `update_applied = false` with identical field state.
pub fn resolve_field_updates(
    existing_fields: &BTreeMap<SystemField, String>,
    existing_provenance: &ProvenanceMap,
    update: &FieldUpdate,
) -> ResolutionOutcome {
    let confidence_before = system_confidence(existing_provenance);

    let mut updated_fields = existing_fields.clone();
    let mut updated_provenance = existing_provenance.clone();
    let mut fields_updated = Vec::new();
    let mut fields_held = Vec::new();
    let mut was_overwrite = false;

    for (field, observed) in &update.extracted {
        let incoming_rank = update.source.rank();

        match existing_provenance.get(field) {
            None => {
                // First evidence for this field
                updated_fields.insert(*field, observed.value.clone());
                updated_provenance.insert(
                    *field,
                    FieldProvenance {
                        source: update.source,
                        confidence: observed.confidence,
                        updated_at: update.observed_at,
                    },
                );
                fields_updated.push(*field);
            }
            Some(current) if incoming_rank > current.source.rank() => {
                if existing_fields.contains_key(field) {
                    was_overwrite = true;
                }
                updated_fields.insert(*field, observed.value.clone());
                updated_provenance.insert(
                    *field,
                    FieldProvenance {
                        source: update.source,
                        confidence: observed.confidence,
                        updated_at: update.observed_at,
                    },
                );
                fields_updated.push(*field);
            }
            Some(current) if incoming_rank == current.source.rank() => {
                let current_value = existing_fields.get(field);
                match current_value {
                    Some(value) if *value != observed.value => {
                        // Same authority, different value: held, never
                        // auto-resolved by recency
                        debug!(
                            field = %field,
                            source = %update.source,
                            "Equal-authority conflict held for confirmation"
                        );
                        fields_held.push(HeldField {
                            field: *field,
                            current_value: value.clone(),
                            incoming_value: observed.value.clone(),
                            source: update.source,
                        });
                    }
                    // Same value (or provenance without a stored value):
                    // nothing to do
                    _ => {}
                }
            }
            Some(_) => {
                // Lower authority: silently ignored
            }
        }
    }

    let new_confidence = system_confidence(&updated_provenance);

    ResolutionOutcome {
        update_applied: !fields_updated.is_empty(),
        was_overwrite,
        requires_confirmation: !fields_held.is_empty(),
        updated_fields,
        updated_provenance,
        fields_updated,
        fields_held,
        confidence_delta: new_confidence - confidence_before,
        new_confidence,
    }
}
