//! Canonical sync orchestration
//!
//! Read-modify-write pipeline for one evidence payload: load the
//! canonical record, run the pure field resolver and sync evaluation,
//! persist the result, append the audit row, and broadcast events.
//! Serialized per (home, kind) through the state's update locks — the
//! pure engine has no locking of its own.

use crate::db;
use crate::AppState;
use chrono::Utc;
use habitta_common::db::models::{Home, HomeSystem, SystemUpdateLog, UpdateOutcome};
use habitta_common::params::PARAMS;
use habitta_common::{HabittaEvent, Result};
use habitta_engine::confidence::is_meaningful_delta_with;
use habitta_engine::fields::ObservedValue;
use habitta_engine::resolver::{resolve_field_updates, FieldUpdate, ResolutionOutcome};
use habitta_engine::sync::{
    evaluate_sync, CanonicalSnapshot, IncomingSync, InstallYearEstimate, SyncDecision, SyncReason,
};
use habitta_engine::{SystemField, SystemKind, UpdateSource};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

/// One normalized evidence payload from a producer
#[derive(Debug, Clone)]
pub struct EvidencePayload {
    pub source: UpdateSource,
    pub extracted: BTreeMap<SystemField, ObservedValue>,
    /// Opaque id of the photo evidence this payload came from, if any
    pub photo_evidence_id: Option<String>,
}

/// Everything a caller needs to report about one processed update
#[derive(Debug, Clone)]
pub struct ProcessedUpdate {
    pub system_id: Uuid,
    pub reason: SyncReason,
    pub outcome: ResolutionOutcome,
    pub install_year: Option<InstallYearEstimate>,
    pub confidence_before: f64,
    pub confidence_after: f64,
    /// Whether the confidence delta passed the meaningful-delta gate
    pub meaningful_delta: bool,
}

/// Process one evidence payload against the canonical record for
/// (home, kind).
pub async fn process_system_update(
    state: &AppState,
    home_id: Uuid,
    kind: SystemKind,
    payload: EvidencePayload,
) -> Result<ProcessedUpdate> {
    // At most one in-flight update per canonical record
    let lock = state.update_lock(home_id, kind).await;
    let _guard = lock.lock().await;

    let home = db::homes::require_home(&state.db, home_id).await?;
    let existing = db::systems::load_system(&state.db, home_id, kind).await?;

    let photo_hash = payload.photo_evidence_id.as_deref().map(photo_evidence_hash);

    // Duplicate photo short-circuits before any resolution: the same
    // image must never be credited twice
    if let (Some(record), Some(hash)) = (&existing, &photo_hash) {
        if record.photo_hashes.contains(hash) {
            debug!(system_id = %record.guid, "Duplicate photo evidence ignored");
            let processed = duplicate_noop(record);
            append_audit(state, &processed, payload.source).await?;
            return Ok(processed);
        }
    }

    let confidence_before = existing.as_ref().map(|r| r.confidence).unwrap_or(0.0);

    // Pure field-level resolution
    let update = FieldUpdate {
        source: payload.source,
        extracted: payload.extracted.clone(),
        observed_at: Utc::now(),
    };
    let (current_fields, current_provenance) = match &existing {
        Some(record) => (record.fields.clone(), record.provenance.clone()),
        None => (BTreeMap::new(), Default::default()),
    };
    let outcome = resolve_field_updates(&current_fields, &current_provenance, &update);

    // Pure canonical sync evaluation (install-year projection)
    let manufacture_year = extract_manufacture_year(&payload.extracted);
    let snapshot = existing.as_ref().map(|record| CanonicalSnapshot {
        install_source: record.install_source,
        confidence: record.confidence,
        photo_hashes: record.photo_hashes.clone(),
    });
    let incoming = IncomingSync {
        source: payload.source,
        confidence: outcome.new_confidence,
        manufacture_year,
        photo_sha256: photo_hash.clone(),
    };
    let decision = evaluate_sync(snapshot.as_ref(), &incoming, &PARAMS.sync_config());

    let processed = match decision {
        SyncDecision::Apply {
            create,
            reason,
            new_confidence,
            install_year,
        } => {
            let record = if create {
                new_canonical_record(&home, kind, &payload, &outcome, new_confidence, install_year, &photo_hash)
            } else {
                // Unwrap is safe: create=false only when a record exists
                let mut record = existing.expect("record exists for non-create apply");
                record.fields = outcome.updated_fields.clone();
                record.provenance = outcome.updated_provenance.clone();
                record.confidence = new_confidence;
                if let Some(estimate) = install_year {
                    record.install_year = Some(estimate.year);
                    record.install_year_estimated = estimate.is_estimated;
                    record.install_year_basis = Some(estimate.basis);
                    record.install_source = payload.source;
                }
                record.data_sources.insert(payload.source.as_db_str().to_string());
                if let Some(hash) = &photo_hash {
                    record.photo_hashes.insert(hash.clone());
                }
                if let Some(evidence_id) = &payload.photo_evidence_id {
                    record.images.push(evidence_id.clone());
                }
                record
            };

            db::systems::save_system(&state.db, &record).await?;
            info!(
                system_id = %record.guid,
                kind = %kind,
                source = %payload.source,
                confidence = record.confidence,
                "Canonical record synced"
            );

            ProcessedUpdate {
                system_id: record.guid,
                reason,
                install_year,
                confidence_before,
                confidence_after: record.confidence,
                meaningful_delta: gate(record.confidence - confidence_before),
                outcome,
            }
        }
        SyncDecision::Reject { reason } => {
            // The install-year projection is protected by a higher
            // authority, but field-level changes that passed per-field
            // authority still persist
            let mut record = existing.expect("reject only against an existing record");
            let confidence_after = if outcome.update_applied {
                record.fields = outcome.updated_fields.clone();
                record.provenance = outcome.updated_provenance.clone();
                record.confidence = outcome.new_confidence.max(record.confidence);
                record.data_sources.insert(payload.source.as_db_str().to_string());
                db::systems::save_system(&state.db, &record).await?;
                record.confidence
            } else {
                record.confidence
            };

            ProcessedUpdate {
                system_id: record.guid,
                reason,
                install_year: None,
                confidence_before,
                confidence_after,
                meaningful_delta: gate(confidence_after - confidence_before),
                outcome,
            }
        }
        SyncDecision::Skip { reason } => {
            // Pre-checked above; kept for completeness
            let record = existing.expect("skip only against an existing record");
            ProcessedUpdate {
                system_id: record.guid,
                reason,
                install_year: None,
                confidence_before,
                confidence_after: record.confidence,
                meaningful_delta: false,
                outcome,
            }
        }
    };

    append_audit(state, &processed, payload.source).await?;
    broadcast_events(state, home_id, kind, &processed);

    Ok(processed)
}

/// SHA-256 of the photo evidence id, hex-encoded
fn photo_evidence_hash(evidence_id: &str) -> String {
    let digest = Sha256::digest(evidence_id.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Manufacture year plus its extraction confidence, when present and numeric
fn extract_manufacture_year(
    extracted: &BTreeMap<SystemField, ObservedValue>,
) -> Option<(i32, f64)> {
    let observed = extracted.get(&SystemField::ManufactureYear)?;
    let year: i32 = observed.value.trim().parse().ok()?;
    Some((year, observed.confidence))
}

fn new_canonical_record(
    home: &Home,
    kind: SystemKind,
    payload: &EvidencePayload,
    outcome: &ResolutionOutcome,
    confidence: f64,
    install_year: Option<InstallYearEstimate>,
    photo_hash: &Option<String>,
) -> HomeSystem {
    info!(
        home_id = %home.guid,
        owner = %home.owner_user_id,
        kind = %kind,
        "Creating canonical record"
    );
    HomeSystem {
        guid: Uuid::new_v4(),
        home_id: home.guid,
        kind,
        generation: 0,
        install_year: install_year.map(|e| e.year),
        install_year_estimated: install_year.map(|e| e.is_estimated).unwrap_or(false),
        install_year_basis: install_year.map(|e| e.basis),
        install_source: payload.source,
        confidence,
        fields: outcome.updated_fields.clone(),
        provenance: outcome.updated_provenance.clone(),
        data_sources: [payload.source.as_db_str().to_string()].into_iter().collect(),
        photo_hashes: photo_hash.iter().cloned().collect(),
        images: payload.photo_evidence_id.iter().cloned().collect(),
        last_maintenance_at: None,
        updated_at: Utc::now(),
    }
}

/// No-op result for a duplicate photo against an existing record
fn duplicate_noop(record: &HomeSystem) -> ProcessedUpdate {
    ProcessedUpdate {
        system_id: record.guid,
        reason: SyncReason::DuplicatePhoto,
        outcome: ResolutionOutcome {
            update_applied: false,
            was_overwrite: false,
            requires_confirmation: false,
            updated_fields: record.fields.clone(),
            updated_provenance: record.provenance.clone(),
            fields_updated: Vec::new(),
            fields_held: Vec::new(),
            confidence_delta: 0.0,
            new_confidence: record.confidence,
        },
        install_year: None,
        confidence_before: record.confidence,
        confidence_after: record.confidence,
        meaningful_delta: false,
    }
}

fn gate(delta: f64) -> bool {
    is_meaningful_delta_with(delta, PARAMS.meaningful_delta_threshold_value())
}

async fn append_audit(
    state: &AppState,
    processed: &ProcessedUpdate,
    source: UpdateSource,
) -> Result<()> {
    let outcome_class = if processed.reason == SyncReason::DuplicatePhoto {
        UpdateOutcome::DuplicatePhoto
    } else if processed.outcome.update_applied {
        UpdateOutcome::Applied
    } else if processed.outcome.requires_confirmation {
        UpdateOutcome::Held
    } else {
        UpdateOutcome::Rejected
    };

    db::updates::insert_update_log(
        &state.db,
        &SystemUpdateLog {
            guid: Uuid::new_v4(),
            system_id: processed.system_id,
            source,
            outcome: outcome_class,
            fields_updated: processed.outcome.fields_updated.clone(),
            fields_held: processed
                .outcome
                .fields_held
                .iter()
                .map(|held| held.field)
                .collect(),
            confidence_before: processed.confidence_before,
            confidence_after: processed.confidence_after,
            created_at: Utc::now(),
        },
    )
    .await
}

fn broadcast_events(state: &AppState, home_id: Uuid, kind: SystemKind, processed: &ProcessedUpdate) {
    // Recompute-triggering event only fires past the delta gate
    if processed.meaningful_delta {
        state.events.broadcast_lossy(HabittaEvent::SystemUpdated {
            home_id,
            system_id: processed.system_id,
            kind,
            confidence: processed.confidence_after,
            confidence_delta: processed.confidence_after - processed.confidence_before,
            fields_updated: processed.outcome.fields_updated.clone(),
            timestamp: Utc::now(),
        });
    }

    if processed.outcome.requires_confirmation {
        state
            .events
            .broadcast_lossy(HabittaEvent::FieldsHeldForConfirmation {
                home_id,
                system_id: processed.system_id,
                kind,
                fields_held: processed
                    .outcome
                    .fields_held
                    .iter()
                    .map(|held| held.field)
                    .collect(),
                timestamp: Utc::now(),
            });
    }
}
