//! Evidence submission endpoint
//!
//! Evidence producers (photo analysis, permit ingestion, user
//! confirmation) POST their extracted fields here. The payload is
//! normalized into engine types at this boundary: unknown sources are a
//! 400, unknown field names are skipped (they are outside the weighted
//! field set and carry no weight).

use crate::error::ApiError;
use crate::sync::{process_system_update, EvidencePayload};
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use habitta_engine::fields::ObservedValue;
use habitta_engine::resolver::HeldField;
use habitta_engine::sync::{InstallYearEstimate, SyncReason};
use habitta_engine::{SystemField, UpdateSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SubmitUpdateRequest {
    /// Evidence source, e.g. "photo_analysis"
    pub source: String,
    /// Extracted field values keyed by field name
    pub extracted: BTreeMap<String, ObservedField>,
    /// Opaque id of the photo this extraction came from, for dedup
    pub photo_evidence_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ObservedField {
    pub value: String,
    pub confidence: f64,
}

#[derive(Debug, Serialize)]
pub struct SubmitUpdateResponse {
    pub system_id: Uuid,
    pub reason: SyncReason,
    pub update_applied: bool,
    pub was_overwrite: bool,
    pub requires_confirmation: bool,
    pub fields_updated: Vec<SystemField>,
    pub fields_held: Vec<HeldField>,
    pub install_year: Option<InstallYearEstimate>,
    pub confidence_before: f64,
    pub confidence_after: f64,
    pub meaningful_delta: bool,
}

#[derive(Debug, Serialize)]
pub struct UpdateHistoryResponse {
    pub updates: Vec<habitta_common::db::models::SystemUpdateLog>,
}

/// GET /api/homes/:home_id/systems/:kind/updates
///
/// Audit history of processed evidence, newest first.
pub async fn list_update_history(
    State(state): State<AppState>,
    Path((home_id, kind)): Path<(Uuid, String)>,
) -> Result<Json<UpdateHistoryResponse>, ApiError> {
    let kind = super::parse_kind(&kind)?;
    crate::db::homes::require_home(&state.db, home_id).await?;
    let system = crate::db::systems::load_system(&state.db, home_id, kind)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no {} record for home {}", kind, home_id)))?;

    let updates = crate::db::updates::load_update_history(&state.db, system.guid).await?;
    Ok(Json(UpdateHistoryResponse { updates }))
}

/// POST /api/homes/:home_id/systems/:kind/updates
pub async fn submit_system_update(
    State(state): State<AppState>,
    Path((home_id, kind)): Path<(Uuid, String)>,
    Json(request): Json<SubmitUpdateRequest>,
) -> Result<Json<SubmitUpdateResponse>, ApiError> {
    let kind = super::parse_kind(&kind)?;
    let source = UpdateSource::from_str(&request.source)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown source '{}'", request.source)))?;

    let mut extracted = BTreeMap::new();
    for (name, observed) in request.extracted {
        match SystemField::from_str(&name) {
            Some(field) => {
                extracted.insert(field, ObservedValue::new(observed.value, observed.confidence));
            }
            None => {
                // Outside the weighted field set: contributes nothing
                debug!(field = %name, "Skipping unweighted extracted field");
            }
        }
    }
    if extracted.is_empty() && request.photo_evidence_id.is_none() {
        return Err(ApiError::BadRequest(
            "update contains no recognized fields or photo evidence".to_string(),
        ));
    }

    let processed = process_system_update(
        &state,
        home_id,
        kind,
        EvidencePayload {
            source,
            extracted,
            photo_evidence_id: request.photo_evidence_id,
        },
    )
    .await?;

    Ok(Json(SubmitUpdateResponse {
        system_id: processed.system_id,
        reason: processed.reason,
        update_applied: processed.outcome.update_applied,
        was_overwrite: processed.outcome.was_overwrite,
        requires_confirmation: processed.outcome.requires_confirmation,
        fields_updated: processed.outcome.fields_updated,
        fields_held: processed.outcome.fields_held,
        install_year: processed.install_year,
        confidence_before: processed.confidence_before,
        confidence_after: processed.confidence_after,
        meaningful_delta: processed.meaningful_delta,
    }))
}
