//! Decision event endpoint
//!
//! Records homeowner decisions against a system generation. A
//! `replace_now` decision also starts the next generation: the record
//! resets to baseline risk and unverified confidence, and evidence for
//! the new equipment accumulates from scratch. History is append-only.

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use habitta_common::db::models::DecisionEventRecord;
use habitta_common::HabittaEvent;
use habitta_engine::decisions::{replacement_reset, DecisionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RecordDecisionRequest {
    /// One of: replace_now, defer_with_date, schedule_inspection, no_action
    pub decision_type: String,
    /// Free-form snapshot of the assumptions behind the decision
    pub assumptions: Option<serde_json::Value>,
    pub user_notes: Option<String>,
    pub defer_until: Option<NaiveDate>,
    /// Install year of the replacement equipment (replace_now only)
    pub new_install_year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RecordDecisionResponse {
    pub decision_id: Uuid,
    pub system_id: Uuid,
    pub decision_type: String,
    /// Present when the decision started a new generation
    pub new_generation: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DecisionHistoryResponse {
    pub decisions: Vec<DecisionEventRecord>,
}

/// GET /api/homes/:home_id/systems/:kind/decisions
///
/// Append-only decision history, newest first.
pub async fn list_decisions(
    State(state): State<AppState>,
    Path((home_id, kind)): Path<(Uuid, String)>,
) -> Result<Json<DecisionHistoryResponse>, ApiError> {
    let kind = super::parse_kind(&kind)?;
    db::homes::require_home(&state.db, home_id).await?;
    let system = db::systems::load_system(&state.db, home_id, kind)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no {} record for home {}", kind, home_id)))?;

    let decisions = db::decisions::load_decisions(&state.db, system.guid).await?;
    Ok(Json(DecisionHistoryResponse { decisions }))
}

/// POST /api/homes/:home_id/systems/:kind/decisions
pub async fn record_decision(
    State(state): State<AppState>,
    Path((home_id, kind)): Path<(Uuid, String)>,
    Json(request): Json<RecordDecisionRequest>,
) -> Result<Json<RecordDecisionResponse>, ApiError> {
    let kind = super::parse_kind(&kind)?;
    let decision_type = DecisionType::from_str(&request.decision_type).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown decision type '{}'", request.decision_type))
    })?;

    // Serialize against concurrent evidence updates for this record
    let lock = state.update_lock(home_id, kind).await;
    let _guard = lock.lock().await;

    db::homes::require_home(&state.db, home_id).await?;
    let mut system = db::systems::load_system(&state.db, home_id, kind)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no {} record for home {}", kind, home_id)))?;

    let event = DecisionEventRecord {
        guid: Uuid::new_v4(),
        system_id: system.guid,
        generation: system.generation,
        decision_type: decision_type.as_db_str().to_string(),
        assumptions: request.assumptions,
        user_notes: request.user_notes,
        defer_until: request.defer_until,
        created_at: Utc::now(),
    };
    db::decisions::insert_decision(&state.db, &event).await?;

    let new_generation = if decision_type.starts_new_generation() {
        let reset = replacement_reset(system.generation, request.new_install_year);
        system.generation = reset.generation;
        system.install_year = reset.install_year;
        system.install_year_estimated = false;
        system.install_year_basis = None;
        system.install_source = reset.install_source;
        system.confidence = reset.confidence;
        system.provenance = reset.provenance;
        system.fields = BTreeMap::new();
        system.photo_hashes = reset.photo_hashes;
        system.images = Vec::new();
        system.last_maintenance_at = None;
        db::systems::save_system(&state.db, &system).await?;

        info!(
            system_id = %system.guid,
            generation = system.generation,
            "Replacement recorded, new generation started"
        );
        Some(system.generation)
    } else {
        None
    };

    state.events.broadcast_lossy(HabittaEvent::DecisionRecorded {
        home_id,
        system_id: system.guid,
        kind,
        decision_type: decision_type.as_db_str().to_string(),
        new_generation,
        timestamp: Utc::now(),
    });

    Ok(Json(RecordDecisionResponse {
        decision_id: event.guid,
        system_id: system.guid,
        decision_type: decision_type.as_db_str().to_string(),
        new_generation,
    }))
}
