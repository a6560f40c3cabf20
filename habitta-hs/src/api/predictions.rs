//! System prediction endpoint

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{Datelike, Duration, Utc};
use habitta_common::db::models::HomeSystem;
use habitta_common::params::PARAMS;
use habitta_engine::presentation::{build_prediction, SystemPrediction};
use habitta_engine::survival::{compute_survival, AgeEvidence};
use uuid::Uuid;

/// Maintenance counts as recent within this window
const RECENT_MAINTENANCE_DAYS: i64 = 365;

/// GET /api/homes/:home_id/systems/:kind/prediction
///
/// Survival core plus narrative presentation for one system. Read-only
/// derivation; nothing is persisted.
pub async fn get_system_prediction(
    State(state): State<AppState>,
    Path((home_id, kind)): Path<(Uuid, String)>,
) -> Result<Json<SystemPrediction>, ApiError> {
    let kind = super::parse_kind(&kind)?;
    let home = db::homes::require_home(&state.db, home_id).await?;
    let system = db::systems::load_system(&state.db, home_id, kind)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no {} record for home {}", kind, home_id)))?;

    let core = compute_survival(
        kind,
        &AgeEvidence {
            install_year: system.install_year,
            permit_replacement_year: None,
            permit_install_year: None,
            home_built_year: home.year_built,
        },
        has_recent_maintenance(&system),
        system.install_source,
        &PARAMS.climate_profile(),
        Utc::now().year(),
    );

    Ok(Json(build_prediction(kind, core)))
}

fn has_recent_maintenance(system: &HomeSystem) -> bool {
    system
        .last_maintenance_at
        .map(|at| Utc::now() - at <= Duration::days(RECENT_MAINTENANCE_DAYS))
        .unwrap_or(false)
}
