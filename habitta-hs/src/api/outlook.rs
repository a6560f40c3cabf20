//! Home outlook endpoint

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{Datelike, Utc};
use habitta_common::db::models::HomeSystem;
use habitta_common::params::PARAMS;
use habitta_engine::outlook::{
    compute_home_outlook, DataQuality, HomeOutlookResult, ReplacementWindow, SystemTimelineEntry,
};
use habitta_engine::survival::ClimateProfile;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct HomeOutlookResponse {
    pub status: &'static str,
    pub outlook: Option<HomeOutlookResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// GET /api/homes/:home_id/outlook
///
/// Weighted planning horizon across the home's systems. When no system
/// is datable the response is an explicit insufficient-data state, never
/// a zero.
pub async fn get_home_outlook(
    State(state): State<AppState>,
    Path(home_id): Path<Uuid>,
) -> Result<Json<HomeOutlookResponse>, ApiError> {
    db::homes::require_home(&state.db, home_id).await?;
    let systems = db::systems::load_systems_for_home(&state.db, home_id).await?;

    let profile = PARAMS.climate_profile();
    let entries: Vec<SystemTimelineEntry> = systems
        .iter()
        .map(|system| timeline_entry(system, &profile))
        .collect();

    match compute_home_outlook(&entries, Utc::now().year()) {
        Some(outlook) => Ok(Json(HomeOutlookResponse {
            status: "ok",
            outlook: Some(outlook),
            message: None,
        })),
        None => Ok(Json(HomeOutlookResponse {
            status: "insufficient_data",
            outlook: None,
            message: Some("Could not assess this home yet; more system information is needed."),
        })),
    }
}

/// Project a canonical record onto the outlook timeline.
///
/// The replacement window comes from the zone's lifespan band anchored
/// at the install year; records without an install year stay ineligible.
fn timeline_entry(system: &HomeSystem, profile: &ClimateProfile) -> SystemTimelineEntry {
    let band = profile.lifespan_band(system.kind);
    let replacement_window = system.install_year.map(|install| ReplacementWindow {
        early_year: install + band.early as i32,
        late_year: install + band.late as i32,
    });

    SystemTimelineEntry {
        system_id: system.guid,
        kind: system.kind,
        install_year: system.install_year,
        replacement_window,
        data_quality: DataQuality::from_confidence(system.confidence),
    }
}
