//! Canonical system record endpoints

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use habitta_common::db::models::HomeSystem;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ListSystemsResponse {
    pub systems: Vec<HomeSystem>,
}

/// GET /api/homes/:home_id/systems
///
/// Canonical records with full field values and provenance.
pub async fn list_systems(
    State(state): State<AppState>,
    Path(home_id): Path<Uuid>,
) -> Result<Json<ListSystemsResponse>, ApiError> {
    db::homes::require_home(&state.db, home_id).await?;
    let systems = db::systems::load_systems_for_home(&state.db, home_id).await?;
    Ok(Json(ListSystemsResponse { systems }))
}
