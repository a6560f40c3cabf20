//! Home endpoints

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use habitta_common::db::models::Home;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateHomeRequest {
    pub owner_user_id: String,
    pub address: Option<String>,
    pub year_built: Option<i32>,
    pub climate_zone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateHomeResponse {
    pub home_id: Uuid,
}

/// POST /api/homes
pub async fn create_home(
    State(state): State<AppState>,
    Json(request): Json<CreateHomeRequest>,
) -> Result<Json<CreateHomeResponse>, ApiError> {
    if request.owner_user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("owner_user_id must not be empty".to_string()));
    }

    let home = Home {
        guid: Uuid::new_v4(),
        owner_user_id: request.owner_user_id,
        address: request.address,
        year_built: request.year_built,
        climate_zone: request.climate_zone.unwrap_or_else(|| "hot_humid".to_string()),
    };
    db::homes::insert_home(&state.db, &home).await?;

    Ok(Json(CreateHomeResponse { home_id: home.guid }))
}

/// GET /api/homes/:home_id
pub async fn get_home(
    State(state): State<AppState>,
    Path(home_id): Path<Uuid>,
) -> Result<Json<Home>, ApiError> {
    let home = db::homes::require_home(&state.db, home_id).await?;
    Ok(Json(home))
}
