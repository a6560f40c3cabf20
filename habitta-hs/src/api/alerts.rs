//! Maintenance alert endpoint

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use habitta_common::params::PARAMS;
use habitta_engine::alerts::{generate_alerts_from_tasks, Alert, MaintenanceTask};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ListAlertsResponse {
    pub alerts: Vec<Alert>,
}

/// GET /api/homes/:home_id/alerts
///
/// Ranked alerts derived from the home's pending tasks. Tasks under the
/// noise floor are not included.
pub async fn list_alerts(
    State(state): State<AppState>,
    Path(home_id): Path<Uuid>,
) -> Result<Json<ListAlertsResponse>, ApiError> {
    db::homes::require_home(&state.db, home_id).await?;
    let tasks = db::tasks::load_pending_tasks(&state.db, home_id).await?;

    let engine_tasks: Vec<MaintenanceTask> = tasks
        .into_iter()
        .map(|task| MaintenanceTask {
            id: task.guid,
            title: task.title,
            category: task.category,
            priority: task.priority,
            due_date: task.due_date,
        })
        .collect();

    let alerts = generate_alerts_from_tasks(
        &engine_tasks,
        &PARAMS.alert_config(),
        Utc::now().date_naive(),
    );

    Ok(Json(ListAlertsResponse { alerts }))
}
