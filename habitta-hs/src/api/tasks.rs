//! Maintenance task endpoints

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use habitta_common::db::models::TaskRecord;
use habitta_engine::alerts::{TaskCategory, TaskPriority};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub category: String,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub task_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<TaskRecord>,
}

/// POST /api/homes/:home_id/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Path(home_id): Path<Uuid>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<Json<CreateTaskResponse>, ApiError> {
    db::homes::require_home(&state.db, home_id).await?;

    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    let category = TaskCategory::from_str(&request.category)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown category '{}'", request.category)))?;
    let priority = TaskPriority::from_str(&request.priority)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown priority '{}'", request.priority)))?;

    let task = TaskRecord {
        guid: Uuid::new_v4(),
        home_id,
        title: request.title,
        category,
        priority,
        status: "pending".to_string(),
        due_date: request.due_date,
    };
    db::tasks::insert_task(&state.db, &task).await?;

    Ok(Json(CreateTaskResponse { task_id: task.guid }))
}

/// GET /api/homes/:home_id/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(home_id): Path<Uuid>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<ListTasksResponse>, ApiError> {
    db::homes::require_home(&state.db, home_id).await?;
    let tasks =
        db::tasks::load_tasks_with_status(&state.db, home_id, query.status.as_deref()).await?;
    Ok(Json(ListTasksResponse { tasks }))
}

/// POST /api/tasks/:task_id/complete
pub async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let completed = db::tasks::complete_task(&state.db, task_id).await?;
    if !completed {
        return Err(ApiError::NotFound(format!("task {task_id}")));
    }
    Ok(Json(serde_json::json!({ "completed": true })))
}
