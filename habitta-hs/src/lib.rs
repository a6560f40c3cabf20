//! habitta-hs library - Home Systems service
//!
//! Ingests system evidence, maintains the canonical per-(home, kind)
//! records, and serves predictions, the home outlook, alerts, and
//! decision recording over HTTP.

use axum::Router;
use habitta_common::sse::EventBroadcaster;
use habitta_engine::SystemKind;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub mod api;
pub mod db;
pub mod error;
pub mod sync;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// SSE event fan-out
    pub events: EventBroadcaster,
    /// Per-(home, kind) update serialization.
    ///
    /// The resolver is pure read-modify-write with no locking of its
    /// own, so the service guarantees at most one in-flight update per
    /// canonical record.
    update_locks: Arc<Mutex<HashMap<(Uuid, SystemKind), Arc<Mutex<()>>>>>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            events: EventBroadcaster::default(),
            update_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Lock guarding updates for one canonical record
    pub async fn update_lock(&self, home_id: Uuid, kind: SystemKind) -> Arc<Mutex<()>> {
        let mut locks = self.update_locks.lock().await;
        locks
            .entry((home_id, kind))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/events", get(api::event_stream))
        .route("/api/homes", post(api::create_home))
        .route("/api/homes/:home_id", get(api::get_home))
        .route("/api/homes/:home_id/systems", get(api::list_systems))
        .route(
            "/api/homes/:home_id/systems/:kind/updates",
            post(api::submit_system_update).get(api::list_update_history),
        )
        .route(
            "/api/homes/:home_id/systems/:kind/prediction",
            get(api::get_system_prediction),
        )
        .route(
            "/api/homes/:home_id/systems/:kind/decisions",
            post(api::record_decision).get(api::list_decisions),
        )
        .route("/api/homes/:home_id/outlook", get(api::get_home_outlook))
        .route("/api/homes/:home_id/alerts", get(api::list_alerts))
        .route("/api/homes/:home_id/tasks", get(api::list_tasks).post(api::create_task))
        .route("/api/tasks/:task_id/complete", post(api::complete_task))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
