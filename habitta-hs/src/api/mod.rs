//! HTTP API handlers

pub mod alerts;
pub mod decisions;
pub mod health;
pub mod homes;
pub mod outlook;
pub mod predictions;
pub mod sse;
pub mod systems;
pub mod tasks;
pub mod updates;

pub use alerts::list_alerts;
pub use decisions::{list_decisions, record_decision};
pub use health::health_check;
pub use homes::{create_home, get_home};
pub use outlook::get_home_outlook;
pub use predictions::get_system_prediction;
pub use sse::event_stream;
pub use systems::list_systems;
pub use tasks::{complete_task, create_task, list_tasks};
pub use updates::{list_update_history, submit_system_update};

use crate::error::ApiError;
use habitta_engine::SystemKind;

/// Parse a system kind path segment, rejecting unknown kinds
pub(crate) fn parse_kind(kind: &str) -> Result<SystemKind, ApiError> {
    SystemKind::from_str(kind)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown system kind '{kind}'")))
}
