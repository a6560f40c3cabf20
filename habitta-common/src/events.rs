//! Event types for the Habitta event system

use habitta_engine::{SystemField, SystemKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Habitta event types, broadcast over SSE to connected clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HabittaEvent {
    /// A system's canonical record changed meaningfully.
    ///
    /// Only emitted when the confidence delta passes the meaningful-delta
    /// gate; trivial re-extractions stay silent.
    SystemUpdated {
        home_id: Uuid,
        system_id: Uuid,
        kind: SystemKind,
        confidence: f64,
        confidence_delta: f64,
        fields_updated: Vec<SystemField>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An update produced equal-authority conflicts needing human review
    FieldsHeldForConfirmation {
        home_id: Uuid,
        system_id: Uuid,
        kind: SystemKind,
        fields_held: Vec<SystemField>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A homeowner decision was recorded
    DecisionRecorded {
        home_id: Uuid,
        system_id: Uuid,
        kind: SystemKind,
        decision_type: String,
        new_generation: Option<i64>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl HabittaEvent {
    /// SSE event name for this variant
    pub fn event_name(&self) -> &'static str {
        match self {
            HabittaEvent::SystemUpdated { .. } => "SystemUpdated",
            HabittaEvent::FieldsHeldForConfirmation { .. } => "FieldsHeldForConfirmation",
            HabittaEvent::DecisionRecorded { .. } => "DecisionRecorded",
        }
    }
}
