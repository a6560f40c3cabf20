//! Database models
//!
//! Typed in-memory forms of the persisted rows. Enum-valued columns are
//! parsed at the storage boundary; an unknown string there means a
//! corrupt row, surfaced as an error rather than a defaulted value.

use chrono::{DateTime, NaiveDate, Utc};
use habitta_engine::alerts::{TaskCategory, TaskPriority};
use habitta_engine::sync::InstallYearBasis;
use habitta_engine::{ProvenanceMap, SystemField, SystemKind, UpdateSource};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Home {
    pub guid: Uuid,
    pub owner_user_id: String,
    pub address: Option<String>,
    pub year_built: Option<i32>,
    pub climate_zone: String,
}

/// The canonical per-(home, kind) system record.
///
/// Everything downstream (survival, outlook, chat) reads this struct;
/// raw evidence never leaves the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeSystem {
    pub guid: Uuid,
    pub home_id: Uuid,
    pub kind: SystemKind,
    pub generation: i64,
    pub install_year: Option<i32>,
    pub install_year_estimated: bool,
    pub install_year_basis: Option<InstallYearBasis>,
    pub install_source: UpdateSource,
    pub confidence: f64,
    pub fields: BTreeMap<SystemField, String>,
    pub provenance: ProvenanceMap,
    /// Evidence origins that have contributed to this record
    pub data_sources: BTreeSet<String>,
    /// SHA-256 hashes of photo evidence already credited
    pub photo_hashes: BTreeSet<String>,
    /// Photo evidence ids in the order they arrived
    pub images: Vec<String>,
    pub last_maintenance_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome class of one audited resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    Applied,
    Held,
    Rejected,
    DuplicatePhoto,
}

impl UpdateOutcome {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "applied" => Some(UpdateOutcome::Applied),
            "held" => Some(UpdateOutcome::Held),
            "rejected" => Some(UpdateOutcome::Rejected),
            "duplicate_photo" => Some(UpdateOutcome::DuplicatePhoto),
            _ => None,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            UpdateOutcome::Applied => "applied",
            UpdateOutcome::Held => "held",
            UpdateOutcome::Rejected => "rejected",
            UpdateOutcome::DuplicatePhoto => "duplicate_photo",
        }
    }
}

/// One audit-log row for a processed update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemUpdateLog {
    pub guid: Uuid,
    pub system_id: Uuid,
    pub source: UpdateSource,
    pub outcome: UpdateOutcome,
    pub fields_updated: Vec<SystemField>,
    pub fields_held: Vec<SystemField>,
    pub confidence_before: f64,
    pub confidence_after: f64,
    pub created_at: DateTime<Utc>,
}

/// Append-only homeowner decision tied to a record generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionEventRecord {
    pub guid: Uuid,
    pub system_id: Uuid,
    pub generation: i64,
    pub decision_type: String,
    pub assumptions: Option<serde_json::Value>,
    pub user_notes: Option<String>,
    pub defer_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub guid: Uuid,
    pub home_id: Uuid,
    pub title: String,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub status: String,
    pub due_date: Option<NaiveDate>,
}
