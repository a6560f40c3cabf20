//! # Habitta Prediction Engine
//!
//! Pure domain core for the Habitta home-systems platform:
//! - Update source authority ranking and conflict resolution
//! - Field-level provenance and system confidence scoring
//! - Canonical record sync decisions (authority gate, photo dedup,
//!   install-year inference)
//! - Survival / lifecycle prediction per system
//! - Home Outlook aggregation across systems
//! - Maintenance alert scoring
//!
//! Everything in this crate is synchronous and side-effect free. Callers
//! own all I/O: they load records, invoke the engine, and persist the
//! results.

pub mod alerts;
pub mod authority;
pub mod confidence;
pub mod decisions;
pub mod fields;
pub mod outlook;
pub mod presentation;
pub mod resolver;
pub mod survival;
pub mod sync;

pub use authority::UpdateSource;
pub use fields::{FieldProvenance, ObservedValue, ProvenanceMap, SystemField};
pub use survival::{ClimateProfile, LifecycleStatus, SurvivalCore, SystemKind};
