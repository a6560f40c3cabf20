//! Global parameter management
//!
//! Centralized singleton for all settings-table-backed runtime
//! parameters. Read-frequently, write-rarely access pattern using
//! RwLock: request handlers read on every prediction, writes happen at
//! startup and on settings changes.
//!
//! # Usage
//!
//! ```rust
//! use habitta_common::params::PARAMS;
//!
//! let profile = PARAMS.climate_profile();
//! let floor = *PARAMS.alert_score_floor.read().unwrap();
//! ```

use habitta_engine::alerts::AlertConfig;
use habitta_engine::survival::ClimateProfile;
use habitta_engine::sync::SyncConfig;
use once_cell::sync::Lazy;
use std::sync::RwLock;

mod init;
mod metadata;
mod setters;
#[cfg(test)]
mod tests;

pub use metadata::ParamMetadata;

/// Global parameters singleton
///
/// Initialized once from the settings table, read everywhere.
pub static PARAMS: Lazy<GlobalParams> = Lazy::new(GlobalParams::default);

/// Global parameter storage
///
/// All parameters stored with RwLock for thread-safe access. Readers
/// don't block each other.
pub struct GlobalParams {
    /// Climate zone identifier for the served region
    ///
    /// Default: "hot_humid"
    pub climate_zone: RwLock<String>,

    /// Lifespan multiplier for climate stress
    ///
    /// Valid range: [0.5, 1.2]
    /// Default: 0.85
    pub climate_lifespan_multiplier: RwLock<f64>,

    /// Lifespan multiplier applied when recent maintenance is on record
    ///
    /// Valid range: [1.0, 1.5]
    /// Default: 1.1
    pub maintenance_lifespan_bonus: RwLock<f64>,

    /// Confidence delta below which downstream recompute is skipped
    ///
    /// Valid range: [0.0, 0.5]
    /// Default: 0.05
    pub meaningful_delta_threshold: RwLock<f64>,

    /// Extraction confidence at or above which a manufacture year is
    /// treated as serial-decoded
    ///
    /// Valid range: [0.0, 1.0]
    /// Default: 0.7
    pub serial_decode_threshold: RwLock<f64>,

    /// Inventory buffer added to low-confidence manufacture years
    ///
    /// Valid range: [0, 5] years
    /// Default: 1
    pub install_year_inventory_buffer: RwLock<i64>,

    /// Alert composite weight for urgency
    ///
    /// Valid range: [0.0, 1.0]
    /// Default: 0.45
    pub alert_urgency_weight: RwLock<f64>,

    /// Alert composite weight for impact
    ///
    /// Valid range: [0.0, 1.0]
    /// Default: 0.35
    pub alert_impact_weight: RwLock<f64>,

    /// Alert composite weight for safety
    ///
    /// Valid range: [0.0, 1.0]
    /// Default: 0.20
    pub alert_safety_weight: RwLock<f64>,

    /// Alerts scoring below this are suppressed
    ///
    /// Valid range: [0, 100]
    /// Default: 20
    pub alert_score_floor: RwLock<i64>,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            climate_zone: RwLock::new("hot_humid".to_string()),
            climate_lifespan_multiplier: RwLock::new(0.85),
            maintenance_lifespan_bonus: RwLock::new(1.1),
            meaningful_delta_threshold: RwLock::new(0.05),
            serial_decode_threshold: RwLock::new(0.7),
            install_year_inventory_buffer: RwLock::new(1),
            alert_urgency_weight: RwLock::new(0.45),
            alert_impact_weight: RwLock::new(0.35),
            alert_safety_weight: RwLock::new(0.20),
            alert_score_floor: RwLock::new(20),
        }
    }
}

impl GlobalParams {
    /// Engine climate profile assembled from the current parameters
    pub fn climate_profile(&self) -> ClimateProfile {
        let mut profile = ClimateProfile::hot_humid();
        profile.zone = self.climate_zone.read().unwrap().clone();
        profile.climate_multiplier = *self.climate_lifespan_multiplier.read().unwrap();
        profile.maintenance_bonus = *self.maintenance_lifespan_bonus.read().unwrap();
        profile
    }

    /// Engine sync config assembled from the current parameters
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            serial_decode_threshold: *self.serial_decode_threshold.read().unwrap(),
            inventory_buffer_years: *self.install_year_inventory_buffer.read().unwrap() as i32,
        }
    }

    /// Engine alert config assembled from the current parameters
    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            urgency_weight: *self.alert_urgency_weight.read().unwrap(),
            impact_weight: *self.alert_impact_weight.read().unwrap(),
            safety_weight: *self.alert_safety_weight.read().unwrap(),
            score_floor: (*self.alert_score_floor.read().unwrap()).clamp(0, 100) as u32,
        }
    }

    /// Current meaningful-delta threshold
    pub fn meaningful_delta_threshold_value(&self) -> f64 {
        *self.meaningful_delta_threshold.read().unwrap()
    }
}
