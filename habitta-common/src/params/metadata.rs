//! Centralized parameter metadata
//!
//! One registry entry per parameter, including its validator. The
//! registry drives database loading, setter validation, and settings
//! API validation, so ranges live in exactly one place.

use super::GlobalParams;

/// Metadata for a single GlobalParams parameter
///
/// Validator signature is `fn(&str) -> Result<(), String>`, with error
/// format `"{param_name}: {specific_reason}"`.
pub struct ParamMetadata {
    pub key: &'static str,
    pub data_type: &'static str,
    pub default_value: &'static str,
    pub description: &'static str,
    pub validation_range: &'static str,
    pub validator: fn(&str) -> Result<(), String>,
}

fn validate_f64_range(name: &str, s: &str, min: f64, max: f64) -> Result<(), String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("{}: invalid number format", name))?;
    if v < min || v > max {
        return Err(format!("{}: value {} out of range [{}, {}]", name, v, min, max));
    }
    Ok(())
}

fn validate_i64_range(name: &str, s: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = s
        .parse()
        .map_err(|_| format!("{}: invalid integer format", name))?;
    if v < min || v > max {
        return Err(format!("{}: value {} out of range [{}, {}]", name, v, min, max));
    }
    Ok(())
}

impl GlobalParams {
    /// The full parameter registry
    pub fn metadata() -> &'static [ParamMetadata] {
        &[
            ParamMetadata {
                key: "climate_zone",
                data_type: "String",
                default_value: "hot_humid",
                description: "Climate zone identifier for the served region",
                validation_range: "non-empty",
                validator: |s| {
                    if s.trim().is_empty() {
                        Err("climate_zone: must not be empty".to_string())
                    } else {
                        Ok(())
                    }
                },
            },
            ParamMetadata {
                key: "climate_lifespan_multiplier",
                data_type: "f64",
                default_value: "0.85",
                description: "Lifespan multiplier for climate stress",
                validation_range: "0.5-1.2",
                validator: |s| validate_f64_range("climate_lifespan_multiplier", s, 0.5, 1.2),
            },
            ParamMetadata {
                key: "maintenance_lifespan_bonus",
                data_type: "f64",
                default_value: "1.1",
                description: "Lifespan multiplier for recent maintenance",
                validation_range: "1.0-1.5",
                validator: |s| validate_f64_range("maintenance_lifespan_bonus", s, 1.0, 1.5),
            },
            ParamMetadata {
                key: "meaningful_delta_threshold",
                data_type: "f64",
                default_value: "0.05",
                description: "Confidence delta gate for downstream recompute",
                validation_range: "0.0-0.5",
                validator: |s| validate_f64_range("meaningful_delta_threshold", s, 0.0, 0.5),
            },
            ParamMetadata {
                key: "serial_decode_threshold",
                data_type: "f64",
                default_value: "0.7",
                description: "Extraction confidence treated as serial-decoded",
                validation_range: "0.0-1.0",
                validator: |s| validate_f64_range("serial_decode_threshold", s, 0.0, 1.0),
            },
            ParamMetadata {
                key: "install_year_inventory_buffer",
                data_type: "i64",
                default_value: "1",
                description: "Years added to low-confidence manufacture years",
                validation_range: "0-5",
                validator: |s| validate_i64_range("install_year_inventory_buffer", s, 0, 5),
            },
            ParamMetadata {
                key: "alert_urgency_weight",
                data_type: "f64",
                default_value: "0.45",
                description: "Alert composite weight for urgency",
                validation_range: "0.0-1.0",
                validator: |s| validate_f64_range("alert_urgency_weight", s, 0.0, 1.0),
            },
            ParamMetadata {
                key: "alert_impact_weight",
                data_type: "f64",
                default_value: "0.35",
                description: "Alert composite weight for impact",
                validation_range: "0.0-1.0",
                validator: |s| validate_f64_range("alert_impact_weight", s, 0.0, 1.0),
            },
            ParamMetadata {
                key: "alert_safety_weight",
                data_type: "f64",
                default_value: "0.20",
                description: "Alert composite weight for safety",
                validation_range: "0.0-1.0",
                validator: |s| validate_f64_range("alert_safety_weight", s, 0.0, 1.0),
            },
            ParamMetadata {
                key: "alert_score_floor",
                data_type: "i64",
                default_value: "20",
                description: "Alerts scoring below this are suppressed",
                validation_range: "0-100",
                validator: |s| validate_i64_range("alert_score_floor", s, 0, 100),
            },
        ]
    }

    /// Look up one parameter's metadata by key
    pub fn metadata_for(key: &str) -> Option<&'static ParamMetadata> {
        Self::metadata().iter().find(|m| m.key == key)
    }
}
