//! Parameter setter methods with metadata-based validation
//!
//! All setters validate through the metadata registry before writing.
//!
//! # RwLock unwrap
//!
//! Setters use `.write().unwrap()`. A poisoned lock means another
//! thread panicked mid-write; propagating the panic is the correct
//! fail-fast behavior for corrupted process state.

use super::GlobalParams;

impl GlobalParams {
    fn validate(key: &'static str, value: &str) -> Result<(), String> {
        let meta = Self::metadata_for(key).expect("parameter metadata must exist");
        (meta.validator)(value)
    }

    pub fn set_climate_zone(&self, value: &str) -> Result<(), String> {
        Self::validate("climate_zone", value)?;
        *self.climate_zone.write().unwrap() = value.to_string();
        Ok(())
    }

    pub fn set_climate_lifespan_multiplier(&self, value: f64) -> Result<(), String> {
        Self::validate("climate_lifespan_multiplier", &value.to_string())?;
        *self.climate_lifespan_multiplier.write().unwrap() = value;
        Ok(())
    }

    pub fn set_maintenance_lifespan_bonus(&self, value: f64) -> Result<(), String> {
        Self::validate("maintenance_lifespan_bonus", &value.to_string())?;
        *self.maintenance_lifespan_bonus.write().unwrap() = value;
        Ok(())
    }

    pub fn set_meaningful_delta_threshold(&self, value: f64) -> Result<(), String> {
        Self::validate("meaningful_delta_threshold", &value.to_string())?;
        *self.meaningful_delta_threshold.write().unwrap() = value;
        Ok(())
    }

    pub fn set_serial_decode_threshold(&self, value: f64) -> Result<(), String> {
        Self::validate("serial_decode_threshold", &value.to_string())?;
        *self.serial_decode_threshold.write().unwrap() = value;
        Ok(())
    }

    pub fn set_install_year_inventory_buffer(&self, value: i64) -> Result<(), String> {
        Self::validate("install_year_inventory_buffer", &value.to_string())?;
        *self.install_year_inventory_buffer.write().unwrap() = value;
        Ok(())
    }

    pub fn set_alert_urgency_weight(&self, value: f64) -> Result<(), String> {
        Self::validate("alert_urgency_weight", &value.to_string())?;
        *self.alert_urgency_weight.write().unwrap() = value;
        Ok(())
    }

    pub fn set_alert_impact_weight(&self, value: f64) -> Result<(), String> {
        Self::validate("alert_impact_weight", &value.to_string())?;
        *self.alert_impact_weight.write().unwrap() = value;
        Ok(())
    }

    pub fn set_alert_safety_weight(&self, value: f64) -> Result<(), String> {
        Self::validate("alert_safety_weight", &value.to_string())?;
        *self.alert_safety_weight.write().unwrap() = value;
        Ok(())
    }

    pub fn set_alert_score_floor(&self, value: i64) -> Result<(), String> {
        Self::validate("alert_score_floor", &value.to_string())?;
        *self.alert_score_floor.write().unwrap() = value;
        Ok(())
    }

    /// Apply one validated string value by key (used by database init)
    pub(super) fn apply_from_string(&self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "climate_zone" => self.set_climate_zone(value),
            "climate_lifespan_multiplier" => {
                self.set_climate_lifespan_multiplier(parse(key, value)?)
            }
            "maintenance_lifespan_bonus" => {
                self.set_maintenance_lifespan_bonus(parse(key, value)?)
            }
            "meaningful_delta_threshold" => {
                self.set_meaningful_delta_threshold(parse(key, value)?)
            }
            "serial_decode_threshold" => self.set_serial_decode_threshold(parse(key, value)?),
            "install_year_inventory_buffer" => {
                self.set_install_year_inventory_buffer(parse(key, value)?)
            }
            "alert_urgency_weight" => self.set_alert_urgency_weight(parse(key, value)?),
            "alert_impact_weight" => self.set_alert_impact_weight(parse(key, value)?),
            "alert_safety_weight" => self.set_alert_safety_weight(parse(key, value)?),
            "alert_score_floor" => self.set_alert_score_floor(parse(key, value)?),
            _ => Err(format!("{}: unknown parameter", key)),
        }
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{}: invalid value '{}'", key, value))
}
