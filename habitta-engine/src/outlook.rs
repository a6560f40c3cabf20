//! Home Outlook aggregation
//!
//! Rolls the remaining life of every system in a home into one
//! planning-horizon number, weighted by system criticality and
//! discounted by data quality. Homes where nothing is datable get an
//! explicit `None`, never a fake zero.

use crate::survival::SystemKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Horizon used to bucket systems as "due" in the outlook summary.
pub const SUMMARY_HORIZON_YEARS: f64 = 5.0;

/// Assessment-quality thresholds over critical-system coverage.
const QUALITY_HIGH_RATIO: f64 = 0.8;
const QUALITY_MEDIUM_RATIO: f64 = 0.4;

/// Expected replacement window for one system, in calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementWindow {
    pub early_year: i32,
    pub late_year: i32,
}

/// Quality tier of the data behind one timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    High,
    Medium,
    Low,
}

impl DataQuality {
    /// Discount applied to remaining life before aggregation.
    pub fn confidence_multiplier(&self) -> f64 {
        match self {
            DataQuality::High => 1.0,
            DataQuality::Medium => 0.9,
            DataQuality::Low => 0.75,
        }
    }

    /// Tier a record-level confidence score.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            DataQuality::High
        } else if confidence >= 0.5 {
            DataQuality::Medium
        } else {
            DataQuality::Low
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            DataQuality::High => "high",
            DataQuality::Medium => "medium",
            DataQuality::Low => "low",
        }
    }
}

/// One system's contribution to the home timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemTimelineEntry {
    pub system_id: Uuid,
    pub kind: SystemKind,
    pub install_year: Option<i32>,
    pub replacement_window: Option<ReplacementWindow>,
    pub data_quality: DataQuality,
}

/// Confidence in the home-level assessment, driven by how many critical
/// system types have usable data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentQuality {
    High,
    Medium,
    Low,
}

/// Aggregated home planning horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeOutlookResult {
    /// Rounded years shown to the user
    pub display_years: i64,
    /// Unrounded weighted average, never negative
    pub raw_years: f64,
    pub eligible_systems: usize,
    pub ineligible_systems: usize,
    pub assessment_quality: AssessmentQuality,
    /// Fixed-order micro summary, critical systems first
    pub summary: String,
}

/// Compute the home outlook across all timeline entries.
///
/// Returns `None` when no entry has both an install year and a
/// replacement window; a home with no datable systems has no outlook
/// rather than a misleading one.
pub fn compute_home_outlook(
    entries: &[SystemTimelineEntry],
    current_year: i32,
) -> Option<HomeOutlookResult> {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut eligible = 0usize;
    let mut ineligible = 0usize;

    let mut critical_due = 0usize;
    let mut routine_due = 0usize;
    let mut stable = 0usize;
    let mut eligible_critical_kinds: Vec<SystemKind> = Vec::new();

    for entry in entries {
        let (install_year, window) = match (entry.install_year, entry.replacement_window) {
            (Some(install), Some(window)) => (install, window),
            _ => {
                ineligible += 1;
                continue;
            }
        };

        let weight = entry.kind.criticality_weight();
        let multiplier = entry.data_quality.confidence_multiplier();

        // Midpoint of the replacement window, expressed as a lifespan
        let lifespan_mid =
            (window.early_year + window.late_year - 2 * install_year) as f64 / 2.0;
        let lifespan_max = (window.late_year - install_year) as f64;
        let age = (current_year - install_year) as f64;

        let remaining_raw = (lifespan_mid - age).clamp(0.0, lifespan_max.max(0.0));
        let adjusted_remaining = remaining_raw * multiplier;

        weighted_sum += adjusted_remaining * weight;
        weight_sum += weight;
        eligible += 1;

        if entry.kind.is_critical() && !eligible_critical_kinds.contains(&entry.kind) {
            eligible_critical_kinds.push(entry.kind);
        }

        if adjusted_remaining <= SUMMARY_HORIZON_YEARS {
            if entry.kind.is_critical() {
                critical_due += 1;
            } else {
                routine_due += 1;
            }
        } else {
            stable += 1;
        }
    }

    if eligible == 0 || weight_sum == 0.0 {
        return None;
    }

    let raw_years = (weighted_sum / weight_sum).max(0.0);
    let display_years = raw_years.round() as i64;

    Some(HomeOutlookResult {
        display_years,
        raw_years,
        eligible_systems: eligible,
        ineligible_systems: ineligible,
        assessment_quality: assessment_quality(eligible_critical_kinds.len()),
        summary: build_summary(critical_due, routine_due, stable),
    })
}

/// Tier the assessment by coverage of the defined critical system types.
fn assessment_quality(eligible_critical_count: usize) -> AssessmentQuality {
    let total_critical = SystemKind::all_variants()
        .iter()
        .filter(|k| k.is_critical())
        .count();

    let ratio = eligible_critical_count as f64 / total_critical as f64;
    if ratio >= QUALITY_HIGH_RATIO {
        AssessmentQuality::High
    } else if ratio >= QUALITY_MEDIUM_RATIO {
        AssessmentQuality::Medium
    } else {
        AssessmentQuality::Low
    }
}

/// Fixed-order micro summary: critical bucket first, then routine, then
/// stable, joined with a fixed separator.
fn build_summary(critical_due: usize, routine_due: usize, stable: usize) -> String {
    let mut parts = Vec::new();
    if critical_due > 0 {
        parts.push(format!(
            "{} critical system{} due within {} years",
            critical_due,
            plural(critical_due),
            SUMMARY_HORIZON_YEARS as i64
        ));
    }
    if routine_due > 0 {
        parts.push(format!(
            "{} routine system{} due",
            routine_due,
            plural(routine_due)
        ));
    }
    if stable > 0 {
        parts.push(format!("{} system{} stable", stable, plural(stable)));
    }
    parts.join(" • ")
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2026;

    fn entry(
        kind: SystemKind,
        install_year: Option<i32>,
        window: Option<(i32, i32)>,
        quality: DataQuality,
    ) -> SystemTimelineEntry {
        SystemTimelineEntry {
            system_id: Uuid::new_v4(),
            kind,
            install_year,
            replacement_window: window.map(|(early_year, late_year)| ReplacementWindow {
                early_year,
                late_year,
            }),
            data_quality: quality,
        }
    }

    #[test]
    fn test_no_eligible_systems_yields_none() {
        assert!(compute_home_outlook(&[], YEAR).is_none());

        let entries = vec![
            entry(SystemKind::Hvac, None, Some((2030, 2034)), DataQuality::High),
            entry(SystemKind::Roof, Some(2010), None, DataQuality::High),
        ];
        assert!(compute_home_outlook(&entries, YEAR).is_none());
    }

    #[test]
    fn test_weighted_average_rollup() {
        // HVAC: installed 2014, window 2024-2032 -> mid lifespan 14,
        // age 12 -> remaining 2, quality high (x1.0), weight 1.0
        // Roof: installed 2010, window 2034-2038 -> mid lifespan 26,
        // age 16 -> remaining 10, quality high, weight 0.9
        // round((1.0*2 + 0.9*10) / 1.9) = round(5.789) = 6
        let entries = vec![
            entry(SystemKind::Hvac, Some(2014), Some((2024, 2032)), DataQuality::High),
            entry(SystemKind::Roof, Some(2010), Some((2034, 2038)), DataQuality::High),
        ];

        let outlook = compute_home_outlook(&entries, YEAR).unwrap();
        assert_eq!(outlook.display_years, 6);
        assert!((outlook.raw_years - 5.789_473_684).abs() < 1e-6);
        assert_eq!(outlook.eligible_systems, 2);
        assert_eq!(outlook.ineligible_systems, 0);
    }

    #[test]
    fn test_quality_discount_applies() {
        let high = compute_home_outlook(
            &[entry(SystemKind::Hvac, Some(2014), Some((2024, 2032)), DataQuality::High)],
            YEAR,
        )
        .unwrap();
        let low = compute_home_outlook(
            &[entry(SystemKind::Hvac, Some(2014), Some((2024, 2032)), DataQuality::Low)],
            YEAR,
        )
        .unwrap();
        assert!(low.raw_years < high.raw_years);
        assert!((low.raw_years - 1.5).abs() < 1e-9); // 2 * 0.75
    }

    #[test]
    fn test_remaining_clamped_non_negative() {
        // Installed 2000, window 2010-2014: long past -> remaining 0
        let outlook = compute_home_outlook(
            &[entry(SystemKind::Hvac, Some(2000), Some((2010, 2014)), DataQuality::High)],
            YEAR,
        )
        .unwrap();
        assert_eq!(outlook.raw_years, 0.0);
        assert_eq!(outlook.display_years, 0);
    }

    #[test]
    fn test_ineligible_systems_are_counted() {
        let entries = vec![
            entry(SystemKind::Hvac, Some(2014), Some((2026, 2034)), DataQuality::High),
            entry(SystemKind::Pool, None, None, DataQuality::Low),
        ];
        let outlook = compute_home_outlook(&entries, YEAR).unwrap();
        assert_eq!(outlook.eligible_systems, 1);
        assert_eq!(outlook.ineligible_systems, 1);
    }

    #[test]
    fn test_assessment_quality_tiers() {
        // 1 of 5 critical kinds covered -> low
        let one = vec![entry(SystemKind::Hvac, Some(2014), Some((2026, 2034)), DataQuality::High)];
        assert_eq!(
            compute_home_outlook(&one, YEAR).unwrap().assessment_quality,
            AssessmentQuality::Low
        );

        // 2 of 5 (0.4) -> medium
        let two = vec![
            entry(SystemKind::Hvac, Some(2014), Some((2026, 2034)), DataQuality::High),
            entry(SystemKind::Roof, Some(2010), Some((2032, 2040)), DataQuality::High),
        ];
        assert_eq!(
            compute_home_outlook(&two, YEAR).unwrap().assessment_quality,
            AssessmentQuality::Medium
        );

        // 4 of 5 (0.8) -> high
        let four = vec![
            entry(SystemKind::Hvac, Some(2014), Some((2026, 2034)), DataQuality::High),
            entry(SystemKind::Roof, Some(2010), Some((2032, 2040)), DataQuality::High),
            entry(SystemKind::Electrical, Some(2000), Some((2035, 2045)), DataQuality::Medium),
            entry(SystemKind::WaterHeater, Some(2020), Some((2028, 2032)), DataQuality::High),
        ];
        assert_eq!(
            compute_home_outlook(&four, YEAR).unwrap().assessment_quality,
            AssessmentQuality::High
        );
    }

    #[test]
    fn test_summary_orders_critical_first() {
        let entries = vec![
            // critical, due: remaining 4
            entry(SystemKind::Hvac, Some(2014), Some((2026, 2034)), DataQuality::High),
            // routine, due: installed 2016, window 2026-2030 -> mid 12, age 10 -> 2
            entry(SystemKind::Pool, Some(2016), Some((2026, 2030)), DataQuality::High),
            // critical, stable: remaining 10
            entry(SystemKind::Roof, Some(2010), Some((2032, 2040)), DataQuality::High),
        ];
        let outlook = compute_home_outlook(&entries, YEAR).unwrap();
        assert_eq!(
            outlook.summary,
            "1 critical system due within 5 years • 1 routine system due • 1 system stable"
        );
    }
}
