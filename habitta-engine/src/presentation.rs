//! Prediction presentation builder
//!
//! Turns a numeric `SurvivalCore` into the narrative fields the UI and
//! chat layers render: forecast headline, protective/risk factor
//! bullets, recommended actions, and an optional planning note.
//!
//! Hard rule: every statement is derived from a fact already present in
//! the core struct. The planning section in particular only exists when
//! the core says replacement is within the planning horizon; callers
//! cannot force it.

use crate::survival::{AgeBasis, LifecycleStatus, SurvivalCore, SystemKind};
use serde::{Deserialize, Serialize};

/// Replacement-planning horizon in remaining years. At or below this,
/// predictions carry a planning note.
pub const PLANNING_HORIZON_YEARS: f64 = 3.0;

/// Render-only prediction narrative for one system.
///
/// Consumers must treat this as read-only display data; all numbers
/// come from the embedded core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPrediction {
    pub kind: SystemKind,
    pub core: SurvivalCore,
    pub headline: String,
    pub protective_factors: Vec<String>,
    pub risk_factors: Vec<String>,
    pub recommended_actions: Vec<String>,
    /// Present only when remaining life is within the planning horizon
    pub planning: Option<String>,
}

/// Build the narrative prediction for one system from its core.
pub fn build_prediction(kind: SystemKind, core: SurvivalCore) -> SystemPrediction {
    let headline = headline_for(kind, &core);
    let protective_factors = protective_factors_for(&core);
    let risk_factors = risk_factors_for(&core);
    let recommended_actions = actions_for(kind, &core);
    let planning = planning_for(kind, &core);

    SystemPrediction {
        kind,
        core,
        headline,
        protective_factors,
        risk_factors,
        recommended_actions,
        planning,
    }
}

fn headline_for(kind: SystemKind, core: &SurvivalCore) -> String {
    match core.status {
        LifecycleStatus::Low => format!(
            "{} has an estimated {:.0} years of service life remaining.",
            kind.display_name(),
            core.remaining_years
        ),
        LifecycleStatus::Moderate => format!(
            "{} is approaching the end of its expected service life, with roughly {:.0}-{:.0} years remaining.",
            kind.display_name(),
            core.remaining_years.floor().max(1.0),
            core.remaining_years.ceil().max(1.0) + 1.0
        ),
        LifecycleStatus::High => format!(
            "{} is at or past its expected service life and could need replacement at any time.",
            kind.display_name()
        ),
    }
}

fn protective_factors_for(core: &SurvivalCore) -> Vec<String> {
    let mut factors = Vec::new();
    if core.has_recent_maintenance {
        factors.push("Recent maintenance on record extends expected service life.".to_string());
    }
    if core.age_years < core.adjusted_lifespan_years * 0.5 {
        factors.push("System is in the first half of its expected lifespan.".to_string());
    }
    factors
}

fn risk_factors_for(core: &SurvivalCore) -> Vec<String> {
    let mut factors = Vec::new();
    if !core.has_recent_maintenance {
        factors.push("No recent maintenance on record.".to_string());
    }
    if core.age_years >= core.adjusted_lifespan_years {
        factors.push(format!(
            "At {:.0} years, the system has exceeded its climate-adjusted lifespan of {:.1} years.",
            core.age_years, core.adjusted_lifespan_years
        ));
    }
    match core.age_basis {
        AgeBasis::InferredFromHomeAge | AgeBasis::Default => {
            factors.push(
                "Install date is unverified; the age estimate may be off by several years."
                    .to_string(),
            );
        }
        _ => {}
    }
    factors
}

fn actions_for(kind: SystemKind, core: &SurvivalCore) -> Vec<String> {
    match core.status {
        LifecycleStatus::Low => vec![format!(
            "Keep up routine maintenance to protect the {}'s remaining service life.",
            kind.display_name()
        )],
        LifecycleStatus::Moderate => vec![
            format!(
                "Schedule a professional inspection of the {} within the next year.",
                kind.display_name()
            ),
            "Start comparing replacement options before failure forces a rushed decision."
                .to_string(),
        ],
        LifecycleStatus::High => vec![
            format!(
                "Have the {} evaluated by a licensed professional now.",
                kind.display_name()
            ),
            "Budget for replacement; an unplanned failure is the most expensive path."
                .to_string(),
        ],
    }
}

fn planning_for(kind: SystemKind, core: &SurvivalCore) -> Option<String> {
    if core.remaining_years > PLANNING_HORIZON_YEARS {
        return None;
    }
    Some(format!(
        "Plan for {} replacement within the next {:.0} year(s).",
        kind.display_name(),
        core.remaining_years.ceil().max(1.0)
    ))
}
