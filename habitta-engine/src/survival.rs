//! Survival / lifecycle prediction
//!
//! Pure math producing the lifecycle core for one system: effective age,
//! climate-adjusted lifespan, remaining years, and a risk status tier.
//! All numeric constants live on `ClimateProfile` so a different climate
//! zone is a different profile value, not a code change.

use crate::authority::UpdateSource;
use serde::{Deserialize, Serialize};

/// Canonical system kinds tracked per home.
///
/// Closed enum: an unknown kind string is a parse error at the boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SystemKind {
    Hvac,
    Roof,
    WaterHeater,
    Electrical,
    Plumbing,
    Pool,
    Solar,
    MiniSplit,
}

impl SystemKind {
    /// Weight of this system in the home-level outlook rollup.
    pub fn criticality_weight(&self) -> f64 {
        match self {
            SystemKind::Hvac => 1.0,
            SystemKind::Roof => 0.9,
            SystemKind::Electrical => 0.8,
            SystemKind::WaterHeater => 0.6,
            SystemKind::Plumbing => 0.6,
            SystemKind::Pool => 0.4,
            SystemKind::Solar => 0.4,
            SystemKind::MiniSplit => 0.3,
        }
    }

    /// Systems weighted >= 0.6 drive the assessment-quality score and
    /// are surfaced first in outlook summaries.
    pub fn is_critical(&self) -> bool {
        self.criticality_weight() >= 0.6
    }

    /// Parse canonical database string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hvac" => Some(SystemKind::Hvac),
            "roof" => Some(SystemKind::Roof),
            "water_heater" => Some(SystemKind::WaterHeater),
            "electrical" => Some(SystemKind::Electrical),
            "plumbing" => Some(SystemKind::Plumbing),
            "pool" => Some(SystemKind::Pool),
            "solar" => Some(SystemKind::Solar),
            "mini_split" => Some(SystemKind::MiniSplit),
            _ => None,
        }
    }

    /// Canonical database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            SystemKind::Hvac => "hvac",
            SystemKind::Roof => "roof",
            SystemKind::WaterHeater => "water_heater",
            SystemKind::Electrical => "electrical",
            SystemKind::Plumbing => "plumbing",
            SystemKind::Pool => "pool",
            SystemKind::Solar => "solar",
            SystemKind::MiniSplit => "mini_split",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            SystemKind::Hvac => "HVAC",
            SystemKind::Roof => "Roof",
            SystemKind::WaterHeater => "Water Heater",
            SystemKind::Electrical => "Electrical",
            SystemKind::Plumbing => "Plumbing",
            SystemKind::Pool => "Pool Equipment",
            SystemKind::Solar => "Solar",
            SystemKind::MiniSplit => "Mini-Split",
        }
    }

    /// All variants in canonical order.
    pub fn all_variants() -> &'static [SystemKind] {
        &[
            SystemKind::Hvac,
            SystemKind::Roof,
            SystemKind::WaterHeater,
            SystemKind::Electrical,
            SystemKind::Plumbing,
            SystemKind::Pool,
            SystemKind::Solar,
            SystemKind::MiniSplit,
        ]
    }
}

impl std::fmt::Display for SystemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Expected lifespan band for one system kind, in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifespanBand {
    /// Baseline used by the survival formula
    pub typical: f64,
    /// Early end of the replacement window
    pub early: f64,
    /// Late end of the replacement window
    pub late: f64,
}

/// Climate-zone parameter set for survival math.
///
/// One profile per zone; the shipped default is the hot-humid coastal
/// profile. Every constant the predictor uses lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateProfile {
    /// Zone identifier, e.g. "hot_humid"
    pub zone: String,
    /// Lifespan multiplier for the zone's climate stress (< 1.0 shortens)
    pub climate_multiplier: f64,
    /// Lifespan multiplier applied when recent maintenance is on record
    pub maintenance_bonus: f64,
    /// Homes younger than this have system age assumed equal to home age
    pub young_home_cutoff_years: i32,
    /// Assumed system age for older homes with no other evidence
    pub assumed_age_older_home: f64,
    /// Hard default age when nothing at all is known
    pub default_age_years: f64,
}

impl ClimateProfile {
    /// Hot-humid coastal profile (the shipped default zone).
    pub fn hot_humid() -> Self {
        Self {
            zone: "hot_humid".to_string(),
            climate_multiplier: 0.85,
            maintenance_bonus: 1.1,
            young_home_cutoff_years: 15,
            assumed_age_older_home: 7.0,
            default_age_years: 8.0,
        }
    }

    /// Baseline lifespan band for a system kind under this zone.
    pub fn lifespan_band(&self, kind: SystemKind) -> LifespanBand {
        match kind {
            SystemKind::Hvac => LifespanBand { typical: 14.0, early: 12.0, late: 17.0 },
            SystemKind::Roof => LifespanBand { typical: 25.0, early: 20.0, late: 30.0 },
            SystemKind::WaterHeater => LifespanBand { typical: 10.0, early: 8.0, late: 12.0 },
            SystemKind::Electrical => LifespanBand { typical: 40.0, early: 30.0, late: 50.0 },
            SystemKind::Plumbing => LifespanBand { typical: 50.0, early: 40.0, late: 60.0 },
            SystemKind::Pool => LifespanBand { typical: 12.0, early: 10.0, late: 15.0 },
            SystemKind::Solar => LifespanBand { typical: 25.0, early: 20.0, late: 30.0 },
            SystemKind::MiniSplit => LifespanBand { typical: 15.0, early: 12.0, late: 18.0 },
        }
    }
}

impl Default for ClimateProfile {
    fn default() -> Self {
        Self::hot_humid()
    }
}

/// Everything known that can date a system's installation.
///
/// Fields are tried in declared priority order; the first present one
/// determines the age.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgeEvidence {
    /// Explicit install year on the canonical record
    pub install_year: Option<i32>,
    /// Replacement year derived from a permit
    pub permit_replacement_year: Option<i32>,
    /// Install year derived from a permit
    pub permit_install_year: Option<i32>,
    /// Year the home itself was built
    pub home_built_year: Option<i32>,
}

/// Which evidence tier produced the resolved age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBasis {
    InstallYear,
    PermitReplacement,
    PermitInstall,
    InferredFromHomeAge,
    Default,
}

/// Lifecycle risk tier derived from remaining years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Low,
    Moderate,
    High,
}

impl LifecycleStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Low => "low",
            LifecycleStatus::Moderate => "moderate",
            LifecycleStatus::High => "high",
        }
    }
}

/// Pure numeric lifecycle core for one system.
///
/// Derived on demand from the canonical record plus the climate profile;
/// never persisted as authoritative. The presentation layer attaches
/// narrative text to this struct and must not add facts beyond it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalCore {
    pub age_years: f64,
    pub age_basis: AgeBasis,
    pub adjusted_lifespan_years: f64,
    pub remaining_years: f64,
    pub status: LifecycleStatus,
    pub has_recent_maintenance: bool,
    pub install_source: UpdateSource,
}

/// Resolve a system's effective age from the best available evidence.
pub fn resolve_age(
    evidence: &AgeEvidence,
    profile: &ClimateProfile,
    current_year: i32,
) -> (f64, AgeBasis) {
    if let Some(year) = evidence.install_year {
        return (years_since(year, current_year), AgeBasis::InstallYear);
    }
    if let Some(year) = evidence.permit_replacement_year {
        return (years_since(year, current_year), AgeBasis::PermitReplacement);
    }
    if let Some(year) = evidence.permit_install_year {
        return (years_since(year, current_year), AgeBasis::PermitInstall);
    }
    if let Some(built) = evidence.home_built_year {
        let home_age = years_since(built, current_year);
        let age = if home_age < profile.young_home_cutoff_years as f64 {
            // Young home: original equipment is still in place
            home_age
        } else {
            profile.assumed_age_older_home
        };
        return (age, AgeBasis::InferredFromHomeAge);
    }
    (profile.default_age_years, AgeBasis::Default)
}

/// Compute the survival core for one system.
///
/// `adjusted_lifespan = baseline × climate_multiplier × maintenance_bonus`,
/// `remaining = max(0, adjusted_lifespan - age)`, and status tiers at
/// 3 / 1 remaining years.
pub fn compute_survival(
    kind: SystemKind,
    evidence: &AgeEvidence,
    has_recent_maintenance: bool,
    install_source: UpdateSource,
    profile: &ClimateProfile,
    current_year: i32,
) -> SurvivalCore {
    let (age_years, age_basis) = resolve_age(evidence, profile, current_year);

    let baseline = profile.lifespan_band(kind).typical;
    let maintenance_factor = if has_recent_maintenance {
        profile.maintenance_bonus
    } else {
        1.0
    };
    let adjusted_lifespan_years = baseline * profile.climate_multiplier * maintenance_factor;

    let remaining_years = (adjusted_lifespan_years - age_years).max(0.0);

    let status = if remaining_years > 3.0 {
        LifecycleStatus::Low
    } else if remaining_years > 1.0 {
        LifecycleStatus::Moderate
    } else {
        LifecycleStatus::High
    };

    SurvivalCore {
        age_years,
        age_basis,
        adjusted_lifespan_years,
        remaining_years,
        status,
        has_recent_maintenance,
        install_source,
    }
}

fn years_since(year: i32, current_year: i32) -> f64 {
    (current_year - year).max(0) as f64
}
