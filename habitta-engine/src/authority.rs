//! Update source authority model
//!
//! Every piece of evidence about a home system arrives from one of five
//! sources, and the sources form a strict total order. The rank is the
//! sole tie-breaker used by the field resolver and the canonical sync
//! adapter: a field written by one source can only be replaced by a
//! source of equal or higher rank.

use serde::{Deserialize, Serialize};

/// Evidence source for a system update, ordered by authority.
///
/// Rank order (highest wins):
/// 1. `ProfessionalOverride` - licensed contractor / inspector entry
/// 2. `UserConfirmed` - homeowner explicitly confirmed a value
/// 3. `PhotoAnalysis` - extracted from nameplate / equipment photos
/// 4. `PermitRecord` - municipal permit data
/// 5. `Inferred` - derived from home age or defaults
///
/// The enum is closed on purpose: an unknown source string is a parse
/// error at the storage/API boundary, never a silently defaulted rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    ProfessionalOverride,
    UserConfirmed,
    PhotoAnalysis,
    PermitRecord,
    Inferred,
}

impl UpdateSource {
    /// Authority rank. Higher values overwrite lower ones.
    pub fn rank(&self) -> u8 {
        match self {
            UpdateSource::ProfessionalOverride => 5,
            UpdateSource::UserConfirmed => 4,
            UpdateSource::PhotoAnalysis => 3,
            UpdateSource::PermitRecord => 2,
            UpdateSource::Inferred => 1,
        }
    }

    /// Whether this source may replace a field currently owned by `other`.
    ///
    /// Equal rank is allowed through here; the resolver separately holds
    /// equal-rank conflicts with differing values for confirmation.
    pub fn outranks_or_equals(&self, other: &UpdateSource) -> bool {
        self.rank() >= other.rank()
    }

    /// Parse canonical database string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "professional_override" => Some(UpdateSource::ProfessionalOverride),
            "user_confirmed" => Some(UpdateSource::UserConfirmed),
            "photo_analysis" => Some(UpdateSource::PhotoAnalysis),
            "permit_record" => Some(UpdateSource::PermitRecord),
            "inferred" => Some(UpdateSource::Inferred),
            _ => None,
        }
    }

    /// Canonical database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            UpdateSource::ProfessionalOverride => "professional_override",
            UpdateSource::UserConfirmed => "user_confirmed",
            UpdateSource::PhotoAnalysis => "photo_analysis",
            UpdateSource::PermitRecord => "permit_record",
            UpdateSource::Inferred => "inferred",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            UpdateSource::ProfessionalOverride => "Professional Override",
            UpdateSource::UserConfirmed => "User Confirmed",
            UpdateSource::PhotoAnalysis => "Photo Analysis",
            UpdateSource::PermitRecord => "Permit Record",
            UpdateSource::Inferred => "Inferred",
        }
    }

    /// All variants, highest authority first.
    pub fn all_variants() -> &'static [UpdateSource] {
        &[
            UpdateSource::ProfessionalOverride,
            UpdateSource::UserConfirmed,
            UpdateSource::PhotoAnalysis,
            UpdateSource::PermitRecord,
            UpdateSource::Inferred,
        ]
    }
}

impl std::fmt::Display for UpdateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
