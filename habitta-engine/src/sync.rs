//! Canonical sync decisions
//!
//! Pure evaluation half of the canonical sync adapter. Given a snapshot
//! of the existing canonical record (if any) and an incoming normalized
//! update, decides whether the sync applies, is rejected by the
//! authority gate, or is a duplicate-photo no-op — and what the record's
//! install year and confidence become. The service layer does the
//! surrounding read-modify-write.

use crate::authority::UpdateSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tunables for sync evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Extraction confidence at or above which a manufacture year is
    /// treated as serial-decoded and trusted exactly
    pub serial_decode_threshold: f64,
    /// Years added to a low-confidence manufacture year to cover the
    /// manufacture-to-install inventory lag
    pub inventory_buffer_years: i32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            serial_decode_threshold: 0.7,
            inventory_buffer_years: 1,
        }
    }
}

/// How an install year estimate was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallYearBasis {
    SerialDecode,
    ManufactureYear,
}

/// Install year derived from a manufacture year.
///
/// Manufacture year is not install year: equipment sits in inventory.
/// Serial-decoded years are trusted exactly; anything weaker gets the
/// inventory buffer and an estimate flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallYearEstimate {
    pub year: i32,
    pub is_estimated: bool,
    pub basis: InstallYearBasis,
}

/// What the caller knows about the existing canonical record.
#[derive(Debug, Clone)]
pub struct CanonicalSnapshot {
    pub install_source: UpdateSource,
    pub confidence: f64,
    /// SHA-256 hashes of photo evidence already credited to this record
    pub photo_hashes: BTreeSet<String>,
}

/// Normalized incoming update for the canonical record.
#[derive(Debug, Clone)]
pub struct IncomingSync {
    pub source: UpdateSource,
    pub confidence: f64,
    /// Manufacture year plus the confidence of that specific extraction
    pub manufacture_year: Option<(i32, f64)>,
    /// Hash of the photo this update came from, for dedup
    pub photo_sha256: Option<String>,
}

/// Why a sync applied or didn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncReason {
    Created,
    Updated,
    HigherAuthorityExists,
    DuplicatePhoto,
}

/// Outcome of evaluating one sync against the canonical record.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncDecision {
    /// Existing record outranks the incoming source; nothing written
    Reject { reason: SyncReason },
    /// Photo already credited to this record; nothing written
    Skip { reason: SyncReason },
    /// Write through: create or update the canonical record
    Apply {
        create: bool,
        reason: SyncReason,
        /// Never lower than the existing record's confidence
        new_confidence: f64,
        install_year: Option<InstallYearEstimate>,
    },
}

/// Derive an install year from a manufacture year, if one is present.
///
/// No manufacture year means no install-year write — never a fabricated
/// default.
pub fn infer_install_year(
    manufacture_year: Option<(i32, f64)>,
    config: &SyncConfig,
) -> Option<InstallYearEstimate> {
    let (year, extraction_confidence) = manufacture_year?;

    if extraction_confidence >= config.serial_decode_threshold {
        Some(InstallYearEstimate {
            year,
            is_estimated: false,
            basis: InstallYearBasis::SerialDecode,
        })
    } else {
        Some(InstallYearEstimate {
            year: year + config.inventory_buffer_years,
            is_estimated: true,
            basis: InstallYearBasis::ManufactureYear,
        })
    }
}

/// Evaluate one incoming sync against the canonical record snapshot.
pub fn evaluate_sync(
    existing: Option<&CanonicalSnapshot>,
    incoming: &IncomingSync,
    config: &SyncConfig,
) -> SyncDecision {
    let existing = match existing {
        None => {
            return SyncDecision::Apply {
                create: true,
                reason: SyncReason::Created,
                new_confidence: incoming.confidence,
                install_year: infer_install_year(incoming.manufacture_year, config),
            };
        }
        Some(snapshot) => snapshot,
    };

    // Authority gate: an existing record written by a higher-ranked
    // source is never downgraded
    if !incoming.source.outranks_or_equals(&existing.install_source) {
        return SyncDecision::Reject {
            reason: SyncReason::HigherAuthorityExists,
        };
    }

    // Reprocessing the same photo must not inflate confidence
    if let Some(hash) = &incoming.photo_sha256 {
        if existing.photo_hashes.contains(hash) {
            return SyncDecision::Skip {
                reason: SyncReason::DuplicatePhoto,
            };
        }
    }

    SyncDecision::Apply {
        create: false,
        reason: SyncReason::Updated,
        new_confidence: incoming.confidence.max(existing.confidence),
        install_year: infer_install_year(incoming.manufacture_year, config),
    }
}
