//! System confidence scoring
//!
//! Folds per-field provenance into a single 0-1 confidence for the
//! system record, and gates downstream recomputation on meaningful
//! deltas so trivial re-extractions do not trigger mode transitions or
//! cache invalidation.

use crate::fields::ProvenanceMap;

/// Smallest confidence change that justifies downstream recomputation.
pub const MEANINGFUL_DELTA: f64 = 0.05;

/// Weighted system confidence over field provenance.
///
/// `score = Σ(field_weight × provenance_confidence)` across attested
/// fields. Missing fields contribute zero. Result is clamped to [0, 1]
/// and rounded to 2 decimals so stored values compare stably.
pub fn system_confidence(provenance: &ProvenanceMap) -> f64 {
    let score: f64 = provenance
        .iter()
        .map(|(field, p)| field.weight() * p.confidence)
        .sum();

    round2(score.clamp(0.0, 1.0))
}

/// Whether a confidence delta is large enough to trigger side effects.
pub fn is_meaningful_delta(delta: f64) -> bool {
    is_meaningful_delta_with(delta, MEANINGFUL_DELTA)
}

/// Delta gate with a caller-supplied threshold (settings override).
pub fn is_meaningful_delta_with(delta: f64, threshold: f64) -> bool {
    delta.abs() >= threshold
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
