//! Similarity threshold between the total times of two states.
//!
//! Pairs whose totals are too close are not worth aligning; the relative gap
//! decides which pairs reach the engine.

use crate::model::StateTrace;

/// Relative gap `(longer - shorter) / shorter`
///
/// Two zero totals are identical (gap 0). A zero shorter total against a
/// non-zero longer one is an infinite gap.
pub fn latency_gap(shorter: f64, longer: f64) -> f64 {
    if shorter == 0.0 {
        if longer == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        (longer - shorter) / shorter
    }
}

/// Order a pair so the state with the smaller total comes first
///
/// Ties keep the lower state id first.
pub fn order_pair<'a>(a: &'a StateTrace, b: &'a StateTrace) -> (&'a StateTrace, &'a StateTrace) {
    let a_first = match a.total_execution_time.total_cmp(&b.total_execution_time) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => a.id <= b.id,
    };
    if a_first {
        (a, b)
    } else {
        (b, a)
    }
}

/// Whether a gap is large enough to analyze the pair
pub fn exceeds_threshold(gap: f64, threshold: f64) -> bool {
    gap >= threshold
}
