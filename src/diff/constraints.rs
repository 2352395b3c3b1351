//! Constraint-based comparability filter.
//!
//! Two states are only worth comparing when they were driven by the same
//! symbolic inputs, up to a small number of tolerated differences.

use super::schema::SkipReason;
use crate::model::StateTrace;

/// Check whether two states are comparable under their constraints
///
/// Constraint lists must have equal length. Positions whose name or value
/// differ are tolerated up to `max_ignored`; the names at those positions
/// (from `first`) are returned so the report can say what was ignored.
pub fn check_comparable(
    first: &StateTrace,
    second: &StateTrace,
    max_ignored: usize,
) -> Result<Vec<String>, SkipReason> {
    if first.constraints.len() != second.constraints.len() {
        return Err(SkipReason::NotComparable {
            detail: format!(
                "constraint counts differ ({} vs {})",
                first.constraints.len(),
                second.constraints.len()
            ),
        });
    }

    let ignored: Vec<String> = first
        .constraints
        .iter()
        .zip(&second.constraints)
        .filter(|(a, b)| a.name != b.name || a.value != b.value)
        .map(|(a, _)| a.name.clone())
        .collect();

    if ignored.len() > max_ignored {
        return Err(SkipReason::NotComparable {
            detail: format!(
                "{} constraints differ, at most {} may be ignored",
                ignored.len(),
                max_ignored
            ),
        });
    }

    Ok(ignored)
}
