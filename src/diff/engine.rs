//! Pairwise analysis engine.
//! Walks every pair of states and runs align -> project -> extract on the
//! pairs that are far enough apart.

use crate::aggregator::top_regressions;
use crate::model::{StateTable, StateTrace};
use crate::utils::config::{AnalysisConfig, SCHEMA_VERSION};
use crate::utils::error::DiffError;
use chrono::Utc;
use log::{debug, error, info};
use std::collections::HashSet;

use super::aligner::align;
use super::constraints::check_comparable;
use super::critical_path::extract_critical_path;
use super::projector::project_latency;
use super::schema::{
    AnalysisReport, PairAnalysis, PairComparison, PairOutcome, SkipReason, StateSummary,
};
use super::threshold::{exceeds_threshold, latency_gap, order_pair};

/// Number of per-function regressions kept in each pair's report
pub const TOP_REGRESSIONS: usize = 10;

/// Analyze every unordered pair of states in ascending id order
///
/// # Arguments
/// * `table` - Ingested states
/// * `config` - Threshold, depth and filter settings
/// * `blacklist` - Resolved function addresses excluded from critical paths
///
/// # Returns
/// A report holding one comparison per pair. Failed pairs are recorded, not
/// propagated.
pub fn analyze_states(
    table: &StateTable,
    config: &AnalysisConfig,
    blacklist: &HashSet<u64>,
) -> AnalysisReport {
    info!("Analyzing {} states ({} pairs)", table.len(), pair_count(table.len()));

    let states: Vec<&StateTrace> = table.values().collect();
    let mut comparisons = Vec::with_capacity(pair_count(states.len()));

    for (i, a) in states.iter().enumerate() {
        for b in &states[i + 1..] {
            comparisons.push(compare_pair(a, b, config, blacklist));
        }
    }

    let report = AnalysisReport {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        states: states.iter().map(|s| StateSummary::from(*s)).collect(),
        comparisons,
    };

    info!(
        "Analysis complete: {} analyzed, {} skipped, {} failed",
        report.analyzed().count(),
        report.skipped_count(),
        report.failed_count()
    );
    report
}

/// Compare one pair of states
///
/// The state with the smaller total time becomes `first`. Similar pairs and
/// pairs rejected by the constraint filter are recorded as skips.
pub fn compare_pair(
    a: &StateTrace,
    b: &StateTrace,
    config: &AnalysisConfig,
    blacklist: &HashSet<u64>,
) -> PairComparison {
    let (first, second) = order_pair(a, b);
    let gap = latency_gap(first.total_execution_time, second.total_execution_time);

    let mut comparison = PairComparison {
        first: first.id,
        second: second.id,
        latency_gap: gap,
        ignored_constraints: Vec::new(),
        outcome: PairOutcome::Skipped(SkipReason::SimilarLatency {
            threshold: config.similarity_threshold,
        }),
    };

    if !exceeds_threshold(gap, config.similarity_threshold) {
        info!(
            "State {} and state {} have similar latency (gap {:.2}%), skipping",
            first.id,
            second.id,
            gap * 100.0
        );
        return comparison;
    }

    if let Some(max_ignored) = config.constraint_ignore {
        match check_comparable(first, second, max_ignored) {
            Ok(ignored) => {
                if !ignored.is_empty() {
                    debug!(
                        "Ignoring constraints {:?} between state {} and state {}",
                        ignored, first.id, second.id
                    );
                }
                comparison.ignored_constraints = ignored;
            }
            Err(reason) => {
                info!(
                    "State {} and state {} are not comparable: {:?}",
                    first.id, second.id, reason
                );
                comparison.outcome = PairOutcome::Skipped(reason);
                return comparison;
            }
        }
    }

    info!(
        "Comparing state {} ({:.3}ms) with state {} ({:.3}ms), gap {:.2}%",
        first.id,
        first.total_execution_time,
        second.id,
        second.total_execution_time,
        gap * 100.0
    );

    comparison.outcome = match analyze_pair(first, second, config, blacklist) {
        Ok(analysis) => PairOutcome::Analyzed(Box::new(analysis)),
        Err(e) => {
            error!(
                "Comparison of state {} with state {} failed: {}",
                first.id, second.id, e
            );
            PairOutcome::Failed {
                error: e.to_string(),
            }
        }
    };
    comparison
}

/// Align, project and extract for an already ordered pair
///
/// `second` is never modified; deltas land on a copy held by the result.
///
/// # Errors
/// Any `DiffError` from alignment or projection
pub fn analyze_pair(
    first: &StateTrace,
    second: &StateTrace,
    config: &AnalysisConfig,
    blacklist: &HashSet<u64>,
) -> Result<PairAnalysis, DiffError> {
    let script = align(first, second)?;

    let mut annotated = second.clone();
    project_latency(first, &mut annotated, &script)?;

    let critical_path = extract_critical_path(&annotated, blacklist, config);
    let regressions = top_regressions(&annotated, TOP_REGRESSIONS);

    debug!(
        "Pair ({}, {}): {} hunks, critical path of {} steps",
        first.id,
        second.id,
        script.hunks.len(),
        critical_path.len()
    );

    Ok(PairAnalysis {
        script_stats: script.stats(),
        critical_path,
        top_regressions: regressions,
        script,
        annotated,
    })
}

fn pair_count(states: usize) -> usize {
    states * states.saturating_sub(1) / 2
}
