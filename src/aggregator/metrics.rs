//! Per-function latency regression totals.
//!
//! The functions that accumulate the most delta across a pair are the first
//! places to look after the critical path.

use crate::diff::FunctionDelta;
use crate::model::StateTrace;
use log::debug;
use std::collections::HashMap;

/// Sum deltas per function and return the `top_n` largest increases
///
/// # Arguments
/// * `trace` - A state annotated by the projector
/// * `top_n` - Number of functions to return
///
/// # Returns
/// Functions with a positive total delta, largest first, ties by address
pub fn top_regressions(trace: &StateTrace, top_n: usize) -> Vec<FunctionDelta> {
    let mut totals: HashMap<u64, (usize, f64)> = HashMap::new();
    for event in &trace.events {
        if let Some(delta) = event.latency_delta {
            let entry = totals.entry(event.function).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += delta;
        }
    }

    let mut regressions: Vec<FunctionDelta> = totals
        .into_iter()
        .filter(|(_, (_, total))| *total > 0.0)
        .map(|(function, (calls, total_delta))| FunctionDelta {
            function,
            calls,
            total_delta,
        })
        .collect();

    regressions.sort_by(|a, b| {
        b.total_delta
            .total_cmp(&a.total_delta)
            .then_with(|| a.function.cmp(&b.function))
    });
    regressions.truncate(top_n);

    debug!(
        "Top {} regressed functions of state {}",
        regressions.len(),
        trace.id
    );
    regressions
}

/// Summary statistics of the deltas in one annotated state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaDistribution {
    pub annotated: usize,
    pub regressed: usize,
    pub improved: usize,
    pub total_increase: f64,
    pub total_decrease: f64,
}

impl DeltaDistribution {
    pub fn from_trace(trace: &StateTrace) -> Self {
        let mut dist = Self::default();
        for delta in trace.events.iter().filter_map(|e| e.latency_delta) {
            dist.annotated += 1;
            if delta > 0.0 {
                dist.regressed += 1;
                dist.total_increase += delta;
            } else if delta < 0.0 {
                dist.improved += 1;
                dist.total_decrease -= delta;
            }
        }
        dist
    }

    /// Human-readable one-liner for logs
    pub fn summary(&self) -> String {
        format!(
            "{} annotated | {} slower (+{:.3}ms) | {} faster (-{:.3}ms)",
            self.annotated,
            self.regressed,
            self.total_increase,
            self.improved,
            self.total_decrease
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FunctionCallEvent;

    fn annotated(deltas: &[(u64, f64)]) -> StateTrace {
        let mut state = StateTrace::new(0);
        for (i, &(function, delta)) in deltas.iter().enumerate() {
            let mut event = FunctionCallEvent::new(function, 0, i as u64 + 1, 0, 1.0);
            event.latency_delta = Some(delta);
            state.push_event(event);
        }
        state
    }

    #[test]
    fn test_top_regressions() {
        let state = annotated(&[(0x1, 5.0), (0x2, 8.0), (0x1, 4.0), (0x3, -2.0)]);
        let top = top_regressions(&state, 5);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].function, 0x1);
        assert_eq!(top[0].calls, 2);
        assert_eq!(top[0].total_delta, 9.0);
        assert_eq!(top[1].function, 0x2);

        assert_eq!(top_regressions(&state, 1).len(), 1);
    }

    #[test]
    fn test_delta_distribution() {
        let dist = DeltaDistribution::from_trace(&annotated(&[(0x1, 2.0), (0x2, -1.0), (0x3, 0.0)]));
        assert_eq!(dist.annotated, 3);
        assert_eq!(dist.regressed, 1);
        assert_eq!(dist.improved, 1);
        assert_eq!(dist.total_decrease, 1.0);
    }
}
