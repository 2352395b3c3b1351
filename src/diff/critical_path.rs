//! Greedy extraction of the dominant latency path.

use super::schema::CriticalPath;
use crate::model::{FunctionCallEvent, StateTrace};
use crate::utils::config::AnalysisConfig;
use log::debug;
use std::collections::{HashMap, HashSet};

/// Walk the annotated call tree from the synthetic root, always descending
/// into the child with the largest latency delta
///
/// # Arguments
/// * `trace` - Second state of a pair, already annotated by the projector
/// * `blacklist` - Function addresses never selected
/// * `config` - Supplies `max_depth` and `min_delta`
///
/// # Returns
/// The selected events, root first. Ties go to the child seen first in trace
/// order. `truncated` is set when the depth limit cut off a qualifying child.
pub fn extract_critical_path(
    trace: &StateTrace,
    blacklist: &HashSet<u64>,
    config: &AnalysisConfig,
) -> CriticalPath {
    let mut children: HashMap<u64, Vec<&FunctionCallEvent>> = HashMap::new();
    for event in &trace.events {
        children.entry(event.parent_id).or_default().push(event);
    }

    let mut path = CriticalPath::default();
    let mut visited: HashSet<u64> = HashSet::new();
    let mut cursor = 0u64;

    while path.len() < config.max_depth {
        let Some(next) = select_child(&children, cursor, blacklist, &visited, config.min_delta)
        else {
            break;
        };
        visited.insert(next.activity_id);
        cursor = next.activity_id;
        path.steps.push(next.clone());
    }

    if path.len() == config.max_depth {
        path.truncated =
            select_child(&children, cursor, blacklist, &visited, config.min_delta).is_some();
    }

    debug!(
        "Critical path of state {}: {} steps{}",
        trace.id,
        path.len(),
        if path.truncated { " (truncated)" } else { "" }
    );
    path
}

fn select_child<'a>(
    children: &HashMap<u64, Vec<&'a FunctionCallEvent>>,
    cursor: u64,
    blacklist: &HashSet<u64>,
    visited: &HashSet<u64>,
    min_delta: f64,
) -> Option<&'a FunctionCallEvent> {
    let mut best: Option<(&FunctionCallEvent, f64)> = None;

    for &event in children.get(&cursor)? {
        if event.activity_id == event.parent_id
            || blacklist.contains(&event.function)
            || visited.contains(&event.activity_id)
        {
            continue;
        }
        let Some(delta) = event.latency_delta else {
            continue;
        };
        if delta <= min_delta {
            continue;
        }
        if best.map_or(true, |(_, max)| delta > max) {
            best = Some((event, delta));
        }
    }

    best.map(|(event, _)| event)
}
