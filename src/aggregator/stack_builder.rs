//! Build collapsed stack format from an annotated trace.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "main;parse_args;strlen 1500"
//! This means: main called parse_args which called strlen, and that frame on
//! its own got 1500us slower than in the faster state.

use crate::model::{format_address, FunctionCallEvent, StateTrace};
use crate::symbols::SymbolTable;
use log::debug;
use std::collections::{HashMap, HashSet};

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Self latency increase in microseconds
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// `stack weight`, one line of folded input
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks of positive self deltas
///
/// # Arguments
/// * `trace` - A state annotated by the projector
/// * `symbols` - Optional table used to name frames
///
/// # Returns
/// Vector of collapsed stacks, heaviest first
///
/// # Algorithm
/// 1. Self delta of an event = its delta minus the deltas of its children
/// 2. Frames are named by walking the parent chain up to the root
/// 3. Identical stacks are summed
pub fn build_delta_stacks(trace: &StateTrace, symbols: Option<&SymbolTable>) -> Vec<CollapsedStack> {
    debug!("Building delta stacks from {} events", trace.len());

    let by_activity: HashMap<u64, &FunctionCallEvent> = trace
        .events
        .iter()
        .filter(|e| e.activity_id != e.parent_id)
        .map(|e| (e.activity_id, e))
        .collect();

    let mut child_deltas: HashMap<u64, f64> = HashMap::new();
    for event in &trace.events {
        if let Some(delta) = event.latency_delta {
            if event.activity_id != event.parent_id {
                *child_deltas.entry(event.parent_id).or_insert(0.0) += delta;
            }
        }
    }

    let mut stack_map: HashMap<String, u64> = HashMap::new();
    for event in &trace.events {
        let Some(delta) = event.latency_delta else {
            continue;
        };
        let own = delta - child_deltas.get(&event.activity_id).copied().unwrap_or(0.0);
        let weight = to_micros(own);
        if weight == 0 {
            continue;
        }
        let stack = stack_of(event, &by_activity, symbols);
        *stack_map.entry(stack).or_insert(0) += weight;
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();
    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique delta stacks", stacks.len());
    stacks
}

fn stack_of(
    event: &FunctionCallEvent,
    by_activity: &HashMap<u64, &FunctionCallEvent>,
    symbols: Option<&SymbolTable>,
) -> String {
    let mut frames = vec![frame_name(event.function, symbols)];
    let mut seen = HashSet::from([event.activity_id]);
    let mut parent = event.parent_id;

    while let Some(caller) = by_activity.get(&parent) {
        if !seen.insert(caller.activity_id) {
            break;
        }
        frames.push(frame_name(caller.function, symbols));
        parent = caller.parent_id;
    }

    frames.reverse();
    frames.join(";")
}

/// Symbol name when known, hex address otherwise. `;` and spaces would
/// break the folded format.
fn frame_name(address: u64, symbols: Option<&SymbolTable>) -> String {
    symbols
        .and_then(|table| table.by_address(address))
        .map(|symbol| symbol.name.replace([';', ' '], "_"))
        .unwrap_or_else(|| format_address(address))
}

/// Milliseconds to whole microseconds, negatives dropped
fn to_micros(ms: f64) -> u64 {
    if ms.is_finite() && ms > 0.0 {
        (ms * 1000.0).round() as u64
    } else {
        0
    }
}
