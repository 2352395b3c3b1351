//! Per-state traces and the table that holds them.

use super::event::FunctionCallEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// States keyed by id, iterated in ascending id order
pub type StateTable = BTreeMap<i32, StateTrace>;

/// A symbolic constraint attached to a state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Variable name of the constraint
    pub name: String,

    /// Concrete value chosen for the variable
    pub value: i64,

    /// Whether the variable is a target configuration
    #[serde(default)]
    pub is_target: bool,
}

/// The ordered function-call events of one execution state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateTrace {
    pub id: i32,
    pub instruction_count: u64,
    pub syscall_count: u64,

    /// Sum of execution times of root-level calls, in milliseconds
    pub total_execution_time: f64,

    pub events: Vec<FunctionCallEvent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl StateTrace {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Append an event, crediting root-level calls to the state's total time
    pub fn push_event(&mut self, event: FunctionCallEvent) {
        if event.is_root_call() {
            self.total_execution_time += event.execution_time;
        }
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Identity keys in trace order, the aligner's input
    pub fn identity_keys(&self) -> Vec<u64> {
        self.events.iter().map(FunctionCallEvent::identity).collect()
    }

    /// Clear every latency annotation
    pub fn clear_deltas(&mut self) {
        for event in &mut self.events {
            event.latency_delta = None;
        }
    }

    /// Number of events that carry a latency delta
    pub fn annotated_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.latency_delta.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_event_accumulates_root_time() {
        let mut state = StateTrace::new(3);
        state.push_event(FunctionCallEvent::new(0x1, 0, 1, 0, 100.0));
        state.push_event(FunctionCallEvent::new(0x2, 0x1, 2, 1, 40.0));
        state.push_event(FunctionCallEvent::new(0x3, 0, 3, 0, 20.0));

        assert_eq!(state.len(), 3);
        assert_eq!(state.total_execution_time, 120.0);
        assert_eq!(state.identity_keys(), vec![0x1, 0x2, 0x3]);
    }

    #[test]
    fn test_clear_deltas() {
        let mut state = StateTrace::new(0);
        state.push_event(FunctionCallEvent::new(0x1, 0, 1, 0, 1.0));
        state.events[0].latency_delta = Some(1.0);
        assert_eq!(state.annotated_count(), 1);

        state.clear_deltas();
        assert_eq!(state.annotated_count(), 0);
    }
}
