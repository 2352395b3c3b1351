//! Function-call events as recorded by the latency tracker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One observed function invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallEvent {
    /// Start address of the called function
    pub function: u64,

    /// Start address of the calling function (0 for the synthetic root)
    pub caller: u64,

    /// Unique id of this invocation within its state
    pub activity_id: u64,

    /// `activity_id` of the dynamic parent invocation
    pub parent_id: u64,

    /// Elapsed time in milliseconds
    pub execution_time: f64,

    /// Latency difference against the paired trace, set by the projector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_delta: Option<f64>,

    /// Return address, only present in binary traces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_address: Option<u64>,

    /// Clock ticks at function entry, only present in binary traces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<i64>,
}

impl FunctionCallEvent {
    pub fn new(
        function: u64,
        caller: u64,
        activity_id: u64,
        parent_id: u64,
        execution_time: f64,
    ) -> Self {
        Self {
            function,
            caller,
            activity_id,
            parent_id,
            execution_time,
            latency_delta: None,
            return_address: None,
            begin: None,
        }
    }

    /// Identity used by the aligner. Timing never takes part in equality.
    pub fn identity(&self) -> u64 {
        self.function
    }

    /// Whether this event sits directly under the synthetic root
    pub fn is_root_call(&self) -> bool {
        self.caller == 0
    }
}

impl fmt::Display for FunctionCallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Function {}; runs {}ms",
            format_address(self.function),
            self.execution_time
        )
    }
}

/// Format an address as `0x`-prefixed lowercase hex
pub fn format_address(address: u64) -> String {
    format!("{:#x}", address)
}
