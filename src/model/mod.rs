//! Trace model shared by ingestion, analysis and reporting.
//!
//! A `StateTrace` is the ordered list of function-call events recorded for one
//! execution state, plus the counters reported by the test case generator.

pub mod event;
pub mod state;

// Re-export main types
pub use event::{format_address, FunctionCallEvent};
pub use state::{Constraint, StateTable, StateTrace};
