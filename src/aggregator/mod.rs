//! Aggregation of annotated traces into collapsed stacks and metrics.
//!
//! This module transforms a state annotated with latency deltas into:
//! - Collapsed stack format (for flamegraph generation)
//! - Per-function regression totals
//! - Delta distribution statistics

pub mod metrics;
pub mod stack_builder;

// Re-export main types and functions
pub use metrics::{top_regressions, DeltaDistribution};
pub use stack_builder::{build_delta_stacks, CollapsedStack};
