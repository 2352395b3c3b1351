//! Differential latency analysis between pairs of states.
//!
//! For every pair of states whose total times differ enough, the two event
//! sequences are aligned, per-event latency deltas are projected onto the
//! slower state and the dominant path through its call tree is extracted.
//!
//! # Example
//! ```ignore
//! use latency_diff::diff::analyze_states;
//! use latency_diff::parser::parse_trace_file;
//!
//! let table = parse_trace_file("trace.txt")?;
//! let report = analyze_states(&table, &AnalysisConfig::default(), &HashSet::new());
//! ```

mod aligner;
mod constraints;
mod critical_path;
mod engine;
mod output;
mod projector;
mod schema;
mod threshold;

// Public API exports
pub use aligner::{align, align_keys, script_from_hunks};
pub use constraints::check_comparable;
pub use critical_path::extract_critical_path;
pub use engine::{analyze_pair, analyze_states, compare_pair, TOP_REGRESSIONS};
pub use output::render_terminal_summary;
pub use projector::{project_latency, MergeMode};
pub use schema::{
    AnalysisReport, CriticalPath, EditKind, EditOp, EditScript, FunctionDelta, Hunk,
    PairAnalysis, PairComparison, PairOutcome, ScriptStats, SkipReason, StateSummary,
};
pub use threshold::{exceeds_threshold, latency_gap, order_pair};
