//! latency-diff
//!
//! Differential latency analysis of symbolic-execution traces.
//!
//! Each state of a trace is a time-ordered list of function-call events.
//! For every pair of states whose total execution times differ enough, the
//! two event sequences are aligned, per-event latency deltas are projected
//! onto the slower state and the call path that accounts for most of the
//! difference is extracted.
//!
//! This crate provides the core implementation for the `latency-diff` CLI.
//!
//! ```bash
//! latency-diff analyze --trace trace.txt --symbols prog.objdump --summary
//! ```

pub mod aggregator;
pub mod commands;
pub mod diff;
pub mod flamegraph;
pub mod model;
pub mod output;
pub mod parser;
pub mod symbols;
pub mod utils;
