//! Flamegraph generation using the inferno library.
//!
//! This module converts collapsed delta stacks into interactive SVG
//! flamegraphs showing where a slower state lost its time.

pub mod generator;

// Re-export main types
pub use generator::{generate_flamegraph, FlamegraphConfig};
