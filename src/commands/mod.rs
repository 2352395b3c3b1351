//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use analyze::{execute_analyze, resolve_blacklist, validate_args};
pub use models::AnalyzeArgs;
pub use utils::{display_version, inspect_trace, list_symbols};
