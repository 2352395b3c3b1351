//! Output writers for traces, diffs and reports.
//!
//! This module handles writing data to disk in various formats:
//! - Per-state and per-pair CSV trace dumps
//! - Unified diff logs of each alignment
//! - The critical-path result file
//! - JSON analysis reports
//! - SVG flamegraphs

pub mod csv;
pub mod json;
pub mod report;
pub mod svg;
pub mod unified;

// Re-export main functions
pub use csv::{diff_csv_name, state_csv_name, write_trace_csv};
pub use json::{read_report_value, report_to_string, write_report};
pub use report::{format_path_step, format_state_summary, write_result_file};
pub use svg::{flamegraph_name, write_svg};
pub use unified::{diff_log_name, write_unified_diff};

use crate::utils::error::OutputError;
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;

/// Reject paths that cannot name an output file
pub(crate) fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Empty path".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Validate `path`, create its parent directories and open it buffered
///
/// With `append` the file is extended, otherwise it is truncated.
pub(crate) fn create_output(path: &Path, append: bool) -> Result<BufWriter<File>, OutputError> {
    validate_output_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    Ok(BufWriter::new(file))
}
