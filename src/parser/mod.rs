//! Trace ingestion.
//!
//! This module handles:
//! - Parsing the engine's text log (`LatencyTracker` / `TestCaseGenerator` lines)
//! - Parsing the packed binary trace file
//! - Loading per-state constraints for the comparability filter

pub mod constraints;
pub mod dat_parser;
pub mod log_parser;

// Re-export main functions
pub use constraints::{attach_constraints, load_constraints, ConstraintRecord};
pub use dat_parser::{parse_dat_file, parse_dat_records};
pub use log_parser::{parse_log_file, parse_log_lines};

use crate::model::StateTable;
use crate::utils::config::TEXT_TRACE_EXTENSION;
use crate::utils::error::ParseError;
use log::info;
use std::path::Path;

/// Input trace encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    /// The engine's debug log
    TextLog,
    /// Packed binary records
    Binary,
}

impl TraceFormat {
    /// `.txt` files are text logs, everything else is binary
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(TEXT_TRACE_EXTENSION) => Self::TextLog,
            _ => Self::Binary,
        }
    }
}

/// Parse a trace file into a state table, picking the parser by extension
///
/// # Errors
/// * `ParseError::Unreadable` - Input missing or unreadable
/// * `ParseError::MalformedLine` - A marker line could not be parsed
/// * `ParseError::TruncatedRecord` - Binary file length mismatch
pub fn parse_trace_file(path: impl AsRef<Path>) -> Result<StateTable, ParseError> {
    let path = path.as_ref();
    let format = TraceFormat::detect(path);
    info!("Parsing {} as {:?}", path.display(), format);

    let table = match format {
        TraceFormat::TextLog => parse_log_file(path)?,
        TraceFormat::Binary => parse_dat_file(path)?,
    };

    let events: usize = table.values().map(|s| s.len()).sum();
    info!(
        "Parsed {} trace events across {} states from {}",
        events,
        table.len(),
        path.display()
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(TraceFormat::detect(Path::new("debug.txt")), TraceFormat::TextLog);
        assert_eq!(TraceFormat::detect(Path::new("DEBUG.TXT")), TraceFormat::TextLog);
        assert_eq!(TraceFormat::detect(Path::new("trace.dat")), TraceFormat::Binary);
        assert_eq!(TraceFormat::detect(Path::new("trace")), TraceFormat::Binary);
    }
}
