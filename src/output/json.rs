//! JSON analysis report writer.
//!
//! Writes AnalysisReport structs to JSON files with proper formatting.

use super::create_output;
use crate::diff::AnalysisReport;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Write an analysis report to a JSON file
///
/// # Arguments
/// * `report` - Report to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let report = analyze_states(&table, &config, &blacklist);
/// write_report(&report, "output/analysis.json")?;
/// ```
pub fn write_report(report: &AnalysisReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing analysis report to: {}", output_path.display());

    let mut writer = create_output(output_path, false)?;
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!(
        "Report written successfully ({} bytes)",
        calculate_file_size(output_path)
    );
    Ok(())
}

/// Serialize a report to a pretty JSON string
pub fn report_to_string(report: &AnalysisReport) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Read a written report back as untyped JSON
///
/// Reports are write-only documents; reading them back is for inspection
/// and tests.
pub fn read_report_value(input_path: impl AsRef<Path>) -> Result<serde_json::Value, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path)?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(value)
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::StateSummary;

    fn create_test_report() -> AnalysisReport {
        AnalysisReport {
            version: "1.0.0".to_string(),
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            states: vec![StateSummary {
                id: 0,
                instruction_count: 10,
                syscall_count: 1,
                total_execution_time: 5.0,
                events: 2,
            }],
            comparisons: Vec::new(),
        }
    }

    #[test]
    fn test_write_and_read_report() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/analysis.json");

        write_report(&create_test_report(), &path).unwrap();
        let value = read_report_value(&path).unwrap();

        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["states"][0]["instruction_count"], 10);
    }

    #[test]
    fn test_report_to_string() {
        let text = report_to_string(&create_test_report()).unwrap();
        assert!(text.contains("\"comparisons\": []"));
    }
}
