//! Critical-path narrative and per-state summary lines.

use super::create_output;
use crate::diff::{AnalysisReport, StateSummary};
use crate::model::{format_address, FunctionCallEvent};
use crate::utils::error::OutputError;
use log::info;
use std::io::Write;
use std::path::Path;

/// One step of a critical path
pub fn format_path_step(state_id: i32, event: &FunctionCallEvent) -> String {
    format!(
        "[State {}] Function {}, caller {}, activityId {}, parentId {}, execution time {}ms; diff time {}ms",
        state_id,
        format_address(event.function),
        format_address(event.caller),
        event.activity_id,
        event.parent_id,
        event.execution_time,
        event.latency_delta.unwrap_or_default()
    )
}

/// Instruction and syscall counters of one state
pub fn format_state_summary(state: &StateSummary) -> String {
    format!(
        "[State {}] => the number of instruction is {}, the number of syscall is {}, the total execution time {}ms",
        state.id, state.instruction_count, state.syscall_count, state.total_execution_time
    )
}

/// Write state summaries followed by the critical path of every analyzed pair
///
/// # Arguments
/// * `report` - Completed analysis
/// * `path` - Result file
/// * `append` - Extend an existing file instead of replacing it
pub fn write_result_file(
    report: &AnalysisReport,
    path: impl AsRef<Path>,
    append: bool,
) -> Result<(), OutputError> {
    let path = path.as_ref();
    info!(
        "{} results to: {}",
        if append { "Appending" } else { "Writing" },
        path.display()
    );

    let mut writer = create_output(path, append)?;
    for state in &report.states {
        writeln!(writer, "{}", format_state_summary(state))?;
    }

    for (comparison, analysis) in report.analyzed() {
        writeln!(writer)?;
        writeln!(
            writer,
            "Critical path of state {} against state {}:",
            comparison.second, comparison.first
        )?;
        for step in &analysis.critical_path.steps {
            writeln!(writer, "{}", format_path_step(comparison.second, step))?;
        }
    }

    writer.flush()?;
    Ok(())
}
