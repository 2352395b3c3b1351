//! CSV dumps of states and annotated states.

use super::create_output;
use crate::model::{format_address, FunctionCallEvent, StateTrace};
use crate::utils::error::OutputError;
use log::info;
use std::io::Write;
use std::path::Path;

/// Header shared by plain and annotated dumps
pub const CSV_HEADER: &str = "function,caller,activity_id,parent_id,execution_time(ms),diff_time(ms)";

/// `trace_state_<id>.csv`
pub fn state_csv_name(id: i32) -> String {
    format!("trace_state_{}.csv", id)
}

/// `trace_diff_state_<first>_<second>.csv`
pub fn diff_csv_name(first: i32, second: i32) -> String {
    format!("trace_diff_state_{}_{}.csv", first, second)
}

/// Write one state as CSV; the diff column is empty for events without a delta
pub fn write_trace_csv(state: &StateTrace, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = path.as_ref();
    info!("Writing {} events of state {} to {}", state.len(), state.id, path.display());

    let mut writer = create_output(path, false)?;
    writeln!(writer, "{}", CSV_HEADER)?;
    for event in &state.events {
        writeln!(writer, "{}", csv_row(event))?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_row(event: &FunctionCallEvent) -> String {
    format!(
        "{},{},{},{},{},{}",
        format_address(event.function),
        format_address(event.caller),
        event.activity_id,
        event.parent_id,
        event.execution_time,
        event
            .latency_delta
            .map(|d| d.to_string())
            .unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_trace_csv() {
        let mut state = StateTrace::new(4);
        state.push_event(FunctionCallEvent::new(0x401126, 0, 1, 0, 12.5));
        let mut child = FunctionCallEvent::new(0x401200, 0x401126, 2, 1, 3.0);
        child.latency_delta = Some(-0.5);
        state.push_event(child);

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(state_csv_name(4));
        write_trace_csv(&state, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "function,caller,activity_id,parent_id,execution_time(ms),diff_time(ms)\n\
             0x401126,0x0,1,0,12.5,\n\
             0x401200,0x401126,2,1,3,-0.5\n"
        );
    }

    #[test]
    fn test_file_names() {
        assert_eq!(state_csv_name(-1), "trace_state_-1.csv");
        assert_eq!(diff_csv_name(2, 5), "trace_diff_state_2_5.csv");
    }
}
