//! Unified diff log of an alignment.
//!
//! Hunks are written without context lines: each `@@` header covers only the
//! changed ranges, followed by `-` lines for events that exist only in the
//! faster state and `+` lines for events only in the slower one.

use super::create_output;
use super::csv::state_csv_name;
use crate::diff::{EditKind, EditScript, Hunk};
use crate::model::StateTrace;
use crate::utils::error::OutputError;
use chrono::Local;
use log::{debug, info};
use std::io::Write;
use std::path::Path;

/// `trace_diff_state_<first>_<second>.diff`
pub fn diff_log_name(first: i32, second: i32) -> String {
    format!("trace_diff_state_{}_{}.diff", first, second)
}

/// Write the changes of `script` between `first` and `second`
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_unified_diff(
    first: &StateTrace,
    second: &StateTrace,
    script: &EditScript,
    path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let path = path.as_ref();
    info!("Writing diff log to: {}", path.display());

    let mut writer = create_output(path, false)?;
    let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.9f %z");
    writeln!(writer, "--- {}\t{}", state_csv_name(first.id), stamp)?;
    writeln!(writer, "+++ {}\t{}", state_csv_name(second.id), stamp)?;

    let mut written = 0;
    for hunk in script.hunks.iter().filter(|h| !h.changes.is_empty()) {
        write_hunk(&mut writer, first, second, hunk)?;
        written += 1;
    }
    writer.flush()?;

    debug!("Wrote {} hunks", written);
    Ok(())
}

fn write_hunk(
    writer: &mut impl Write,
    first: &StateTrace,
    second: &StateTrace,
    hunk: &Hunk,
) -> Result<(), OutputError> {
    let first_from = hunk.first_start + hunk.common_len;
    let second_from = hunk.second_start + hunk.common_len;
    let deleted = hunk.changes.iter().filter(|k| **k == EditKind::Delete).count();
    let added = hunk.changes.iter().filter(|k| **k == EditKind::Add).count();

    writeln!(
        writer,
        "@@ -{} +{} @@",
        range(first_from, deleted),
        range(second_from, added)
    )?;

    let (mut first_idx, mut second_idx) = (first_from, second_from);
    for kind in &hunk.changes {
        match kind {
            EditKind::Delete => {
                if let Some(event) = first.events.get(first_idx) {
                    writeln!(writer, "-{}: {}", first_idx, event)?;
                }
                first_idx += 1;
            }
            EditKind::Add => {
                if let Some(event) = second.events.get(second_idx) {
                    writeln!(writer, "+{}: {}", second_idx, event)?;
                }
                second_idx += 1;
            }
            EditKind::Common => {
                first_idx += 1;
                second_idx += 1;
            }
        }
    }
    Ok(())
}

/// `start,len` with the 1-based start convention of unified diffs; an empty
/// range names the line before it
fn range(start: usize, len: usize) -> String {
    if len == 0 {
        format!("{},0", start)
    } else {
        format!("{},{}", start + 1, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::align;
    use crate::model::FunctionCallEvent;

    fn flat(id: i32, functions: &[u64]) -> StateTrace {
        let mut state = StateTrace::new(id);
        for (i, &f) in functions.iter().enumerate() {
            state.push_event(FunctionCallEvent::new(f, 0, i as u64 + 1, 0, 1.0));
        }
        state
    }

    #[test]
    fn test_write_unified_diff() {
        let first = flat(0, &[0x1, 0x2, 0x3]);
        let second = flat(1, &[0x1, 0x3, 0x4]);
        let script = align(&first, &second).unwrap();

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(diff_log_name(0, 1));
        write_unified_diff(&first, &second, &script, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("--- trace_state_0.csv\t"));
        assert!(lines[1].starts_with("+++ trace_state_1.csv\t"));
        assert_eq!(lines[2], "@@ -2,1 +1,0 @@");
        assert_eq!(lines[3], "-1: Function 0x2; runs 1ms");
        assert_eq!(lines[4], "@@ -3,0 +3,1 @@");
        assert_eq!(lines[5], "+2: Function 0x4; runs 1ms");
        assert_eq!(lines.len(), 6);
    }
}
