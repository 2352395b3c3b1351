//! Per-state constraint files.
//!
//! A constraint file is a JSON array of records:
//!
//! ```json
//! [{ "state": 1, "name": "autocommit", "value": 0, "is_target": true }]
//! ```

use crate::model::{Constraint, StateTable};
use crate::utils::error::ParseError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A constraint as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintRecord {
    pub state: i32,
    pub name: String,
    pub value: i64,
    #[serde(default)]
    pub is_target: bool,
}

/// Read constraint records from a JSON file
pub fn load_constraints(path: &Path) -> Result<Vec<ConstraintRecord>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let records = serde_json::from_reader(BufReader::new(file))?;
    Ok(records)
}

/// Append records to their states, in file order
///
/// Returns the number of records attached. Records for unknown states are dropped.
pub fn attach_constraints(table: &mut StateTable, records: Vec<ConstraintRecord>) -> usize {
    let mut attached = 0;
    for record in records {
        match table.get_mut(&record.state) {
            Some(state) => {
                state.constraints.push(Constraint {
                    name: record.name,
                    value: record.value,
                    is_target: record.is_target,
                });
                attached += 1;
            }
            None => warn!(
                "Constraint '{}' refers to unknown state {}",
                record.name, record.state
            ),
        }
    }
    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StateTrace;

    #[test]
    fn test_attach_skips_unknown_states() {
        let mut table = StateTable::new();
        table.insert(1, StateTrace::new(1));

        let records: Vec<ConstraintRecord> = serde_json::from_str(
            r#"[{"state": 1, "name": "autocommit", "value": 1},
                {"state": 9, "name": "autocommit", "value": 0}]"#,
        )
        .unwrap();

        assert_eq!(attach_constraints(&mut table, records), 1);
        assert_eq!(table[&1].constraints.len(), 1);
        assert!(!table[&1].constraints[0].is_target);
    }
}
