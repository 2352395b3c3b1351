//! Parser for the packed binary trace file.
//!
//! Each record is 60 bytes, little-endian, without padding:
//!
//! | offset | type | field            |
//! |--------|------|------------------|
//! | 0      | i32  | state id         |
//! | 4      | u64  | function address |
//! | 12     | u64  | return address   |
//! | 20     | u64  | caller address   |
//! | 28     | f64  | execution time   |
//! | 36     | u64  | activity id      |
//! | 44     | u64  | parent id        |
//! | 52     | i64  | entry clock      |

use crate::model::{FunctionCallEvent, StateTable, StateTrace};
use crate::utils::config::TRACE_RECORD_SIZE;
use crate::utils::error::ParseError;
use log::debug;
use std::fs;
use std::path::Path;

/// One decoded binary record
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRecord {
    pub state_id: i32,
    pub address: u64,
    pub return_address: u64,
    pub caller_address: u64,
    pub execution_time: f64,
    pub activity_id: u64,
    pub parent_id: u64,
    pub begin: i64,
}

impl TraceRecord {
    /// Decode a record from exactly `TRACE_RECORD_SIZE` bytes
    pub fn from_bytes(bytes: &[u8; TRACE_RECORD_SIZE]) -> Self {
        let mut cursor = FieldCursor { bytes, offset: 0 };
        Self {
            state_id: i32::from_le_bytes(cursor.take()),
            address: u64::from_le_bytes(cursor.take()),
            return_address: u64::from_le_bytes(cursor.take()),
            caller_address: u64::from_le_bytes(cursor.take()),
            execution_time: f64::from_le_bytes(cursor.take()),
            activity_id: u64::from_le_bytes(cursor.take()),
            parent_id: u64::from_le_bytes(cursor.take()),
            begin: i64::from_le_bytes(cursor.take()),
        }
    }

    /// Encode back into the packed layout
    pub fn to_bytes(&self) -> [u8; TRACE_RECORD_SIZE] {
        let mut out = [0u8; TRACE_RECORD_SIZE];
        let fields: [&[u8]; 8] = [
            &self.state_id.to_le_bytes(),
            &self.address.to_le_bytes(),
            &self.return_address.to_le_bytes(),
            &self.caller_address.to_le_bytes(),
            &self.execution_time.to_le_bytes(),
            &self.activity_id.to_le_bytes(),
            &self.parent_id.to_le_bytes(),
            &self.begin.to_le_bytes(),
        ];
        let mut offset = 0;
        for field in fields {
            out[offset..offset + field.len()].copy_from_slice(field);
            offset += field.len();
        }
        out
    }

    fn into_event(self) -> FunctionCallEvent {
        let mut event = FunctionCallEvent::new(
            self.address,
            self.caller_address,
            self.activity_id,
            self.parent_id,
            self.execution_time,
        );
        event.return_address = Some(self.return_address);
        event.begin = Some(self.begin);
        event
    }
}

struct FieldCursor<'a> {
    bytes: &'a [u8; TRACE_RECORD_SIZE],
    offset: usize,
}

impl FieldCursor<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut field = [0u8; N];
        field.copy_from_slice(&self.bytes[self.offset..self.offset + N]);
        self.offset += N;
        field
    }
}

/// Parse a binary trace file from disk
pub fn parse_dat_file(path: &Path) -> Result<StateTable, ParseError> {
    let data = fs::read(path).map_err(|source| ParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dat_records(&data)
}

/// Parse an in-memory buffer of packed records
///
/// Binary traces carry no instruction or syscall counters; both stay 0.
///
/// # Errors
/// * `ParseError::TruncatedRecord` - Buffer length is not a whole number of records
pub fn parse_dat_records(data: &[u8]) -> Result<StateTable, ParseError> {
    if data.len() % TRACE_RECORD_SIZE != 0 {
        return Err(ParseError::TruncatedRecord {
            size: data.len() as u64,
            record_size: TRACE_RECORD_SIZE,
        });
    }

    let mut table = StateTable::new();
    for chunk in data.chunks_exact(TRACE_RECORD_SIZE) {
        let mut raw = [0u8; TRACE_RECORD_SIZE];
        raw.copy_from_slice(chunk);
        let record = TraceRecord::from_bytes(&raw);
        let state_id = record.state_id;
        table
            .entry(state_id)
            .or_insert_with(|| StateTrace::new(state_id))
            .push_event(record.into_event());
    }

    debug!(
        "Decoded {} binary records",
        data.len() / TRACE_RECORD_SIZE
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state_id: i32, address: u64, caller: u64, time: f64, activity: u64, parent: u64) -> TraceRecord {
        TraceRecord {
            state_id,
            address,
            return_address: address + 4,
            caller_address: caller,
            execution_time: time,
            activity_id: activity,
            parent_id: parent,
            begin: 1000,
        }
    }

    #[test]
    fn test_field_offsets() {
        let bytes = record(7, 0x401126, 0, 2.5, 1, 0).to_bytes();
        assert_eq!(&bytes[0..4], &7i32.to_le_bytes());
        assert_eq!(&bytes[4..12], &0x401126u64.to_le_bytes());
        assert_eq!(&bytes[28..36], &2.5f64.to_le_bytes());
        assert_eq!(&bytes[52..60], &1000i64.to_le_bytes());
    }

    #[test]
    fn test_records_grouped_by_state() {
        let mut data = Vec::new();
        data.extend_from_slice(&record(1, 0x10, 0, 5.0, 1, 0).to_bytes());
        data.extend_from_slice(&record(2, 0x10, 0, 9.0, 1, 0).to_bytes());
        data.extend_from_slice(&record(1, 0x20, 0x10, 3.0, 2, 1).to_bytes());

        let table = parse_dat_records(&data).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[&1].len(), 2);
        assert_eq!(table[&1].total_execution_time, 5.0);
        assert_eq!(table[&1].events[1].return_address, Some(0x24));
        assert_eq!(table[&2].total_execution_time, 9.0);
    }

    #[test]
    fn test_truncated_file_rejected() {
        let data = vec![0u8; TRACE_RECORD_SIZE + 7];
        assert!(matches!(
            parse_dat_records(&data),
            Err(ParseError::TruncatedRecord { size: 67, .. })
        ));
    }
}
