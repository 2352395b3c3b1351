//! Parser for the engine's text debug log.
//!
//! Only two kinds of lines matter:
//!
//! ```text
//! 1520 [State 3] LatencyTracker: Function 0x4005d6; activityId 7; caller 0x400510; parentId 2; runs 0.25ms;
//! 1534 [State 3] TestCaseGenerator: generating test case at address 0x400620; the number of instruction 812; the number of syscall 4;
//! ```
//!
//! Every other line is ignored. Fields are `;` separated and a key is followed
//! by its value after a space or `=`.

use crate::model::{FunctionCallEvent, StateTable, StateTrace};
use crate::utils::config::{LATENCY_PLUGIN, TEST_CASE_PLUGIN};
use crate::utils::error::ParseError;
use log::{debug, warn};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

const TEST_CASE_PREFIX: &str = "generating test case";

fn plugin_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[State (?P<state>-?\d+)\]\s+(?P<plugin>\w+):\s*(?P<message>.*)$")
            .expect("plugin line regex is valid")
    })
}

/// Parse a text log from disk
pub fn parse_log_file(path: &Path) -> Result<StateTable, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_log_lines(BufReader::new(file))
}

/// Parse text log lines from any reader
///
/// Invalid UTF-8 in unrelated lines is tolerated.
pub fn parse_log_lines<R: BufRead>(mut reader: R) -> Result<StateTable, ParseError> {
    let mut table = StateTable::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = String::from_utf8_lossy(&buf);
        parse_line(&line, line_no, &mut table)?;
    }

    Ok(table)
}

fn parse_line(line: &str, line_no: usize, table: &mut StateTable) -> Result<(), ParseError> {
    let Some(caps) = plugin_line_re().captures(line.trim_end()) else {
        return Ok(());
    };

    let plugin = &caps["plugin"];
    let message = caps["message"].trim();
    if plugin != LATENCY_PLUGIN && plugin != TEST_CASE_PLUGIN {
        return Ok(());
    }

    let state_id: i32 = caps["state"]
        .parse()
        .map_err(|e| malformed(line_no, format!("invalid state id: {}", e)))?;

    if plugin == LATENCY_PLUGIN && message.starts_with("Function") {
        let event = parse_function_event(message, line_no)?;
        table
            .entry(state_id)
            .or_insert_with(|| StateTrace::new(state_id))
            .push_event(event);
    } else if plugin == TEST_CASE_PLUGIN && message.starts_with(TEST_CASE_PREFIX) {
        let fields = split_fields(message);
        let instructions = parse_decimal(required(&fields, "instruction", line_no)?, line_no)?;
        let syscalls = parse_decimal(required(&fields, "syscall", line_no)?, line_no)?;

        let state = table
            .entry(state_id)
            .or_insert_with(|| StateTrace::new(state_id));
        if state.instruction_count != 0 || state.syscall_count != 0 {
            warn!(
                "State {} reports test case counters twice (line {})",
                state_id, line_no
            );
        }
        state.instruction_count = instructions;
        state.syscall_count = syscalls;
        debug!(
            "State {}: {} instructions, {} syscalls",
            state_id, instructions, syscalls
        );
    }

    Ok(())
}

fn parse_function_event(message: &str, line_no: usize) -> Result<FunctionCallEvent, ParseError> {
    let fields = split_fields(message);

    let function = parse_number(required(&fields, "Function", line_no)?, line_no)?;
    let activity_id = parse_number(required(&fields, "activityId", line_no)?, line_no)?;
    let caller = parse_number(required(&fields, "caller", line_no)?, line_no)?;
    let parent_id = parse_number(required(&fields, "parentId", line_no)?, line_no)?;
    let runs = required(&fields, "runs", line_no)?;
    let execution_time: f64 = runs
        .trim_end_matches("ms")
        .trim()
        .parse()
        .map_err(|e| malformed(line_no, format!("invalid execution time '{}': {}", runs, e)))?;

    Ok(FunctionCallEvent::new(
        function,
        caller,
        activity_id,
        parent_id,
        execution_time,
    ))
}

/// Split a message into `(key, value)` pairs
///
/// `key=value` splits at the `=`, anything else splits at the last whitespace,
/// so `the number of syscall 4` yields `("the number of syscall", "4")`.
fn split_fields(message: &str) -> Vec<(&str, &str)> {
    message
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.split_once('=') {
            Some((key, value)) => Some((key.trim(), value.trim())),
            None => part
                .rsplit_once(char::is_whitespace)
                .map(|(key, value)| (key.trim(), value.trim())),
        })
        .collect()
}

fn required<'a>(
    fields: &[(&'a str, &'a str)],
    name: &str,
    line_no: usize,
) -> Result<&'a str, ParseError> {
    fields
        .iter()
        .find(|(key, _)| {
            *key == name
                || key
                    .strip_suffix(name)
                    .is_some_and(|head| head.ends_with(' '))
        })
        .map(|(_, value)| *value)
        .ok_or_else(|| malformed(line_no, format!("missing field '{}'", name)))
}

/// Numbers are hex with a `0x` prefix, decimal otherwise
fn parse_number(value: &str, line_no: usize) -> Result<u64, ParseError> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|e| malformed(line_no, format!("invalid number '{}': {}", value, e)))
}

fn parse_decimal(value: &str, line_no: usize) -> Result<u64, ParseError> {
    value
        .parse::<u64>()
        .map_err(|e| malformed(line_no, format!("invalid count '{}': {}", value, e)))
}

fn malformed(line: usize, reason: String) -> ParseError {
    ParseError::MalformedLine { line, reason }
}
