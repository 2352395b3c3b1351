use latency_diff::parser::dat_parser::TraceRecord;
use latency_diff::parser::{attach_constraints, load_constraints, parse_log_lines, parse_trace_file};
use latency_diff::utils::error::ParseError;
use pretty_assertions::assert_eq;
use std::io::Write;

const SAMPLE_LOG: &str = "\
0 [State 0] LatencyTracker: Function 0x401126; activityId 1; caller 0x0; parentId 0; runs 100ms;
1 [State 0] TestCaseGenerator: generating test case at address 0x401150; the number of instruction 1200; the number of syscall 4;
2 [State 1] LatencyTracker: Function 0x401126; activityId 1; caller 0x0; parentId 0; runs 150ms;
3 [State 1] Searcher: selecting state 1
4 [State 1] LatencyTracker: Function=0x401200; activityId=2; caller=0x401126; parentId=1; runs=40ms;
KLEE: done: total instructions = 3000
";

fn record(state_id: i32, address: u64, caller: u64, activity: u64, parent: u64, time: f64) -> TraceRecord {
    TraceRecord {
        state_id,
        address,
        return_address: 0,
        caller_address: caller,
        execution_time: time,
        activity_id: activity,
        parent_id: parent,
        begin: 0,
    }
}

#[test]
fn test_parse_text_log() {
    let table = parse_log_lines(SAMPLE_LOG.as_bytes()).unwrap();

    assert_eq!(table.len(), 2);
    let first = &table[&0];
    assert_eq!(first.instruction_count, 1200);
    assert_eq!(first.syscall_count, 4);
    assert_eq!(first.total_execution_time, 100.0);

    let second = &table[&1];
    assert_eq!(second.len(), 2);
    assert_eq!(second.events[1].function, 0x401200);
    assert_eq!(second.events[1].caller, 0x401126);
    assert_eq!(second.events[1].parent_id, 1);
    // only root-level calls count towards the total
    assert_eq!(second.total_execution_time, 150.0);
}

#[test]
fn test_malformed_marker_line_is_an_error() {
    let log = "[State 0] LatencyTracker: Function 0x1; activityId 1; caller 0x0; runs 2ms;\n";
    match parse_log_lines(log.as_bytes()) {
        Err(ParseError::MalformedLine { line, reason }) => {
            assert_eq!(line, 1);
            assert!(reason.contains("parentId"));
        }
        other => panic!("expected malformed line, got {:?}", other),
    }
}

#[test]
fn test_format_detected_by_extension() {
    let temp_dir = tempfile::tempdir().unwrap();

    let text_path = temp_dir.path().join("run.txt");
    std::fs::write(&text_path, SAMPLE_LOG).unwrap();
    assert_eq!(parse_trace_file(&text_path).unwrap().len(), 2);

    let bin_path = temp_dir.path().join("run.dat");
    let mut file = std::fs::File::create(&bin_path).unwrap();
    for rec in [
        record(0, 0x10, 0, 1, 0, 5.0),
        record(3, 0x10, 0, 1, 0, 9.0),
        record(3, 0x20, 0x10, 2, 1, 4.0),
    ] {
        file.write_all(&rec.to_bytes()).unwrap();
    }
    drop(file);

    let table = parse_trace_file(&bin_path).unwrap();
    assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![0, 3]);
    assert_eq!(table[&3].len(), 2);
    assert_eq!(table[&3].total_execution_time, 9.0);
}

#[test]
fn test_truncated_binary_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("broken.dat");
    let mut bytes = record(0, 0x10, 0, 1, 0, 5.0).to_bytes().to_vec();
    bytes.extend_from_slice(&[0u8; 7]);
    std::fs::write(&path, bytes).unwrap();

    assert!(matches!(
        parse_trace_file(&path),
        Err(ParseError::TruncatedRecord { size: 67, .. })
    ));
}

#[test]
fn test_missing_trace_file() {
    assert!(parse_trace_file("definitely/missing.txt").is_err());
}

#[test]
fn test_constraints_attach_in_file_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("constraints.json");
    std::fs::write(
        &path,
        r#"[
            {"state": 1, "name": "argv_1", "value": 3, "is_target": true},
            {"state": 1, "name": "argv_2", "value": 0, "is_target": false},
            {"state": 0, "name": "argv_1", "value": 3, "is_target": true}
        ]"#,
    )
    .unwrap();

    let mut table = parse_log_lines(SAMPLE_LOG.as_bytes()).unwrap();
    let records = load_constraints(&path).unwrap();
    assert_eq!(attach_constraints(&mut table, records), 3);

    let names: Vec<_> = table[&1].constraints.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["argv_1", "argv_2"]);
    assert!(table[&0].constraints[0].is_target);
}
