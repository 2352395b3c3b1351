use latency_diff::commands::{execute_analyze, AnalyzeArgs};
use latency_diff::diff::{PairOutcome, SkipReason};
use latency_diff::output::read_report_value;
use latency_diff::utils::config::AnalysisConfig;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

const TRACE: &str = "\
[State 0] LatencyTracker: Function 0x1; activityId 1; caller 0x0; parentId 0; runs 100ms;
[State 0] TestCaseGenerator: generating test case at address 0x1; the number of instruction 10; the number of syscall 1;
[State 1] LatencyTracker: Function 0x1; activityId 1; caller 0x0; parentId 0; runs 150ms;
[State 1] LatencyTracker: Function 0x2; activityId 2; caller 0x1; parentId 1; runs 40ms;
[State 1] TestCaseGenerator: generating test case at address 0x1; the number of instruction 14; the number of syscall 2;
[State 2] LatencyTracker: Function 0x1; activityId 1; caller 0x0; parentId 0; runs 105ms;
";

fn write_trace(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("trace.txt");
    fs::write(&path, TRACE).unwrap();
    path
}

#[test]
fn test_analyze_writes_every_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let outdir = temp_dir.path().join("out");
    let args = AnalyzeArgs {
        trace: write_trace(temp_dir.path()),
        outdir: outdir.clone(),
        flamegraph: true,
        ..Default::default()
    };

    let report = execute_analyze(args).unwrap();

    // (0,1) and (1,2) exceed 20%, (0,2) is a 5% gap
    let pairs: Vec<_> = report.analyzed().map(|(c, _)| (c.first, c.second)).collect();
    assert_eq!(pairs, vec![(0, 1), (2, 1)]);
    assert!(report.comparisons.iter().any(|c| matches!(
        c.outcome,
        PairOutcome::Skipped(SkipReason::SimilarLatency { .. })
    )));

    for name in [
        "trace_state_0.csv",
        "trace_state_1.csv",
        "trace_state_2.csv",
        "trace_diff_state_0_1.csv",
        "trace_diff_state_0_1.diff",
        "trace_diff_state_2_1.csv",
        "flamegraph_0_1.svg",
        "result.txt",
        "analysis.json",
    ] {
        assert!(outdir.join(name).exists(), "missing {}", name);
    }

    let annotated = fs::read_to_string(outdir.join("trace_diff_state_0_1.csv")).unwrap();
    assert_eq!(
        annotated,
        "function,caller,activity_id,parent_id,execution_time(ms),diff_time(ms)\n\
         0x1,0x0,1,0,150,50\n\
         0x2,0x1,2,1,40,40\n"
    );

    let result = fs::read_to_string(outdir.join("result.txt")).unwrap();
    assert!(result.starts_with(
        "[State 0] => the number of instruction is 10, the number of syscall is 1, \
         the total execution time 100ms\n"
    ));
    assert!(result.contains(
        "[State 1] Function 0x2, caller 0x1, activityId 2, parentId 1, \
         execution time 40ms; diff time 40ms"
    ));

    let json = read_report_value(outdir.join("analysis.json")).unwrap();
    assert_eq!(json["comparisons"].as_array().unwrap().len(), 3);
}

#[test]
fn test_result_file_append() {
    let temp_dir = tempfile::tempdir().unwrap();
    let trace = write_trace(temp_dir.path());
    let result = temp_dir.path().join("result.log");
    fs::write(&result, "previous run\n").unwrap();

    let args = AnalyzeArgs {
        trace: trace.clone(),
        outdir: temp_dir.path().join("out"),
        result_file: Some(result.clone()),
        append: true,
        ..Default::default()
    };
    execute_analyze(args).unwrap();
    let appended = fs::read_to_string(&result).unwrap();
    assert!(appended.starts_with("previous run\n[State 0]"));

    let args = AnalyzeArgs {
        trace,
        outdir: temp_dir.path().join("out"),
        result_file: Some(result.clone()),
        append: false,
        ..Default::default()
    };
    execute_analyze(args).unwrap();
    assert!(fs::read_to_string(&result).unwrap().starts_with("[State 0]"));
}

#[test]
fn test_blacklist_by_symbol_name() {
    let temp_dir = tempfile::tempdir().unwrap();
    let symbols = temp_dir.path().join("prog.objdump");
    fs::write(
        &symbols,
        "\nprog:     file format elf64-x86-64\n\nSYMBOL TABLE:\n\
         0000000000000001 g     F .text\t0000000000000010              main\n\
         0000000000000002 g     F .text\t0000000000000010              helper\n",
    )
    .unwrap();

    let args = AnalyzeArgs {
        trace: write_trace(temp_dir.path()),
        outdir: temp_dir.path().join("out"),
        symbols: Some(symbols),
        config: AnalysisConfig {
            blacklist: vec!["helper".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };

    let report = execute_analyze(args).unwrap();
    let (_, analysis) = report.analyzed().next().unwrap();
    assert_eq!(analysis.critical_path.activity_ids(), vec![1]);
}

#[test]
fn test_unreadable_trace_fails_before_analysis() {
    let temp_dir = tempfile::tempdir().unwrap();
    let args = AnalyzeArgs {
        trace: temp_dir.path().join("missing.txt"),
        outdir: temp_dir.path().join("out"),
        ..Default::default()
    };
    assert!(execute_analyze(args).is_err());
    assert!(!temp_dir.path().join("out").exists());
}
