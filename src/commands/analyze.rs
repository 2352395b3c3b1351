//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Parses the trace file into states
//! 2. Attaches constraints and loads symbols (optional)
//! 3. Dumps every state as CSV
//! 4. Runs the pairwise analysis
//! 5. Writes per-pair CSVs, diff logs and flamegraphs
//! 6. Writes the result file and the JSON report

use super::models::AnalyzeArgs;
use crate::aggregator::{build_delta_stacks, DeltaDistribution};
use crate::diff::{analyze_states, render_terminal_summary, AnalysisReport};
use crate::flamegraph::{generate_flamegraph, FlamegraphConfig};
use crate::model::StateTable;
use crate::output::{
    diff_csv_name, diff_log_name, flamegraph_name, state_csv_name, write_report,
    write_result_file, write_svg, write_trace_csv, write_unified_diff,
};
use crate::parser::{attach_constraints, load_constraints, parse_trace_file};
use crate::symbols::{load_symbols, SymbolTable};
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::time::Instant;

/// Execute the analyze command
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// The analysis report, after every output file has been written
///
/// # Errors
/// * Unreadable or malformed trace, constraint or symbol files
/// * File write errors
///
/// Per-pair alignment failures are not errors here; they are recorded in
/// the report.
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalysisReport> {
    let start_time = Instant::now();

    info!("Step 1/5: Parsing trace {}", args.trace.display());
    let mut table = parse_trace_file(&args.trace)
        .with_context(|| format!("Failed to parse trace {}", args.trace.display()))?;
    if table.is_empty() {
        warn!("No states found in {}", args.trace.display());
    }

    info!("Step 2/5: Loading constraints and symbols...");
    if let Some(path) = &args.constraints {
        let records = load_constraints(path)
            .with_context(|| format!("Failed to load constraints from {}", path.display()))?;
        let attached = attach_constraints(&mut table, records);
        info!("Attached {} constraints", attached);
    } else if args.config.constraint_ignore.is_some() {
        warn!("constraint_ignore is set but no constraint file was given; all states compare as unconstrained");
    }

    let symbols = match &args.symbols {
        Some(path) => Some(
            load_symbols(path)
                .with_context(|| format!("Failed to load symbols from {}", path.display()))?,
        ),
        None => None,
    };
    let blacklist = resolve_blacklist(&args.config.blacklist, symbols.as_ref());

    info!("Step 3/5: Writing state dumps to {}", args.outdir.display());
    for state in table.values() {
        write_trace_csv(state, args.outdir.join(state_csv_name(state.id)))
            .with_context(|| format!("Failed to write dump of state {}", state.id))?;
    }

    info!("Step 4/5: Comparing states...");
    let report = analyze_states(&table, &args.config, &blacklist);

    info!("Step 5/5: Writing results...");
    write_pair_outputs(&args, &table, &report, symbols.as_ref())?;
    write_result_file(&report, args.result_path(), args.append)
        .context("Failed to write result file")?;
    write_report(&report, args.report_path()).context("Failed to write JSON report")?;

    if args.print_summary {
        println!("{}", render_terminal_summary(&report, symbols.as_ref()));
    }

    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(report)
}

/// Validate analyze arguments before running
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if !args.trace.exists() {
        bail!("Trace file not found: {}", args.trace.display());
    }
    if let Some(path) = &args.constraints {
        if !path.exists() {
            bail!("Constraint file not found: {}", path.display());
        }
    }
    if let Some(path) = &args.symbols {
        if !path.exists() {
            bail!("Symbol file not found: {}", path.display());
        }
    }
    args.config.validate().context("Invalid analysis configuration")?;
    Ok(())
}

/// Turn black-list entries into function addresses
///
/// Entries are hex (`0x...`) or decimal addresses, or symbol names resolved
/// through `symbols`. Unresolvable entries are warned about and dropped.
pub fn resolve_blacklist(entries: &[String], symbols: Option<&SymbolTable>) -> HashSet<u64> {
    let mut resolved = HashSet::new();

    for entry in entries {
        let entry = entry.trim();
        let address = parse_address(entry)
            .or_else(|| symbols.and_then(|t| t.by_name(entry)).map(|s| s.address));
        match address {
            Some(address) => {
                resolved.insert(address);
            }
            None => warn!("Ignoring black-list entry {:?}: not an address or known symbol", entry),
        }
    }

    debug!("Black list resolved to {} addresses", resolved.len());
    resolved
}

fn parse_address(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn write_pair_outputs(
    args: &AnalyzeArgs,
    table: &StateTable,
    report: &AnalysisReport,
    symbols: Option<&SymbolTable>,
) -> Result<()> {
    for (comparison, analysis) in report.analyzed() {
        let (a, b) = (comparison.first, comparison.second);
        debug!(
            "Pair ({}, {}): {}",
            a,
            b,
            DeltaDistribution::from_trace(&analysis.annotated).summary()
        );

        write_trace_csv(&analysis.annotated, args.outdir.join(diff_csv_name(a, b)))
            .with_context(|| format!("Failed to write annotated dump of pair ({}, {})", a, b))?;

        if let (Some(first), Some(second)) = (table.get(&a), table.get(&b)) {
            write_unified_diff(first, second, &analysis.script, args.outdir.join(diff_log_name(a, b)))
                .with_context(|| format!("Failed to write diff log of pair ({}, {})", a, b))?;
        }

        if args.flamegraph {
            let stacks = build_delta_stacks(&analysis.annotated, symbols);
            if stacks.is_empty() {
                info!("State {} is nowhere slower than state {}, no flamegraph", b, a);
                continue;
            }
            let config = FlamegraphConfig::new()
                .with_title(format!("State {} vs State {}", b, a))
                .with_subtitle(format!("latency gap {:.2}%", comparison.latency_gap * 100.0));
            let svg = generate_flamegraph(&stacks, Some(&config))
                .with_context(|| format!("Failed to render flamegraph of pair ({}, {})", a, b))?;
            write_svg(&svg, args.outdir.join(flamegraph_name(a, b)))
                .context("Failed to write flamegraph")?;
        }
    }
    Ok(())
}
