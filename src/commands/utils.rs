use crate::parser::parse_trace_file;
use crate::symbols::load_symbols;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Print per-state counters of a trace file
pub fn inspect_trace(path: &Path) -> Result<()> {
    println!("Inspecting trace: {}", path.display());

    let table = parse_trace_file(path)
        .with_context(|| format!("Failed to parse trace {}", path.display()))?;

    println!("✓ {} states", table.len());
    for state in table.values() {
        println!(
            "  State {:>4}: {:>8} events, {:>10} instructions, {:>6} syscalls, {:.3}ms",
            state.id,
            state.len(),
            state.instruction_count,
            state.syscall_count,
            state.total_execution_time
        );
    }

    Ok(())
}

/// Print the symbols of an objdump listing or object file
pub fn list_symbols(path: &Path, filter: Option<&str>) -> Result<()> {
    let table = load_symbols(path)
        .with_context(|| format!("Failed to load symbols from {}", path.display()))?;

    println!("{} text symbols in {}", table.len(), path.display());
    for symbol in table.symbols() {
        if filter.map_or(true, |f| symbol.name.contains(f)) {
            println!("  {:#018x} {}", symbol.address, symbol.name);
        }
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("latency-diff v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Differential latency analysis of symbolic-execution traces.");
}
