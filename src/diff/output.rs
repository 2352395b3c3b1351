//! Terminal output rendering for analysis reports.
//!
//! Provides a human-readable summary of every pair with visual cues for
//! regressions, skips and failures.

use super::schema::{AnalysisReport, PairAnalysis, PairComparison, PairOutcome, SkipReason};
use crate::model::format_address;
use crate::symbols::SymbolTable;
use colored::*;

/// Render a human-readable summary of an analysis report for the terminal
pub fn render_terminal_summary(report: &AnalysisReport, symbols: Option<&SymbolTable>) -> String {
    let mut out = String::new();

    out.push_str(&render_header(report));
    for comparison in &report.comparisons {
        out.push_str(&render_comparison(comparison, symbols));
    }
    out.push_str(&render_status(report));

    out
}

fn render_header(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str("\n📊 ");
    out.push_str(&"Differential Latency Summary".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    for state in &report.states {
        out.push_str(&format!(
            "State {:>4}: {:>8} events, {:>12.3}ms\n",
            state.id, state.events, state.total_execution_time
        ));
    }
    out.push_str("---------------------------------------------------\n");
    out
}

fn render_comparison(comparison: &PairComparison, symbols: Option<&SymbolTable>) -> String {
    let title = format!(
        "State {} -> State {} ({})",
        comparison.first,
        comparison.second,
        format_gap(comparison.latency_gap)
    );

    match &comparison.outcome {
        PairOutcome::Skipped(SkipReason::SimilarLatency { .. }) => {
            format!("➡️  {} similar latency\n", title.dimmed())
        }
        PairOutcome::Skipped(SkipReason::NotComparable { detail }) => {
            format!("➡️  {} not comparable: {}\n", title.dimmed(), detail)
        }
        PairOutcome::Failed { error } => {
            format!("❌ {} {}\n", title.bold(), error.red())
        }
        PairOutcome::Analyzed(analysis) => {
            let mut out = format!("\n📈 {}\n", title.bold());
            out.push_str(&render_analysis(analysis, symbols));
            out
        }
    }
}

fn render_analysis(analysis: &PairAnalysis, symbols: Option<&SymbolTable>) -> String {
    let stats = &analysis.script_stats;
    let mut out = format!(
        "   {} common, {} added, {} deleted\n",
        stats.common,
        stats.added.to_string().green(),
        stats.deleted.to_string().red()
    );

    if analysis.critical_path.is_empty() {
        out.push_str("   no latency-increasing path\n");
        return out;
    }

    out.push_str("   Critical path:\n");
    for (depth, step) in analysis.critical_path.steps.iter().enumerate() {
        let delta = step.latency_delta.unwrap_or_default();
        out.push_str(&format!(
            "   {}└─ {} {}\n",
            "  ".repeat(depth.min(8)),
            label(step.function, symbols),
            format!("{:+.3}ms", delta).yellow()
        ));
    }
    if analysis.critical_path.truncated {
        out.push_str(&"   (depth limit reached)\n".dimmed().to_string());
    }
    out
}

fn render_status(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str("\n---------------------------------------------------\n");
    let analyzed = report.analyzed().count();
    let status = if report.failed_count() > 0 {
        format!(
            "❌ {} analyzed, {} skipped, {} FAILED",
            analyzed,
            report.skipped_count(),
            report.failed_count()
        )
        .red()
        .bold()
    } else {
        format!("✅ {} analyzed, {} skipped", analyzed, report.skipped_count())
            .green()
            .bold()
    };
    out.push_str(&status.to_string());
    out.push('\n');
    out
}

fn label(address: u64, symbols: Option<&SymbolTable>) -> String {
    match symbols {
        Some(table) => table.describe(address),
        None => format_address(address),
    }
}

fn format_gap(gap: f64) -> String {
    if gap.is_infinite() {
        "+inf%".to_string()
    } else {
        format!("{:+.2}%", gap * 100.0)
    }
}
