//! latency-diff CLI
//!
//! Compares the states of a symbolic-execution trace pairwise and reports
//! the call path responsible for most of each latency regression.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Env, Target};
use std::fs::File;
use std::path::PathBuf;

use latency_diff::commands::{
    display_version, execute_analyze, inspect_trace, list_symbols, validate_args, AnalyzeArgs,
};
use latency_diff::utils::config::{load_config, AnalysisConfig, DEFAULT_OUTDIR, EXTENDED_MAX_DEPTH};

/// latency-diff - Differential latency analysis of execution traces
#[derive(Parser, Debug)]
#[command(name = "latency-diff")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write the log to this file instead of stderr
    #[arg(long, global = true, env = "LATENCY_DIFF_LOG")]
    log_file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare every pair of states and extract critical paths
    Analyze {
        /// Trace file (`.txt` log, anything else is read as binary records)
        #[arg(short, long)]
        trace: PathBuf,

        /// TOML file with analysis settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON file with per-state constraints
        #[arg(long)]
        constraints: Option<PathBuf>,

        /// Symbol source (`objdump -t` output or an object file)
        #[arg(short, long)]
        symbols: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTDIR)]
        outdir: PathBuf,

        /// Result file (defaults to <outdir>/result.txt)
        #[arg(short, long)]
        result: Option<PathBuf>,

        /// Append to the result file instead of replacing it
        #[arg(short, long)]
        append: bool,

        /// Minimum relative latency gap for a pair to be analyzed
        #[arg(long)]
        threshold: Option<f64>,

        /// Maximum critical path length
        #[arg(long, conflicts_with = "extended_depth")]
        max_depth: Option<usize>,

        /// Use the extended critical path length
        #[arg(long)]
        extended_depth: bool,

        /// Children must exceed this delta (ms) to extend the path
        #[arg(long)]
        min_delta: Option<f64>,

        /// Functions to exclude from critical paths (addresses or symbol names)
        #[arg(short, long, value_delimiter = ',')]
        blacklist: Vec<String>,

        /// Compare constrained states differing in at most N constraints
        #[arg(long)]
        constraint_ignore: Option<usize>,

        /// Write a delta flamegraph per analyzed pair
        #[arg(long)]
        flamegraph: bool,

        /// Print a colored summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Print per-state counters of a trace file
    Inspect {
        /// Trace file
        #[arg(short, long)]
        trace: PathBuf,
    },

    /// List the text symbols of an objdump listing or object file
    Symbols {
        /// Symbol source
        #[arg(short, long)]
        file: PathBuf,

        /// Only show symbols whose name contains this string
        #[arg(long)]
        filter: Option<String>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(log_level));
    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            trace,
            config,
            constraints,
            symbols,
            outdir,
            result,
            append,
            threshold,
            max_depth,
            extended_depth,
            min_delta,
            blacklist,
            constraint_ignore,
            flamegraph,
            summary,
        } => {
            // File settings first, flags override
            let mut analysis = match &config {
                Some(path) => load_config(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => AnalysisConfig::default(),
            };
            if let Some(threshold) = threshold {
                analysis.similarity_threshold = threshold;
            }
            if extended_depth {
                analysis.max_depth = EXTENDED_MAX_DEPTH;
            } else if let Some(depth) = max_depth {
                analysis.max_depth = depth;
            }
            if let Some(min_delta) = min_delta {
                analysis.min_delta = min_delta;
            }
            analysis.blacklist.extend(blacklist);
            if constraint_ignore.is_some() {
                analysis.constraint_ignore = constraint_ignore;
            }

            let args = AnalyzeArgs {
                trace,
                config: analysis,
                constraints,
                symbols,
                outdir,
                result_file: result,
                append,
                flamegraph,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            let report = execute_analyze(args)?;
            if report.failed_count() > 0 {
                log::warn!("{} comparisons failed, see the report", report.failed_count());
            }
        }

        Commands::Inspect { trace } => {
            inspect_trace(&trace)?;
        }

        Commands::Symbols { file, filter } => {
            list_symbols(&file, filter.as_deref())?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
