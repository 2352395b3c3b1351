use crate::utils::config::{AnalysisConfig, DEFAULT_OUTDIR};
use std::path::PathBuf;

/// Result file written next to the per-state dumps unless overridden
pub const DEFAULT_RESULT_FILE: &str = "result.txt";

/// JSON report written into the output directory
pub const REPORT_FILE: &str = "analysis.json";

/// Arguments for the analyze command
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Trace file (`.txt` log or binary records)
    pub trace: PathBuf,

    /// Engine settings after file and flag merging
    pub config: AnalysisConfig,

    /// Per-state constraint file (JSON)
    pub constraints: Option<PathBuf>,

    /// Symbol source: `objdump -t` text or an object file
    pub symbols: Option<PathBuf>,

    /// Directory for CSV dumps, diff logs, flamegraphs and the JSON report
    pub outdir: PathBuf,

    /// Narrative result file; defaults to `<outdir>/result.txt`
    pub result_file: Option<PathBuf>,

    /// Append to the result file instead of replacing it
    pub append: bool,

    /// Write a delta flamegraph per analyzed pair
    pub flamegraph: bool,

    /// Print the colored summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            config: AnalysisConfig::default(),
            constraints: None,
            symbols: None,
            outdir: PathBuf::from(DEFAULT_OUTDIR),
            result_file: None,
            append: false,
            flamegraph: false,
            print_summary: false,
        }
    }
}

impl AnalyzeArgs {
    pub fn result_path(&self) -> PathBuf {
        self.result_file
            .clone()
            .unwrap_or_else(|| self.outdir.join(DEFAULT_RESULT_FILE))
    }

    pub fn report_path(&self) -> PathBuf {
        self.outdir.join(REPORT_FILE)
    }
}
