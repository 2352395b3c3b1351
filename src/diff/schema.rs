//! Schema definitions for alignments, critical paths and analysis reports.

use crate::model::{FunctionCallEvent, StateTrace};
use serde::{Deserialize, Serialize};

/// Kind of a single alignment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EditKind {
    /// Present only in the second trace
    Add,
    /// Present only in the first trace
    Delete,
    /// Same function at both positions
    Common,
}

/// One alignment operation with its positions in each trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOp {
    pub kind: EditKind,
    pub position_in_first: Option<usize>,
    pub position_in_second: Option<usize>,
}

impl EditOp {
    pub fn common(first: usize, second: usize) -> Self {
        Self {
            kind: EditKind::Common,
            position_in_first: Some(first),
            position_in_second: Some(second),
        }
    }

    pub fn add(second: usize) -> Self {
        Self {
            kind: EditKind::Add,
            position_in_first: None,
            position_in_second: Some(second),
        }
    }

    pub fn delete(first: usize) -> Self {
        Self {
            kind: EditKind::Delete,
            position_in_first: Some(first),
            position_in_second: None,
        }
    }
}

/// A common run followed by the changes that come after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// Index into the first trace where the common run starts
    pub first_start: usize,

    /// Index into the second trace where the common run starts
    pub second_start: usize,

    /// Length of the common run
    pub common_len: usize,

    /// Changes after the common run, in order
    pub changes: Vec<EditKind>,
}

impl Hunk {
    /// Events of the first trace spanned by this hunk
    pub fn first_len(&self) -> usize {
        self.common_len
            + self
                .changes
                .iter()
                .filter(|k| matches!(k, EditKind::Delete | EditKind::Common))
                .count()
    }

    /// Events of the second trace spanned by this hunk
    pub fn second_len(&self) -> usize {
        self.common_len
            + self
                .changes
                .iter()
                .filter(|k| matches!(k, EditKind::Add | EditKind::Common))
                .count()
    }
}

/// Ordered alignment between two traces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    pub ops: Vec<EditOp>,

    /// Hunks the ops were derived from (skipped hunks excluded)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hunks: Vec<Hunk>,

    /// Number of hunks rejected for regressing start positions
    #[serde(default)]
    pub skipped_hunks: usize,
}

impl EditScript {
    pub fn from_ops(ops: Vec<EditOp>) -> Self {
        Self {
            ops,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn count(&self, kind: EditKind) -> usize {
        self.ops.iter().filter(|op| op.kind == kind).count()
    }

    /// Only the add and delete ops, the lines of a unified diff
    pub fn changes(&self) -> impl Iterator<Item = &EditOp> {
        self.ops.iter().filter(|op| op.kind != EditKind::Common)
    }

    pub fn stats(&self) -> ScriptStats {
        ScriptStats {
            common: self.count(EditKind::Common),
            added: self.count(EditKind::Add),
            deleted: self.count(EditKind::Delete),
            hunks: self.hunks.len(),
            skipped_hunks: self.skipped_hunks,
        }
    }
}

/// Op counts of an edit script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStats {
    pub common: usize,
    pub added: usize,
    pub deleted: usize,
    pub hunks: usize,
    pub skipped_hunks: usize,
}

/// Greedy dominant-cost path through the annotated call tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Selected events, root first
    pub steps: Vec<FunctionCallEvent>,

    /// Whether the walk stopped on the depth limit rather than a leaf
    pub truncated: bool,
}

impl CriticalPath {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn activity_ids(&self) -> Vec<u64> {
        self.steps.iter().map(|e| e.activity_id).collect()
    }

    /// Sum of the deltas along the path
    pub fn total_delta(&self) -> f64 {
        self.steps.iter().filter_map(|e| e.latency_delta).sum()
    }
}

/// Result of a completed pairwise comparison
#[derive(Debug, Clone, Serialize)]
pub struct PairAnalysis {
    pub script_stats: ScriptStats,
    pub critical_path: CriticalPath,

    /// Functions with the largest accumulated delta
    pub top_regressions: Vec<FunctionDelta>,

    #[serde(skip)]
    pub script: EditScript,

    /// Second state with deltas applied
    #[serde(skip)]
    pub annotated: StateTrace,
}

/// Accumulated delta of one function across a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDelta {
    pub function: u64,
    pub calls: usize,
    pub total_delta: f64,
}

/// Why a pair was not analyzed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Total times are within the similarity threshold
    SimilarLatency { threshold: f64 },
    /// Constraint shapes differ
    NotComparable { detail: String },
}

/// What happened to one pair
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairOutcome {
    Skipped(SkipReason),
    Failed { error: String },
    Analyzed(Box<PairAnalysis>),
}

/// One unordered pair of states; `first` has the smaller total time
#[derive(Debug, Clone, Serialize)]
pub struct PairComparison {
    pub first: i32,
    pub second: i32,

    /// `(longer - shorter) / shorter`
    pub latency_gap: f64,

    /// Constraint names ignored to make the pair comparable
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_constraints: Vec<String>,

    pub outcome: PairOutcome,
}

impl PairComparison {
    pub fn analysis(&self) -> Option<&PairAnalysis> {
        match &self.outcome {
            PairOutcome::Analyzed(analysis) => Some(analysis),
            _ => None,
        }
    }
}

/// Aggregate counters of one state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub id: i32,
    pub instruction_count: u64,
    pub syscall_count: u64,
    pub total_execution_time: f64,
    pub events: usize,
}

impl From<&StateTrace> for StateSummary {
    fn from(state: &StateTrace) -> Self {
        Self {
            id: state.id,
            instruction_count: state.instruction_count,
            syscall_count: state.syscall_count,
            total_execution_time: state.total_execution_time,
            events: state.len(),
        }
    }
}

/// Full result of analyzing a state table
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub version: String,
    pub generated_at: String,
    pub states: Vec<StateSummary>,
    pub comparisons: Vec<PairComparison>,
}

impl AnalysisReport {
    pub fn analyzed(&self) -> impl Iterator<Item = (&PairComparison, &PairAnalysis)> {
        self.comparisons
            .iter()
            .filter_map(|c| c.analysis().map(|a| (c, a)))
    }

    pub fn failed_count(&self) -> usize {
        self.comparisons
            .iter()
            .filter(|c| matches!(c.outcome, PairOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.comparisons
            .iter()
            .filter(|c| matches!(c.outcome, PairOutcome::Skipped(_)))
            .count()
    }
}
