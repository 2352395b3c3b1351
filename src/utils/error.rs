//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while ingesting traces
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unable to open {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("Trace file size {size} is not a multiple of the {record_size}-byte record")]
    TruncatedRecord { size: u64, record_size: usize },

    #[error("Constraint file is not valid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors that can occur while loading symbol tables
#[derive(Error, Debug)]
pub enum SymbolError {
    #[error("Unable to read symbol file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unable to parse object file: {0}")]
    ObjectError(#[from] object::Error),

    #[error("No `SYMBOL TABLE:` section found")]
    MissingTable,
}

/// Structural errors of a single pairwise comparison
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffError {
    #[error("Alignment failed: {0}")]
    Alignment(String),

    #[error(
        "Aligned events differ: first[{first_index}] is {first_function:#x}, \
         second[{second_index}] is {second_function:#x}"
    )]
    IdentityMismatch {
        first_index: usize,
        second_index: usize,
        first_function: u64,
        second_function: u64,
    },

    #[error("Cursor overrun in {trace} trace at index {index} (bound {bound})")]
    CursorOverrun {
        trace: &'static str,
        index: usize,
        bound: usize,
    },
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("Failed to render flamegraph: {0}")]
    Render(String),

    #[error("Flamegraph output is not UTF-8: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading analyzer configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
