//! Configuration and constants for the analyzer.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current analysis report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Pairs whose total times differ by less than this ratio are not compared
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.2;

/// Default critical path length
pub const DEFAULT_MAX_DEPTH: usize = 15;

/// Critical path length of the extended preset
pub const EXTENDED_MAX_DEPTH: usize = 30;

/// Size of one packed binary trace record
pub const TRACE_RECORD_SIZE: usize = 60;

/// Default output directory for per-state and per-pair files
pub const DEFAULT_OUTDIR: &str = "output";

// Markers in the engine's text log
pub const LATENCY_PLUGIN: &str = "LatencyTracker";
pub const TEST_CASE_PLUGIN: &str = "TestCaseGenerator";
pub const TEXT_TRACE_EXTENSION: &str = "txt";

/// Analysis settings threaded into the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum relative gap `(longer - shorter) / shorter` for a pair to be analyzed
    pub similarity_threshold: f64,

    /// Maximum number of events on a critical path
    pub max_depth: usize,

    /// Children must exceed this delta to extend the path
    pub min_delta: f64,

    /// Functions never selected on a critical path (hex addresses or symbol names)
    pub blacklist: Vec<String>,

    /// Enables the constraint pre-filter, tolerating this many differing constraints
    pub constraint_ignore: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
            min_delta: 0.0,
            blacklist: Vec::new(),
            constraint_ignore: None,
        }
    }
}

impl AnalysisConfig {
    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.similarity_threshold.is_finite() || self.similarity_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "similarity_threshold must be a non-negative number, got {}",
                self.similarity_threshold
            )));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be greater than 0".to_string(),
            ));
        }

        if !self.min_delta.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "min_delta must be finite, got {}",
                self.min_delta
            )));
        }

        Ok(())
    }
}

/// Load analysis settings from a TOML file
///
/// Missing keys fall back to their defaults.
///
/// # Errors
/// * `ConfigError::IoError` - If file cannot be read
/// * `ConfigError::ParseFailed` - If TOML is invalid
/// * `ConfigError::Invalid` - If a value is out of range
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AnalysisConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert_eq!(config.similarity_threshold, 0.2);
        assert_eq!(config.max_depth, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 30").unwrap();
        writeln!(file, "blacklist = [\"0x59a448\", \"cache_store\"]").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.max_depth, 30);
        assert_eq!(config.similarity_threshold, 0.2);
        assert_eq!(config.blacklist.len(), 2);
        assert!(config.constraint_ignore.is_none());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 0").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
