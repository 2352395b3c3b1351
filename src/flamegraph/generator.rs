//! SVG flamegraph generation using inferno.
//!
//! Each analyzed pair gets a flamegraph of the latency it gained: frame
//! widths are self deltas in microseconds, so wide frames are where the
//! slower state spent its extra time.

use crate::aggregator::stack_builder::CollapsedStack;
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::info;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub subtitle: Option<String>,
    pub count_name: String,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Latency Regression".to_string(),
            subtitle: None,
            count_name: "us".to_string(),
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// Generate an SVG flamegraph from collapsed stacks
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - Nothing got slower
/// * `FlamegraphError::Render` - inferno rejected the stacks or failed to write the SVG
/// * `FlamegraphError::Utf8Error` - The rendered SVG is not UTF-8
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    let mut options = Options::default();
    options.title = config.title;
    options.subtitle = config.subtitle;
    options.count_name = config.count_name;

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();
    let mut svg = Vec::new();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::Render(e.to_string()))?;

    let svg = String::from_utf8(svg)?;
    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}
