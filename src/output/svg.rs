//! SVG flamegraph output writer.

use super::create_output;
use crate::utils::error::OutputError;
use log::{info, warn};
use std::io::Write;
use std::path::Path;

/// Write SVG content to a file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
///
/// # Example
/// ```ignore
/// let svg = generate_flamegraph(&stacks, None)?;
/// write_svg(&svg, "output/flamegraph_0_1.svg")?;
/// ```
pub fn write_svg(svg_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing SVG to: {}", output_path.display());

    if output_path.extension().and_then(|e| e.to_str()) != Some("svg") {
        warn!("Output file doesn't have .svg extension: {}", output_path.display());
    }

    let mut writer = create_output(output_path, false)?;
    writer.write_all(svg_content.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// `flamegraph_<first>_<second>.svg`
pub fn flamegraph_name(first: i32, second: i32) -> String {
    format!("flamegraph_{}_{}.svg", first, second)
}
