//! Rendering of validation results for humans and pipelines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::validator::ValidationResult;

/// How a result is printed on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// `key=value` lines
    #[default]
    Lines,
    /// The full result as a JSON object
    Json,
}

/// The `key=value` pairs pipelines consume, in a fixed order
pub fn output_pairs(result: &ValidationResult) -> Vec<(&'static str, String)> {
    vec![
        ("version", result.version.clone()),
        ("major_minor", result.major_minor.clone()),
        ("release_branch", result.release_branch.clone()),
        ("is_minor", result.is_minor.to_string()),
        ("is_first_rc", result.is_first_rc.to_string()),
        ("tag", result.tag.clone()),
    ]
}

/// Render as `key=value` lines, newline terminated
pub fn render_lines(result: &ValidationResult) -> String {
    output_pairs(result)
        .into_iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
}

pub fn render_json(result: &ValidationResult) -> Result<String> {
    serde_json::to_string_pretty(result)
        .map_err(|e| ReleaseError::config(format!("Cannot serialize result: {}", e)))
}

pub fn render(result: &ValidationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Lines => Ok(render_lines(result)),
        OutputFormat::Json => render_json(result).map(|json| json + "\n"),
    }
}

/// Append the result to a CI step-output file (e.g. `$GITHUB_OUTPUT`)
pub fn append_step_outputs(path: &Path, result: &ValidationResult) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(render_lines(result).as_bytes())?;
    Ok(())
}
