//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_aql_diagnostics::AqlError;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "json-pretty" => Self::JsonPretty,
            _ => Self::Text,
        }
    }
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Format diagnostic information (file:line:col)
pub fn format_location(file: &str, line: usize, col: usize) -> String {
    format!("{}:{}:{}", file.cyan(), line, col)
}

/// Attach the file location to a parse error
pub fn parse_failure(file: &Path, error: AqlError) -> anyhow::Error {
    let location = error
        .location()
        .map(|loc| format_location(&file.display().to_string(), loc.line, loc.column))
        .unwrap_or_else(|| file.display().to_string());
    anyhow::Error::new(error).context(format!("Failed to parse query at {}", location))
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Format JSON value for output
pub fn format_json(value: &Value, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}
