//! Render command implementation

use super::{load_query, output};
use anyhow::{Context, Result};
use octofhir_aql_ast::QueryAst;
use output::OutputFormat;
use std::path::PathBuf;

/// Configuration for render command
pub struct RenderConfig {
    pub file: PathBuf,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Parse a query file and print it in canonical form
pub fn render(config: RenderConfig) -> Result<()> {
    let ast = load_query(&config.file)?;
    let content = format_query(&ast, config.format)?;
    output::write_output(&content, config.output_file.as_deref())
}

/// Canonical text, or the AST as JSON
pub fn format_query(ast: &QueryAst, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => crate::render(ast).context("Failed to render query"),
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let value = serde_json::to_value(ast).context("Failed to serialize query")?;
            output::format_json(&value, format == OutputFormat::JsonPretty)
        }
    }
}
