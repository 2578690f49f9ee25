//! Bind command implementation

use super::output;
use anyhow::{Context, Result};
use octofhir_aql_policy::{ParameterBinder, ParameterValue, Parameters};
use std::fs;
use std::path::PathBuf;

/// Configuration for bind command
pub struct BindConfig {
    pub file: PathBuf,
    pub params: Vec<String>,
    pub output_file: Option<PathBuf>,
}

/// Bind parameters into a query file and print the result
pub fn bind(config: BindConfig) -> Result<()> {
    let text = fs::read_to_string(&config.file)
        .with_context(|| format!("Failed to read query file: {}", config.file.display()))?;
    let parameters = parse_parameters(&config.params)?;

    let content = ParameterBinder::new(&parameters)
        .bind(&text)
        .with_context(|| format!("Failed to bind parameters into {}", config.file.display()))?;
    output::write_output(&content, config.output_file.as_deref())
}

/// Parse `name=value` pairs; `null` marks a parameter as absent
pub fn parse_parameters(params: &[String]) -> Result<Parameters> {
    let mut result = Parameters::new();

    for param in params {
        let Some((name, value_str)) = param.split_once('=') else {
            anyhow::bail!("Invalid parameter format: '{}'. Expected 'name=value'", param);
        };
        let name = name.trim().trim_start_matches('$').to_string();
        if name.is_empty() {
            anyhow::bail!("Invalid parameter format: '{}'. Missing name", param);
        }
        result.insert(name, parse_value(value_str.trim())?);
    }

    Ok(result)
}

fn parse_value(value_str: &str) -> Result<Option<ParameterValue>> {
    if value_str == "null" {
        return Ok(None);
    }
    if value_str.starts_with('[') {
        let value = serde_json::from_str(value_str)
            .with_context(|| format!("Invalid list value: {}", value_str))?;
        return Ok(Some(value));
    }

    let value = if let Ok(int) = value_str.parse::<i64>() {
        ParameterValue::Integer(int)
    } else if let Ok(decimal) = value_str.parse() {
        ParameterValue::Decimal(decimal)
    } else if value_str == "true" || value_str == "false" {
        ParameterValue::Boolean(value_str == "true")
    } else {
        ParameterValue::Text(unquote(value_str).to_string())
    };
    Ok(Some(value))
}

fn unquote(value: &str) -> &str {
    ['\'', '"']
        .iter()
        .find_map(|quote| {
            value
                .strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(value)
}
