//! Evaluate command implementation

use super::{load_query, output};
use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use octofhir_aql_ast::render;
use octofhir_aql_cohort::{
    CachedTemplateRegistry, Cohort, CohortConfig, CohortEngine, FixtureEngine, IdentifierSet,
    QueryResponse, TemplateRegistry, spawn_periodic_clear,
};
use output::OutputFormat;
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for evaluate command
pub struct EvaluateConfig {
    pub cohort_file: PathBuf,
    pub fixtures: PathBuf,
    pub allow_outside_eu: bool,
    pub config_file: Option<PathBuf>,
    pub consent_oid: Option<String>,
    pub export: Option<PathBuf>,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

impl EvaluateConfig {
    /// Settings from the config file, overridden by command-line flags
    pub fn settings(&self) -> Result<CohortConfig> {
        let mut settings = match &self.config_file {
            Some(path) => CohortConfig::from_json_file(path)
                .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
            None => CohortConfig::default(),
        };
        if self.consent_oid.is_some() {
            settings.consent_oid = self.consent_oid.clone();
        }
        Ok(settings)
    }
}

/// Evaluate a cohort against a fixture engine, optionally exporting its records
pub async fn evaluate(config: EvaluateConfig) -> Result<()> {
    let settings = config.settings()?;
    let fixture = Arc::new(
        FixtureEngine::from_json_file(&config.fixtures)
            .with_context(|| format!("Failed to load fixtures: {}", config.fixtures.display()))?,
    );

    let content = fs::read_to_string(&config.cohort_file)
        .with_context(|| format!("Failed to read cohort file: {}", config.cohort_file.display()))?;
    let cohort: Cohort = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cohort file: {}", config.cohort_file.display()))?;

    let engine = CohortEngine::new(fixture.clone(), &settings);
    let ids = engine
        .evaluate_cohort(&cohort, config.allow_outside_eu)
        .with_context(|| format!("Failed to evaluate cohort '{}'", cohort.id))?;
    info!("Cohort '{}' evaluated to {} subject(s)", cohort.id, ids.len());
    if ids.is_empty() {
        eprintln!("{}", output::format_warning("Cohort matched no subjects"));
    }

    let export = match &config.export {
        Some(path) => {
            let registry = CachedTemplateRegistry::new(fixture.clone(), settings.cache_ttl());
            let sweeper = spawn_periodic_clear(registry.cache(), settings.cache_ttl());
            let templates = registry.list_templates().context("Failed to list templates")?;
            let query = render(&load_query(path)?)?;
            let response = engine
                .export(&query, &ids, &templates, config.allow_outside_eu)
                .with_context(|| format!("Failed to export records with {}", path.display()));
            sweeper.abort();
            Some(response?)
        }
        None => None,
    };

    let content = match config.format {
        OutputFormat::Text => format_text(&cohort, &ids, export.as_ref()),
        OutputFormat::Json | OutputFormat::JsonPretty => output::format_json(
            &to_json(&cohort, &ids, export.as_ref())?,
            config.format == OutputFormat::JsonPretty,
        )?,
    };
    output::write_output(&content, config.output_file.as_deref())
}

/// Human-readable summary
pub fn format_text(cohort: &Cohort, ids: &IdentifierSet, export: Option<&QueryResponse>) -> String {
    let mut lines = vec![format!(
        "{} {} matched {} subject(s)",
        "Cohort".bold(),
        cohort.name.cyan(),
        ids.len().to_string().green()
    )];
    lines.extend(ids.iter().map(|id| format!("  {}", id)));

    if let Some(response) = export {
        lines.push(format!("{} {}", "Export:".bold(), response.query));
        let header: Vec<&str> = response.columns.iter().map(|c| c.name.as_str()).collect();
        lines.push(format!("  {}", header.join(" | ")));
        for row in &response.rows {
            let cells: Vec<String> = row.iter().map(format_cell).collect();
            lines.push(format!("  {}", cells.join(" | ")));
        }
    }
    lines.join("\n")
}

/// JSON summary
pub fn to_json(cohort: &Cohort, ids: &IdentifierSet, export: Option<&QueryResponse>) -> Result<Value> {
    let mut value = json!({
        "cohort": cohort.id,
        "name": cohort.name,
        "size": ids.len(),
        "ids": ids,
    });
    if let Some(response) = export {
        value["export"] = serde_json::to_value(response).context("Failed to serialize export")?;
    }
    Ok(value)
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
