//! Restrict command implementation

use super::{load_query, output};
use anyhow::{Context, Result};
use log::info;
use octofhir_aql_policy::{PolicyRunner, QueryPolicy};
use std::path::PathBuf;

/// Configuration for restrict command
pub struct RestrictConfig {
    pub file: PathBuf,
    pub ehr_ids: Vec<String>,
    pub templates: Vec<String>,
    pub consent_oid: Option<String>,
    pub output_file: Option<PathBuf>,
}

impl RestrictConfig {
    /// Policies requested on the command line, in application order
    pub fn policies(&self) -> Vec<QueryPolicy> {
        let mut policies = Vec::new();
        if !self.ehr_ids.is_empty() {
            policies.push(QueryPolicy::ehr(self.ehr_ids.iter().cloned()));
        }
        if !self.templates.is_empty() {
            policies.push(QueryPolicy::templates(self.templates.iter().cloned()));
        }
        if self.consent_oid.is_some() {
            policies.push(QueryPolicy::consent(self.consent_oid.clone()));
        }
        policies
    }
}

/// Apply restriction policies to a query file and print the result
pub fn restrict(config: RestrictConfig) -> Result<()> {
    let ast = load_query(&config.file)?;
    let policies = config.policies();
    info!("Applying {} policies to {}", policies.len(), config.file.display());

    let content = PolicyRunner::new()
        .rewrite_and_render(&ast, &policies)
        .with_context(|| format!("Failed to restrict {}", config.file.display()))?;
    output::write_output(&content, config.output_file.as_deref())
}
