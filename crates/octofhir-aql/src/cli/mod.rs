//! CLI functionality for the AQL tool
//!
//! This module contains all CLI-related functionality including:
//! - Rendering queries in canonical form
//! - Applying restriction policies
//! - Binding parameters
//! - Evaluating cohorts against a fixture engine
//! - Output formatting

pub mod bind;
pub mod evaluate;
pub mod output;
pub mod render;
pub mod restrict;

use anyhow::{Context, Result};
use octofhir_aql_ast::QueryAst;
use std::fs;
use std::path::Path;

/// Read and parse a query file
pub fn load_query(file: &Path) -> Result<QueryAst> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read query file: {}", file.display()))?;
    crate::parse(&text).map_err(|e| output::parse_failure(file, e))
}
