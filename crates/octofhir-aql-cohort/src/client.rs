//! Seams to the external query engine

use crate::IdentifierSet;
use octofhir_aql_diagnostics::{AQL0300, AQL0301, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors reported by a query engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine rejected the query text
    #[error("{code}: Query rejected with status {status}: {message}", code = AQL0300)]
    MalformedQuery { status: u16, message: String },

    /// The request failed for any other reason
    #[error("{code}: Transport failure: {message}", code = AQL0301)]
    Transport { message: String },
}

impl EngineError {
    pub fn malformed(status: u16, message: impl Into<String>) -> Self {
        Self::MalformedQuery {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedQuery { .. } => AQL0300,
            Self::Transport { .. } => AQL0301,
        }
    }
}

/// A result column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Tabular query result with column metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Query text the engine executed
    #[serde(default)]
    pub query: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResponse {
    /// Distinct string values of the first column
    pub fn first_column_ids(&self) -> IdentifierSet {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .filter_map(|value| match value {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect()
    }
}

/// Executes AQL against a clinical data repository
pub trait QueryEngineClient: Send + Sync {
    /// Run a query selecting a single identifier column
    fn execute_id_query(&self, query: &str) -> Result<IdentifierSet, EngineError>;

    /// Run a query and return every column
    fn execute_tabular_query(&self, query: &str) -> Result<QueryResponse, EngineError>;
}

/// Lists the templates known to the repository
pub trait TemplateRegistry: Send + Sync {
    fn list_templates(&self) -> Result<BTreeSet<String>, EngineError>;
}
