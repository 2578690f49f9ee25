//! Deterministic query engine backed by a JSON fixture
//!
//! ```json
//! {
//!   "universe": ["1", "2", "3"],
//!   "templates": ["vitals.v1"],
//!   "rules": [
//!     {"pattern": "openEHR-EHR-OBSERVATION\\.blood_pressure", "ids": ["1", "2"]},
//!     {"pattern": "broken", "error": "Unknown alias", "status": 400}
//!   ]
//! }
//! ```
//!
//! The universe query returns `universe`. Any other query is answered by the
//! first rule whose pattern matches its text; with no matching rule the
//! result is empty.

use crate::executor::UNIVERSE_QUERY;
use crate::{CohortError, CohortResult, Column, EngineError, IdentifierSet, QueryEngineClient, QueryResponse, TemplateRegistry};
use log::debug;
use parking_lot::Mutex;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    universe: IdentifierSet,
    #[serde(default)]
    templates: BTreeSet<String>,
    #[serde(default)]
    rules: Vec<RuleFile>,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    pattern: String,
    #[serde(default)]
    ids: IdentifierSet,
    error: Option<String>,
    status: Option<u16>,
}

#[derive(Debug)]
enum Outcome {
    Ids(IdentifierSet),
    Rejected { status: u16, message: String },
}

#[derive(Debug)]
struct Rule {
    pattern: Regex,
    outcome: Outcome,
}

/// Query engine answering from fixed rules
#[derive(Debug)]
pub struct FixtureEngine {
    universe: IdentifierSet,
    templates: BTreeSet<String>,
    rules: Vec<Rule>,
    executed: Mutex<Vec<String>>,
}

impl FixtureEngine {
    pub fn from_json_file(path: impl AsRef<Path>) -> CohortResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CohortError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> CohortResult<Self> {
        let file: FixtureFile = serde_json::from_str(content).map_err(|e| CohortError::Config {
            message: format!("invalid fixture: {e}"),
        })?;

        let rules = file
            .rules
            .into_iter()
            .map(|rule| {
                let pattern = Regex::new(&rule.pattern).map_err(|e| CohortError::Config {
                    message: format!("invalid fixture pattern '{}': {}", rule.pattern, e),
                })?;
                let outcome = match rule.error {
                    Some(message) => Outcome::Rejected {
                        status: rule.status.unwrap_or(400),
                        message,
                    },
                    None => Outcome::Ids(rule.ids),
                };
                Ok(Rule { pattern, outcome })
            })
            .collect::<CohortResult<Vec<_>>>()?;

        Ok(Self {
            universe: file.universe,
            templates: file.templates,
            rules,
            executed: Mutex::new(Vec::new()),
        })
    }

    /// Every query text received so far, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    fn answer(&self, query: &str) -> Result<IdentifierSet, EngineError> {
        self.executed.lock().push(query.to_string());

        if query.trim() == UNIVERSE_QUERY {
            return Ok(self.universe.clone());
        }
        match self.rules.iter().find(|rule| rule.pattern.is_match(query)) {
            Some(Rule {
                outcome: Outcome::Ids(ids),
                ..
            }) => Ok(ids.clone()),
            Some(Rule {
                outcome: Outcome::Rejected { status, message },
                ..
            }) => Err(EngineError::malformed(*status, message.clone())),
            None => {
                debug!("No fixture rule matches: {}", query);
                Ok(IdentifierSet::new())
            }
        }
    }
}

impl QueryEngineClient for FixtureEngine {
    fn execute_id_query(&self, query: &str) -> Result<IdentifierSet, EngineError> {
        self.answer(query)
    }

    fn execute_tabular_query(&self, query: &str) -> Result<QueryResponse, EngineError> {
        let ids = self.answer(query)?;
        Ok(QueryResponse {
            query: query.to_string(),
            columns: vec![Column {
                name: "ehr_id".to_string(),
                path: None,
            }],
            rows: ids.into_iter().map(|id| vec![Value::String(id)]).collect(),
        })
    }
}

impl TemplateRegistry for FixtureEngine {
    fn list_templates(&self) -> Result<BTreeSet<String>, EngineError> {
        Ok(self.templates.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "universe": ["1", "2", "3"],
        "templates": ["vitals"],
        "rules": [
            {"pattern": "blood_pressure", "ids": ["1", "2"]},
            {"pattern": "broken", "error": "Unknown alias"}
        ]
    }"#;

    #[test]
    fn test_rules_answer_queries() {
        let engine = FixtureEngine::from_json_str(FIXTURE).unwrap();

        assert_eq!(engine.execute_id_query(UNIVERSE_QUERY).unwrap().len(), 3);
        assert_eq!(
            engine.execute_id_query("SELECT o FROM OBSERVATION o[blood_pressure]").unwrap(),
            IdentifierSet::from(["1".to_string(), "2".to_string()])
        );
        assert!(engine.execute_id_query("SELECT x FROM EHR x").unwrap().is_empty());
        assert_eq!(
            engine.execute_id_query("broken"),
            Err(EngineError::malformed(400, "Unknown alias"))
        );
        assert_eq!(engine.executed().len(), 4);
        assert_eq!(engine.list_templates().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let result = FixtureEngine::from_json_str(r#"{"rules": [{"pattern": "("}]}"#);
        assert!(matches!(result, Err(CohortError::Config { .. })));
    }
}
