//! Cohort definitions
//!
//! A cohort is a boolean tree: groups combine their children with AND, OR or
//! NOT, leaves carry a stored query. Parameters bound on a group apply to
//! every leaf below it unless the leaf binds the same name itself.

use crate::SetOperator;
use octofhir_aql_policy::{ParameterValue, Parameters};
use serde::{Deserialize, Serialize};

/// A stored query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafQuery {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    pub query_text: String,
}

impl LeafQuery {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            query_text: query_text.into(),
        }
    }

    /// True when there is no query text to execute
    pub fn is_blank(&self) -> bool {
        self.query_text.trim().is_empty()
    }
}

/// A node of a cohort tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum CohortNode {
    Group {
        operator: SetOperator,
        children: Vec<CohortNode>,
        #[serde(default, skip_serializing_if = "Parameters::is_empty")]
        parameters: Parameters,
    },
    Leaf {
        query: Option<LeafQuery>,
        #[serde(default, skip_serializing_if = "Parameters::is_empty")]
        parameters: Parameters,
    },
}

impl CohortNode {
    /// A group without bound parameters
    pub fn group(operator: SetOperator, children: Vec<CohortNode>) -> Self {
        Self::Group {
            operator,
            children,
            parameters: Parameters::new(),
        }
    }

    /// A leaf without bound parameters
    pub fn leaf(query: LeafQuery) -> Self {
        Self::Leaf {
            query: Some(query),
            parameters: Parameters::new(),
        }
    }

    /// Bind a parameter on this node; `None` marks it absent
    pub fn with_parameter(mut self, name: impl Into<String>, value: Option<ParameterValue>) -> Self {
        self.parameters_mut().insert(name.into(), value);
        self
    }

    pub fn parameters(&self) -> &Parameters {
        match self {
            Self::Group { parameters, .. } | Self::Leaf { parameters, .. } => parameters,
        }
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        match self {
            Self::Group { parameters, .. } | Self::Leaf { parameters, .. } => parameters,
        }
    }

    /// Number of leaves in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Group { children, .. } => children.iter().map(Self::leaf_count).sum(),
            Self::Leaf { .. } => 1,
        }
    }
}

/// A named cohort definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub root: Option<CohortNode>,
}

impl Cohort {
    pub fn new(id: impl Into<String>, name: impl Into<String>, root: Option<CohortNode>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cohort_from_json() {
        let json = r#"{
            "id": "c-1",
            "name": "Diabetics",
            "root": {
                "type": "GROUP",
                "operator": "AND",
                "parameters": {"from": "2020-01-01", "unit": null},
                "children": [
                    {"type": "LEAF", "query": {"id": "q1", "query_text": "SELECT e/ehr_id/value FROM EHR e"}},
                    {"type": "LEAF", "query": null, "parameters": {"from": "2021-01-01"}}
                ]
            }
        }"#;

        let cohort: Cohort = serde_json::from_str(json).unwrap();
        let root = cohort.root.as_ref().unwrap();

        assert_eq!(root.leaf_count(), 2);
        assert_eq!(root.parameters().get("unit"), Some(&None));
        match root {
            CohortNode::Group {
                operator, children, ..
            } => {
                assert_eq!(*operator, SetOperator::And);
                assert_eq!(
                    children[1].parameters().get("from"),
                    Some(&Some(ParameterValue::from("2021-01-01")))
                );
            }
            other => panic!("Expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_leaf_query() {
        assert!(LeafQuery::new("q", "blank", "  \n").is_blank());
        assert!(!LeafQuery::new("q", "all", "SELECT e/ehr_id/value FROM EHR e").is_blank());
    }

    #[test]
    fn test_missing_root_deserializes() {
        let cohort: Cohort = serde_json::from_str(r#"{"id": "c-2"}"#).unwrap();
        assert_eq!(cohort.root, None);
    }
}
