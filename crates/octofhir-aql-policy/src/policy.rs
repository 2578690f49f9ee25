//! Restriction policies
//!
//! Policies are pure: `apply` takes a query by reference and returns a
//! restricted copy, so an ordered list of policies composes by feeding each
//! output into the next policy.

use crate::record::{CONSENT_ID_PATH, EHR_ID_PATH, TEMPLATE_ID_PATH};
use crate::{PolicyError, PolicyResult, QueryRewriter, RecordContainer};
use octofhir_aql_ast::QueryAst;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const EHR_REWRITER: QueryRewriter = QueryRewriter::new(RecordContainer::Ehr, EHR_ID_PATH);
const TEMPLATE_REWRITER: QueryRewriter =
    QueryRewriter::new(RecordContainer::Composition, TEMPLATE_ID_PATH);
const CONSENT_REWRITER: QueryRewriter =
    QueryRewriter::new(RecordContainer::Composition, CONSENT_ID_PATH);

/// A restriction narrowing the records a query may return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryPolicy {
    /// Only the listed EHRs
    EhrRestriction { ehr_ids: BTreeSet<String> },
    /// Only compositions recorded with one of the listed templates
    TemplateRestriction { template_ids: BTreeSet<String> },
    /// Only compositions carrying the given consent identifier
    ConsentRestriction { oid: Option<String> },
}

impl QueryPolicy {
    /// Restrict to a set of EHR ids
    pub fn ehr<I, S>(ehr_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::EhrRestriction {
            ehr_ids: ehr_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Restrict to a set of template ids
    pub fn templates<I, S>(template_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::TemplateRestriction {
            template_ids: template_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Restrict to compositions with the configured consent identifier
    pub fn consent(oid: Option<String>) -> Self {
        Self::ConsentRestriction { oid }
    }

    /// Short name used in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EhrRestriction { .. } => "EhrRestriction",
            Self::TemplateRestriction { .. } => "TemplateRestriction",
            Self::ConsentRestriction { .. } => "ConsentRestriction",
        }
    }

    /// Return a restricted copy of `ast`
    pub fn apply(&self, ast: &QueryAst) -> PolicyResult<QueryAst> {
        match self {
            Self::EhrRestriction { ehr_ids } => {
                if ehr_ids.is_empty() {
                    return Err(PolicyError::EmptyCohortSize);
                }
                Ok(EHR_REWRITER.restrict(ast, ehr_ids))
            }
            Self::TemplateRestriction { template_ids } => {
                if template_ids.is_empty() {
                    return Err(PolicyError::NoTemplatesAttached);
                }
                Ok(TEMPLATE_REWRITER.restrict(ast, template_ids))
            }
            Self::ConsentRestriction { oid } => {
                let oid = oid
                    .as_deref()
                    .map(str::trim)
                    .filter(|oid| !oid.is_empty())
                    .ok_or_else(|| PolicyError::missing_configuration("consent_oid"))?;
                if ast.from.is_none() {
                    return Err(PolicyError::malformed(
                        "query has no FROM clause to attach the consent restriction to",
                    ));
                }
                Ok(CONSENT_REWRITER.restrict(ast, &BTreeSet::from([oid.to_string()])))
            }
        }
    }
}

impl fmt::Display for QueryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EhrRestriction { ehr_ids } => write!(f, "{}({} ids)", self.name(), ehr_ids.len()),
            Self::TemplateRestriction { template_ids } => {
                write!(f, "{}({} templates)", self.name(), template_ids.len())
            }
            Self::ConsentRestriction { oid } => {
                write!(f, "{}({})", self.name(), oid.as_deref().unwrap_or("unset"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_aql_ast::{Condition, Operand, render};
    use octofhir_aql_parser::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_allow_lists_are_rejected() {
        let ast = parse("SELECT e/ehr_id/value FROM EHR e").unwrap();
        assert!(matches!(
            QueryPolicy::ehr(Vec::<String>::new()).apply(&ast),
            Err(PolicyError::EmptyCohortSize)
        ));
        assert!(matches!(
            QueryPolicy::templates(Vec::<String>::new()).apply(&ast),
            Err(PolicyError::NoTemplatesAttached)
        ));
    }

    #[test]
    fn test_ehr_restriction_without_containment() {
        let ast = parse("SELECT e1/ehr_id/value").unwrap();
        let restricted = QueryPolicy::ehr(["A", "B"]).apply(&ast).unwrap();

        let from = restricted.from.as_ref().unwrap();
        assert_eq!(from.breadth_first().len(), 1);
        match restricted.where_clause {
            Some(Condition::Matches(matches)) => {
                let values: Vec<String> = matches
                    .values
                    .iter()
                    .map(|v| match v {
                        Operand::Literal(l) => l.as_str().unwrap_or_default().to_string(),
                        other => panic!("Expected literal, got {:?}", other),
                    })
                    .collect();
                assert_eq!(values, vec!["A", "B"]);
            }
            other => panic!("Expected a single MATCHES condition, got {:?}", other),
        }
    }

    #[test]
    fn test_consent_restriction() {
        let ast = parse("SELECT e/ehr_id/value FROM EHR e CONTAINS COMPOSITION c").unwrap();
        let restricted = QueryPolicy::consent(Some("1.2.3".to_string()))
            .apply(&ast)
            .unwrap();
        assert_eq!(
            render(&restricted).unwrap(),
            "SELECT e/ehr_id/value FROM EHR e CONTAINS COMPOSITION c WHERE \
             c/feeder_audit/feeder_system_audit/other_details[openEHR-EHR-ITEM_TREE.generic.v1]/items[at0001]/value/id \
             MATCHES {'1.2.3'}"
        );
    }

    #[test]
    fn test_consent_restriction_failures() {
        let ast = parse("SELECT e/ehr_id/value FROM EHR e").unwrap();
        assert!(matches!(
            QueryPolicy::consent(None).apply(&ast),
            Err(PolicyError::MissingConfiguration { .. })
        ));
        assert!(matches!(
            QueryPolicy::consent(Some("  ".to_string())).apply(&ast),
            Err(PolicyError::MissingConfiguration { .. })
        ));

        let no_from = parse("SELECT 1").unwrap();
        assert!(matches!(
            QueryPolicy::consent(Some("1.2.3".to_string())).apply(&no_from),
            Err(PolicyError::MalformedAst { .. })
        ));
    }

    #[test]
    fn test_policy_json_shape() {
        let policy: QueryPolicy =
            serde_json::from_str(r#"{"type":"TEMPLATE_RESTRICTION","template_ids":["t1"]}"#).unwrap();
        assert_eq!(policy, QueryPolicy::templates(["t1"]));
        assert_eq!(policy.to_string(), "TemplateRestriction(1 templates)");
    }
}
