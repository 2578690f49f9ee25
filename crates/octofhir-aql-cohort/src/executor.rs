//! Execution of single cohort leaves

use crate::{CohortError, CohortResult, IdentifierSet, LeafQuery, QueryEngineClient};
use log::{debug, info};
use octofhir_aql_ast::{IdentifiedPath, QueryAst, SelectClause, render};
use octofhir_aql_parser::parse;
use octofhir_aql_policy::{
    EHR_ID_PATH, ParameterBinder, Parameters, PolicyRunner, QueryPolicy, QueryRewriter, RecordContainer,
};
use std::sync::Arc;

/// Query returning every subject known to the repository
pub const UNIVERSE_QUERY: &str = "SELECT e/ehr_id/value FROM EHR e";

const EHR_ANCHOR: QueryRewriter = QueryRewriter::new(RecordContainer::Ehr, EHR_ID_PATH);

/// Turns a stored leaf query into the set of matching subject ids
#[derive(Clone)]
pub struct LeafQueryExecutor {
    client: Arc<dyn QueryEngineClient>,
    consent_oid: Option<String>,
    runner: PolicyRunner,
}

impl LeafQueryExecutor {
    pub fn new(client: Arc<dyn QueryEngineClient>, consent_oid: Option<String>) -> Self {
        Self {
            client,
            consent_oid,
            runner: PolicyRunner::new(),
        }
    }

    pub fn client(&self) -> &Arc<dyn QueryEngineClient> {
        &self.client
    }

    pub fn consent_oid(&self) -> Option<&str> {
        self.consent_oid.as_deref()
    }

    /// Execute a leaf.
    ///
    /// A missing or blank query yields the empty set without contacting the
    /// engine. The consent restriction is applied unless `allow_outside_eu`
    /// is `Some(true)`.
    pub fn execute(
        &self,
        query: Option<&LeafQuery>,
        parameters: &Parameters,
        allow_outside_eu: Option<bool>,
    ) -> CohortResult<IdentifierSet> {
        let Some(query) = query.filter(|query| !query.is_blank()) else {
            debug!("Skipping blank leaf query");
            return Ok(IdentifierSet::new());
        };

        let text = self.prepare(query, parameters, allow_outside_eu)?;
        debug!("Executing leaf '{}': {}", query.id, text);
        let ids = self.client.execute_id_query(&text)?;
        info!("Leaf '{}' matched {} subject(s)", query.id, ids.len());
        Ok(ids)
    }

    /// Final query text for a leaf
    pub fn prepare(
        &self,
        query: &LeafQuery,
        parameters: &Parameters,
        allow_outside_eu: Option<bool>,
    ) -> CohortResult<String> {
        let ast = parse(&query.query_text).map_err(|e| CohortError::InvalidQuery {
            status: None,
            message: format!("leaf '{}': {}", query.id, e),
        })?;

        let policies = match allow_outside_eu {
            Some(true) => Vec::new(),
            _ => vec![QueryPolicy::consent(self.consent_oid.clone())],
        };
        let restricted = self.runner.apply(&ast, &policies)?;
        let bound = ParameterBinder::new(parameters).bind_ast(&restricted)?;

        Ok(render(&select_subject_ids(bound))?)
    }

    /// Every subject known to the repository
    pub fn universe(&self) -> CohortResult<IdentifierSet> {
        let ids = self.client.execute_id_query(UNIVERSE_QUERY)?;
        debug!("Universe holds {} subject(s)", ids.len());
        Ok(ids)
    }
}

/// Replace the select clause with the distinct EHR id of the record.
///
/// Ordering and paging are dropped so the leaf resolves to every matching subject.
fn select_subject_ids(mut ast: QueryAst) -> QueryAst {
    let alias = EHR_ANCHOR
        .anchor_aliases(&mut ast)
        .into_iter()
        .next()
        .unwrap_or_else(|| "e".to_string());
    ast.select = SelectClause::distinct_path(IdentifiedPath::new(alias, EHR_ID_PATH));
    ast.order_by.clear();
    ast.limit = None;
    ast.offset = None;
    ast
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_select_replaced_by_subject_ids() {
        let ast = parse("SELECT c/name/value, o/data FROM EHR x CONTAINS COMPOSITION c ORDER BY c/name/value").unwrap();
        assert_eq!(
            render(&select_subject_ids(ast)).unwrap(),
            "SELECT DISTINCT x/ehr_id/value FROM EHR x CONTAINS COMPOSITION c"
        );
    }

    #[test]
    fn test_paging_dropped_from_subject_ids() {
        let ast = parse(
            "SELECT TOP 5 c/name FROM EHR e CONTAINS COMPOSITION c ORDER BY c/name LIMIT 1 OFFSET 3",
        )
        .unwrap();
        assert_eq!(
            render(&select_subject_ids(ast)).unwrap(),
            "SELECT DISTINCT e/ehr_id/value FROM EHR e CONTAINS COMPOSITION c"
        );
    }

    #[test]
    fn test_ehr_synthesised_for_subject_ids() {
        let ast = parse("SELECT c/name/value FROM COMPOSITION c").unwrap();
        assert_eq!(
            render(&select_subject_ids(ast)).unwrap(),
            "SELECT DISTINCT e2/ehr_id/value FROM EHR e2 CONTAINS COMPOSITION c"
        );
    }
}
