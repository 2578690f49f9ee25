//! Cohort engine
//!
//! [`CohortEngine`] is the entry point for callers: it evaluates cohorts,
//! restricts queries and runs gated record exports against one query engine.

use crate::{
    Cohort, CohortConfig, CohortEvaluator, CohortNode, CohortResult, ExportPolicyComposer, IdentifierSet,
    LeafQueryExecutor, QueryEngineClient, QueryResponse,
};
use log::{debug, info};
use octofhir_aql_ast::QueryAst;
use octofhir_aql_parser::parse;
use octofhir_aql_policy::{PolicyRunner, QueryPolicy};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Evaluates cohorts and exports their records
#[derive(Clone)]
pub struct CohortEngine {
    executor: LeafQueryExecutor,
    composer: ExportPolicyComposer,
    runner: PolicyRunner,
}

impl CohortEngine {
    /// Create an engine with the given settings
    pub fn new(client: Arc<dyn QueryEngineClient>, config: &CohortConfig) -> Self {
        Self {
            executor: LeafQueryExecutor::new(client, config.consent_oid.clone()),
            composer: ExportPolicyComposer::new(config.privacy_min_hits, config.consent_oid.clone()),
            runner: PolicyRunner::new(),
        }
    }

    pub fn executor(&self) -> &LeafQueryExecutor {
        &self.executor
    }

    pub fn composer(&self) -> &ExportPolicyComposer {
        &self.composer
    }

    /// Subjects matching a stored cohort
    pub fn evaluate_cohort(&self, cohort: &Cohort, allow_outside_eu: bool) -> CohortResult<IdentifierSet> {
        debug!("Evaluating cohort '{}' ({})", cohort.name, cohort.id);
        let ids = self.evaluate_root(cohort.root.as_ref(), allow_outside_eu)?;
        info!("Cohort '{}' matched {} subject(s)", cohort.id, ids.len());
        Ok(ids)
    }

    /// Subjects matching a cohort tree
    pub fn evaluate(&self, root: &CohortNode, allow_outside_eu: bool) -> CohortResult<IdentifierSet> {
        self.evaluate_root(Some(root), allow_outside_eu)
    }

    /// Number of subjects matching a stored cohort
    pub fn cohort_size(&self, cohort: &Cohort, allow_outside_eu: bool) -> CohortResult<usize> {
        self.evaluate_cohort(cohort, allow_outside_eu).map(|ids| ids.len())
    }

    /// Apply `policies` in order and render the result
    pub fn rewrite_and_render(&self, ast: &QueryAst, policies: &[QueryPolicy]) -> CohortResult<String> {
        Ok(self.runner.rewrite_and_render(ast, policies)?)
    }

    /// Restrictions for exporting the records of `ids`
    pub fn collect_policies(
        &self,
        ids: &IdentifierSet,
        template_ids: &BTreeSet<String>,
        allow_outside_eu: bool,
    ) -> CohortResult<Vec<QueryPolicy>> {
        self.composer.collect_policies(ids, template_ids, allow_outside_eu)
    }

    /// Run `query_text` restricted to the records of `ids`.
    ///
    /// Fails without contacting the query engine when `ids` is below the
    /// privacy threshold.
    pub fn export(
        &self,
        query_text: &str,
        ids: &IdentifierSet,
        template_ids: &BTreeSet<String>,
        allow_outside_eu: bool,
    ) -> CohortResult<QueryResponse> {
        let policies = self.collect_policies(ids, template_ids, allow_outside_eu)?;
        let ast = parse(query_text)?;
        let restricted = self.rewrite_and_render(&ast, &policies)?;
        Ok(self.executor.client().execute_tabular_query(&restricted)?)
    }

    fn evaluate_root(&self, root: Option<&CohortNode>, allow_outside_eu: bool) -> CohortResult<IdentifierSet> {
        CohortEvaluator::new(&self.executor).evaluate(root, allow_outside_eu)
    }
}
