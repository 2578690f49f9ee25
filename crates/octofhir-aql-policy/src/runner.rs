//! Ordered policy application

use crate::{PolicyError, PolicyResult, QueryPolicy};
use log::{debug, warn};
use octofhir_aql_ast::{QueryAst, render};

/// Applies a chain of policies, each one narrowing the previous result
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyRunner;

impl PolicyRunner {
    pub fn new() -> Self {
        Self
    }

    /// Apply `policies` in order.
    ///
    /// A policy failing with [`PolicyError::MissingConfiguration`] is skipped
    /// with a warning; any other failure aborts the chain.
    pub fn apply(&self, ast: &QueryAst, policies: &[QueryPolicy]) -> PolicyResult<QueryAst> {
        log_query("before policies", ast);

        let mut current = ast.clone();
        for policy in policies {
            match policy.apply(&current) {
                Ok(restricted) => current = restricted,
                Err(PolicyError::MissingConfiguration { setting }) => {
                    warn!("Skipping {}: '{}' is not configured", policy.name(), setting);
                }
                Err(e) => return Err(e),
            }
        }

        log_query("after policies", &current);
        Ok(current)
    }

    /// Apply `policies` and render the result
    pub fn rewrite_and_render(&self, ast: &QueryAst, policies: &[QueryPolicy]) -> PolicyResult<String> {
        let restricted = self.apply(ast, policies)?;
        Ok(render(&restricted)?)
    }
}

fn log_query(stage: &str, ast: &QueryAst) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    match render(ast) {
        Ok(text) => debug!("Query {}: {}", stage, text),
        Err(e) => warn!("Could not render query {} for logging: {}", stage, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_aql_ast::{Condition, SelectClause};
    use octofhir_aql_parser::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_policies_compose_in_order() {
        let ast = parse("SELECT e/ehr_id/value FROM EHR e CONTAINS COMPOSITION c").unwrap();
        let rendered = PolicyRunner::new()
            .rewrite_and_render(
                &ast,
                &[QueryPolicy::ehr(["x"]), QueryPolicy::templates(["t"])],
            )
            .unwrap();

        assert_eq!(
            rendered,
            "SELECT e/ehr_id/value FROM EHR e CONTAINS COMPOSITION c \
             WHERE e/ehr_id/value MATCHES {'x'} AND c/archetype_details/template_id/value MATCHES {'t'}"
        );
    }

    #[test]
    fn test_missing_configuration_is_skipped() {
        let ast = parse("SELECT e/ehr_id/value FROM EHR e").unwrap();
        let restricted = PolicyRunner::new()
            .apply(&ast, &[QueryPolicy::consent(None), QueryPolicy::ehr(["x"])])
            .unwrap();
        assert_eq!(
            render(&restricted).unwrap(),
            "SELECT e/ehr_id/value FROM EHR e WHERE e/ehr_id/value MATCHES {'x'}"
        );
    }

    #[test]
    fn test_unrenderable_query_still_restricted() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
        assert!(log::log_enabled!(log::Level::Debug));

        let mut ast = parse("SELECT e/ehr_id/value FROM EHR e").unwrap();
        ast.select = SelectClause::new(Vec::new());
        assert!(render(&ast).is_err());

        let restricted = PolicyRunner::new()
            .apply(&ast, &[QueryPolicy::ehr(["x"])])
            .unwrap();
        assert!(matches!(restricted.where_clause, Some(Condition::Matches(_))));
    }

    #[test]
    fn test_other_failures_abort() {
        let ast = parse("SELECT e/ehr_id/value FROM EHR e").unwrap();
        let result = PolicyRunner::new().apply(
            &ast,
            &[QueryPolicy::ehr(["x"]), QueryPolicy::templates(Vec::<String>::new())],
        );
        assert!(matches!(result, Err(PolicyError::NoTemplatesAttached)));
    }
}
