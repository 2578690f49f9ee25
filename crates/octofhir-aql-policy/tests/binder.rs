//! Tests for parameter binding
//!
//! Covers:
//! - Removal of conditions on absent parameters
//! - Collapse of logical nodes left with one operand
//! - Scalar and list substitution
//! - Exact-name matching of placeholders

use octofhir_aql_policy::{ParameterBinder, ParameterError, ParameterValue, Parameters};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn params(entries: &[(&str, Option<ParameterValue>)]) -> Parameters {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn text(value: &str) -> Option<ParameterValue> {
    Some(ParameterValue::from(value))
}

fn bind(query: &str, parameters: &Parameters) -> String {
    ParameterBinder::new(parameters)
        .bind(query)
        .unwrap_or_else(|e| panic!("Failed to bind '{}': {:?}", query, e))
}

const BASE: &str = "SELECT e/ehr_id/value FROM EHR e CONTAINS COMPOSITION c";

#[test]
fn test_absent_removed_and_present_substituted() {
    let query = format!("{BASE} WHERE c/a = $p1 AND c/b = $p2");
    let expected = format!("{BASE} WHERE c/b = 'x'");

    let forward = params(&[("p1", None), ("p2", text("x"))]);
    let backward = params(&[("p2", text("x")), ("p1", None)]);

    assert_eq!(bind(&query, &forward), expected);
    assert_eq!(bind(&query, &backward), expected);
}

#[test]
fn test_string_escapes_are_preserved() {
    let query = format!(r"{BASE} WHERE c/name/value = 'line\nbreak' AND c/code = $code");
    let parameters = params(&[("code", text("tab\there"))]);

    assert_eq!(
        bind(&query, &parameters),
        format!(r"{BASE} WHERE c/name/value = 'line\nbreak' AND c/code = 'tab\there'")
    );
}

#[test]
fn test_placeholders_match_by_exact_name() {
    let query = format!("{BASE} WHERE c/a = $p AND c/b = $p1");
    let parameters = params(&[("p", text("short")), ("p1", text("long"))]);

    assert_eq!(
        bind(&query, &parameters),
        format!("{BASE} WHERE c/a = 'short' AND c/b = 'long'")
    );
}

#[rstest]
#[case::whole_where("WHERE c/a = $gone", "")]
#[case::or_collapses("WHERE c/a = $gone OR c/b = 1", " WHERE c/b = 1")]
#[case::not_removed("WHERE NOT c/a = $gone AND c/b = 1", " WHERE c/b = 1")]
#[case::nested_group("WHERE c/x = 1 AND (c/a = $gone OR c/b = $gone)", " WHERE c/x = 1")]
#[case::like_pattern("WHERE c/name LIKE $gone", "")]
#[case::matches_entry("WHERE c/code MATCHES {'a', $gone}", " WHERE c/code MATCHES {'a'}")]
#[case::matches_emptied("WHERE c/code MATCHES {$gone} AND c/b = 1", " WHERE c/b = 1")]
#[case::exists_kept("WHERE EXISTS c/a OR c/b = $gone", " WHERE EXISTS c/a")]
fn test_absent_parameter_removal(#[case] filter: &str, #[case] expected: &str) {
    let parameters = params(&[("gone", None)]);
    assert_eq!(
        bind(&format!("{BASE} {filter}"), &parameters),
        format!("{BASE}{expected}")
    );
}

#[rstest]
#[case::integer(Some(ParameterValue::Integer(42)), "42")]
#[case::decimal(Some(ParameterValue::Decimal("1.25".parse().unwrap())), "1.25")]
#[case::boolean(Some(ParameterValue::Boolean(false)), "false")]
#[case::quoted(text("O'Brien"), r"'O\'Brien'")]
fn test_scalar_substitution(#[case] value: Option<ParameterValue>, #[case] literal: &str) {
    let parameters = params(&[("v", value)]);
    assert_eq!(
        bind(&format!("{BASE} WHERE c/a = $v"), &parameters),
        format!("{BASE} WHERE c/a = {literal}")
    );
}

#[test]
fn test_list_expands_inside_matches() {
    let parameters = params(&[("codes", Some(ParameterValue::from(vec!["a", "b"])))]);
    assert_eq!(
        bind(&format!("{BASE} WHERE c/code MATCHES {{'z', $codes}}"), &parameters),
        format!("{BASE} WHERE c/code MATCHES {{'z', 'a', 'b'}}")
    );
}

#[test]
fn test_list_outside_matches_is_rejected() {
    let parameters = params(&[("codes", Some(ParameterValue::from(vec!["a", "b"])))]);
    let result = ParameterBinder::new(&parameters).bind(&format!("{BASE} WHERE c/code = $codes"));

    match result {
        Err(ParameterError::ListOutsideMatches { name }) => assert_eq!(name, "codes"),
        other => panic!("Expected ListOutsideMatches, got {:?}", other),
    }
}

#[test]
fn test_unknown_placeholder_is_left_untouched() {
    let parameters = params(&[("other", text("x"))]);
    assert_eq!(
        bind(&format!("{BASE} WHERE c/a = $unknown"), &parameters),
        format!("{BASE} WHERE c/a = $unknown")
    );
}

#[test]
fn test_unparseable_query_is_reported() {
    let parameters = Parameters::new();
    let result = ParameterBinder::new(&parameters).bind("SELECT FROM");
    assert!(matches!(result, Err(ParameterError::Query(_))));
}
