//! Tests for gated record export against the fixture engine

use octofhir_aql_cohort::{
    CachedTemplateRegistry, Cohort, CohortConfig, CohortEngine, CohortError, FixtureEngine, IdentifierSet,
    TemplateRegistry,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

const FIXTURE: &str = r#"{
    "universe": ["1", "2", "3", "4", "5"],
    "templates": ["vitals.v1", "labs.v2"],
    "rules": [
        {"pattern": "blood_pressure", "ids": ["1", "2", "3"]},
        {"pattern": "body_weight", "ids": ["2", "3", "4"]},
        {"pattern": "MATCHES \\{'2', '3'\\}", "ids": ["2", "3"]}
    ]
}"#;

const COHORT: &str = r#"{
    "id": "c-1",
    "name": "Hypertensive, weighed",
    "root": {
        "type": "GROUP",
        "operator": "AND",
        "children": [
            {"type": "LEAF", "query": {"id": "bp", "query_text": "SELECT o FROM EHR e CONTAINS OBSERVATION o[openEHR-EHR-OBSERVATION.blood_pressure.v1]"}},
            {"type": "LEAF", "query": {"id": "w", "query_text": "SELECT o FROM EHR e CONTAINS OBSERVATION o[openEHR-EHR-OBSERVATION.body_weight.v1]"}}
        ]
    }
}"#;

fn fixture_engine() -> Arc<FixtureEngine> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FIXTURE.as_bytes()).unwrap();
    Arc::new(FixtureEngine::from_json_file(file.path()).unwrap())
}

fn config(privacy_min_hits: usize) -> CohortConfig {
    CohortConfig {
        consent_oid: Some("1.2.3".to_string()),
        privacy_min_hits,
        ..CohortConfig::default()
    }
}

#[test]
fn test_evaluate_then_export() {
    let fixture = fixture_engine();
    let engine = CohortEngine::new(fixture.clone(), &config(2));
    let cohort: Cohort = serde_json::from_str(COHORT).unwrap();

    let ids = engine.evaluate_cohort(&cohort, true).unwrap();
    assert_eq!(ids, IdentifierSet::from(["2".to_string(), "3".to_string()]));

    let templates = CachedTemplateRegistry::new(fixture.clone(), Duration::from_secs(60))
        .list_templates()
        .unwrap();
    let response = engine
        .export("SELECT c/content FROM EHR e CONTAINS COMPOSITION c", &ids, &templates, false)
        .unwrap();

    assert_eq!(
        response.query,
        "SELECT c/content FROM EHR e CONTAINS COMPOSITION c \
         WHERE e/ehr_id/value MATCHES {'2', '3'} \
         AND c/archetype_details/template_id/value MATCHES {'labs.v2', 'vitals.v1'} \
         AND c/feeder_audit/feeder_system_audit/other_details[openEHR-EHR-ITEM_TREE.generic.v1]/items[at0001]/value/id MATCHES {'1.2.3'}"
    );
    assert_eq!(response.rows.len(), 2);
}

#[test]
fn test_export_below_threshold_is_refused() {
    let fixture = fixture_engine();
    let engine = CohortEngine::new(fixture.clone(), &config(5));
    let ids = IdentifierSet::from(["1".to_string(), "2".to_string(), "3".to_string()]);
    let templates = fixture.list_templates().unwrap();

    let result = engine.export("SELECT c FROM EHR e CONTAINS COMPOSITION c", &ids, &templates, true);
    match result {
        Err(CohortError::PrivacyThresholdNotMet { hits, required }) => assert_eq!((hits, required), (3, 5)),
        other => panic!("Expected PrivacyThresholdNotMet, got {:?}", other),
    }
    assert!(fixture.executed().is_empty());
}

#[test]
fn test_export_without_templates_is_rejected() {
    let engine = CohortEngine::new(fixture_engine(), &config(1));
    let ids = IdentifierSet::from(["1".to_string()]);

    let result = engine.export("SELECT c FROM EHR e CONTAINS COMPOSITION c", &ids, &Default::default(), true);
    assert!(matches!(
        result,
        Err(CohortError::Policy(octofhir_aql_policy::PolicyError::NoTemplatesAttached))
    ));
}
