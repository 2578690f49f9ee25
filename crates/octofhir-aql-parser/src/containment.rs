//! FROM clause parser
//!
//! ```text
//! containment := and-chain ( OR and-chain )*
//! and-chain   := unit ( AND unit )*
//! unit        := "(" containment ")"
//!              | CLASS [alias] ["[" predicate "]"] [CONTAINS containment]
//! ```
//!
//! The right-hand side of CONTAINS extends as far as possible, so
//! `EHR e CONTAINS A AND B` reads as `EHR e CONTAINS (A AND B)`.

use crate::combinators::{Input, PResult, bracketed, fail_with, keyword, lit, name, ws};
use octofhir_aql_ast::{Containment, ContainmentClass, LogicalContainment, LogicalOperator};
use winnow::prelude::*;

/// Parse a containment expression and number its classes in pre-order, starting at 1
pub(crate) fn containment_expression(input: &mut Input<'_>) -> PResult<Containment> {
    let mut containment = or_containment(input)?;
    let mut next_id = 1;
    assign_ids(&mut containment, &mut next_id);
    Ok(containment)
}

fn or_containment(input: &mut Input<'_>) -> PResult<Containment> {
    let mut operands = Vec::new();
    operands.push(and_containment(input)?);
    while keyword("OR").parse_next(input).is_ok() {
        operands.push(and_containment(input)?);
    }
    Ok(combine(LogicalOperator::Or, operands))
}

fn and_containment(input: &mut Input<'_>) -> PResult<Containment> {
    let mut operands = Vec::new();
    operands.push(containment_unit(input)?);
    while keyword("AND").parse_next(input).is_ok() {
        operands.push(containment_unit(input)?);
    }
    Ok(combine(LogicalOperator::And, operands))
}

fn combine(operator: LogicalOperator, mut operands: Vec<Containment>) -> Containment {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        Containment::Logical(LogicalContainment { operator, operands })
    }
}

fn containment_unit(input: &mut Input<'_>) -> PResult<Containment> {
    if lit("(").parse_next(input).is_ok() {
        let inner = or_containment(input)?;
        lit(")")
            .parse_next(input)
            .map_err(|_| fail_with(input, "closing delimiter"))?;
        return Ok(inner);
    }

    let mut class = ContainmentClass::new(0, name(input)?);
    if let Ok(alias) = name(input) {
        class.alias = Some(alias.to_string());
    }

    let checkpoint = *input;
    ws(input)?;
    if input.starts_with('[') {
        class.predicate = Some(bracketed(input)?.trim().to_string());
    } else {
        *input = checkpoint;
    }

    if keyword("CONTAINS").parse_next(input).is_ok() {
        class.contains = Some(Box::new(or_containment(input)?));
    }

    Ok(Containment::Class(class))
}

fn assign_ids(containment: &mut Containment, next_id: &mut u32) {
    match containment {
        Containment::Class(class) => {
            class.id = *next_id;
            *next_id += 1;
            if let Some(nested) = class.contains.as_deref_mut() {
                assign_ids(nested, next_id);
            }
        }
        Containment::Logical(logical) => {
            for operand in logical.operands.iter_mut() {
                assign_ids(operand, next_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_greedy() {
        let mut input = "EHR e CONTAINS COMPOSITION c AND OBSERVATION o";
        let parsed = containment_expression(&mut input).unwrap();
        assert!(input.is_empty());

        let Containment::Class(ehr) = parsed else {
            panic!("Expected EHR class at the root");
        };
        assert_eq!(ehr.id, 1);
        match ehr.contains.as_deref() {
            Some(Containment::Logical(logical)) => {
                assert_eq!(logical.operator, LogicalOperator::And);
                assert_eq!(logical.operands.len(), 2);
            }
            other => panic!("Expected AND under EHR, got {:?}", other),
        }
    }

    #[test]
    fn test_ids_are_pre_order() {
        let mut input =
            "EHR e CONTAINS (COMPOSITION c CONTAINS OBSERVATION o) OR COMPOSITION c2[openEHR-EHR-COMPOSITION.report.v1]";
        let parsed = containment_expression(&mut input).unwrap();

        let ids: Vec<(u32, Option<&str>)> = parsed
            .breadth_first()
            .into_iter()
            .map(|class| (class.id, class.alias.as_deref()))
            .collect();
        assert_eq!(
            ids,
            vec![(1, Some("e")), (2, Some("c")), (4, Some("c2")), (3, Some("o"))]
        );
        assert_eq!(
            parsed.class(4).and_then(|c| c.predicate.as_deref()),
            Some("openEHR-EHR-COMPOSITION.report.v1")
        );
    }

    #[test]
    fn test_class_without_alias() {
        let mut input = "COMPOSITION[openEHR-EHR-COMPOSITION.encounter.v1] WHERE";
        let parsed = containment_expression(&mut input).unwrap();
        let Containment::Class(class) = parsed else {
            panic!("Expected class");
        };
        assert_eq!(class.alias, None);
        assert_eq!(class.predicate.as_deref(), Some("openEHR-EHR-COMPOSITION.encounter.v1"));
        assert_eq!(input, " WHERE");
    }
}
