//! WHERE clause parser
//!
//! NOT binds tighter than AND, which binds tighter than OR.

use crate::combinators::{
    Input, PResult, backtrack, fail_with, identified_path, keyword, keyword_literal, lit,
    number_literal, parameter, string_literal, ws,
};
use octofhir_aql_ast::{
    Comparison, ComparisonOperator, Condition, Like, Literal, LogicalCondition, LogicalOperator,
    Matches, Operand,
};
use winnow::combinator::{alt, separated};
use winnow::error::ContextError;
use winnow::prelude::*;

/// Parse a filter condition
pub(crate) fn condition_expression(input: &mut Input<'_>) -> PResult<Condition> {
    or_condition(input)
}

fn or_condition(input: &mut Input<'_>) -> PResult<Condition> {
    let mut operands = Vec::new();
    operands.push(and_condition(input)?);
    while keyword("OR").parse_next(input).is_ok() {
        operands.push(and_condition(input)?);
    }
    Ok(combine(LogicalOperator::Or, operands))
}

fn and_condition(input: &mut Input<'_>) -> PResult<Condition> {
    let mut operands = Vec::new();
    operands.push(unary_condition(input)?);
    while keyword("AND").parse_next(input).is_ok() {
        operands.push(unary_condition(input)?);
    }
    Ok(combine(LogicalOperator::And, operands))
}

fn combine(operator: LogicalOperator, mut operands: Vec<Condition>) -> Condition {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        Condition::Logical(LogicalCondition { operator, operands })
    }
}

fn unary_condition(input: &mut Input<'_>) -> PResult<Condition> {
    if keyword("NOT").parse_next(input).is_ok() {
        return Ok(Condition::Not(Box::new(unary_condition(input)?)));
    }

    if keyword("EXISTS").parse_next(input).is_ok() {
        return identified_path(input).map(Condition::Exists);
    }

    if lit("(").parse_next(input).is_ok() {
        let inner = or_condition(input)?;
        lit(")")
            .parse_next(input)
            .map_err(|_| fail_with(input, "closing delimiter"))?;
        return Ok(inner);
    }

    predicate(input)
}

fn predicate(input: &mut Input<'_>) -> PResult<Condition> {
    let left = operand(input)?;

    if keyword("MATCHES").parse_next(input).is_ok() {
        lit("{")
            .parse_next(input)
            .map_err(|_| fail_with(input, "condition"))?;
        let values: Vec<Operand> = separated(1.., operand, lit(",")).parse_next(input)?;
        lit("}")
            .parse_next(input)
            .map_err(|_| fail_with(input, "closing delimiter"))?;
        return Ok(Condition::Matches(Matches {
            operand: left,
            values: values.into(),
        }));
    }

    if keyword("LIKE").parse_next(input).is_ok() {
        let pattern = operand(input)?;
        return Ok(Condition::Like(Like {
            operand: left,
            pattern,
        }));
    }

    let operator = comparison_operator(input)?;
    let right = operand(input)?;
    Ok(Condition::Comparison(Comparison {
        left,
        operator,
        right,
    }))
}

fn comparison_operator(input: &mut Input<'_>) -> PResult<ComparisonOperator> {
    ws(input)?;
    alt((
        "<=".value(ComparisonOperator::LessOrEqual),
        ">=".value(ComparisonOperator::GreaterOrEqual),
        "!=".value(ComparisonOperator::NotEqual),
        "<>".value(ComparisonOperator::NotEqual),
        "=".value(ComparisonOperator::Equal),
        "<".value(ComparisonOperator::Less),
        ">".value(ComparisonOperator::Greater),
    ))
    .parse_next(input)
    .map_err(|_: ContextError| fail_with(input, "condition"))
}

/// Parse an operand, dispatching on its first character
pub(crate) fn operand(input: &mut Input<'_>) -> PResult<Operand> {
    ws(input)?;
    let first = input.chars().next();
    match first {
        Some('\'' | '"') => string_literal(input).map(|s| Operand::Literal(Literal::String(s))),
        Some('$') => parameter(input).map(Operand::Parameter),
        Some(c) if c.is_ascii_digit() || c == '-' => number_literal(input).map(Operand::Literal),
        Some(_) => {
            if let Ok(literal) = keyword_literal(input) {
                return Ok(Operand::Literal(literal));
            }
            identified_path(input).map(Operand::Path)
        }
        None => Err(backtrack()),
    }
}
