//! Statement parser
//!
//! ```text
//! query := SELECT [DISTINCT] [TOP n] field ("," field)*
//!          [FROM containment]
//!          [WHERE condition]
//!          [ORDER BY path [ASC|DESC] ("," path [ASC|DESC])*]
//!          [LIMIT n [OFFSET n]]
//! ```

use crate::combinators::{
    Input, PResult, fail_with, identified_path, keyword, lit, name, number_literal,
    string_literal, unsigned, ws,
};
use crate::condition::{condition_expression, operand};
use crate::containment::containment_expression;
use octofhir_aql_ast::{
    FunctionCall, Literal, OrderByItem, QueryAst, SelectClause, SelectExpression, SelectField,
    SortDirection,
};
use octofhir_aql_diagnostics::{
    AQL0001, AQL0002, AQL0003, AQL0005, AQL0006, AQL0007, AQL0008, AQL0009, AQL0010, AQL0011,
    AQL0012, AQL0013, AqlError, ErrorCode, Result, Span,
};
use winnow::combinator::separated;
use winnow::error::{ContextError, StrContext};
use winnow::prelude::*;

/// Parse AQL text into a [`QueryAst`]
///
/// Containment classes are numbered 1, 2, 3, ... in pre-order.
pub fn parse(text: &str) -> Result<QueryAst> {
    let mut input: Input<'_> = text;
    query(&mut input).map_err(|e| parse_error(text, input, &e))
}

fn query(input: &mut Input<'_>) -> PResult<QueryAst> {
    let select = select_clause(input)?;
    let mut ast = QueryAst::new(select);

    if keyword("FROM").parse_next(input).is_ok() {
        ast.from = Some(
            containment_expression
                .context(StrContext::Label("containment"))
                .parse_next(input)?,
        );
    }

    if keyword("WHERE").parse_next(input).is_ok() {
        ast.where_clause = Some(
            condition_expression
                .context(StrContext::Label("condition"))
                .parse_next(input)?,
        );
    }

    if keyword("ORDER").parse_next(input).is_ok() {
        keyword("BY")
            .parse_next(input)
            .map_err(|_| fail_with(input, "ORDER BY"))?;
        ast.order_by = separated(1.., order_item, lit(",")).parse_next(input)?;
    }

    if keyword("LIMIT").parse_next(input).is_ok() {
        ast.limit = Some(unsigned(input)?);
        if keyword("OFFSET").parse_next(input).is_ok() {
            ast.offset = Some(unsigned(input)?);
        }
    }

    ws(input)?;
    if !input.is_empty() {
        return Err(fail_with(input, "trailing input"));
    }

    Ok(ast)
}

fn select_clause(input: &mut Input<'_>) -> PResult<SelectClause> {
    keyword("SELECT")
        .parse_next(input)
        .map_err(|_| fail_with(input, "select"))?;

    let distinct = keyword("DISTINCT").parse_next(input).is_ok();
    let top = if keyword("TOP").parse_next(input).is_ok() {
        Some(unsigned(input)?)
    } else {
        None
    };

    let fields: Vec<SelectField> = separated(1.., select_field, lit(","))
        .context(StrContext::Label("select"))
        .parse_next(input)?;

    Ok(SelectClause {
        distinct,
        top,
        fields,
    })
}

fn select_field(input: &mut Input<'_>) -> PResult<SelectField> {
    ws(input)?;
    let first = input.chars().next();
    let expression = match first {
        Some('\'' | '"') => SelectExpression::Literal(Literal::String(string_literal(input)?)),
        Some(c) if c.is_ascii_digit() || c == '-' => {
            SelectExpression::Literal(number_literal(input)?)
        }
        _ => select_path_or_call(input)?,
    };

    let alias = if keyword("AS").parse_next(input).is_ok() {
        Some(name(input).map_err(|_| fail_with(input, "identifier"))?)
    } else {
        None
    };

    Ok(SelectField {
        expression,
        alias: alias.map(str::to_string),
    })
}

fn select_path_or_call(input: &mut Input<'_>) -> PResult<SelectExpression> {
    let checkpoint = *input;
    let function = name(input)?;
    if !input.starts_with('(') {
        *input = checkpoint;
        return identified_path(input).map(SelectExpression::Path);
    }

    lit("(").parse_next(input)?;
    let arguments = if lit(")").parse_next(input).is_ok() {
        Vec::new()
    } else {
        let arguments = separated(1.., operand, lit(",")).parse_next(input)?;
        lit(")")
            .parse_next(input)
            .map_err(|_| fail_with(input, "closing delimiter"))?;
        arguments
    };

    Ok(SelectExpression::Function(FunctionCall {
        name: function.to_string(),
        arguments,
    }))
}

fn order_item(input: &mut Input<'_>) -> PResult<OrderByItem> {
    let path = identified_path(input)?;
    let direction = if keyword("DESC").parse_next(input).is_ok()
        || keyword("DESCENDING").parse_next(input).is_ok()
    {
        Some(SortDirection::Descending)
    } else if keyword("ASC").parse_next(input).is_ok()
        || keyword("ASCENDING").parse_next(input).is_ok()
    {
        Some(SortDirection::Ascending)
    } else {
        None
    };
    Ok(OrderByItem { path, direction })
}

fn parse_error(text: &str, remaining: &str, error: &ContextError) -> AqlError {
    let rest = remaining.trim_start();
    let offset = text.len() - rest.len();
    let token = rest.split_whitespace().next();
    let label = error.context().find_map(|context| match context {
        StrContext::Label(label) => Some(*label),
        _ => None,
    });

    let code = error_code(label, token.is_none());
    let message = match (label, token) {
        (Some(label), None) => format!("Unexpected end of input while parsing {label}"),
        (None, None) => "Unexpected end of input".to_string(),
        (Some("trailing input"), Some(token)) => format!("Unexpected trailing input '{token}'"),
        (Some(label), Some(token)) => format!("Invalid {label} near '{token}'"),
        (None, Some(token)) => format!("Unexpected token '{token}'"),
    };

    let length = token.map(str::len).unwrap_or(0);
    AqlError::parse_at(code, message, text, Span::new(offset, offset + length))
}

fn error_code(label: Option<&str>, at_end: bool) -> ErrorCode {
    match label {
        Some("string") => AQL0005,
        Some("closing delimiter") => AQL0007,
        _ if at_end => AQL0002,
        Some("select") => AQL0008,
        Some("containment") => AQL0009,
        Some("condition") => AQL0010,
        Some("path") => AQL0011,
        Some("parameter") => AQL0012,
        Some("number") => AQL0006,
        Some("identifier") => AQL0003,
        Some("trailing input") => AQL0013,
        _ => AQL0001,
    }
}
