//! Canonical AQL rendering
//!
//! Turns a [`QueryAst`] back into query text. Output uses upper-case keywords,
//! single-quoted strings and only the parentheses needed to preserve the tree.

use crate::{
    Condition, Containment, ContainmentClass, Literal, Operand, QueryAst, SelectExpression,
    SelectField, quote_string,
};
use octofhir_aql_diagnostics::{AQL0105, AqlError, Result};

/// Render a query to canonical AQL text
pub fn render(ast: &QueryAst) -> Result<String> {
    let mut out = String::new();

    out.push_str("SELECT ");
    if ast.select.distinct {
        out.push_str("DISTINCT ");
    }
    if let Some(top) = ast.select.top {
        out.push_str(&format!("TOP {} ", top));
    }
    if ast.select.fields.is_empty() {
        return Err(AqlError::render(AQL0105, "SELECT clause has no fields"));
    }
    let fields = ast
        .select
        .fields
        .iter()
        .map(render_field)
        .collect::<Result<Vec<_>>>()?;
    out.push_str(&fields.join(", "));

    if let Some(from) = &ast.from {
        out.push_str(" FROM ");
        out.push_str(&render_containment(from)?);
    }

    if let Some(condition) = &ast.where_clause {
        out.push_str(" WHERE ");
        out.push_str(&render_condition(condition)?);
    }

    if !ast.order_by.is_empty() {
        let items: Vec<String> = ast
            .order_by
            .iter()
            .map(|item| match item.direction {
                Some(direction) => format!("{} {}", item.path.to_aql(), direction.keyword()),
                None => item.path.to_aql(),
            })
            .collect();
        out.push_str(" ORDER BY ");
        out.push_str(&items.join(", "));
    }

    if let Some(limit) = ast.limit {
        out.push_str(&format!(" LIMIT {}", limit));
        if let Some(offset) = ast.offset {
            out.push_str(&format!(" OFFSET {}", offset));
        }
    }

    Ok(out)
}

fn render_field(field: &SelectField) -> Result<String> {
    let mut out = match &field.expression {
        SelectExpression::Path(path) => path.to_aql(),
        SelectExpression::Literal(literal) => render_literal(literal),
        SelectExpression::Function(call) => {
            if call.name.is_empty() {
                return Err(AqlError::render(AQL0105, "function call without a name"));
            }
            let args: Vec<String> = call.arguments.iter().map(render_operand).collect();
            format!("{}({})", call.name, args.join(", "))
        }
    };
    if let Some(alias) = &field.alias {
        out.push_str(" AS ");
        out.push_str(alias);
    }
    Ok(out)
}

/// Render a containment expression
pub fn render_containment(containment: &Containment) -> Result<String> {
    match containment {
        Containment::Class(class) => render_class(class),
        Containment::Logical(logical) => {
            if logical.operands.is_empty() {
                return Err(AqlError::render(
                    AQL0105,
                    format!("{} containment without operands", logical.operator.keyword()),
                ));
            }
            let operands = logical
                .operands
                .iter()
                .map(|operand| match operand {
                    Containment::Class(class) if class.contains.is_none() => render_class(class),
                    nested => Ok(format!("({})", render_containment(nested)?)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(operands.join(&format!(" {} ", logical.operator.keyword())))
        }
    }
}

fn render_class(class: &ContainmentClass) -> Result<String> {
    if class.class_name.is_empty() {
        return Err(AqlError::render(
            AQL0105,
            format!("containment {} has no class name", class.id),
        ));
    }

    let mut out = class.class_name.clone();
    if let Some(alias) = &class.alias {
        out.push(' ');
        out.push_str(alias);
    }
    if let Some(predicate) = &class.predicate {
        out.push('[');
        out.push_str(predicate);
        out.push(']');
    }
    if let Some(nested) = &class.contains {
        out.push_str(" CONTAINS ");
        match nested.as_ref() {
            Containment::Logical(_) => {
                out.push('(');
                out.push_str(&render_containment(nested)?);
                out.push(')');
            }
            Containment::Class(_) => out.push_str(&render_containment(nested)?),
        }
    }
    Ok(out)
}

/// Render a filter condition
pub fn render_condition(condition: &Condition) -> Result<String> {
    match condition {
        Condition::Comparison(cmp) => Ok(format!(
            "{} {} {}",
            render_operand(&cmp.left),
            cmp.operator.symbol(),
            render_operand(&cmp.right)
        )),
        Condition::Matches(matches) => {
            if matches.values.is_empty() {
                return Err(AqlError::render(AQL0105, "MATCHES without values"));
            }
            let values: Vec<String> = matches.values.iter().map(render_operand).collect();
            Ok(format!(
                "{} MATCHES {{{}}}",
                render_operand(&matches.operand),
                values.join(", ")
            ))
        }
        Condition::Like(like) => Ok(format!(
            "{} LIKE {}",
            render_operand(&like.operand),
            render_operand(&like.pattern)
        )),
        Condition::Exists(path) => Ok(format!("EXISTS {}", path.to_aql())),
        Condition::Not(inner) => match inner.as_ref() {
            Condition::Logical(_) => Ok(format!("NOT ({})", render_condition(inner)?)),
            _ => Ok(format!("NOT {}", render_condition(inner)?)),
        },
        Condition::Logical(logical) => {
            if logical.operands.is_empty() {
                return Err(AqlError::render(
                    AQL0105,
                    format!("{} condition without operands", logical.operator.keyword()),
                ));
            }
            let operands = logical
                .operands
                .iter()
                .map(|operand| match operand {
                    Condition::Logical(_) => Ok(format!("({})", render_condition(operand)?)),
                    _ => render_condition(operand),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(operands.join(&format!(" {} ", logical.operator.keyword())))
        }
    }
}

/// Render an operand
pub fn render_operand(operand: &Operand) -> String {
    match operand {
        Operand::Path(path) => path.to_aql(),
        Operand::Literal(literal) => render_literal(literal),
        Operand::Parameter(name) => format!("${}", name),
    }
}

/// Render a literal using AQL literal syntax
pub fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Null => "NULL".to_string(),
        Literal::Boolean(b) => b.to_string(),
        Literal::Integer(i) => i.to_string(),
        Literal::Decimal(d) => d.to_string(),
        Literal::String(s) => quote_string(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Comparison, ComparisonOperator, IdentifiedPath, LogicalCondition, LogicalOperator,
        SelectClause,
    };
    use pretty_assertions::assert_eq;

    fn ehr_query() -> QueryAst {
        let composition = ContainmentClass::new(2, "COMPOSITION")
            .with_alias("c")
            .with_predicate("openEHR-EHR-COMPOSITION.report.v1");
        let ehr = ContainmentClass::new(1, "EHR")
            .with_alias("e")
            .containing(Containment::Class(composition));
        let mut ast = QueryAst::new(SelectClause::distinct_path(IdentifiedPath::new(
            "e",
            "ehr_id/value",
        )));
        ast.from = Some(Containment::Class(ehr));
        ast
    }

    #[test]
    fn test_render_simple_query() {
        assert_eq!(
            render(&ehr_query()).unwrap(),
            "SELECT DISTINCT e/ehr_id/value FROM EHR e CONTAINS COMPOSITION c[openEHR-EHR-COMPOSITION.report.v1]"
        );
    }

    #[test]
    fn test_render_parenthesises_nested_logic() {
        let cmp = |path: &str, value: i64| {
            Condition::Comparison(Comparison {
                left: Operand::Path(IdentifiedPath::new("c", path)),
                operator: ComparisonOperator::Greater,
                right: Operand::Literal(Literal::Integer(value)),
            })
        };
        let or = Condition::Logical(LogicalCondition {
            operator: LogicalOperator::Or,
            operands: vec![cmp("a", 1), cmp("b", 2)],
        });
        let condition = Condition::Not(Box::new(
            Condition::conjunction(vec![or, cmp("d", 3)]).unwrap(),
        ));

        assert_eq!(
            render_condition(&condition).unwrap(),
            "NOT ((c/a > 1 OR c/b > 2) AND c/d > 3)"
        );
    }

    #[test]
    fn test_render_logical_containment_under_contains() {
        let mut ast = ehr_query();
        if let Some(Containment::Class(ehr)) = ast.from.as_mut() {
            let existing = ehr.contains.take().map(|c| *c);
            let added = Containment::Class(ContainmentClass::new(3, "COMPOSITION").with_alias("c3"));
            ehr.contains = existing.map(|c| Box::new(c.and(added)));
        }

        assert_eq!(
            render(&ast).unwrap(),
            "SELECT DISTINCT e/ehr_id/value FROM EHR e CONTAINS (COMPOSITION c[openEHR-EHR-COMPOSITION.report.v1] AND COMPOSITION c3)"
        );
    }

    #[test]
    fn test_render_rejects_invalid_structure() {
        let ast = QueryAst::new(SelectClause::new(Vec::new()));
        assert_eq!(render(&ast).unwrap_err().code(), AQL0105);

        let empty = Condition::Logical(LogicalCondition {
            operator: LogicalOperator::And,
            operands: Vec::new(),
        });
        assert!(render_condition(&empty).is_err());
    }

    #[test]
    fn test_render_literals() {
        assert_eq!(render_literal(&Literal::Null), "NULL");
        assert_eq!(render_literal(&Literal::Boolean(true)), "true");
        assert_eq!(render_literal(&Literal::string("it's")), r"'it\'s'");
        assert_eq!(render_operand(&Operand::Parameter("from".to_string())), "$from");
    }
}
