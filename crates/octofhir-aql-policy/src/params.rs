//! Parameter binding
//!
//! Binding runs in two passes over the filter clause. The first removes every
//! condition that references a parameter whose value is absent; the second
//! replaces the remaining `$name` placeholders with literals. Both passes work
//! on the AST, so placeholders are matched by exact name and the order of
//! entries in the parameter map never matters.

use crate::ParameterError;
use indexmap::IndexMap;
use log::debug;
use octofhir_aql_ast::{Comparison, Condition, Like, Literal, LogicalCondition, Matches, Operand, QueryAst, render};
use octofhir_aql_parser::parse;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A value bound to a query parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
    Decimal(Decimal),
    /// Only valid inside a MATCHES value list
    List(Vec<ParameterValue>),
}

impl ParameterValue {
    /// Literal for a scalar value, `None` for a list
    pub fn to_literal(&self) -> Option<Literal> {
        match self {
            Self::Boolean(b) => Some(Literal::Boolean(*b)),
            Self::Integer(i) => Some(Literal::Integer(*i)),
            Self::Text(s) => Some(Literal::String(s.clone())),
            Self::Decimal(d) => Some(Literal::Decimal(*d)),
            Self::List(_) => None,
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParameterValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for ParameterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Decimal> for ParameterValue {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Parameter name to value; `None` marks the parameter as absent
pub type Parameters = IndexMap<String, Option<ParameterValue>>;

/// Binds a parameter map into queries
#[derive(Debug, Clone, Copy)]
pub struct ParameterBinder<'a> {
    parameters: &'a Parameters,
}

impl<'a> ParameterBinder<'a> {
    pub fn new(parameters: &'a Parameters) -> Self {
        Self { parameters }
    }

    /// Parse, bind and render a query
    pub fn bind(&self, text: &str) -> Result<String, ParameterError> {
        let ast = parse(text)?;
        let bound = self.bind_ast(&ast)?;
        let rendered = render(&bound)?;
        debug!("Bound {} parameter(s): {}", self.parameters.len(), rendered);
        Ok(rendered)
    }

    /// Strip absent parameters, then substitute the rest
    pub fn bind_ast(&self, ast: &QueryAst) -> Result<QueryAst, ParameterError> {
        self.substitute(&self.strip_absent(ast))
    }

    /// Remove every condition referencing an absent parameter
    pub fn strip_absent(&self, ast: &QueryAst) -> QueryAst {
        let mut ast = ast.clone();
        ast.where_clause = ast
            .where_clause
            .take()
            .and_then(|condition| self.strip_condition(condition));
        ast
    }

    /// Replace placeholders that have a value with literals
    pub fn substitute(&self, ast: &QueryAst) -> Result<QueryAst, ParameterError> {
        let mut ast = ast.clone();
        ast.where_clause = ast
            .where_clause
            .take()
            .map(|condition| self.substitute_condition(condition))
            .transpose()?;
        Ok(ast)
    }

    fn is_absent(&self, operand: &Operand) -> bool {
        operand
            .parameter_name()
            .is_some_and(|name| matches!(self.parameters.get(name), Some(None)))
    }

    fn strip_condition(&self, condition: Condition) -> Option<Condition> {
        match condition {
            Condition::Comparison(cmp) => {
                (!self.is_absent(&cmp.left) && !self.is_absent(&cmp.right)).then_some(Condition::Comparison(cmp))
            }
            Condition::Like(like) => {
                (!self.is_absent(&like.operand) && !self.is_absent(&like.pattern)).then_some(Condition::Like(like))
            }
            Condition::Matches(mut matches) => {
                if self.is_absent(&matches.operand) {
                    return None;
                }
                matches.values.retain(|value| !self.is_absent(value));
                (!matches.values.is_empty()).then_some(Condition::Matches(matches))
            }
            Condition::Exists(path) => Some(Condition::Exists(path)),
            Condition::Not(inner) => self
                .strip_condition(*inner)
                .map(|inner| Condition::Not(Box::new(inner))),
            Condition::Logical(logical) => {
                let mut operands: Vec<Condition> = logical
                    .operands
                    .into_iter()
                    .filter_map(|operand| self.strip_condition(operand))
                    .collect();
                match operands.len() {
                    0 => None,
                    1 => operands.pop(),
                    _ => Some(Condition::Logical(LogicalCondition {
                        operator: logical.operator,
                        operands,
                    })),
                }
            }
        }
    }

    fn substitute_condition(&self, condition: Condition) -> Result<Condition, ParameterError> {
        Ok(match condition {
            Condition::Comparison(cmp) => Condition::Comparison(Comparison {
                left: self.substitute_scalar(cmp.left)?,
                operator: cmp.operator,
                right: self.substitute_scalar(cmp.right)?,
            }),
            Condition::Like(like) => Condition::Like(Like {
                operand: self.substitute_scalar(like.operand)?,
                pattern: self.substitute_scalar(like.pattern)?,
            }),
            Condition::Matches(matches) => {
                let mut values = SmallVec::with_capacity(matches.values.len());
                for value in matches.values {
                    self.expand_into(value, &mut values)?;
                }
                Condition::Matches(Matches {
                    operand: self.substitute_scalar(matches.operand)?,
                    values,
                })
            }
            Condition::Exists(path) => Condition::Exists(path),
            Condition::Not(inner) => Condition::Not(Box::new(self.substitute_condition(*inner)?)),
            Condition::Logical(logical) => Condition::Logical(LogicalCondition {
                operator: logical.operator,
                operands: logical
                    .operands
                    .into_iter()
                    .map(|operand| self.substitute_condition(operand))
                    .collect::<Result<_, _>>()?,
            }),
        })
    }

    fn substitute_scalar(&self, operand: Operand) -> Result<Operand, ParameterError> {
        let Operand::Parameter(name) = operand else {
            return Ok(operand);
        };
        match self.parameters.get(&name) {
            Some(Some(value)) => value
                .to_literal()
                .map(Operand::Literal)
                .ok_or(ParameterError::ListOutsideMatches { name }),
            _ => Ok(Operand::Parameter(name)),
        }
    }

    /// Push the substitution of a MATCHES entry, expanding list values in place
    fn expand_into(&self, operand: Operand, values: &mut SmallVec<[Operand; 2]>) -> Result<(), ParameterError> {
        if let Operand::Parameter(name) = &operand {
            if let Some(Some(ParameterValue::List(items))) = self.parameters.get(name) {
                for item in items {
                    let literal = item
                        .to_literal()
                        .ok_or_else(|| ParameterError::ListOutsideMatches { name: name.clone() })?;
                    values.push(Operand::Literal(literal));
                }
                return Ok(());
            }
        }
        values.push(self.substitute_scalar(operand)?);
        Ok(())
    }
}
