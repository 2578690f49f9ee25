//! Filter (WHERE) clause AST nodes

use crate::{IdentifiedPath, Literal};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// Logical operator joining conditions or containment expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOperator {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

/// A value position in a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// Path into the record
    Path(IdentifiedPath),
    /// Constant
    Literal(Literal),
    /// Named placeholder (`$name`)
    Parameter(String),
}

impl Operand {
    /// Parameter name if this operand is a placeholder
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Self::Parameter(name) => Some(name),
            _ => None,
        }
    }
}

/// A filter condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `left op right`
    Comparison(Comparison),
    /// `operand MATCHES {v1, v2, ...}`
    Matches(Matches),
    /// `operand LIKE pattern`
    Like(Like),
    /// `EXISTS path`
    Exists(IdentifiedPath),
    /// `NOT condition`
    Not(Box<Condition>),
    /// Conditions joined with AND/OR
    Logical(LogicalCondition),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub left: Operand,
    pub operator: ComparisonOperator,
    pub right: Operand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matches {
    pub operand: Operand,
    pub values: SmallVec<[Operand; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub operand: Operand,
    pub pattern: Operand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalCondition {
    pub operator: LogicalOperator,
    pub operands: Vec<Condition>,
}

impl Condition {
    /// Build a `path MATCHES {values}` condition over literal values
    pub fn matches_literals(path: IdentifiedPath, values: impl IntoIterator<Item = Literal>) -> Self {
        Condition::Matches(Matches {
            operand: Operand::Path(path),
            values: values.into_iter().map(Operand::Literal).collect(),
        })
    }

    /// AND a list of conditions together.
    ///
    /// Returns `None` for an empty list and the condition itself for a single
    /// element. Operands that are already conjunctions are flattened.
    pub fn conjunction(conditions: impl IntoIterator<Item = Condition>) -> Option<Condition> {
        let mut operands = Vec::new();
        for condition in conditions {
            match condition {
                Condition::Logical(logical) if logical.operator == LogicalOperator::And => {
                    operands.extend(logical.operands);
                }
                other => operands.push(other),
            }
        }

        match operands.len() {
            0 => None,
            1 => operands.pop(),
            _ => Some(Condition::Logical(LogicalCondition {
                operator: LogicalOperator::And,
                operands,
            })),
        }
    }

    /// Names of every parameter placeholder referenced by this condition
    pub fn parameters(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_parameters(&mut names);
        names
    }

    fn collect_parameters<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Condition::Comparison(cmp) => {
                names.extend(cmp.left.parameter_name());
                names.extend(cmp.right.parameter_name());
            }
            Condition::Matches(matches) => {
                names.extend(matches.operand.parameter_name());
                names.extend(matches.values.iter().filter_map(Operand::parameter_name));
            }
            Condition::Like(like) => {
                names.extend(like.operand.parameter_name());
                names.extend(like.pattern.parameter_name());
            }
            Condition::Exists(_) => {}
            Condition::Not(inner) => inner.collect_parameters(names),
            Condition::Logical(logical) => {
                for operand in &logical.operands {
                    operand.collect_parameters(names);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(path: &str, param: &str) -> Condition {
        Condition::Comparison(Comparison {
            left: Operand::Path(IdentifiedPath::new("o", path)),
            operator: ComparisonOperator::Equal,
            right: Operand::Parameter(param.to_string()),
        })
    }

    #[test]
    fn test_conjunction_shapes() {
        assert!(Condition::conjunction(Vec::new()).is_none());

        let single = Condition::conjunction(vec![eq("a", "p1")]);
        assert_eq!(single, Some(eq("a", "p1")));

        let nested = Condition::conjunction(vec![eq("a", "p1"), eq("b", "p2")]);
        let flat = Condition::conjunction(vec![nested.unwrap(), eq("c", "p3")]);
        match flat {
            Some(Condition::Logical(logical)) => {
                assert_eq!(logical.operator, LogicalOperator::And);
                assert_eq!(logical.operands.len(), 3);
            }
            other => panic!("Expected conjunction, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_conditions_nest() {
        let inner = Condition::Logical(LogicalCondition {
            operator: LogicalOperator::Or,
            operands: vec![eq("a", "p1"), eq("b", "p2")],
        });
        let outer = Condition::Logical(LogicalCondition {
            operator: LogicalOperator::Or,
            operands: vec![inner.clone(), Condition::Not(Box::new(inner)), eq("c", "p3")],
        });

        let names: Vec<&str> = outer.parameters().into_iter().collect();
        assert_eq!(names, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_parameters_collected_through_nesting() {
        let condition = Condition::Not(Box::new(
            Condition::conjunction(vec![
                eq("a", "start"),
                Condition::Matches(Matches {
                    operand: Operand::Path(IdentifiedPath::new("o", "code")),
                    values: smallvec::smallvec![
                        Operand::Parameter("codes".to_string()),
                        Operand::Literal(Literal::string("x")),
                    ],
                }),
            ])
            .unwrap(),
        ));

        let names: Vec<&str> = condition.parameters().into_iter().collect();
        assert_eq!(names, vec!["codes", "start"]);
    }
}
