//! Containment (FROM) clause AST nodes
//!
//! A containment tree is made of class references (`COMPOSITION c[...]`) that may
//! contain further containment expressions, combined with logical AND/OR.
//! Every class node carries an integer identifier that is unique within a query.

use crate::LogicalOperator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Containment expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Containment {
    /// A class reference, optionally containing a nested expression
    Class(ContainmentClass),
    /// Logical combination of containment expressions
    Logical(LogicalContainment),
}

/// A class reference in the containment tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainmentClass {
    /// Identifier unique within the query
    pub id: u32,
    /// Reference model class name (e.g. `EHR`, `COMPOSITION`)
    pub class_name: String,
    /// Alias used by paths in other clauses
    pub alias: Option<String>,
    /// Raw archetype predicate, without brackets
    pub predicate: Option<String>,
    /// Nested containment expression
    pub contains: Option<Box<Containment>>,
}

impl ContainmentClass {
    pub fn new(id: u32, class_name: impl Into<String>) -> Self {
        Self {
            id,
            class_name: class_name.into(),
            alias: None,
            predicate: None,
            contains: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn containing(mut self, contains: Containment) -> Self {
        self.contains = Some(Box::new(contains));
        self
    }

    /// Whether this node references the given class (case-insensitive)
    pub fn is_class(&self, class_name: &str) -> bool {
        self.class_name.eq_ignore_ascii_case(class_name)
    }
}

/// Logical combination of containment expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalContainment {
    pub operator: LogicalOperator,
    pub operands: Vec<Containment>,
}

impl Containment {
    /// AND two containment expressions together, flattening an existing AND on the left
    pub fn and(self, other: Containment) -> Containment {
        match self {
            Containment::Logical(mut logical) if logical.operator == LogicalOperator::And => {
                logical.operands.push(other);
                Containment::Logical(logical)
            }
            left => Containment::Logical(LogicalContainment {
                operator: LogicalOperator::And,
                operands: vec![left, other],
            }),
        }
    }

    /// Class nodes in breadth-first order
    pub fn breadth_first(&self) -> Vec<&ContainmentClass> {
        let mut classes = Vec::new();
        let mut queue = VecDeque::from([self]);

        while let Some(node) = queue.pop_front() {
            match node {
                Containment::Class(class) => {
                    classes.push(class);
                    if let Some(nested) = &class.contains {
                        queue.push_back(nested);
                    }
                }
                Containment::Logical(logical) => queue.extend(logical.operands.iter()),
            }
        }

        classes
    }

    /// Identifiers of every node of the given class, in breadth-first order
    pub fn find_class_ids(&self, class_name: &str) -> Vec<u32> {
        self.breadth_first()
            .into_iter()
            .filter(|class| class.is_class(class_name))
            .map(|class| class.id)
            .collect()
    }

    /// Largest identifier used in the tree (0 for a tree without classes)
    pub fn max_id(&self) -> u32 {
        self.breadth_first()
            .into_iter()
            .map(|class| class.id)
            .max()
            .unwrap_or(0)
    }

    /// All aliases declared in the tree
    pub fn aliases(&self) -> BTreeSet<&str> {
        self.breadth_first()
            .into_iter()
            .filter_map(|class| class.alias.as_deref())
            .collect()
    }

    /// Look up a class node by identifier
    pub fn class(&self, id: u32) -> Option<&ContainmentClass> {
        self.breadth_first().into_iter().find(|class| class.id == id)
    }

    /// Look up a class node by identifier for modification
    pub fn class_mut(&mut self, id: u32) -> Option<&mut ContainmentClass> {
        match self {
            Containment::Class(class) => {
                if class.id == id {
                    return Some(class);
                }
                class.contains.as_deref_mut().and_then(|nested| nested.class_mut(id))
            }
            Containment::Logical(logical) => logical
                .operands
                .iter_mut()
                .find_map(|operand| operand.class_mut(id)),
        }
    }
}
