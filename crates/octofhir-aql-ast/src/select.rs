//! Select and ordering clauses

use crate::{IdentifiedPath, Literal, Operand};
use serde::{Deserialize, Serialize};

/// The SELECT clause (output columns)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectClause {
    /// Whether duplicate rows are removed
    pub distinct: bool,
    /// Optional `TOP n` row limit
    pub top: Option<u64>,
    /// Output columns
    pub fields: Vec<SelectField>,
}

impl SelectClause {
    /// Create a select clause from a list of fields
    pub fn new(fields: Vec<SelectField>) -> Self {
        Self {
            distinct: false,
            top: None,
            fields,
        }
    }

    /// Create a `SELECT DISTINCT` clause for a single path
    pub fn distinct_path(path: IdentifiedPath) -> Self {
        Self {
            distinct: true,
            top: None,
            fields: vec![SelectField::path(path)],
        }
    }
}

/// A single output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectField {
    /// Column expression
    pub expression: SelectExpression,
    /// Optional `AS` alias
    pub alias: Option<String>,
}

impl SelectField {
    /// A column selecting a path
    pub fn path(path: IdentifiedPath) -> Self {
        Self {
            expression: SelectExpression::Path(path),
            alias: None,
        }
    }

    /// Set the column alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// Expression producing a column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectExpression {
    /// A path into the record
    Path(IdentifiedPath),
    /// A constant
    Literal(Literal),
    /// A function or aggregate call, e.g. `COUNT(e/ehr_id/value)`
    Function(FunctionCall),
}

/// Function or aggregate call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name as written
    pub name: String,
    /// Call arguments
    pub arguments: Vec<Operand>,
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    /// Sort key
    pub path: IdentifiedPath,
    /// Explicit direction, if written
    pub direction: Option<SortDirection>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}
