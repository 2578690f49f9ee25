//! AQL Abstract Syntax Tree definitions
//!
//! This crate defines the AST for the Archetype Query Language subset used to
//! select patients from a clinical data repository. A query has three
//! addressable regions:
//!
//! - the select clause (output columns),
//! - the containment clause (`FROM EHR e CONTAINS COMPOSITION c ...`), a tree of
//!   class references joined by AND/OR,
//! - the filter clause (`WHERE ...`), a tree of conditions joined by AND/OR.
//!
//! All nodes are plain values: rewriting a query means building a new value,
//! never mutating one that is shared.

mod condition;
mod containment;
mod literal;
mod path;
mod render;
mod select;

pub use condition::*;
pub use containment::*;
pub use literal::*;
pub use path::*;
pub use render::*;
pub use select::*;

use serde::{Deserialize, Serialize};

/// A parsed AQL statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAst {
    /// SELECT clause
    pub select: SelectClause,
    /// FROM clause (containment tree)
    pub from: Option<Containment>,
    /// WHERE clause (filter tree)
    pub where_clause: Option<Condition>,
    /// ORDER BY items
    pub order_by: Vec<OrderByItem>,
    /// LIMIT
    pub limit: Option<u64>,
    /// OFFSET (only rendered together with LIMIT)
    pub offset: Option<u64>,
}

impl QueryAst {
    /// Create a query with only a select clause
    pub fn new(select: SelectClause) -> Self {
        Self {
            select,
            from: None,
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Next unused containment identifier
    pub fn next_containment_id(&self) -> u32 {
        self.from.as_ref().map(Containment::max_id).unwrap_or(0) + 1
    }

    /// Parameter placeholders referenced anywhere in the filter clause
    pub fn parameters(&self) -> Vec<String> {
        self.where_clause
            .as_ref()
            .map(|condition| {
                condition
                    .parameters()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_containment_id() {
        let mut ast = QueryAst::new(SelectClause::distinct_path(IdentifiedPath::new(
            "e",
            "ehr_id/value",
        )));
        assert_eq!(ast.next_containment_id(), 1);

        ast.from = Some(Containment::Class(
            ContainmentClass::new(1, "EHR")
                .with_alias("e")
                .containing(Containment::Class(ContainmentClass::new(5, "COMPOSITION"))),
        ));
        assert_eq!(ast.next_containment_id(), 6);
    }

    #[test]
    fn test_ast_serializes_to_json() {
        let ast = QueryAst::new(SelectClause::distinct_path(IdentifiedPath::new(
            "e",
            "ehr_id/value",
        )));
        let json = serde_json::to_value(&ast).unwrap();
        assert_eq!(json["select"]["distinct"], serde_json::json!(true));
        let back: QueryAst = serde_json::from_value(json).unwrap();
        assert_eq!(back, ast);
    }
}
