//! Containment-anchored query rewriting
//!
//! A [`QueryRewriter`] narrows a query to a set of allowed values for one
//! attribute of a record container:
//!
//! 1. Every containment node of the container class is located breadth-first.
//! 2. Each located node gets a `alias/attribute MATCHES {values}` condition.
//!    When there is no such node, one is synthesised with the next unused
//!    containment id and receives the single condition.
//! 3. The new conditions are ANDed with the existing WHERE clause.
//!
//! The input query is never modified; a rewritten copy is returned.

use crate::RecordContainer;
use octofhir_aql_ast::{Condition, Containment, ContainmentClass, IdentifiedPath, Literal, QueryAst};
use std::collections::{BTreeSet, HashSet};

/// Attaches an allow-list condition to every anchor of a record container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRewriter {
    container: RecordContainer,
    attribute_path: &'static str,
}

impl QueryRewriter {
    /// Create a rewriter for an attribute of the given container
    pub const fn new(container: RecordContainer, attribute_path: &'static str) -> Self {
        Self {
            container,
            attribute_path,
        }
    }

    /// Container the rewriter anchors on
    pub const fn container(&self) -> RecordContainer {
        self.container
    }

    /// Return a copy of `ast` restricted to `values` (rendered in sorted order)
    pub fn restrict(&self, ast: &QueryAst, values: &BTreeSet<String>) -> QueryAst {
        let mut ast = ast.clone();
        let aliases = self.anchor_aliases(&mut ast);

        let conditions = aliases.into_iter().map(|alias| {
            Condition::matches_literals(
                IdentifiedPath::new(alias, self.attribute_path),
                values.iter().map(|value| Literal::string(value.as_str())),
            )
        });

        ast.where_clause = Condition::conjunction(ast.where_clause.take().into_iter().chain(conditions));
        ast
    }

    /// Aliases of every container node in breadth-first order.
    ///
    /// Nodes without an alias are given one; when the tree has no container
    /// node at all, one is synthesised.
    pub fn anchor_aliases(&self, ast: &mut QueryAst) -> Vec<String> {
        let anchor_ids = ast
            .from
            .as_ref()
            .map(|from| from.find_class_ids(self.container.class_name()))
            .unwrap_or_default();

        if anchor_ids.is_empty() {
            return vec![self.synthesise_anchor(ast)];
        }
        anchor_ids
            .into_iter()
            .filter_map(|id| ensure_alias(ast, id, self.container))
            .collect()
    }

    /// Add a container node to the containment tree, returning its alias
    fn synthesise_anchor(&self, ast: &mut QueryAst) -> String {
        let id = ast.next_containment_id();
        let alias = unique_alias(
            ast.from.as_ref(),
            &format!("{}{}", self.container.alias_prefix(), id),
        );
        let anchor = ContainmentClass::new(id, self.container.class_name()).with_alias(alias.clone());

        ast.from = Some(match (self.container, ast.from.take()) {
            (_, None) => Containment::Class(anchor),
            (RecordContainer::Ehr, Some(existing)) => Containment::Class(anchor.containing(existing)),
            (RecordContainer::Composition, Some(Containment::Class(mut root)))
                if root.is_class(RecordContainer::Ehr.class_name()) =>
            {
                let nested = match root.contains.take() {
                    Some(existing) => (*existing).and(Containment::Class(anchor)),
                    None => Containment::Class(anchor),
                };
                root.contains = Some(Box::new(nested));
                Containment::Class(root)
            }
            (RecordContainer::Composition, Some(existing)) => {
                existing.and(Containment::Class(anchor))
            }
        });

        alias
    }
}

/// Alias of the node with `id`, generating one when the node has none
fn ensure_alias(ast: &mut QueryAst, id: u32, container: RecordContainer) -> Option<String> {
    let from = ast.from.as_mut()?;
    if let Some(alias) = from.class(id).and_then(|class| class.alias.clone()) {
        return Some(alias);
    }

    let alias = unique_alias(Some(&*from), &format!("{}{}", container.alias_prefix(), id));
    let class = from.class_mut(id)?;
    class.alias = Some(alias.clone());
    Some(alias)
}

/// `base`, or `base_1`, `base_2`, ... until no containment alias collides
fn unique_alias(from: Option<&Containment>, base: &str) -> String {
    let taken: HashSet<&str> = from
        .map(|from| from.aliases().into_iter().collect())
        .unwrap_or_default();

    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}
