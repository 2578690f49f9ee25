//! AQL parser using winnow
//!
//! Hand-written recursive descent over the AQL subset used for cohort
//! selection: SELECT, FROM with nested CONTAINS, WHERE with AND/OR/NOT,
//! MATCHES, LIKE, EXISTS and `$name` parameter placeholders, ORDER BY,
//! LIMIT and OFFSET. Keywords are case-insensitive.
//!
//! Errors carry an `AQL00xx` code and the line/column of the offending token.

mod combinators;
mod condition;
mod containment;
mod query;

pub use query::parse;
