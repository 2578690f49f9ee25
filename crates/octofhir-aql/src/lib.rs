//! AQL cohort evaluation and query restriction for Rust
//!
//! This crate bundles the AQL workspace:
//! - Parsing and rendering AQL statements
//! - Restricting queries to allowed EHRs, templates and consented records
//! - Binding parameters into stored queries
//! - Evaluating cohort trees against a query engine and gating record export
//!
//! # Example
//!
//! ```
//! use octofhir_aql::{PolicyRunner, QueryPolicy, parse};
//!
//! let ast = parse("SELECT c/name/value FROM EHR e CONTAINS COMPOSITION c")?;
//! let restricted = PolicyRunner::new().rewrite_and_render(&ast, &[QueryPolicy::templates(["vitals.v1"])])?;
//! assert!(restricted.ends_with("MATCHES {'vitals.v1'}"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_aql_ast as ast;
pub use octofhir_aql_cohort as cohort;
pub use octofhir_aql_diagnostics as diagnostics;
pub use octofhir_aql_parser as parser;
pub use octofhir_aql_policy as policy;

// Convenience re-exports
pub use octofhir_aql_ast::{QueryAst, render};
pub use octofhir_aql_cohort::{Cohort, CohortConfig, CohortEngine, CohortError, CohortNode, IdentifierSet};
pub use octofhir_aql_diagnostics::{AqlError, Result};
pub use octofhir_aql_parser::parse;
pub use octofhir_aql_policy::{ParameterBinder, Parameters, PolicyRunner, QueryPolicy};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
