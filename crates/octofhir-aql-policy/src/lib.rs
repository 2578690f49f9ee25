//! Query restriction policies and parameter binding for AQL
//!
//! This crate turns a researcher's query into the query that may actually be
//! executed:
//!
//! - [`QueryPolicy`] restricts a query to allowed EHRs, templates or consented
//!   compositions by attaching `MATCHES` conditions to the right containment
//!   anchors ([`QueryRewriter`]).
//! - [`PolicyRunner`] applies an ordered list of policies.
//! - [`ParameterBinder`] removes conditions on absent parameters and
//!   substitutes the remaining placeholders.
//!
//! ## Example
//!
//! ```
//! use octofhir_aql_policy::{PolicyRunner, QueryPolicy};
//!
//! let ast = octofhir_aql_parser::parse("SELECT e/ehr_id/value FROM EHR e").unwrap();
//! let text = PolicyRunner::new()
//!     .rewrite_and_render(&ast, &[QueryPolicy::ehr(["a"])])
//!     .unwrap();
//! assert_eq!(
//!     text,
//!     "SELECT e/ehr_id/value FROM EHR e WHERE e/ehr_id/value MATCHES {'a'}"
//! );
//! ```

mod error;
mod params;
mod policy;
mod record;
mod rewriter;
mod runner;

pub use error::{ParameterError, PolicyError, PolicyResult};
pub use params::{ParameterBinder, ParameterValue, Parameters};
pub use policy::QueryPolicy;
pub use record::{CONSENT_ID_PATH, EHR_ID_PATH, RecordContainer, TEMPLATE_ID_PATH};
pub use rewriter::QueryRewriter;
pub use runner::PolicyRunner;
