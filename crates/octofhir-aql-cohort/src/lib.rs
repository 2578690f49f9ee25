//! Cohort evaluation for AQL
//!
//! A cohort is a boolean tree of stored queries. Evaluating it runs every leaf
//! against the query engine (restricted by consent and bound to its
//! parameters) and combines the resulting subject id sets with AND, OR and
//! NOT. The same crate builds the restrictions applied when the records of an
//! evaluated cohort are exported, and refuses exports that would disclose too
//! few subjects.

mod cache;
mod client;
mod config;
mod engine;
mod error;
mod evaluator;
mod executor;
mod export;
#[cfg(feature = "fixture")]
mod fixture;
mod model;
pub mod set_algebra;

pub use cache::{CachedTemplateRegistry, TtlCache, spawn_periodic_clear};
pub use client::{Column, EngineError, QueryEngineClient, QueryResponse, TemplateRegistry};
pub use config::{CohortConfig, DEFAULT_CACHE_TTL_SECS};
pub use engine::CohortEngine;
pub use error::{CohortError, CohortResult};
pub use evaluator::CohortEvaluator;
pub use executor::{LeafQueryExecutor, UNIVERSE_QUERY};
pub use export::{DEFAULT_PRIVACY_MIN_HITS, ExportPolicyComposer};
#[cfg(feature = "fixture")]
pub use fixture::FixtureEngine;
pub use model::{Cohort, CohortNode, LeafQuery};
pub use set_algebra::{IdentifierSet, SetOperator};
