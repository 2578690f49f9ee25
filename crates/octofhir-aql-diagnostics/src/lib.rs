//! AQL diagnostics and error handling
//!
//! Error codes, source locations and the [`AqlError`] type shared by the AQL
//! parser, renderer and query rewriting crates.

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for AQL operations
pub type Result<T> = std::result::Result<T, AqlError>;
