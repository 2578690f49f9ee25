//! Errors raised while restricting or binding queries

use octofhir_aql_diagnostics::{
    AQL0100, AQL0101, AQL0102, AQL0103, AQL0104, AqlError, ErrorCode,
};
use thiserror::Error;

/// Result type for policy operations
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur while applying a restriction policy
#[derive(Debug, Clone, Error)]
pub enum PolicyError {
    /// The query has no containment anchor the policy can attach to
    #[error("{code}: Malformed query: {message}", code = AQL0100)]
    MalformedAst { message: String },

    /// A configuration value the policy depends on is not set
    #[error("{code}: Missing configuration value '{setting}'", code = AQL0101)]
    MissingConfiguration { setting: String },

    /// EHR restriction requested against an empty id set
    #[error("{code}: Cannot restrict a query to an empty set of EHR ids", code = AQL0102)]
    EmptyCohortSize,

    /// Template restriction requested against an empty template set
    #[error("{code}: No templates attached to the restriction", code = AQL0103)]
    NoTemplatesAttached,

    /// The query could not be parsed or rendered
    #[error(transparent)]
    Query(#[from] AqlError),
}

impl PolicyError {
    /// Create a malformed AST error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedAst {
            message: message.into(),
        }
    }

    /// Create a missing configuration error
    pub fn missing_configuration(setting: impl Into<String>) -> Self {
        Self::MissingConfiguration {
            setting: setting.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedAst { .. } => AQL0100,
            Self::MissingConfiguration { .. } => AQL0101,
            Self::EmptyCohortSize => AQL0102,
            Self::NoTemplatesAttached => AQL0103,
            Self::Query(e) => e.code(),
        }
    }
}

/// Errors that can occur while binding parameter values into a query
#[derive(Debug, Clone, Error)]
pub enum ParameterError {
    /// A list value was bound to a placeholder outside a MATCHES value list
    #[error("{code}: List value for parameter '{name}' is only allowed inside MATCHES", code = AQL0104)]
    ListOutsideMatches { name: String },

    /// The query could not be parsed or rendered
    #[error(transparent)]
    Query(#[from] AqlError),
}

impl ParameterError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ListOutsideMatches { .. } => AQL0104,
            Self::Query(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_aql_diagnostics::AQL0001;

    #[test]
    fn test_policy_error_codes() {
        assert_eq!(PolicyError::EmptyCohortSize.code(), AQL0102);
        assert_eq!(
            PolicyError::missing_configuration("consent_oid").to_string(),
            "AQL0101: Missing configuration value 'consent_oid'"
        );
        let parse = AqlError::parse(AQL0001, "Unexpected token", "SELECT");
        assert_eq!(PolicyError::from(parse).code(), AQL0001);
    }

    #[test]
    fn test_parameter_error_codes() {
        let error = ParameterError::ListOutsideMatches {
            name: "codes".to_string(),
        };
        assert_eq!(error.code(), AQL0104);
        assert!(error.code().is_rewrite_error());
    }
}
