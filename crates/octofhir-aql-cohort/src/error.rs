//! Errors for cohort evaluation and export

use crate::client::EngineError;
use octofhir_aql_diagnostics::{
    AQL0200, AQL0201, AQL0202, AQL0300, AQL0301, AQL0401, AQL0402, AqlError, ErrorCode,
};
use octofhir_aql_policy::{ParameterError, PolicyError};
use thiserror::Error;

/// Result type for cohort operations
pub type CohortResult<T> = Result<T, CohortError>;

/// Errors that can occur while evaluating a cohort or exporting its records
#[derive(Debug, Clone, Error)]
pub enum CohortError {
    /// The cohort has no root node
    #[error("{code}: Cohort has no definition", code = AQL0200)]
    EmptyCohort,

    /// A group or NOT combinator received unusable operands
    #[error("{code}: Invalid operands: {message}", code = AQL0201)]
    InvalidOperands { message: String },

    /// Too few subjects matched for records to be disclosed
    #[error("{code}: {hits} subject(s) matched, at least {required} required for export", code = AQL0202)]
    PrivacyThresholdNotMet { hits: usize, required: usize },

    /// The query engine rejected a query
    #[error("{code}: Invalid query{}: {message}", status_suffix(.status), code = AQL0300)]
    InvalidQuery { status: Option<u16>, message: String },

    /// The query engine could not be reached or failed
    #[error("{code}: Query execution failed: {message}", code = AQL0301)]
    QueryExecutionFailed { message: String },

    /// A configuration file could not be read
    #[error("{code}: I/O error: {message}", code = AQL0401)]
    Io { message: String },

    /// A configuration file is invalid
    #[error("{code}: Invalid configuration: {message}", code = AQL0402)]
    Config { message: String },

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Query(#[from] AqlError),
}

impl CohortError {
    /// Create an invalid operands error
    pub fn invalid_operands(message: impl Into<String>) -> Self {
        Self::InvalidOperands {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyCohort => AQL0200,
            Self::InvalidOperands { .. } => AQL0201,
            Self::PrivacyThresholdNotMet { .. } => AQL0202,
            Self::InvalidQuery { .. } => AQL0300,
            Self::QueryExecutionFailed { .. } => AQL0301,
            Self::Io { .. } => AQL0401,
            Self::Config { .. } => AQL0402,
            Self::Policy(e) => e.code(),
            Self::Parameter(e) => e.code(),
            Self::Query(e) => e.code(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|status| format!(" (status {status})")).unwrap_or_default()
}

impl From<EngineError> for CohortError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::MalformedQuery { status, message } => Self::InvalidQuery {
                status: Some(status),
                message,
            },
            EngineError::Transport { message } => Self::QueryExecutionFailed { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_aql_diagnostics::AQL0104;

    #[test]
    fn test_engine_errors_are_distinguished() {
        let malformed = CohortError::from(EngineError::MalformedQuery {
            status: 400,
            message: "unknown alias".to_string(),
        });
        assert_eq!(malformed.code(), AQL0300);
        assert_eq!(
            malformed.to_string(),
            "AQL0300: Invalid query (status 400): unknown alias"
        );

        let transport = CohortError::from(EngineError::Transport {
            message: "connection reset".to_string(),
        });
        assert_eq!(transport.code(), AQL0301);
    }

    #[test]
    fn test_wrapped_codes_pass_through() {
        let error = CohortError::from(ParameterError::ListOutsideMatches {
            name: "codes".to_string(),
        });
        assert_eq!(error.code(), AQL0104);
        assert!(CohortError::EmptyCohort.code().is_evaluation_error());
    }
}
