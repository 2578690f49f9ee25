//! AQL error types

use crate::{ErrorCode, SourceLocation, Span};
use thiserror::Error;

/// Main AQL error type
#[derive(Debug, Clone, Error)]
pub enum AqlError {
    /// Query text could not be parsed
    #[error("{code}: {message}")]
    Parse {
        code: ErrorCode,
        message: String,
        query: String,
        location: Option<SourceLocation>,
    },

    /// Query value could not be rendered back to text
    #[error("{code}: {message}")]
    Render { code: ErrorCode, message: String },
}

impl AqlError {
    /// Create a parse error
    pub fn parse(code: ErrorCode, message: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            query: query.into(),
            location: None,
        }
    }

    /// Create a parse error pointing at a span of the query text
    pub fn parse_at(
        code: ErrorCode,
        message: impl Into<String>,
        query: impl Into<String>,
        span: Span,
    ) -> Self {
        let query = query.into();
        let location = SourceLocation::from_span(span, &query);
        Self::Parse {
            code,
            message: message.into(),
            query,
            location: Some(location),
        }
    }

    /// Create a render error
    pub fn render(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Render {
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { code, .. } => *code,
            Self::Render { code, .. } => *code,
        }
    }

    /// Get the location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Parse { location, .. } => location.as_ref(),
            Self::Render { .. } => None,
        }
    }
}
