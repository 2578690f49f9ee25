//! AQL error codes following a structured numbering system
//!
//! Error code ranges:
//! - AQL0001-AQL0099: Parse errors (syntax)
//! - AQL0100-AQL0199: Rewrite errors (policies, parameters, rendering)
//! - AQL0200-AQL0299: Cohort evaluation errors
//! - AQL0300-AQL0399: Query engine errors
//! - AQL0400-AQL0499: System errors (I/O, configuration)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Check if this is a parse error (0001-0099)
    pub const fn is_parse_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a rewrite error (0100-0199)
    pub const fn is_rewrite_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a cohort evaluation error (0200-0299)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a query engine error (0300-0399)
    pub const fn is_engine_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AQL{:04}", self.0)
    }
}

// Parse errors
pub const AQL0001: ErrorCode = ErrorCode::new(1);
pub const AQL0002: ErrorCode = ErrorCode::new(2);
pub const AQL0003: ErrorCode = ErrorCode::new(3);
pub const AQL0005: ErrorCode = ErrorCode::new(5);
pub const AQL0006: ErrorCode = ErrorCode::new(6);
pub const AQL0007: ErrorCode = ErrorCode::new(7);
pub const AQL0008: ErrorCode = ErrorCode::new(8);
pub const AQL0009: ErrorCode = ErrorCode::new(9);
pub const AQL0010: ErrorCode = ErrorCode::new(10);
pub const AQL0011: ErrorCode = ErrorCode::new(11);
pub const AQL0012: ErrorCode = ErrorCode::new(12);
pub const AQL0013: ErrorCode = ErrorCode::new(13);

// Rewrite errors
pub const AQL0100: ErrorCode = ErrorCode::new(100);
pub const AQL0101: ErrorCode = ErrorCode::new(101);
pub const AQL0102: ErrorCode = ErrorCode::new(102);
pub const AQL0103: ErrorCode = ErrorCode::new(103);
pub const AQL0104: ErrorCode = ErrorCode::new(104);
pub const AQL0105: ErrorCode = ErrorCode::new(105);

// Cohort evaluation errors
pub const AQL0200: ErrorCode = ErrorCode::new(200);
pub const AQL0201: ErrorCode = ErrorCode::new(201);
pub const AQL0202: ErrorCode = ErrorCode::new(202);

// Query engine errors
pub const AQL0300: ErrorCode = ErrorCode::new(300);
pub const AQL0301: ErrorCode = ErrorCode::new(301);

// System errors
pub const AQL0401: ErrorCode = ErrorCode::new(401);
pub const AQL0402: ErrorCode = ErrorCode::new(402);
