//! Literal AST nodes for AQL

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A literal value in AQL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Null literal
    Null,
    /// Boolean literal (true/false)
    Boolean(bool),
    /// Integer literal (64-bit signed)
    Integer(i64),
    /// Decimal literal (arbitrary precision)
    Decimal(Decimal),
    /// String literal
    String(String),
}

impl Literal {
    /// Create a string literal
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Get the string value if this is a string literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Quote a string using AQL single-quote literal syntax
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            '\u{8}' => quoted.push_str("\\b"),
            '\u{c}' => quoted.push_str("\\f"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_string_escapes() {
        assert_eq!(quote_string("x"), "'x'");
        assert_eq!(quote_string("O'Brien"), r"'O\'Brien'");
        assert_eq!(quote_string(r"a\b"), r"'a\\b'");
        assert_eq!(quote_string("line\nbreak\ttab"), r"'line\nbreak\ttab'");
        assert_eq!(quote_string("bell\u{7}"), r"'bell\u0007'");
        assert_eq!(quote_string("caf\u{e9}"), "'caf\u{e9}'");
    }
}
