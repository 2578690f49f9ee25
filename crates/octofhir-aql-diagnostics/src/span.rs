//! Source span and location tracking for AQL parsing

use serde::{Deserialize, Serialize};
use std::fmt;

/// A span in the query text, represented as a byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span from start and end offsets
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Get the length of the span in bytes
    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Source location with line and column information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Byte offset from start (0-based)
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
}

impl SourceLocation {
    /// Create from a span and the query text
    pub fn from_span(span: Span, source: &str) -> Self {
        let (line, column) = offset_to_line_col(source, span.start);
        Self {
            line,
            column,
            offset: span.start,
            length: span.len(),
        }
    }

    /// Get the span for this location
    pub const fn span(&self) -> Span {
        Span::new(self.offset, self.offset + self.length)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Convert a byte offset to line and column numbers
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_line_col() {
        let source = "SELECT e\nFROM EHR e\nWHERE";
        assert_eq!(offset_to_line_col(source, 0), (1, 1));
        assert_eq!(offset_to_line_col(source, 7), (1, 8));
        assert_eq!(offset_to_line_col(source, 9), (2, 1));
        assert_eq!(offset_to_line_col(source, 20), (3, 1));
    }

    #[test]
    fn test_location_from_span() {
        let source = "SELECT x\nFROM ]";
        let loc = SourceLocation::from_span(Span::new(14, 15), source);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 6);
        assert_eq!(loc.span(), Span::new(14, 15));
        assert_eq!(loc.to_string(), "2:6");
    }
}
