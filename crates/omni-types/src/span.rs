use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position of a token.
///
/// Line and column are 1-based for human-readable error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    #[serde(rename = "column")]
    pub col: u32,
}

impl Span {
    /// Create a span at a single position.
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// The first position of a document.
    pub fn start() -> Self {
        Self::new(1, 1)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(3, 14).to_string(), "3:14");
    }

    #[test]
    fn test_span_default_is_document_start() {
        let s = Span::default();
        assert_eq!(s.line, 1);
        assert_eq!(s.col, 1);
    }

    #[test]
    fn test_span_json_uses_column() {
        let json = serde_json::to_string(&Span::new(2, 5)).unwrap();
        assert_eq!(json, r#"{"line":2,"column":5}"#);
    }
}
