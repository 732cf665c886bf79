use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Lexical,
    Structure,
    Evaluation,
}

/// Numeric diagnostic code (E100–E399).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical errors (E100–E199) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);

    // ── Structure errors (E200–E299) ──
    pub const UNEXPECTED_TOKEN: Self = Self(200);
    pub const MISSING_THEN: Self = Self(201);
    pub const UNCLOSED_BODY: Self = Self(202);
    pub const INVALID_RULE_START: Self = Self(203);

    // ── Evaluation errors (E300–E399) ──
    pub const MALFORMED_EXPRESSION: Self = Self(300);
    pub const UNDEFINED_NAME: Self = Self(301);
    pub const NON_EXHAUSTIVE_MATCH: Self = Self(302);
    pub const TYPE_MISMATCH: Self = Self(303);
    pub const EVALUATION_LIMIT: Self = Self(304);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Lexical,
            200..=299 => ErrorCategory::Structure,
            _ => ErrorCategory::Evaluation,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Structure => write!(f, "structure"),
            Self::Evaluation => write!(f, "evaluation"),
        }
    }
}

/// No token pattern matched at a non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{line}:{column}: {code} unexpected character '{character}'")]
pub struct LexError {
    pub code: ErrorCode,
    pub line: u32,
    pub column: u32,
    pub character: char,
}

impl LexError {
    pub fn new(code: ErrorCode, line: u32, column: u32, character: char) -> Self {
        Self {
            code,
            line,
            column,
            character,
        }
    }
}

/// Structural grammar violation in a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("line {line}: {code} expected {expected}, found {found}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub expected: String,
    pub found: String,
    pub line: u32,
}

impl ParseError {
    pub fn new(
        code: ErrorCode,
        expected: impl Into<String>,
        found: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            code,
            expected: expected.into(),
            found: found.into(),
            line,
        }
    }
}

/// Any failure that aborts parsing of one document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OmniError {
    #[error("lex error at {0}")]
    Lex(#[from] LexError),
    #[error("parse error at {0}")]
    Parse(#[from] ParseError),
}

impl OmniError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Lex(e) => e.code,
            Self::Parse(e) => e.code,
        }
    }

    /// 1-based line the error was reported on.
    pub fn line(&self) -> u32 {
        match self {
            Self::Lex(e) => e.line,
            Self::Parse(e) => e.line,
        }
    }
}
