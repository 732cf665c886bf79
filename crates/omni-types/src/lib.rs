//! Shared types for the OmniLang policy toolchain.
//!
//! This crate defines the policy AST, source spans and the lexical and
//! structural error types used across all pipeline stages.

mod error;
mod span;
pub mod ast;

pub use error::{ErrorCategory, ErrorCode, LexError, OmniError, ParseError};
pub use span::Span;

/// Result type used by the lexer and the document parser.
pub type Result<T> = std::result::Result<T, OmniError>;
