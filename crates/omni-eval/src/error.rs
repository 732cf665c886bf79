//! Error types for condition evaluation and interpreter setup.

use omni_types::{ErrorCode, LexError};
use thiserror::Error;

/// Evaluation error: malformed syntax, unknown names, runtime traps.
///
/// These never abort a policy run. The interpreter catches them per
/// condition and either downgrades to the fallback grammar or treats the
/// condition as false.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Condition text does not follow the expression grammar.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// Name is neither a local, a runtime binding nor a built-in.
    #[error("undefined name: {0}")]
    UndefinedName(String),
    /// No clause matched and there is no `_` clause.
    #[error("non-exhaustive match: no clause matches {0}")]
    NonExhaustiveMatch(String),
    /// More than one `_` clause in a match.
    #[error("match has more than one wildcard clause")]
    DuplicateWildcard,
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// Division or modulo by zero, non-finite results.
    #[error("arithmetic trap: {0}")]
    ArithmeticTrap(String),
    /// `reduce` over an empty list without an initial value.
    #[error("reduce of empty list with no initial value")]
    EmptyReduce,
    #[error("{name} expects {expected} argument(s), got {found}")]
    WrongArgCount {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("value is not callable: {0}")]
    NotCallable(String),
    /// Step or call-depth budget exhausted.
    #[error("gas exhausted")]
    GasExhausted,
}

impl EvalError {
    /// Diagnostic code in the evaluation range (E300–E399).
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Syntax(_) | Self::DuplicateWildcard => ErrorCode::MALFORMED_EXPRESSION,
            Self::UndefinedName(_) => ErrorCode::UNDEFINED_NAME,
            Self::NonExhaustiveMatch(_) => ErrorCode::NON_EXHAUSTIVE_MATCH,
            Self::TypeMismatch(_)
            | Self::ArithmeticTrap(_)
            | Self::EmptyReduce
            | Self::WrongArgCount { .. }
            | Self::NotCallable(_) => ErrorCode::TYPE_MISMATCH,
            Self::GasExhausted => ErrorCode::EVALUATION_LIMIT,
        }
    }
}

impl From<LexError> for EvalError {
    fn from(err: LexError) -> Self {
        Self::Syntax(err.to_string())
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Invalid interpreter configuration or runtime bindings input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("runtime bindings must be a JSON object")]
    NotAnObject,
    #[error("binding '{name}': {reason}")]
    InvalidBinding { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            EvalError::NonExhaustiveMatch("\"x\"".into()).code(),
            ErrorCode::NON_EXHAUSTIVE_MATCH
        );
        assert_eq!(EvalError::GasExhausted.code().to_string(), "E304");
        assert_eq!(EvalError::EmptyReduce.code(), ErrorCode::TYPE_MISMATCH);
    }

    #[test]
    fn test_display() {
        let err = EvalError::WrongArgCount {
            name: "map".into(),
            expected: "2".into(),
            found: 1,
        };
        assert_eq!(err.to_string(), "map expects 2 argument(s), got 1");
    }

    #[test]
    fn test_from_lex_error() {
        let lex = LexError::new(ErrorCode::UNEXPECTED_CHARACTER, 1, 3, '@');
        let err: EvalError = lex.into();
        assert!(matches!(err, EvalError::Syntax(msg) if msg.contains('@')));
    }
}
