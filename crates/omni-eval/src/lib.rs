//! OmniLang evaluator.
//!
//! Evaluates RULE condition text against runtime bindings and walks a parsed
//! [`Policy`](omni_types::ast::Policy) to collect triggered actions.
//!
//! Conditions are first evaluated with the full expression grammar
//! (arithmetic, comparisons, `match`, lambdas and higher-order built-ins).
//! Simple conditions that fail there are retried with the fallback grammar,
//! which synthesizes values for missing identifiers from a mock table.

pub mod bindings;
pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod fallback;
pub mod interpreter;
pub mod mock;
mod parse_expr;
pub mod value;

pub use bindings::RuntimeBindings;
pub use config::InterpreterConfig;
pub use error::{ConfigError, EvalError, EvalResult};
pub use evaluator::{evaluate, Evaluator, DEFAULT_GAS_LIMIT};
pub use expr::Expr;
pub use fallback::{FallbackEvaluator, FallbackOutcome, TruthWords};
pub use interpreter::{Execution, ExecutionMetrics, Interpreter};
pub use mock::{MockTable, MockingNotice};
pub use parse_expr::parse_expression;
pub use value::Value;
