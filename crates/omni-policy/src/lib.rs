//! OmniLang policy pipeline.
//!
//! ```text
//! Source → Lexer → Parser → Policy → Interpreter (+ fallback, mocking) → RunReport
//! ```
//!
//! [`parse_policy`] and [`run_policy`] are the host-facing entry points.
//! [`lint`] checks a parsed policy for structural problems.

pub mod lint;
mod pipeline;

pub use lint::{lint, Finding, LintReport, Severity};
pub use pipeline::{parse_policy, policy_hash, run_policy, run_policy_json, PipelineError, RunReport};

pub use omni_eval::{Execution, ExecutionMetrics, InterpreterConfig, RuntimeBindings, Value};
pub use omni_types::ast::Policy;
pub use omni_types::OmniError;
