//! Source text → tokens → [`Policy`] → [`Execution`].

use omni_eval::{ConfigError, Execution, Interpreter, InterpreterConfig, RuntimeBindings};
use omni_types::ast::Policy;
use omni_types::OmniError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Tokenize and parse one document.
pub fn parse_policy(source: &str) -> Result<Policy, OmniError> {
    let tokens = omni_lexer::tokenize(source)?;
    let policy = omni_parser::parse(tokens)?;
    tracing::debug!(
        actors = policy.actors.len(),
        rules = policy.rules.len(),
        "policy parsed"
    );
    Ok(policy)
}

/// Parse `source` and run its rules against `bindings`.
///
/// Lex and parse failures abort the run. Condition failures never do; they
/// show up in the execution diagnostics instead.
pub fn run_policy(
    source: &str,
    bindings: RuntimeBindings,
    config: &InterpreterConfig,
) -> Result<RunReport, OmniError> {
    let policy = match parse_policy(source) {
        Ok(policy) => policy,
        Err(err) => {
            tracing::warn!(code = %err.code(), line = err.line(), "policy rejected");
            return Err(err);
        }
    };
    let mut bindings = bindings;
    let execution = Interpreter::new(config.clone()).execute(&policy, &mut bindings);
    Ok(RunReport {
        policy_hash: policy_hash(source),
        policy,
        execution,
        bindings,
    })
}

/// [`run_policy`] with bindings and configuration given as JSON text.
///
/// An empty `config_json` selects the default configuration.
pub fn run_policy_json(
    source: &str,
    bindings_json: &str,
    config_json: &str,
) -> Result<RunReport, PipelineError> {
    let bindings = RuntimeBindings::from_json_str(bindings_json)?;
    let config = if config_json.trim().is_empty() {
        InterpreterConfig::default()
    } else {
        InterpreterConfig::from_json_str(config_json)?
    };
    Ok(run_policy(source, bindings, &config)?)
}

/// Lowercase hex SHA-256 of the source text.
pub fn policy_hash(source: &str) -> String {
    Sha256::digest(source.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Everything one run produced, ready for audit output.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub policy_hash: String,
    pub policy: Policy,
    pub execution: Execution,
    /// Bindings after the run, including mocked values.
    pub bindings: RuntimeBindings,
}

impl RunReport {
    pub fn actions(&self) -> &[String] {
        &self.execution.actions
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Failure of [`run_policy_json`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Document(#[from] OmniError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
