//! Interpreter configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::evaluator::DEFAULT_GAS_LIMIT;
use crate::fallback::TruthWords;
use crate::mock::MockTable;

/// Default number of times a FOR/WHILE body is run.
pub const DEFAULT_LOOP_ITERATIONS: u32 = 2;

/// Tunables for one [`Interpreter`](crate::Interpreter).
///
/// Every field has a default, so a JSON document only needs the keys it
/// overrides:
///
/// ```ignore
/// let config = InterpreterConfig::from_json_str(r#"{"loop_iterations": 3}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Simulated iteration count for loop bodies.
    pub loop_iterations: u32,
    /// Evaluation step budget per condition.
    pub gas_limit: u64,
    pub mock_table: MockTable,
    pub truth_words: TruthWords,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            loop_iterations: DEFAULT_LOOP_ITERATIONS,
            gas_limit: DEFAULT_GAS_LIMIT,
            mock_table: MockTable::default(),
            truth_words: TruthWords::default(),
        }
    }
}

impl InterpreterConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_mock_table(mut self, mock_table: MockTable) -> Self {
        self.mock_table = mock_table;
        self
    }

    pub fn with_loop_iterations(mut self, loop_iterations: u32) -> Self {
        self.loop_iterations = loop_iterations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InterpreterConfig::default();
        assert_eq!(config.loop_iterations, 2);
        assert_eq!(config.gas_limit, 10_000);
        assert_eq!(config.mock_table.default_value, 1.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = InterpreterConfig::from_json_str(
            r#"{"loop_iterations": 3, "mock_table": {"rules": [{"keyword": "temp", "value": 99}], "default_value": 0}}"#,
        )
        .unwrap();
        assert_eq!(config.loop_iterations, 3);
        assert_eq!(config.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(config.mock_table.value_for("CoreTemp"), 99.0);
        assert_eq!(config.mock_table.value_for("Level"), 0.0);
        assert_eq!(config.truth_words, TruthWords::default());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            InterpreterConfig::from_json_str("{\"gas_limit\": -1}"),
            Err(ConfigError::Json(_))
        ));
    }
}
