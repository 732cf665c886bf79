//! Mocking resolver: plausible stand-in values for missing identifiers.
//!
//! The lookup table is data, so hosts and tests can substitute their own.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bindings::RuntimeBindings;
use crate::value::Value;

/// How a [`MockRule`] keyword is compared against the lowercase identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordMatch {
    #[default]
    Substring,
    Prefix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockRule {
    /// Lowercase keyword.
    pub keyword: String,
    pub value: f64,
    #[serde(default)]
    pub matching: KeywordMatch,
}

impl MockRule {
    pub fn substring(keyword: &str, value: f64) -> Self {
        Self {
            keyword: keyword.to_string(),
            value,
            matching: KeywordMatch::Substring,
        }
    }

    pub fn prefix(keyword: &str, value: f64) -> Self {
        Self {
            keyword: keyword.to_string(),
            value,
            matching: KeywordMatch::Prefix,
        }
    }

    fn matches(&self, lower: &str) -> bool {
        match self.matching {
            KeywordMatch::Substring => lower.contains(&self.keyword),
            KeywordMatch::Prefix => lower.starts_with(&self.keyword),
        }
    }
}

/// Ordered keyword rules; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockTable {
    pub rules: Vec<MockRule>,
    /// Value used when no rule matches.
    pub default_value: f64,
}

impl Default for MockTable {
    fn default() -> Self {
        Self {
            rules: vec![
                MockRule::substring("level", 45.0),
                MockRule::substring("capacity", 45.0),
                MockRule::substring("detected", 1.0),
                MockRule::substring("status", 1.0),
                // Prefix only, so `distance` and `precision` reach their own rules.
                MockRule::prefix("is", 1.0),
                MockRule::substring("score", 0.75),
                MockRule::substring("probability", 0.75),
                MockRule::substring("distance", 10.0),
                MockRule::substring("temp", 25.0),
            ],
            default_value: 1.0,
        }
    }
}

impl MockTable {
    /// A table with no rules that always yields `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            rules: Vec::new(),
            default_value: value,
        }
    }

    /// The stand-in value for `identifier`.
    pub fn value_for(&self, identifier: &str) -> f64 {
        let lower = identifier.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map_or(self.default_value, |rule| rule.value)
    }

    /// Resolve `identifier`, synthesizing and recording a value if absent.
    ///
    /// An existing binding is returned unchanged. Otherwise the mocked value
    /// is written into `bindings`, so later lookups in the same run see the
    /// same value, and a [`MockingNotice`] is returned.
    pub fn resolve(
        &self,
        identifier: &str,
        bindings: &mut RuntimeBindings,
    ) -> (Value, Option<MockingNotice>) {
        if let Some(existing) = bindings.get(identifier) {
            return (existing.clone(), None);
        }
        let value = self.value_for(identifier);
        bindings.insert_if_absent(identifier, Value::Number(value));
        let notice = MockingNotice {
            identifier: identifier.to_string(),
            value,
        };
        warn!(identifier, value, "mocked missing runtime value");
        (Value::Number(value), Some(notice))
    }
}

/// Informational record of one synthesized value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockingNotice {
    pub identifier: String,
    pub value: f64,
}

impl fmt::Display for MockingNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mocked missing value: {} = {}",
            self.identifier,
            Value::Number(self.value)
        )
    }
}
