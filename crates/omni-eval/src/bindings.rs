//! Runtime bindings: the external data conditions are evaluated against.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ConfigError;
use crate::value::Value;

/// Identifier → value mapping supplied by the host for one run.
///
/// Hosts may insert freely before a run. During a run only the mocking
/// resolver adds entries, and only for names that are absent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RuntimeBindings {
    values: BTreeMap<String, Value>,
}

impl RuntimeBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Insert only if `name` is absent. Returns the value now bound.
    pub fn insert_if_absent(&mut self, name: &str, value: Value) -> &Value {
        self.values.entry(name.to_string()).or_insert(value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build bindings from a JSON object.
    ///
    /// Values may be numbers, strings, booleans or arrays of those.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ConfigError> {
        let object = json.as_object().ok_or(ConfigError::NotAnObject)?;
        let mut bindings = Self::new();
        for (name, value) in object {
            bindings.insert(name.clone(), json_to_value(name, value)?);
        }
        Ok(bindings)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(&json)
    }
}

fn json_to_value(name: &str, json: &serde_json::Value) -> Result<Value, ConfigError> {
    use serde_json::Value as Json;
    match json {
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| {
            ConfigError::InvalidBinding {
                name: name.to_string(),
                reason: format!("number {n} is not representable as f64"),
            }
        }),
        Json::Array(items) => items
            .iter()
            .map(|item| json_to_value(name, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Json::Null => Err(ConfigError::InvalidBinding {
            name: name.to_string(),
            reason: "null is not a supported value".into(),
        }),
        Json::Object(_) => Err(ConfigError::InvalidBinding {
            name: name.to_string(),
            reason: "nested objects are not supported".into(),
        }),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RuntimeBindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (k, v) in iter {
            bindings.insert(k, v);
        }
        bindings
    }
}
