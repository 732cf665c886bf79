//! Scoped local environment for the evaluator.
//!
//! Holds lambda parameters only. Runtime bindings and built-ins are
//! resolved by the evaluator after the local scopes.

use crate::value::Value;
use std::collections::BTreeMap;

/// A single scope level.
#[derive(Debug, Clone, Default)]
struct Scope {
    bindings: BTreeMap<String, Value>,
}

/// Scoped variable environment.
///
/// Variables are looked up from innermost scope outward.
/// `define` always creates in the current (innermost) scope. A lambda call
/// runs in a clone of its captured environment plus one pushed scope, so
/// scopes are discarded with that clone instead of being popped.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    /// Create a new environment with one empty scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// Push a new scope (for a lambda call).
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Define a variable in the current (innermost) scope.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.to_string(), value);
        }
    }

    /// Look up a variable, searching from innermost to outermost scope.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
