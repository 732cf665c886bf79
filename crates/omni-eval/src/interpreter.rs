//! Rule interpreter: walks a policy's rule tree and collects triggered actions.
//!
//! Traversal is depth-first, pre-order. Each leaf condition is evaluated
//! with the full expression grammar first; simple conditions that fail there
//! are retried with the fallback grammar. A condition that produces no
//! boolean counts as false, so one bad rule never stops the run.

use omni_types::ast::{LoopRule, Policy, Rule, RuleNode};
use serde::Serialize;

use crate::bindings::RuntimeBindings;
use crate::config::InterpreterConfig;
use crate::evaluator::Evaluator;
use crate::fallback::FallbackEvaluator;
use crate::parse_expr::parse_expression;

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionMetrics {
    pub rules_evaluated: usize,
    pub actions_triggered: usize,
    pub loop_iterations: usize,
    pub fallback_evaluations: usize,
    pub mocked_identifiers: usize,
}

/// Output of [`Interpreter::execute`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Execution {
    /// Triggered action text, in traversal order.
    pub actions: Vec<String>,
    /// Human-readable trace lines.
    pub diagnostics: Vec<String>,
    pub metrics: ExecutionMetrics,
}

impl Execution {
    pub fn triggered(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }
}

/// How a condition was decided.
enum Verdict {
    Full(bool),
    Fallback(bool),
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Run every rule of `policy` against `bindings`.
    ///
    /// `bindings` only grows: mocked values for missing identifiers are
    /// added, existing entries are never replaced.
    pub fn execute(&self, policy: &Policy, bindings: &mut RuntimeBindings) -> Execution {
        tracing::info!(
            rules = policy.rules.len(),
            bindings = bindings.len(),
            "policy run started"
        );
        let mut run = Run {
            interpreter: self,
            bindings,
            out: Execution::default(),
        };
        if let Some(intent) = &policy.intent {
            run.out.diagnostics.push(format!("intent: {intent}"));
        }
        run.walk(&policy.rules, 0);

        let out = run.out;
        tracing::info!(
            actions = out.metrics.actions_triggered,
            rules = out.metrics.rules_evaluated,
            fallbacks = out.metrics.fallback_evaluations,
            "policy run finished"
        );
        out
    }

    /// Decide one condition, mocking through `bindings` when it falls back.
    pub fn evaluate_condition(&self, condition: &str, bindings: &mut RuntimeBindings) -> bool {
        let mut run = Run {
            interpreter: self,
            bindings,
            out: Execution::default(),
        };
        run.decide(condition, 0)
    }
}

/// Mutable state of one [`Interpreter::execute`] call.
struct Run<'i, 'b> {
    interpreter: &'i Interpreter,
    bindings: &'b mut RuntimeBindings,
    out: Execution,
}

impl<'i> Run<'i, '_> {
    fn walk(&mut self, nodes: &[RuleNode], depth: usize) {
        for node in nodes {
            match node {
                RuleNode::Rule(rule) => self.run_rule(rule, depth),
                RuleNode::Loop(lp) => self.run_loop(lp, depth),
            }
        }
    }

    fn trace(&mut self, depth: usize, line: String) {
        self.out
            .diagnostics
            .push(format!("{}{line}", "  ".repeat(depth)));
    }

    fn run_rule(&mut self, rule: &Rule, depth: usize) {
        self.out.metrics.rules_evaluated += 1;
        let fired = self.decide(&rule.condition, depth);
        tracing::debug!(condition = %rule.condition, action = %rule.action, fired, "rule evaluated");
        if fired {
            self.trace(depth, format!("IF {} -> {}", rule.condition, rule.action));
            self.out.actions.push(rule.action.clone());
            self.out.metrics.actions_triggered += 1;
        } else {
            self.trace(depth, format!("IF {} -> not triggered", rule.condition));
        }
    }

    /// Loop bodies run a fixed number of times; the header is not evaluated.
    fn run_loop(&mut self, lp: &LoopRule, depth: usize) {
        let iterations = self.interpreter.config.loop_iterations;
        self.trace(
            depth,
            format!("{} (simulating {iterations} iterations)", lp.header()),
        );
        for i in 1..=iterations {
            self.out.metrics.loop_iterations += 1;
            self.trace(depth + 1, format!("iteration {i}/{iterations}"));
            self.walk(&lp.body, depth + 1);
        }
    }

    fn decide(&mut self, condition: &str, depth: usize) -> bool {
        match self.verdict(condition, depth) {
            Verdict::Full(b) | Verdict::Fallback(b) => b,
            Verdict::Failed => {
                self.trace(
                    depth,
                    format!("condition '{condition}' could not be evaluated; treated as false"),
                );
                false
            }
        }
    }

    fn verdict(&mut self, condition: &str, depth: usize) -> Verdict {
        let interpreter: &'i Interpreter = self.interpreter;
        let config = &interpreter.config;
        let full_error = match parse_expression(condition) {
            Ok(expr) => {
                let result = Evaluator::new(&*self.bindings, config.gas_limit).eval_expr(&expr);
                match result {
                    Ok(value) => return Verdict::Full(value.is_truthy()),
                    // Match, lambda and call syntax is never mocked.
                    Err(err) if expr.uses_advanced_syntax() => {
                        tracing::warn!(condition, error = %err, "condition failed");
                        self.trace(
                            depth,
                            format!("condition '{condition}' failed: {err} [{}]", err.code()),
                        );
                        return Verdict::Failed;
                    }
                    Err(err) => err,
                }
            }
            Err(err) => err,
        };

        tracing::warn!(condition, error = %full_error, "downgrading condition to fallback grammar");
        self.trace(
            depth,
            format!("condition '{condition}' downgraded to fallback: {full_error}"),
        );
        self.out.metrics.fallback_evaluations += 1;

        let fallback = FallbackEvaluator::new(&config.mock_table, &config.truth_words);
        let outcome = fallback.evaluate(condition, &mut *self.bindings);
        for notice in &outcome.notices {
            self.out.metrics.mocked_identifiers += 1;
            self.trace(depth, notice.to_string());
        }
        match outcome.value {
            Some(b) => Verdict::Fallback(b),
            None => Verdict::Failed,
        }
    }
}
