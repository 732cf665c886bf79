//! Policy linter: structural checks over a parsed [`Policy`].
//!
//! Findings are advisory. A policy with lint errors still runs.

use std::fmt;

use omni_eval::{parse_expression, FallbackEvaluator};
use omni_types::ast::{LoopRule, Policy, Rule, RuleNode};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Lint rule id, e.g. `required-sections`.
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    fn new(rule: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            message: message.into(),
            suggestion: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.rule, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub findings: Vec<Finding>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// Findings produced by one lint rule.
    pub fn by_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.rule == rule)
    }
}

/// Run every lint rule over `policy`.
pub fn lint(policy: &Policy) -> LintReport {
    let mut findings = Vec::new();
    required_sections(policy, &mut findings);
    primary_actor(policy, &mut findings);
    walk_rules(&policy.rules, &mut findings);
    empty_constraints(policy, &mut findings);
    LintReport { findings }
}

fn required_sections(policy: &Policy, out: &mut Vec<Finding>) {
    if policy.intent.is_none() {
        out.push(
            Finding::new("required-sections", Severity::Error, "policy has no INTENT")
                .with_suggestion("add 'INTENT: <one line describing the goal>'"),
        );
    }
    if policy.actors.is_empty() {
        out.push(
            Finding::new("required-sections", Severity::Error, "policy has no ACTOR")
                .with_suggestion("add an ACTOR section with a '- Primary: <role>' entry"),
        );
    }
    if policy.rules.is_empty() {
        out.push(Finding::new(
            "required-sections",
            Severity::Warning,
            "policy has no RULE entries; running it triggers nothing",
        ));
    }
}

fn primary_actor(policy: &Policy, out: &mut Vec<Finding>) {
    let primaries: Vec<&str> = policy
        .actors
        .iter()
        .filter(|a| a.is_primary)
        .map(|a| a.role.as_str())
        .collect();
    if primaries.len() > 1 {
        out.push(
            Finding::new(
                "primary-actor",
                Severity::Warning,
                format!("{} primary actors: {}", primaries.len(), primaries.join(", ")),
            )
            .with_suggestion("mark all but one as 'Secondary'"),
        );
    }
}

fn walk_rules(nodes: &[RuleNode], out: &mut Vec<Finding>) {
    for node in nodes {
        match node {
            RuleNode::Rule(rule) => condition_syntax(rule, out),
            RuleNode::Loop(lp) => {
                loop_simulation(lp, out);
                walk_rules(&lp.body, out);
            }
        }
    }
}

fn loop_simulation(lp: &LoopRule, out: &mut Vec<Finding>) {
    out.push(Finding::new(
        "loop-simulation",
        Severity::Info,
        format!(
            "'{}' is simulated: its body runs a fixed number of times and the header is not evaluated",
            lp.header()
        ),
    ));
}

fn condition_syntax(rule: &Rule, out: &mut Vec<Finding>) {
    if parse_expression(&rule.condition).is_ok() || FallbackEvaluator::parses(&rule.condition) {
        return;
    }
    out.push(
        Finding::new(
            "condition-syntax",
            Severity::Warning,
            format!(
                "condition '{}' is not a valid expression; it always evaluates to false",
                rule.condition
            ),
        )
        .with_suggestion("use '<name> <operator> <value>' or a full expression"),
    );
}

fn empty_constraints(policy: &Policy, out: &mut Vec<Finding>) {
    if policy.constraints.is_empty() {
        out.push(Finding::new(
            "empty-constraints",
            Severity::Info,
            "policy declares no CONSTRAINT entries",
        ));
    }
}
