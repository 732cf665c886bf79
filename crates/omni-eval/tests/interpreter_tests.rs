//! Rule interpreter tests over whole documents: triggered actions, the
//! fallback grammar, mocking, loop simulation and diagnostics.

use omni_eval::mock::MockRule;
use omni_eval::{Execution, Interpreter, InterpreterConfig, MockTable, RuntimeBindings, Value};
use omni_lexer::tokenize;
use omni_parser::parse;
use omni_types::ast::Policy;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn policy(source: &str) -> Policy {
    let tokens = tokenize(source).expect("lex should succeed");
    parse(tokens).unwrap_or_else(|e| panic!("parse failed: {e}"))
}

fn run(source: &str, bindings: &mut RuntimeBindings) -> Execution {
    Interpreter::default().execute(&policy(source), bindings)
}

fn rules(lines: &[&str]) -> String {
    let mut source = String::from("INTENT: Test\nRULE:\n");
    for line in lines {
        source.push_str("- ");
        source.push_str(line);
        source.push('\n');
    }
    source
}

fn has_action_containing(out: &Execution, needle: &str) -> bool {
    out.actions.iter().any(|a| a.contains(needle))
}

const FACTORY: &str = include_str!("../../omni-parser/tests/corpus/factory_safety.omni");

// ══════════════════════════════════════════════════════════════════════════════
// Leaf rules
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_threshold_rule() {
    let source = rules(&["IF Temperature > 50 THEN ActivateCooling"]);

    let mut hot = RuntimeBindings::new().with("Temperature", 55.0);
    assert!(run(&source, &mut hot).triggered("ActivateCooling"));

    let mut cool = RuntimeBindings::new().with("Temperature", 40.0);
    assert!(!run(&source, &mut cool).triggered("ActivateCooling"));
}

#[test]
fn test_match_condition_triggers() {
    let source = rules(&["IF match Status { \"Ready\" => true, _ => false } THEN Display \"ok\""]);
    let mut bindings = RuntimeBindings::new().with("Status", "Ready");
    let out = run(&source, &mut bindings);
    assert!(has_action_containing(&out, "ok"));
    assert_eq!(out.metrics.fallback_evaluations, 0);
}

#[test]
fn test_higher_order_condition_triggers() {
    let source = rules(&["IF reduce(map([1,2,3], |x| x*2), |acc,x| acc+x, 0) == 12 THEN Display \"hof\""]);
    let out = run(&source, &mut RuntimeBindings::new());
    assert!(has_action_containing(&out, "hof"));
}

#[test]
fn test_actions_follow_traversal_order() {
    let source = rules(&[
        "IF A > 0 THEN first",
        "FOR x IN xs { - IF B > 0 THEN second }",
        "IF C > 0 THEN third",
    ]);
    let mut bindings = RuntimeBindings::new()
        .with("A", 1.0)
        .with("B", 1.0)
        .with("C", 1.0);
    let out = run(&source, &mut bindings);
    assert_eq!(out.actions, vec!["first", "second", "second", "third"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Fallback and mocking
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_identifier_is_mocked_once() {
    let source = rules(&[
        "IF WaterLevel > 40 THEN Open spillway",
        "IF WaterLevel > 50 THEN Evacuate",
    ]);
    let mut bindings = RuntimeBindings::new();
    let out = run(&source, &mut bindings);

    assert_eq!(out.actions, vec!["Open spillway"]);
    assert_eq!(bindings.get("WaterLevel"), Some(&Value::Number(45.0)));
    // The second rule sees the mocked binding and needs no fallback.
    assert_eq!(out.metrics.fallback_evaluations, 1);
    assert_eq!(out.metrics.mocked_identifiers, 1);
    assert_eq!(
        out.diagnostics
            .iter()
            .filter(|d| d.contains("mocked missing value: WaterLevel = 45"))
            .count(),
        1
    );
}

#[test]
fn test_existing_bindings_are_never_overwritten() {
    let source = rules(&["IF RiskScore > 0.5 OR Unknown > 0 THEN Escalate"]);
    let mut bindings = RuntimeBindings::new().with("RiskScore", 0.2);
    let out = run(&source, &mut bindings);
    assert!(out.triggered("Escalate"));
    assert_eq!(bindings.get("RiskScore"), Some(&Value::Number(0.2)));
    assert_eq!(bindings.get("Unknown"), Some(&Value::Number(1.0)));
}

#[test]
fn test_truth_words_in_fallback() {
    let source = rules(&["IF GateStatus == Ready THEN Open gate"]);
    let mut bindings = RuntimeBindings::new();
    assert!(run(&source, &mut bindings).triggered("Open gate"));
}

#[test]
fn test_advanced_syntax_is_not_mocked() {
    let source = rules(&[
        "IF match Mode { \"auto\" => true, _ => false } THEN Engage",
        "IF sum(Readings) > 3 THEN Alarm",
    ]);
    let mut bindings = RuntimeBindings::new();
    let out = run(&source, &mut bindings);
    assert!(out.actions.is_empty());
    assert!(bindings.is_empty());
    assert_eq!(out.metrics.fallback_evaluations, 0);
    assert!(out.diagnostics.iter().any(|d| d.contains("undefined name: Mode")));
}

#[test]
fn test_non_exhaustive_match_counts_as_false() {
    let source = rules(&[
        "IF match Status { \"Ready\" => true } THEN Never",
        "IF 1 == 1 THEN Always",
    ]);
    let mut bindings = RuntimeBindings::new().with("Status", "Offline");
    let out = run(&source, &mut bindings);
    assert_eq!(out.actions, vec!["Always"]);
    assert!(out.diagnostics.iter().any(|d| d.contains("E302")));
}

#[test]
fn test_deeply_nested_condition_counts_as_false() {
    let long_sum = vec!["1"; 10_000].join(" + ");
    let negations = format!("{}true", "not ".repeat(1000));
    let source = rules(&[
        &format!("IF {long_sum} > 0 THEN Never"),
        &format!("IF {negations} THEN Never"),
        "IF 1 == 1 THEN Always",
    ]);
    let out = run(&source, &mut RuntimeBindings::new());
    assert_eq!(out.actions, vec!["Always"]);
    assert_eq!(out.metrics.rules_evaluated, 3);
    assert!(out.diagnostics.iter().any(|d| d.contains("nesting deeper than")));
}

#[test]
fn test_negative_literal_with_mocked_value() {
    let source = rules(&["IF x > -5 THEN Hit"]);
    let mut bindings = RuntimeBindings::new();
    let out = run(&source, &mut bindings);
    assert_eq!(out.actions, vec!["Hit"]);
    assert_eq!(bindings.get("x"), Some(&Value::Number(1.0)));

    let mut cold = RuntimeBindings::new().with("x", -9.0);
    assert!(!run(&source, &mut cold).triggered("Hit"));
}

#[test]
fn test_membership_is_always_true() {
    let source = rules(&["IF Zone in RestrictedZones THEN Deny entry"]);
    let out = run(&source, &mut RuntimeBindings::new());
    assert!(out.triggered("Deny entry"));
}

#[test]
fn test_custom_mock_table() {
    let table = MockTable {
        rules: vec![MockRule::substring("temp", 99.0)],
        default_value: 0.0,
    };
    let interpreter = Interpreter::new(InterpreterConfig::default().with_mock_table(table));
    let p = policy(&rules(&[
        "IF CoreTemp > 90 THEN Shutdown",
        "IF Pressure > 0 THEN Vent",
    ]));
    let out = interpreter.execute(&p, &mut RuntimeBindings::new());
    assert_eq!(out.actions, vec!["Shutdown"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Loops and diagnostics
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_nested_loops_multiply_iterations() {
    let source = "RULE:
- FOR zone IN zones {
    - WHILE Alert == 1 {
        - IF Alert == 1 THEN Notify
      }
  }
";
    let mut bindings = RuntimeBindings::new().with("Alert", 1.0);
    let out = run(source, &mut bindings);
    assert_eq!(out.actions.len(), 4);
    assert_eq!(out.metrics.loop_iterations, 2 + 4);
    assert!(out.diagnostics.iter().any(|d| d.contains("FOR zone IN zones (simulating 2 iterations)")));
}

#[test]
fn test_intent_is_traced_first() {
    let out = run(FACTORY, &mut RuntimeBindings::new());
    assert_eq!(
        out.diagnostics.first().map(String::as_str),
        Some("intent: Keep the assembly line safe for human operators")
    );
}

#[test]
fn test_factory_policy() {
    let mut calm = RuntimeBindings::new();
    let out = run(FACTORY, &mut calm);
    assert!(out.actions.is_empty());
    assert_eq!(out.metrics.rules_evaluated, 3 + 2);

    let mut hot = RuntimeBindings::new()
        .with("Temperature", 95.0)
        .with("GasLevel", 60.0)
        .with("VentStatus", "Closed");
    let out = run(FACTORY, &mut hot);
    assert_eq!(out.actions, vec!["Trigger cooling cycle", "Open vents"]);
}

#[test]
fn test_execution_serializes() {
    let source = rules(&["IF Speed > 10 THEN Slow down"]);
    let mut bindings = RuntimeBindings::new().with("Speed", 20.0);
    let out = run(&source, &mut bindings);
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["actions"][0], "Slow down");
    assert_eq!(json["metrics"]["actions_triggered"], 1);
}

#[test]
fn test_runs_are_independent() {
    let source = rules(&["IF Level > 40 THEN Drain"]);
    let p = policy(&source);
    let interpreter = Interpreter::default();
    for _ in 0..10 {
        let mut bindings = RuntimeBindings::new();
        let out = interpreter.execute(&p, &mut bindings);
        assert_eq!(out.actions, vec!["Drain"]);
        assert_eq!(out.metrics.mocked_identifiers, 1);
    }
}
