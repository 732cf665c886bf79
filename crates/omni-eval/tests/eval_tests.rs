//! Integration tests for the condition expression evaluator.
//!
//! Tests key evaluator features:
//! - arithmetic, comparison and logical operators
//! - name resolution through runtime bindings
//! - match expressions (wildcards, exhaustiveness, clause splitting)
//! - lambdas and higher-order built-ins
//! - records, lists and field access
//! - gas metering

use omni_eval::{evaluate, parse_expression, EvalError, Evaluator, RuntimeBindings, Value};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn eval(text: &str) -> Result<Value, EvalError> {
    evaluate(text, &RuntimeBindings::new())
}

fn eval_with(text: &str, bindings: &RuntimeBindings) -> Value {
    evaluate(text, bindings).unwrap_or_else(|e| panic!("'{text}' failed: {e}"))
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn s(v: &str) -> Value {
    Value::Str(v.to_string())
}

fn b(v: bool) -> Value {
    Value::Bool(v)
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_comparisons_against_bindings() {
    let bindings = RuntimeBindings::new().with("Temperature", 55.0);
    assert_eq!(eval_with("Temperature > 50", &bindings), b(true));
    assert_eq!(eval_with("Temperature <= 50", &bindings), b(false));
    assert_eq!(eval_with("Temperature = 55", &bindings), b(true));
    assert_eq!(eval_with("Temperature != 55", &bindings), b(false));
}

#[test]
fn test_logical_words() {
    let bindings = RuntimeBindings::new().with("A", 1.0).with("B", 0.0);
    assert_eq!(eval_with("A > 0 and B > 0", &bindings), b(false));
    assert_eq!(eval_with("A > 0 OR B > 0", &bindings), b(true));
    assert_eq!(eval_with("not B > 0", &bindings), b(true));
}

#[test]
fn test_short_circuit_skips_undefined_names() {
    assert_eq!(eval("false and Missing > 1").unwrap(), b(false));
    assert_eq!(eval("TRUE or Missing > 1").unwrap(), b(true));
}

#[test]
fn test_string_operations() {
    let bindings = RuntimeBindings::new().with("Zone", "North");
    assert_eq!(eval_with("Zone == \"North\"", &bindings), b(true));
    assert_eq!(eval_with("Zone + \"-1\"", &bindings), s("North-1"));
    assert_eq!(eval_with("len(Zone)", &bindings), num(5.0));
    assert_eq!(eval_with("\"apple\" < \"banana\"", &bindings), b(true));
}

#[test]
fn test_type_mismatch() {
    assert!(matches!(eval("\"a\" - 1"), Err(EvalError::TypeMismatch(_))));
    assert!(matches!(eval("1 < \"a\""), Err(EvalError::TypeMismatch(_))));
}

#[test]
fn test_undefined_name() {
    assert_eq!(eval("Pressure > 3"), Err(EvalError::UndefinedName("Pressure".into())));
}

#[test]
fn test_builtins_are_not_ambient_capabilities() {
    assert_eq!(eval("print(1)"), Err(EvalError::UndefinedName("print".into())));
    assert!(matches!(eval("Map([1], |x| x)"), Err(EvalError::UndefinedName(_))));
}

// ══════════════════════════════════════════════════════════════════════════════
// Match
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_match_with_wildcard() {
    let ready = RuntimeBindings::new().with("Status", "Ready");
    let idle = RuntimeBindings::new().with("Status", "Idle");
    let text = "match Status { \"Ready\" => true, _ => false }";
    assert_eq!(eval_with(text, &ready), b(true));
    assert_eq!(eval_with(text, &idle), b(false));
}

#[test]
fn test_match_first_clause_wins() {
    let bindings = RuntimeBindings::new().with("Level", 3.0);
    assert_eq!(
        eval_with("match Level { 3 => \"first\", 3 => \"second\", _ => \"other\" }", &bindings),
        s("first")
    );
}

#[test]
fn test_match_bare_pattern_names() {
    let bindings = RuntimeBindings::new().with("Light", "Green");
    assert_eq!(
        eval_with("match Light { Red => 0, Green => 1, _ => 2 }", &bindings),
        num(1.0)
    );
}

#[test]
fn test_match_clause_splitting_respects_nesting() {
    let bindings = RuntimeBindings::new().with("Mode", "a,b").with("Inner", 2.0);
    let text = "match Mode { \"a,b\" => match Inner { 1 => \"one\", 2 => \"two\", _ => \"many\" }, _ => \"none\" }";
    assert_eq!(eval_with(text, &bindings), s("two"));
}

#[test]
fn test_match_without_matching_clause_is_an_error() {
    let bindings = RuntimeBindings::new().with("Status", "Offline");
    let err = evaluate("match Status { \"Ready\" => 1, \"Busy\" => 2 }", &bindings).unwrap_err();
    assert!(matches!(err, EvalError::NonExhaustiveMatch(_)));
    assert_eq!(err.code().to_string(), "E302");
}

#[test]
fn test_match_rejects_two_wildcards() {
    assert_eq!(
        eval("match 1 { _ => 1, _ => 2 }"),
        Err(EvalError::DuplicateWildcard)
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Lambdas and higher-order built-ins
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_map_then_reduce() {
    assert_eq!(
        eval("reduce(map([1,2,3], |x| x*2), |acc,x| acc+x, 0) == 12").unwrap(),
        b(true)
    );
}

#[test]
fn test_reduce_without_initial_value() {
    assert_eq!(eval("reduce([4, 5, 6], |a, b| a * b)").unwrap(), num(120.0));
    assert_eq!(eval("reduce([], |a, b| a + b)"), Err(EvalError::EmptyReduce));
    assert_eq!(eval("reduce([], |a, b| a + b, 7)").unwrap(), num(7.0));
}

#[test]
fn test_filter_sum_len() {
    let bindings = RuntimeBindings::new().with("Readings", vec![12.0, 48.0, 51.0, 77.0]);
    assert_eq!(
        eval_with("sum(filter(Readings, |r| r > 50))", &bindings),
        num(128.0)
    );
    assert_eq!(eval_with("len(filter(Readings, |r| r < 0))", &bindings), num(0.0));
}

#[test]
fn test_any_all() {
    let bindings = RuntimeBindings::new().with("Flags", vec![true, false]);
    assert_eq!(eval_with("any(Flags)", &bindings), b(true));
    assert_eq!(eval_with("all(Flags)", &bindings), b(false));
    assert_eq!(eval_with("all([1, 2], |x| x > 0)", &bindings), b(true));
    assert_eq!(eval_with("any([], |x| x > 0)", &bindings), b(false));
}

#[test]
fn test_lambda_captures_binding_scope() {
    let bindings = RuntimeBindings::new().with("Limit", 10.0);
    assert_eq!(
        eval_with("map([5, 15], |x| x > Limit)", &bindings),
        Value::List(vec![b(false), b(true)])
    );
}

#[test]
fn test_wrong_arg_count() {
    assert!(matches!(
        eval("map([1])"),
        Err(EvalError::WrongArgCount { found: 1, .. })
    ));
    assert!(matches!(
        eval("(|a, b| a + b)(1)"),
        Err(EvalError::WrongArgCount { .. })
    ));
}

// ══════════════════════════════════════════════════════════════════════════════
// Records and lists
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_record_field_access() {
    assert_eq!(eval("Point { x: 1, y: 2 }.y").unwrap(), num(2.0));
    assert!(matches!(eval("Point { x: 1 }.z"), Err(EvalError::TypeMismatch(_))));
}

#[test]
fn test_list_equality_is_structural() {
    assert_eq!(eval("[1, 2] + [3] == [1, 2, 3]").unwrap(), b(true));
    assert_eq!(eval("[1, 2] == [2, 1]").unwrap(), b(false));
}

// ══════════════════════════════════════════════════════════════════════════════
// Syntax and gas
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_malformed_expressions() {
    for text in ["1 +", "(1", "match { }", "Temperature > 50 THEN", "1 < 2 < 3", "@"] {
        assert!(
            matches!(parse_expression(text), Err(EvalError::Syntax(_))),
            "expected syntax error for '{text}'"
        );
    }
}

#[test]
fn test_gas_exhaustion_is_reported() {
    let expr = parse_expression("map([1, 2, 3, 4, 5, 6, 7, 8], |x| x * x)").unwrap();
    let bindings = RuntimeBindings::new();
    let mut tight = Evaluator::new(&bindings, 10);
    assert_eq!(tight.eval_expr(&expr), Err(EvalError::GasExhausted));
    let mut roomy = Evaluator::new(&bindings, 1_000);
    assert!(roomy.eval_expr(&expr).is_ok());
}

#[test]
fn test_evaluation_is_deterministic() {
    let bindings = RuntimeBindings::new().with("Xs", vec![3.0, 1.0, 2.0]);
    let text = "reduce(map(Xs, |x| x * 10), |a, b| a + b)";
    let first = eval_with(text, &bindings);
    for _ in 0..50 {
        assert_eq!(eval_with(text, &bindings), first);
    }
}
