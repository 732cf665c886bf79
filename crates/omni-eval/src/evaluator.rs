//! Core expression evaluator.

use crate::bindings::RuntimeBindings;
use crate::builtins::Builtin;
use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::expr::{BinOp, Expr, Literal, MatchArm, UnaryOp};
use crate::parse_expr::parse_expression;
use crate::value::{Closure, Value};

/// Default step budget for one condition.
pub const DEFAULT_GAS_LIMIT: u64 = 10_000;

/// Maximum nesting of lambda applications.
const MAX_CALL_DEPTH: u32 = 128;

/// Parse and evaluate condition text with the default gas limit.
///
/// In a `match` pattern, a bare name that resolves to nothing is read as
/// the string of the same text rather than an undefined-name error, so
/// `match Status { Ready => 1, _ => 0 }` matches the value `"Ready"`.
pub fn evaluate(text: &str, bindings: &RuntimeBindings) -> EvalResult<Value> {
    let expr = parse_expression(text)?;
    Evaluator::new(bindings, DEFAULT_GAS_LIMIT).eval_expr(&expr)
}

/// The expression evaluator: walks [`Expr`] nodes and produces Values.
///
/// Names resolve through lambda scopes, then runtime bindings, then the
/// built-in table. Nothing else is reachable from condition text.
pub struct Evaluator<'b> {
    /// Lambda parameter scopes.
    pub env: Environment,
    bindings: &'b RuntimeBindings,
    /// Gas counter: limits total steps so runaway lambdas terminate.
    pub gas: u64,
    pub gas_limit: u64,
    call_depth: u32,
}

impl<'b> Evaluator<'b> {
    pub fn new(bindings: &'b RuntimeBindings, gas_limit: u64) -> Self {
        Self {
            env: Environment::new(),
            bindings,
            gas: 0,
            gas_limit,
            call_depth: 0,
        }
    }

    /// Consume one unit of gas. Returns error if exhausted.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.gas_limit {
            Err(EvalError::GasExhausted)
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.tick()?;
        match expr {
            Expr::Literal(Literal::Number(n)) => Ok(Value::Number(*n)),
            Expr::Literal(Literal::Str(s)) => Ok(Value::Str(s.clone())),
            Expr::Identifier(name) => self.eval_identifier(name),
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand),
            Expr::Call { callee, args } => self.eval_call(callee, args),
            Expr::Match {
                scrutinee,
                arms,
                default,
            } => self.eval_match(scrutinee, arms, default.as_deref()),
            Expr::Lambda { params, body } => Ok(Value::Closure(Closure {
                params: params.clone(),
                body: body.clone(),
                env: self.env.clone(),
            })),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Record { name, fields } => {
                let mut values = Vec::with_capacity(fields.len());
                for (field, value) in fields {
                    values.push((field.clone(), self.eval_expr(value)?));
                }
                Ok(Value::Record {
                    name: name.clone(),
                    fields: values,
                })
            }
            Expr::FieldAccess { object, field } => self.eval_field_access(object, field),
        }
    }

    fn eval_identifier(&self, name: &str) -> EvalResult<Value> {
        if let Some(value) = self.env.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        if let Some(builtin) = Builtin::from_name(name) {
            return Ok(Value::Builtin(builtin));
        }
        if name.eq_ignore_ascii_case("true") {
            return Ok(Value::Bool(true));
        }
        if name.eq_ignore_ascii_case("false") {
            return Ok(Value::Bool(false));
        }
        Err(EvalError::UndefinedName(name.to_string()))
    }

    fn eval_field_access(&mut self, object: &Expr, field: &str) -> EvalResult<Value> {
        match self.eval_expr(object)? {
            Value::Record { name, fields } => fields
                .into_iter()
                .find(|(k, _)| k == field)
                .map(|(_, v)| v)
                .ok_or_else(|| EvalError::TypeMismatch(format!("{name} has no field '{field}'"))),
            other => Err(EvalError::TypeMismatch(format!(
                "cannot access field '{field}' on {}",
                other.type_name()
            ))),
        }
    }

    // ── Operators ────────────────────────────────────────────────────────────

    fn eval_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> EvalResult<Value> {
        // Short-circuit for logical operators
        if op == BinOp::And {
            let lv = self.eval_expr(left)?;
            return if !lv.is_truthy() {
                Ok(Value::Bool(false))
            } else {
                Ok(Value::Bool(self.eval_expr(right)?.is_truthy()))
            };
        }
        if op == BinOp::Or {
            let lv = self.eval_expr(left)?;
            return if lv.is_truthy() {
                Ok(Value::Bool(true))
            } else {
                Ok(Value::Bool(self.eval_expr(right)?.is_truthy()))
            };
        }

        let lv = self.eval_expr(left)?;
        let rv = self.eval_expr(right)?;

        match op {
            BinOp::Add => eval_add(&lv, &rv),
            BinOp::Sub => eval_arith(&lv, &rv, op, |a, b| a - b),
            BinOp::Mul => eval_arith(&lv, &rv, op, |a, b| a * b),
            BinOp::Div | BinOp::Mod => {
                if rv.as_number() == Some(0.0) && lv.as_number().is_some() {
                    let what = if op == BinOp::Div { "division" } else { "modulo" };
                    return Err(EvalError::ArithmeticTrap(format!("{what} by zero")));
                }
                if op == BinOp::Div {
                    eval_arith(&lv, &rv, op, |a, b| a / b)
                } else {
                    eval_arith(&lv, &rv, op, |a, b| a % b)
                }
            }
            BinOp::Eq => Ok(Value::Bool(lv.structural_eq(&rv))),
            BinOp::NotEq => Ok(Value::Bool(!lv.structural_eq(&rv))),
            BinOp::Less => eval_comparison(&lv, &rv, op, |o| o.is_lt()),
            BinOp::Greater => eval_comparison(&lv, &rv, op, |o| o.is_gt()),
            BinOp::LessEq => eval_comparison(&lv, &rv, op, |o| o.is_le()),
            BinOp::GreaterEq => eval_comparison(&lv, &rv, op, |o| o.is_ge()),
            BinOp::And | BinOp::Or => Err(EvalError::Syntax(format!("misplaced '{op}'"))),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> EvalResult<Value> {
        let val = self.eval_expr(operand)?;
        match op {
            UnaryOp::Neg => match val {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(EvalError::TypeMismatch(format!(
                    "cannot negate {}",
                    other.type_name()
                ))),
            },
            UnaryOp::Not => Ok(Value::Bool(!val.is_truthy())),
        }
    }

    // ── Calls ────────────────────────────────────────────────────────────────

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> EvalResult<Value> {
        let func = self.eval_expr(callee)?;
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        self.apply(&func, values)
    }

    /// Call a lambda or built-in with already evaluated arguments.
    pub fn apply(&mut self, func: &Value, args: Vec<Value>) -> EvalResult<Value> {
        match func {
            Value::Builtin(builtin) => builtin.call(self, args),
            Value::Closure(closure) => self.apply_closure(closure, args),
            other => Err(EvalError::NotCallable(other.to_string())),
        }
    }

    fn apply_closure(&mut self, closure: &Closure, args: Vec<Value>) -> EvalResult<Value> {
        if args.len() != closure.params.len() {
            return Err(EvalError::WrongArgCount {
                name: "lambda".into(),
                expected: closure.params.len().to_string(),
                found: args.len(),
            });
        }
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(EvalError::GasExhausted);
        }

        self.call_depth += 1;
        let saved = std::mem::replace(&mut self.env, closure.env.clone());
        self.env.push_scope();
        for (param, arg) in closure.params.iter().zip(args) {
            self.env.define(param, arg);
        }
        let result = self.eval_expr(&closure.body);
        self.env = saved;
        self.call_depth -= 1;
        result
    }

    // ── Match ────────────────────────────────────────────────────────────────

    /// The first arm whose pattern equals the scrutinee wins; the `_` result
    /// is used only when no explicit pattern matches.
    fn eval_match(
        &mut self,
        scrutinee: &Expr,
        arms: &[MatchArm],
        default: Option<&Expr>,
    ) -> EvalResult<Value> {
        let subject = self.eval_expr(scrutinee)?;
        for arm in arms {
            let pattern = self.eval_pattern(&arm.pattern)?;
            if pattern.structural_eq(&subject) {
                return self.eval_expr(&arm.result);
            }
        }
        match default {
            Some(result) => self.eval_expr(result),
            None => Err(EvalError::NonExhaustiveMatch(subject.to_string())),
        }
    }

    /// A bare pattern name that resolves to nothing matches the string of
    /// the same text, so `Ready => ...` matches the value `"Ready"`.
    fn eval_pattern(&mut self, pattern: &Expr) -> EvalResult<Value> {
        match self.eval_expr(pattern) {
            Err(EvalError::UndefinedName(name)) if matches!(pattern, Expr::Identifier(_)) => {
                Ok(Value::Str(name))
            }
            other => other,
        }
    }
}

fn eval_add(lv: &Value, rv: &Value) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Number(_), Value::Number(_)) => eval_arith(lv, rv, BinOp::Add, |a, b| a + b),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (Value::List(a), Value::List(b)) => Ok(Value::List(a.iter().chain(b).cloned().collect())),
        _ => Err(EvalError::TypeMismatch(format!(
            "cannot add {} and {}",
            lv.type_name(),
            rv.type_name()
        ))),
    }
}

fn eval_arith(lv: &Value, rv: &Value, op: BinOp, f: fn(f64, f64) -> f64) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => {
            let result = f(*a, *b);
            if result.is_finite() {
                Ok(Value::Number(result))
            } else {
                Err(EvalError::ArithmeticTrap(format!("'{op}' produced NaN/Infinity")))
            }
        }
        _ => Err(EvalError::TypeMismatch(format!(
            "cannot apply '{op}' to {} and {}",
            lv.type_name(),
            rv.type_name()
        ))),
    }
}

fn eval_comparison(
    lv: &Value,
    rv: &Value,
    op: BinOp,
    test: fn(std::cmp::Ordering) -> bool,
) -> EvalResult<Value> {
    let ordering = match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => {
            return Err(EvalError::TypeMismatch(format!(
                "cannot compare {} {op} {}",
                lv.type_name(),
                rv.type_name()
            )))
        }
    };
    Ok(Value::Bool(ordering.is_some_and(test)))
}
