//! The fixed built-in function table.
//!
//! Policy text cannot add to this set. Anything not listed here, not a
//! runtime binding and not a lambda parameter is an undefined name.

use crate::error::{EvalError, EvalResult};
use crate::evaluator::Evaluator;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Map,
    Filter,
    Reduce,
    Sum,
    Len,
    Any,
    All,
}

impl Builtin {
    pub const ALL: [Builtin; 7] = [
        Builtin::Map,
        Builtin::Filter,
        Builtin::Reduce,
        Builtin::Sum,
        Builtin::Len,
        Builtin::Any,
        Builtin::All,
    ];

    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Map => "map",
            Builtin::Filter => "filter",
            Builtin::Reduce => "reduce",
            Builtin::Sum => "sum",
            Builtin::Len => "len",
            Builtin::Any => "any",
            Builtin::All => "all",
        }
    }

    /// Accepted argument counts, inclusive.
    fn arity(self) -> (usize, usize) {
        match self {
            Builtin::Map | Builtin::Filter => (2, 2),
            Builtin::Reduce => (2, 3),
            Builtin::Sum | Builtin::Len => (1, 1),
            Builtin::Any | Builtin::All => (1, 2),
        }
    }

    fn arg_count_error(self, found: usize) -> EvalError {
        let (min, max) = self.arity();
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min} or {max}")
        };
        EvalError::WrongArgCount {
            name: self.name().to_string(),
            expected,
            found,
        }
    }

    pub fn call(self, ev: &mut Evaluator<'_>, args: Vec<Value>) -> EvalResult<Value> {
        let (min, max) = self.arity();
        let found = args.len();
        if found < min || found > max {
            return Err(self.arg_count_error(found));
        }

        let mut args = args.into_iter();
        let first = args.next().ok_or_else(|| self.arg_count_error(found))?;
        let func = args.next();
        let init = args.next();
        let required = |f: Option<Value>| f.ok_or_else(|| self.arg_count_error(found));

        match self {
            Builtin::Len => match first {
                Value::List(items) => Ok(Value::Number(items.len() as f64)),
                Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
                other => Err(type_error(self, "a list or string", &other)),
            },
            Builtin::Sum => {
                let items = expect_list(self, first)?;
                let mut total = 0.0;
                for item in &items {
                    match item {
                        Value::Number(n) => total += n,
                        other => return Err(type_error(self, "a list of numbers", other)),
                    }
                }
                Ok(Value::Number(total))
            }
            Builtin::Map => {
                let items = expect_list(self, first)?;
                let func = required(func)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(ev.apply(&func, vec![item])?);
                }
                Ok(Value::List(out))
            }
            Builtin::Filter => {
                let items = expect_list(self, first)?;
                let func = required(func)?;
                let mut out = Vec::new();
                for item in items {
                    if ev.apply(&func, vec![item.clone()])?.is_truthy() {
                        out.push(item);
                    }
                }
                Ok(Value::List(out))
            }
            Builtin::Reduce => {
                let items = expect_list(self, first)?;
                let func = required(func)?;
                let mut items = items.into_iter();
                // Without an initial value the first element seeds the fold.
                let mut acc = match init {
                    Some(init) => init,
                    None => items.next().ok_or(EvalError::EmptyReduce)?,
                };
                for item in items {
                    acc = ev.apply(&func, vec![acc, item])?;
                }
                Ok(acc)
            }
            Builtin::Any | Builtin::All => {
                let items = expect_list(self, first)?;
                let want_all = self == Builtin::All;
                for item in items {
                    let truthy = match &func {
                        Some(f) => ev.apply(f, vec![item])?.is_truthy(),
                        None => item.is_truthy(),
                    };
                    if truthy != want_all {
                        return Ok(Value::Bool(!want_all));
                    }
                }
                Ok(Value::Bool(want_all))
            }
        }
    }
}

fn expect_list(builtin: Builtin, value: Value) -> EvalResult<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(type_error(builtin, "a list", &other)),
    }
}

fn type_error(builtin: Builtin, expected: &str, found: &Value) -> EvalError {
    EvalError::TypeMismatch(format!(
        "{} expects {expected}, got {}",
        builtin.name(),
        found.type_name()
    ))
}
