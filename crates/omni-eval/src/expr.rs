//! Expression AST for RULE conditions.

use std::fmt;
use std::sync::Arc;

/// A condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Identifier(String),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `callee(args...)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `match scrutinee { pattern => result, ..., _ => default }`
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
        /// Result of the single `_` clause, if present.
        default: Option<Box<Expr>>,
    },
    /// `|a, b| body`
    Lambda {
        params: Vec<String>,
        body: Arc<Expr>,
    },
    List(Vec<Expr>),
    /// `Name { field: expr, ... }`
    Record {
        name: String,
        fields: Vec<(String, Expr)>,
    },
    FieldAccess {
        object: Box<Expr>,
        field: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
}

/// An explicit (non-wildcard) match clause.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Expr,
    pub result: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl Expr {
    /// `true` if the expression uses match, lambda or call syntax anywhere.
    ///
    /// Such conditions are never retried with the fallback grammar.
    pub fn uses_advanced_syntax(&self) -> bool {
        match self {
            Expr::Match { .. } | Expr::Lambda { .. } | Expr::Call { .. } => true,
            Expr::Literal(_) | Expr::Identifier(_) => false,
            Expr::Binary { left, right, .. } => {
                left.uses_advanced_syntax() || right.uses_advanced_syntax()
            }
            Expr::Unary { operand, .. } => operand.uses_advanced_syntax(),
            Expr::List(items) => items.iter().any(Expr::uses_advanced_syntax),
            Expr::Record { fields, .. } => fields.iter().any(|(_, e)| e.uses_advanced_syntax()),
            Expr::FieldAccess { object, .. } => object.uses_advanced_syntax(),
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Identifier(name.into()))
    }

    #[test]
    fn test_plain_comparison_is_not_advanced() {
        let e = Expr::Binary {
            op: BinOp::Greater,
            left: ident("Temperature"),
            right: Box::new(Expr::Literal(Literal::Number(50.0))),
        };
        assert!(!e.uses_advanced_syntax());
    }

    #[test]
    fn test_nested_call_is_advanced() {
        let e = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::Call {
                callee: ident("any"),
                args: vec![Expr::Identifier("xs".into())],
            }),
        };
        assert!(e.uses_advanced_syntax());
    }
}
