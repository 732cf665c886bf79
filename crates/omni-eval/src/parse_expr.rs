//! Expression parsing with full operator precedence.
//!
//! Condition text is re-tokenized with the document lexer and parsed here.
//!
//! Precedence (lowest → highest):
//! 7. `or`
//! 6. `and`
//! 5. `==`, `=`, `!=`, `<`, `>`, `<=`, `>=` (no chaining)
//! 4. `+`, `-`
//! 3. `*`, `/`, `%`
//! 2. unary `-`, `not`
//! 1. `.` (field access), `()` (call)
//!
//! `and`, `or`, `not` and `match` are recognised case-insensitively.

use std::sync::Arc;

use omni_lexer::{tokenize, Token, TokenKind};
use omni_types::Span;

use crate::error::{EvalError, EvalResult};
use crate::expr::{BinOp, Expr, Literal, MatchArm, UnaryOp};

/// Depth budget for one expression. Brackets, match bodies, unary
/// operators and every binary operator in a chain each use one level.
const MAX_DEPTH: u32 = 128;

/// Parse condition text into an [`Expr`].
pub fn parse_expression(text: &str) -> EvalResult<Expr> {
    let tokens: Vec<Token> = tokenize(text)?
        .into_iter()
        .filter(|t| t.kind != TokenKind::Newline)
        .collect();
    ExprParser::new(tokens, 0).parse_complete()
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    depth: u32,
    /// Set while parsing a match scrutinee, where `Name {` opens the match
    /// body instead of a record literal.
    no_record: bool,
}

impl ExprParser {
    fn new(mut tokens: Vec<Token>, depth: u32) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, "", Span::start()));
        }
        Self {
            tokens,
            pos: 0,
            depth,
            no_record: false,
        }
    }

    /// Parse one expression that must span every token.
    fn parse_complete(mut self) -> EvalResult<Expr> {
        if self.at_end() {
            return Err(EvalError::Syntax("empty expression".into()));
        }
        let expr = self.parse_expr()?;
        if !self.at_end() {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> EvalResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(EvalError::Syntax(format!(
                "expected '{kind}', found '{}'",
                self.peek_kind()
            )))
        }
    }

    /// Current token is the given word, ignoring case.
    fn at_word(&self, word: &str) -> bool {
        let token = self.peek();
        token.kind.is_word() && token.lexeme.eq_ignore_ascii_case(word)
    }

    fn unexpected(&self) -> EvalError {
        EvalError::Syntax(format!("unexpected '{}'", self.peek_kind()))
    }

    fn expect_name(&mut self, what: &str) -> EvalResult<String> {
        if self.peek_kind().is_word() {
            Ok(self.advance().lexeme)
        } else {
            Err(EvalError::Syntax(format!(
                "expected {what}, found '{}'",
                self.peek_kind()
            )))
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// Take one level of the depth budget.
    fn descend(&mut self) -> EvalResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::Syntax(format!(
                "expression nesting deeper than {MAX_DEPTH}"
            )));
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> EvalResult<Expr> {
        self.descend()?;
        let result = self.parse_or();
        self.depth -= 1;
        result
    }

    /// `OrExpr = AndExpr { "or" AndExpr }`
    fn parse_or(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_and()?;
        while self.at_word("or") {
            self.advance();
            self.descend()?;
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    /// `AndExpr = CompExpr { "and" CompExpr }`
    fn parse_and(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_comparison()?;
        while self.at_word("and") {
            self.advance();
            self.descend()?;
            let right = self.parse_comparison()?;
            left = binary(BinOp::And, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    /// `CompExpr = AddExpr [ CompOp AddExpr ]`
    ///
    /// Comparison operators do NOT chain: `a < b < c` is a syntax error.
    fn parse_comparison(&mut self) -> EvalResult<Expr> {
        let left = self.parse_add()?;
        let Some(op) = self.match_comparison_op() else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_add()?;
        if self.match_comparison_op().is_some() {
            return Err(EvalError::Syntax(
                "comparison operators cannot be chained; use 'and'".into(),
            ));
        }
        Ok(binary(op, left, right))
    }

    fn match_comparison_op(&self) -> Option<BinOp> {
        match self.peek_kind() {
            TokenKind::EqEq | TokenKind::Eq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            _ => None,
        }
    }

    /// `AddExpr = MulExpr { ("+" | "-") MulExpr }`
    fn parse_add(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus | TokenKind::ListMarker => BinOp::Sub,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_mul()?;
            left = binary(op, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    /// `MulExpr = UnaryExpr { ("*" | "/" | "%") UnaryExpr }`
    fn parse_mul(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    /// `UnaryExpr = ("-" | "not") UnaryExpr | PostfixExpr`
    fn parse_unary(&mut self) -> EvalResult<Expr> {
        let op = if matches!(self.peek_kind(), TokenKind::Minus | TokenKind::ListMarker) {
            UnaryOp::Neg
        } else if self.at_word("not") {
            UnaryOp::Not
        } else {
            return self.parse_postfix();
        };
        self.advance();
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// `PostfixExpr = Primary { "(" Args ")" | "." Name }`
    fn parse_postfix(&mut self) -> EvalResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::LParen) {
                let args = self.parse_comma_list(&TokenKind::RParen)?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.eat(&TokenKind::Dot) {
                let field = self.expect_name("field name")?;
                expr = Expr::FieldAccess {
                    object: Box::new(expr),
                    field,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primaries
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> EvalResult<Expr> {
        match self.peek_kind().clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Number(n)))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(s)))
            }
            TokenKind::LParen => {
                self.advance();
                let saved = std::mem::replace(&mut self.no_record, false);
                let inner = self.parse_expr();
                self.no_record = saved;
                let inner = inner?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_comma_list(&TokenKind::RBracket)?;
                Ok(Expr::List(items))
            }
            TokenKind::Pipe => self.parse_lambda(),
            kind if kind.is_word() => {
                if self.at_word("match") {
                    return self.parse_match();
                }
                if !self.no_record && self.at_record_literal() {
                    return self.parse_record();
                }
                Ok(Expr::Identifier(self.advance().lexeme))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Comma-separated expressions up to `close`. A trailing comma is allowed.
    fn parse_comma_list(&mut self, close: &TokenKind) -> EvalResult<Vec<Expr>> {
        let saved = std::mem::replace(&mut self.no_record, false);
        let mut items = Vec::new();
        let result = loop {
            if self.eat(close) {
                break Ok(items);
            }
            match self.parse_expr() {
                Ok(item) => items.push(item),
                Err(e) => break Err(e),
            }
            if !self.eat(&TokenKind::Comma) {
                break self.expect(close).map(|_| items);
            }
        };
        self.no_record = saved;
        result
    }

    /// `|a, b| body`
    fn parse_lambda(&mut self) -> EvalResult<Expr> {
        self.advance(); // opening '|'
        let mut params = Vec::new();
        if !self.eat(&TokenKind::Pipe) {
            loop {
                params.push(self.expect_name("lambda parameter")?);
                if self.eat(&TokenKind::Pipe) {
                    break;
                }
                self.expect(&TokenKind::Comma)?;
            }
        }
        let saved = std::mem::replace(&mut self.no_record, false);
        let body = self.parse_expr();
        self.no_record = saved;
        Ok(Expr::Lambda {
            params,
            body: Arc::new(body?),
        })
    }

    /// `Name {` followed by `field:` or `}`.
    fn at_record_literal(&self) -> bool {
        if self.look_ahead(1) != &TokenKind::LBrace {
            return false;
        }
        match self.look_ahead(2) {
            TokenKind::RBrace => true,
            kind if kind.is_word() => self.look_ahead(3) == &TokenKind::Colon,
            _ => false,
        }
    }

    /// `Name { field: expr, ... }`
    fn parse_record(&mut self) -> EvalResult<Expr> {
        let name = self.advance().lexeme;
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            let field = self.expect_name("record field name")?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_expr()?;
            fields.push((field, value));
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBrace)?;
                break;
            }
        }
        Ok(Expr::Record { name, fields })
    }

    /// `match <scrutinee> { <pattern> => <result>, ..., _ => <default> }`
    ///
    /// The body is split into clauses at depth-0 commas, then each clause at
    /// its first depth-0 `=>`. String literals are single tokens, so commas
    /// inside them never split a clause.
    fn parse_match(&mut self) -> EvalResult<Expr> {
        self.advance(); // match
        let saved = std::mem::replace(&mut self.no_record, true);
        let scrutinee = self.parse_expr();
        self.no_record = saved;
        let scrutinee = scrutinee?;
        self.expect(&TokenKind::LBrace)?;

        let close = self.find_closing_brace()?;
        let body: Vec<Token> = self.tokens[self.pos..close].to_vec();
        self.pos = close + 1;

        let mut arms = Vec::new();
        let mut default = None;
        for clause in split_clauses(&body) {
            if clause.is_empty() {
                continue; // trailing comma
            }
            let Some(arrow) = find_top_level(clause, &TokenKind::FatArrow) else {
                return Err(EvalError::Syntax("match clause is missing '=>'".into()));
            };
            let (pattern, result) = (&clause[..arrow], &clause[arrow + 1..]);
            let result = self.parse_slice(result)?;
            if is_wildcard(pattern) {
                if default.is_some() {
                    return Err(EvalError::DuplicateWildcard);
                }
                default = Some(Box::new(result));
            } else {
                arms.push(MatchArm {
                    pattern: self.parse_slice(pattern)?,
                    result,
                });
            }
        }

        Ok(Expr::Match {
            scrutinee: Box::new(scrutinee),
            arms,
            default,
        })
    }

    /// Index of the `}` closing the brace just consumed.
    fn find_closing_brace(&self) -> EvalResult<usize> {
        let mut depth = 1u32;
        for (i, token) in self.tokens.iter().enumerate().skip(self.pos) {
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        }
        Err(EvalError::Syntax("unclosed match body".into()))
    }

    /// Parse a clause fragment as a complete expression.
    fn parse_slice(&self, tokens: &[Token]) -> EvalResult<Expr> {
        ExprParser::new(tokens.to_vec(), self.depth + 1).parse_complete()
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn is_wildcard(pattern: &[Token]) -> bool {
    matches!(pattern, [t] if t.kind == TokenKind::Identifier("_".into()))
}

/// Bracket depth change contributed by a token.
fn depth_delta(kind: &TokenKind) -> i32 {
    match kind {
        TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => 1,
        TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => -1,
        _ => 0,
    }
}

/// Split match body tokens at commas outside any bracket pair.
pub(crate) fn split_clauses(tokens: &[Token]) -> Vec<&[Token]> {
    let mut clauses = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if depth == 0 && token.kind == TokenKind::Comma {
            clauses.push(&tokens[start..i]);
            start = i + 1;
        }
        depth = (depth + depth_delta(&token.kind)).max(0);
    }
    clauses.push(&tokens[start..]);
    clauses
}

/// First occurrence of `kind` outside any bracket pair.
fn find_top_level(tokens: &[Token], kind: &TokenKind) -> Option<usize> {
    let mut depth = 0i32;
    for (i, token) in tokens.iter().enumerate() {
        if depth == 0 && &token.kind == kind {
            return Some(i);
        }
        depth = (depth + depth_delta(&token.kind)).max(0);
    }
    None
}
