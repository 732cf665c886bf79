//! Fallback condition grammar.
//!
//! Used when a simple condition fails under the full expression grammar,
//! usually because it names data the host did not supply. Accepts
//! `<identifier> <operator> <literal>` clauses joined with `OR`/`AND`, each
//! optionally prefixed with `NOT`. Missing identifiers are mocked.

use serde::{Deserialize, Serialize};

use crate::bindings::RuntimeBindings;
use crate::mock::{MockTable, MockingNotice};
use crate::value::Value;

// ══════════════════════════════════════════════════════════════════════════════
// Truth words
// ══════════════════════════════════════════════════════════════════════════════

/// Words that normalize to `true` / `false` before equality comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthWords {
    pub truthy: Vec<String>,
    pub falsy: Vec<String>,
}

impl Default for TruthWords {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect();
        Self {
            truthy: words(&["ready", "true", "active", "green", "success"]),
            falsy: words(&["error", "false", "inactive", "red", "failed"]),
        }
    }
}

impl TruthWords {
    /// `Some(true)` for a truthy word, `Some(false)` for a falsy one.
    pub fn truth_of(&self, word: &str) -> Option<bool> {
        let lower = word.trim().to_lowercase();
        if self.truthy.iter().any(|w| *w == lower) {
            Some(true)
        } else if self.falsy.iter().any(|w| *w == lower) {
            Some(false)
        } else {
            None
        }
    }

    /// Lowercase `word`, collapsing truth words to `"true"` / `"false"`.
    pub fn normalize(&self, word: &str) -> String {
        match self.truth_of(word) {
            Some(b) => b.to_string(),
            None => word.trim().to_lowercase(),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Condition syntax
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Eq,
    NotEq,
    In,
}

/// Symbolic operators, longest first.
const SYMBOL_OPS: [(&str, CompareOp); 7] = [
    ("<=", CompareOp::LessEq),
    (">=", CompareOp::GreaterEq),
    ("==", CompareOp::Eq),
    ("!=", CompareOp::NotEq),
    ("<", CompareOp::Less),
    (">", CompareOp::Greater),
    ("=", CompareOp::Eq),
];

#[derive(Debug, Clone, PartialEq)]
struct Comparison {
    identifier: String,
    op: CompareOp,
    literal: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Any(Vec<Condition>),
    All(Vec<Condition>),
    Not(Box<Condition>),
    Compare(Comparison),
}

fn parse_condition(text: &str) -> Option<Condition> {
    let alternatives = split_keyword(text, "or");
    if alternatives.len() > 1 {
        return alternatives
            .into_iter()
            .map(parse_conjunction)
            .collect::<Option<Vec<_>>>()
            .map(Condition::Any);
    }
    parse_conjunction(text)
}

fn parse_conjunction(text: &str) -> Option<Condition> {
    let parts = split_keyword(text, "and");
    if parts.len() > 1 {
        return parts
            .into_iter()
            .map(parse_clause)
            .collect::<Option<Vec<_>>>()
            .map(Condition::All);
    }
    parse_clause(text)
}

fn parse_clause(text: &str) -> Option<Condition> {
    let mut text = text.trim();
    let mut negated = false;
    while let Some(rest) = strip_word(text, "not") {
        negated = !negated;
        text = rest.trim();
    }
    let cmp = Condition::Compare(parse_comparison(text)?);
    Some(if negated { Condition::Not(Box::new(cmp)) } else { cmp })
}

fn parse_comparison(text: &str) -> Option<Comparison> {
    let ident_len = text
        .char_indices()
        .find(|&(_, c)| !(c.is_alphanumeric() || c == '_' || c == '.'))
        .map_or(text.len(), |(i, _)| i);
    if ident_len == 0 {
        return None;
    }
    let identifier = &text[..ident_len];
    let rest = text[ident_len..].trim_start();

    let (op, literal) = SYMBOL_OPS
        .iter()
        .find_map(|&(sym, op)| rest.strip_prefix(sym).map(|lit| (op, lit)))
        .or_else(|| strip_word(rest, "in").map(|lit| (CompareOp::In, lit)))?;

    let literal = unquote(literal.trim());
    if literal.is_empty() || literal.starts_with(['<', '>', '=', '!']) {
        return None;
    }
    Some(Comparison {
        identifier: identifier.to_string(),
        op,
        literal: literal.to_string(),
    })
}

/// Split `text` at each standalone, unquoted, case-insensitive `keyword`.
fn split_keyword<'t>(text: &'t str, keyword: &str) -> Vec<&'t str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut prev_blank = true;

    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if prev_blank && i >= start => {
                if let Some(after) = strip_word(&text[i..], keyword) {
                    parts.push(&text[start..i]);
                    start = text.len() - after.len();
                }
            }
            None => {}
        }
        prev_blank = c.is_whitespace();
    }
    parts.push(&text[start..]);
    parts
}

/// If `text` starts with `word` followed by whitespace or end of text,
/// return what follows.
fn strip_word<'t>(text: &'t str, word: &str) -> Option<&'t str> {
    let head = text.get(..word.len())?;
    if !head.eq_ignore_ascii_case(word) {
        return None;
    }
    let rest = &text[word.len()..];
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

fn unquote(text: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = text.strip_prefix(q).and_then(|t| t.strip_suffix(q)) {
            return inner;
        }
    }
    text
}

// ══════════════════════════════════════════════════════════════════════════════
// Evaluation
// ══════════════════════════════════════════════════════════════════════════════

/// Result of one fallback evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FallbackOutcome {
    /// `None` when the text is not in the fallback grammar or an ordering
    /// comparison has a non-numeric side.
    pub value: Option<bool>,
    /// Values synthesized for missing identifiers, in resolution order.
    pub notices: Vec<MockingNotice>,
}

pub struct FallbackEvaluator<'c> {
    mock_table: &'c MockTable,
    truth_words: &'c TruthWords,
}

impl<'c> FallbackEvaluator<'c> {
    pub fn new(mock_table: &'c MockTable, truth_words: &'c TruthWords) -> Self {
        Self {
            mock_table,
            truth_words,
        }
    }

    /// Whether `text` is in the fallback grammar.
    pub fn parses(text: &str) -> bool {
        parse_condition(text).is_some()
    }

    pub fn evaluate(&self, text: &str, bindings: &mut RuntimeBindings) -> FallbackOutcome {
        let mut notices = Vec::new();
        let value = parse_condition(text).and_then(|c| self.eval(&c, bindings, &mut notices));
        FallbackOutcome { value, notices }
    }

    fn eval(
        &self,
        cond: &Condition,
        bindings: &mut RuntimeBindings,
        notices: &mut Vec<MockingNotice>,
    ) -> Option<bool> {
        match cond {
            Condition::Any(parts) => {
                for part in parts {
                    if self.eval(part, bindings, notices)? {
                        return Some(true);
                    }
                }
                Some(false)
            }
            Condition::All(parts) => {
                for part in parts {
                    if !self.eval(part, bindings, notices)? {
                        return Some(false);
                    }
                }
                Some(true)
            }
            Condition::Not(inner) => self.eval(inner, bindings, notices).map(|b| !b),
            Condition::Compare(cmp) => self.compare(cmp, bindings, notices),
        }
    }

    fn compare(
        &self,
        cmp: &Comparison,
        bindings: &mut RuntimeBindings,
        notices: &mut Vec<MockingNotice>,
    ) -> Option<bool> {
        // Membership performs no containment check.
        if cmp.op == CompareOp::In {
            return Some(true);
        }

        let (left, notice) = self.mock_table.resolve(&cmp.identifier, bindings);
        notices.extend(notice);

        match cmp.op {
            CompareOp::Eq => Some(self.equals(&left, &cmp.literal)),
            CompareOp::NotEq => Some(!self.equals(&left, &cmp.literal)),
            CompareOp::Less | CompareOp::Greater | CompareOp::LessEq | CompareOp::GreaterEq => {
                let l = value_number(&left)?;
                let r = literal_number(&cmp.literal)?;
                Some(match cmp.op {
                    CompareOp::Less => l < r,
                    CompareOp::Greater => l > r,
                    CompareOp::LessEq => l <= r,
                    _ => l >= r,
                })
            }
            CompareOp::In => Some(true),
        }
    }

    fn equals(&self, left: &Value, literal: &str) -> bool {
        let right = literal_number(literal)
            .or_else(|| self.truth_words.truth_of(literal).map(truth_number));
        if let (Some(l), Some(r)) = (value_number(left), right) {
            return l == r;
        }
        self.truth_words.normalize(&value_text(left)) == self.truth_words.normalize(literal)
    }
}

fn truth_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn literal_number(literal: &str) -> Option<f64> {
    let literal = literal.trim();
    if literal.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if literal.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }
    literal.parse().ok()
}

/// Numeric view of a bound value. Strings keep only digits, `.` and `-`.
fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Bool(b) => Some(truth_number(*b)),
        Value::Str(s) => {
            if let Some(n) = literal_number(s) {
                return Some(n);
            }
            let digits: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}
