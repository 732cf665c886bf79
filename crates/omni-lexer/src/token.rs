//! Token types for the OmniLang lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of a policy document and
//! [`Token`], which pairs a kind with its source text and [`Span`].

use omni_types::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The nine section keywords, in canonical spelling.
pub const SECTION_KEYWORDS: &[&str] = &[
    "INTENT",
    "ACTOR",
    "CONTEXT",
    "ASSUMPTION",
    "RULE",
    "CONSTRAINT",
    "IMPACT",
    "TRACE",
    "REVIEW",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text. String literals keep their quotes.
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }
}

// ─────────────────────────────────────────────────────────────────────
// Keyword groups
// ─────────────────────────────────────────────────────────────────────

/// Section headers. Matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Intent,
    Actor,
    Context,
    Assumption,
    Rule,
    Constraint,
    Impact,
    Trace,
    Review,
}

impl Section {
    pub fn from_word(word: &str) -> Option<Section> {
        Some(match word.to_ascii_uppercase().as_str() {
            "INTENT" => Section::Intent,
            "ACTOR" => Section::Actor,
            "CONTEXT" => Section::Context,
            "ASSUMPTION" => Section::Assumption,
            "RULE" => Section::Rule,
            "CONSTRAINT" => Section::Constraint,
            "IMPACT" => Section::Impact,
            "TRACE" => Section::Trace,
            "REVIEW" => Section::Review,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Intent => "INTENT",
            Section::Actor => "ACTOR",
            Section::Context => "CONTEXT",
            Section::Assumption => "ASSUMPTION",
            Section::Rule => "RULE",
            Section::Constraint => "CONSTRAINT",
            Section::Impact => "IMPACT",
            Section::Trace => "TRACE",
            Section::Review => "REVIEW",
        }
    }
}

/// Fixed vocabulary tags. Matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Primary,
    Secondary,
    Domain,
    Location,
    Phase,
    Legal,
    Ethical,
    Technical,
    Benefit,
    Risk,
    TradeOff,
    Moral,
    Regulation,
    Evidence,
}

impl Tag {
    pub fn from_word(word: &str) -> Option<Tag> {
        Some(match word {
            "Primary" => Tag::Primary,
            "Secondary" => Tag::Secondary,
            "Domain" => Tag::Domain,
            "Location" => Tag::Location,
            "Phase" => Tag::Phase,
            "Legal" => Tag::Legal,
            "Ethical" => Tag::Ethical,
            "Technical" => Tag::Technical,
            "Benefit" => Tag::Benefit,
            "Risk" => Tag::Risk,
            "Trade-off" => Tag::TradeOff,
            "Moral" => Tag::Moral,
            "Regulation" => Tag::Regulation,
            "Evidence" => Tag::Evidence,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Primary => "Primary",
            Tag::Secondary => "Secondary",
            Tag::Domain => "Domain",
            Tag::Location => "Location",
            Tag::Phase => "Phase",
            Tag::Legal => "Legal",
            Tag::Ethical => "Ethical",
            Tag::Technical => "Technical",
            Tag::Benefit => "Benefit",
            Tag::Risk => "Risk",
            Tag::TradeOff => "Trade-off",
            Tag::Moral => "Moral",
            Tag::Regulation => "Regulation",
            Tag::Evidence => "Evidence",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in a policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // ── Keywords ─────────────────────────────────────────────
    Section(Section),
    /// `IF`
    If,
    /// `THEN`
    Then,
    /// `FOR`
    For,
    /// `WHILE`
    While,
    /// `IN`
    In,
    Tag(Tag),

    // ── Literals & names ─────────────────────────────────────
    Number(f64),
    /// Unquoted string contents.
    Str(String),
    Identifier(String),

    // ── Operators ────────────────────────────────────────────
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    BangEq,
    LessEq,
    GreaterEq,
    Less,
    Greater,
    Eq,
    FatArrow,

    // ── Punctuation ──────────────────────────────────────────
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Dot,
    Pipe,

    // ── Special ──────────────────────────────────────────────
    /// `-` as the first non-blank character of a line.
    ListMarker,
    Newline,
    Eof,
}

impl TokenKind {
    /// Control keywords, matched case-insensitively.
    pub fn from_control_word(word: &str) -> Option<TokenKind> {
        Some(match word.to_ascii_uppercase().as_str() {
            "IF" => TokenKind::If,
            "THEN" => TokenKind::Then,
            "FOR" => TokenKind::For,
            "WHILE" => TokenKind::While,
            "IN" => TokenKind::In,
            _ => return None,
        })
    }

    /// Returns `true` for tokens spelled as a word (keywords, tags, names).
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            TokenKind::Section(_)
                | TokenKind::If
                | TokenKind::Then
                | TokenKind::For
                | TokenKind::While
                | TokenKind::In
                | TokenKind::Tag(_)
                | TokenKind::Identifier(_)
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Section(s) => f.write_str(s.as_str()),
            TokenKind::If => f.write_str("IF"),
            TokenKind::Then => f.write_str("THEN"),
            TokenKind::For => f.write_str("FOR"),
            TokenKind::While => f.write_str("WHILE"),
            TokenKind::In => f.write_str("IN"),
            TokenKind::Tag(t) => f.write_str(t.as_str()),
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Str(s) => write!(f, "\"{s}\""),
            TokenKind::Identifier(s) => f.write_str(s),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::BangEq => f.write_str("!="),
            TokenKind::LessEq => f.write_str("<="),
            TokenKind::GreaterEq => f.write_str(">="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::FatArrow => f.write_str("=>"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Pipe => f.write_str("|"),
            TokenKind::ListMarker => f.write_str("list marker '-'"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}
