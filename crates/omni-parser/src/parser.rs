//! Core parser infrastructure: token cursor, section dispatch, free text.

use omni_lexer::{Section, Token, TokenKind};
use omni_types::ast::Policy;
use omni_types::{ErrorCode, ParseError, Span};

/// Parse a complete token stream into a [`Policy`].
pub fn parse(tokens: Vec<Token>) -> Result<Policy, ParseError> {
    Parser::new(tokens).parse()
}

/// The OmniLang document parser.
///
/// Consumes a token stream produced by the lexer and builds a [`Policy`].
/// Structural errors abort the parse.
pub struct Parser {
    /// The token stream, always terminated by `Eof`.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Current `{ ... }` rule body nesting depth.
    pub(crate) body_depth: u32,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", span));
        }
        Self {
            tokens,
            pos: 0,
            body_depth: 0,
        }
    }

    /// Parse the whole document.
    ///
    /// Repeated list sections append; a repeated `INTENT` or `CONTEXT`
    /// replaces the earlier one.
    pub fn parse(mut self) -> Result<Policy, ParseError> {
        let mut policy = Policy::default();

        while !self.at_end() {
            let section = match self.peek_kind() {
                TokenKind::Section(s) if self.look_ahead(1) == &TokenKind::Colon => *s,
                _ => {
                    // Not a section header: skip for graceful recovery.
                    self.advance();
                    continue;
                }
            };
            self.advance(); // keyword
            self.advance(); // ':'

            match section {
                Section::Intent => policy.intent = self.parse_intent(),
                Section::Actor => policy.actors.extend(self.parse_actors()?),
                Section::Context => policy.context = Some(self.parse_context()?),
                Section::Assumption => policy.assumptions.extend(self.parse_assumptions()?),
                Section::Rule => policy.rules.extend(self.parse_rule_list()?),
                Section::Constraint => policy.constraints.extend(self.parse_tagged()?),
                Section::Impact => policy.impacts.extend(self.parse_tagged()?),
                Section::Trace => policy.traces.extend(self.parse_tagged()?),
                Section::Review => policy.reviews.extend(self.parse_reviews()?),
            }
        }

        Ok(policy)
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn tokens_between(&self, start: usize, end: usize) -> &[Token] {
        &self.tokens[start..end]
    }

    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len() - 1);
    }

    // ── Newline & Line Handling ───────────────────────────────────────────────

    /// Skip all consecutive newline tokens.
    pub(crate) fn skip_newlines(&mut self) {
        while self.check_exact(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// A section keyword immediately followed by `:`.
    pub(crate) fn at_section_header(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Section(_)) && self.look_ahead(1) == &TokenKind::Colon
    }

    /// The current token ends a free-text line.
    ///
    /// Inside a rule body a `}` also ends the line.
    pub(crate) fn at_line_end(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::Eof => true,
            TokenKind::RBrace => self.body_depth > 0,
            _ => self.at_section_header(),
        }
    }

    /// Consume tokens up to the end of the line and join their lexemes.
    pub(crate) fn free_text(&mut self) -> String {
        let start = self.pos;
        while !self.at_line_end() {
            self.advance();
        }
        join_lexemes(&self.tokens[start..self.pos])
    }

    // ── Errors ────────────────────────────────────────────────────────────────

    /// Build an error describing the current token.
    pub(crate) fn error_at_current(&self, code: ErrorCode, expected: &str) -> ParseError {
        ParseError::new(
            code,
            expected,
            self.peek_kind().to_string(),
            self.current_span().line,
        )
    }

    /// Expect a specific token kind.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check_exact(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, &kind.to_string()))
        }
    }

    /// Expect any word token (identifier, tag or keyword) and return its text.
    pub(crate) fn expect_word(&mut self, expected: &str) -> Result<String, ParseError> {
        if self.peek_kind().is_word() {
            Ok(self.advance().lexeme)
        } else {
            Err(self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, expected))
        }
    }

    // ── Lists ─────────────────────────────────────────────────────────────────

    /// Parse the body of a list section.
    ///
    /// Items are `-` prefixed and separated by any number of blank lines.
    /// Content on the header line itself is a single inline item. The list
    /// ends at the first token that is not a list marker.
    pub(crate) fn parse_list<T>(
        &mut self,
        item: fn(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();

        if !self.at_line_end() {
            self.eat(&TokenKind::Minus);
            items.push(item(self)?);
        }

        loop {
            self.skip_newlines();
            if !self.eat(&TokenKind::ListMarker) {
                break;
            }
            items.push(item(self)?);
        }

        Ok(items)
    }
}

/// Join token lexemes with single spaces.
///
/// Punctuation is glued: no space before `, . : ) ]`, none after `( [ .`,
/// and none before a `(` or `[` that directly follows a name or a closing
/// bracket (calls and indexing). A sign in operand position stays attached
/// to its number, so `x > -5` keeps the literal `-5`.
pub fn join_lexemes(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&TokenKind> = None;
    let mut glue_sign = false;
    for (i, token) in tokens.iter().enumerate() {
        let glue_before = match token.kind {
            TokenKind::Comma
            | TokenKind::Dot
            | TokenKind::Colon
            | TokenKind::RParen
            | TokenKind::RBracket => true,
            TokenKind::LParen | TokenKind::LBracket => matches!(
                prev,
                Some(TokenKind::Identifier(_) | TokenKind::RParen | TokenKind::RBracket)
            ),
            _ => false,
        };
        let glue_after_prev = matches!(
            prev,
            Some(TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot)
        );
        if !out.is_empty() && !glue_before && !glue_after_prev && !glue_sign {
            out.push(' ');
        }
        out.push_str(&token.lexeme);
        glue_sign = matches!(token.kind, TokenKind::Minus | TokenKind::ListMarker)
            && matches!(tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::Number(_)))
            && expects_operand(prev);
        prev = Some(&token.kind);
    }
    out
}

/// Whether a token after `prev` starts an operand rather than continuing one.
fn expects_operand(prev: Option<&TokenKind>) -> bool {
    match prev {
        None => true,
        Some(TokenKind::Identifier(word)) => {
            ["and", "or", "not"].iter().any(|w| word.eq_ignore_ascii_case(w))
        }
        Some(kind) => matches!(
            kind,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::ListMarker
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::EqEq
                | TokenKind::BangEq
                | TokenKind::LessEq
                | TokenKind::GreaterEq
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::Eq
                | TokenKind::FatArrow
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Pipe
                | TokenKind::If
                | TokenKind::Then
                | TokenKind::In
        ),
    }
}
