//! RULE list parsing: `IF ... THEN ...` leaves and nested FOR/WHILE bodies.

use omni_lexer::TokenKind;
use omni_types::ast::{LoopKind, LoopRule, Rule, RuleNode};
use omni_types::{ErrorCode, ParseError};

use crate::parser::{join_lexemes, Parser};

impl Parser {
    pub(crate) fn parse_rule_list(&mut self) -> Result<Vec<RuleNode>, ParseError> {
        self.parse_list(Self::parse_rule_item)
    }

    /// One rule list item, after its list marker.
    pub(crate) fn parse_rule_item(&mut self) -> Result<RuleNode, ParseError> {
        match self.peek_kind() {
            TokenKind::If => self.parse_if().map(RuleNode::Rule),
            TokenKind::For => self.parse_for().map(RuleNode::Loop),
            TokenKind::While => self.parse_while().map(RuleNode::Loop),
            _ => Err(self.error_at_current(ErrorCode::INVALID_RULE_START, "IF, FOR or WHILE")),
        }
    }

    /// `IF <condition> THEN <action>`
    fn parse_if(&mut self) -> Result<Rule, ParseError> {
        self.advance(); // IF
        let start = self.position();
        // Braces opened inside the condition (match expressions).
        let mut depth = 0u32;
        loop {
            match self.peek_kind() {
                TokenKind::Then => break,
                TokenKind::Newline | TokenKind::Eof => {
                    return Err(self.error_at_current(ErrorCode::MISSING_THEN, "THEN"));
                }
                TokenKind::RBrace if depth == 0 && self.body_depth > 0 => {
                    return Err(self.error_at_current(ErrorCode::MISSING_THEN, "THEN"));
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
        let condition = join_lexemes(self.tokens_between(start, self.position()));
        self.advance(); // THEN
        let action = self.free_text();
        Ok(Rule { condition, action })
    }

    /// `FOR <ident> IN <ident> { <rules> }`
    fn parse_for(&mut self) -> Result<LoopRule, ParseError> {
        self.advance(); // FOR
        let iterator = self.expect_word("iterator name")?;
        self.expect(&TokenKind::In)?;
        let collection = self.expect_word("collection name")?;
        self.expect(&TokenKind::LBrace)?;
        let body = self.parse_body()?;
        Ok(LoopRule {
            kind: LoopKind::For,
            iterator: Some(iterator),
            collection: Some(collection),
            condition: None,
            body,
        })
    }

    /// `WHILE <condition> { <rules> }`
    ///
    /// The condition may itself contain braces (a match expression), so the
    /// body opens at the last `{` on the header line that is followed by a
    /// line end or a list marker.
    fn parse_while(&mut self) -> Result<LoopRule, ParseError> {
        self.advance(); // WHILE
        let start = self.position();
        let mut open = None;
        let mut offset = 0;
        loop {
            match self.look_ahead(offset) {
                TokenKind::Newline | TokenKind::Eof => break,
                TokenKind::LBrace => {
                    if matches!(
                        self.look_ahead(offset + 1),
                        TokenKind::Newline
                            | TokenKind::Eof
                            | TokenKind::Minus
                            | TokenKind::ListMarker
                    ) {
                        open = Some(start + offset);
                    }
                }
                _ => {}
            }
            offset += 1;
        }

        let Some(open) = open else {
            self.seek(start + offset);
            return Err(self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "{"));
        };
        let condition = join_lexemes(self.tokens_between(start, open));
        self.seek(open + 1);
        let body = self.parse_body()?;
        Ok(LoopRule {
            kind: LoopKind::While,
            iterator: None,
            collection: None,
            condition: Some(condition),
            body,
        })
    }

    /// Rule items up to the closing `}`; the opening `{` is already consumed.
    ///
    /// Items use list markers; a `-` right after `{` on the same line also
    /// starts an item.
    fn parse_body(&mut self) -> Result<Vec<RuleNode>, ParseError> {
        self.body_depth += 1;
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek_kind() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(self.error_at_current(ErrorCode::UNCLOSED_BODY, "}"));
                }
                _ if self.at_section_header() => {
                    return Err(self.error_at_current(ErrorCode::UNCLOSED_BODY, "}"));
                }
                TokenKind::ListMarker | TokenKind::Minus => {
                    self.advance();
                    body.push(self.parse_rule_item()?);
                }
                _ => {
                    return Err(self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "'-' or '}'"));
                }
            }
        }
        self.body_depth -= 1;
        Ok(body)
    }
}
