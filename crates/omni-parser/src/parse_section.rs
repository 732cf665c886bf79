//! Section sub-parsers: INTENT, ACTOR, CONTEXT, ASSUMPTION, the tagged
//! CONSTRAINT / IMPACT / TRACE lists and REVIEW.

use omni_lexer::{Tag, TokenKind};
use omni_types::ast::{Actor, Context, Review, TaggedEntry};
use omni_types::ParseError;

use crate::parser::Parser;

impl Parser {
    /// `INTENT: <free text>`. The text may start on the following line.
    pub(crate) fn parse_intent(&mut self) -> Option<String> {
        self.skip_newlines();
        let text = self.free_text();
        (!text.is_empty()).then_some(text)
    }

    pub(crate) fn parse_assumptions(&mut self) -> Result<Vec<String>, ParseError> {
        self.parse_list(|p| Ok(p.free_text()))
    }

    /// `- Primary: Operator`, `- Secondary: Auditor` or just `- Operator`.
    pub(crate) fn parse_actors(&mut self) -> Result<Vec<Actor>, ParseError> {
        self.parse_list(Self::parse_actor)
    }

    fn parse_actor(&mut self) -> Result<Actor, ParseError> {
        let is_primary = match self.peek_kind() {
            TokenKind::Tag(Tag::Primary) if self.look_ahead(1) == &TokenKind::Colon => Some(true),
            TokenKind::Tag(Tag::Secondary) if self.look_ahead(1) == &TokenKind::Colon => {
                Some(false)
            }
            _ => None,
        };
        if is_primary.is_some() {
            self.advance(); // tag
            self.advance(); // ':'
        }
        Ok(Actor {
            role: self.free_text(),
            is_primary: is_primary.unwrap_or(false),
        })
    }

    /// `- Domain: ...`, `- Location: ...`, `- Phase: ...` or any other
    /// `key: value` pair, which is kept in [`Context::extra`].
    pub(crate) fn parse_context(&mut self) -> Result<Context, ParseError> {
        let mut context = Context::default();
        for (key, value) in self.parse_list(Self::parse_key_value)? {
            match key.as_str() {
                "Domain" => context.domain = Some(value),
                "Location" => context.location = Some(value),
                "Phase" => context.phase = Some(value),
                _ => context.extra.push((key, value)),
            }
        }
        Ok(context)
    }

    /// `- <tag|identifier>: text`; untagged items get the `Unknown` kind.
    pub(crate) fn parse_tagged(&mut self) -> Result<Vec<TaggedEntry>, ParseError> {
        let entries = self.parse_list(Self::parse_key_value)?;
        Ok(entries
            .into_iter()
            .map(|(kind, description)| TaggedEntry { kind, description })
            .collect())
    }

    /// A `key: value` list item. Without a leading word and colon the whole
    /// line is the value and the key is `Unknown`.
    fn parse_key_value(&mut self) -> Result<(String, String), ParseError> {
        let key = if self.peek_kind().is_word() && self.look_ahead(1) == &TokenKind::Colon {
            let key = self.advance().lexeme;
            self.advance(); // ':'
            key
        } else {
            TaggedEntry::UNKNOWN_KIND.to_string()
        };
        Ok((key, self.free_text()))
    }

    /// Review items are scanned for `interval:` and then `criteria:`.
    ///
    /// Only the first marker found is recovered; the rest of the line after
    /// it becomes that field's value.
    pub(crate) fn parse_reviews(&mut self) -> Result<Vec<Review>, ParseError> {
        self.parse_list(|p| Ok(review_from_line(&p.free_text())))
    }
}

fn review_from_line(line: &str) -> Review {
    let lower = line.to_lowercase();
    let value_after = |marker: &str| -> Option<String> {
        let idx = lower.find(marker)?;
        // Lowercasing can shift byte offsets for non-ASCII text.
        let rest = line.get(idx + marker.len()..)?;
        Some(rest.trim().to_string())
    };

    if let Some(interval) = value_after("interval:") {
        Review {
            interval: Some(interval),
            criteria: None,
        }
    } else if let Some(criteria) = value_after("criteria:") {
        Review {
            interval: None,
            criteria: Some(criteria),
        }
    } else {
        Review::default()
    }
}
