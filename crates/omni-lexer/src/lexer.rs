//! Core OmniLang lexer: converts policy text to a token stream.
//!
//! Features:
//! - Section keywords and control keywords (case-insensitive)
//! - Fixed vocabulary tags, including the hyphenated `Trade-off`
//! - Number and double-quoted string literals
//! - `//` and `#` comments stripped
//! - Newlines are tokens; a leading `-` on a line is a list marker
//! - Fails fast on the first character no pattern accepts

use omni_types::{ErrorCode, LexError, Span};

use crate::token::{Section, Tag, Token, TokenKind};

/// Tokenize a whole document.
///
/// The returned stream always ends with [`TokenKind::Eof`].
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(text).tokenize()
}

/// The OmniLang lexer.
pub struct Lexer {
    chars: Vec<char>,
    /// Current index into `chars`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// No token has been emitted yet on the current line.
    at_line_start: bool,
}

impl Lexer {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            at_line_start: true,
        }
    }

    /// Lex the entire input into a token stream.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            self.at_line_start = token.kind == TokenKind::Newline;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn text_from(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn error(&self, code: ErrorCode, span: Span, ch: char) -> LexError {
        LexError::new(code, span.line, span.col, ch)
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces, tabs and carriage returns (not newlines, which are tokens).
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip a `// ...` or `# ...` comment up to (not including) the newline.
    fn skip_comment(&mut self) -> bool {
        let is_comment = self.peek() == Some('#')
            || (self.peek() == Some('/') && self.peek_at(1) == Some('/'));
        if is_comment {
            while let Some(ch) = self.peek() {
                if ch == '\n' {
                    break;
                }
                self.advance();
            }
        }
        is_comment
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_whitespace();
            if !self.skip_comment() {
                break;
            }
        }

        let span = Span::new(self.line, self.col);
        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, "", span));
        };

        let kind = match ch {
            '\n' => TokenKind::Newline,
            '"' => return self.scan_string(start, span),
            c if c.is_ascii_digit() => return Ok(self.scan_number(start, span)),
            c if c.is_alphabetic() || c == '_' => return Ok(self.scan_word(start, span)),

            '-' if self.at_line_start => TokenKind::ListMarker,
            '-' => TokenKind::Minus,
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::EqEq
                }
                Some('>') => {
                    self.advance();
                    TokenKind::FatArrow
                }
                _ => TokenKind::Eq,
            },
            '!' if self.peek() == Some('=') => {
                self.advance();
                TokenKind::BangEq
            }
            '<' if self.peek() == Some('=') => {
                self.advance();
                TokenKind::LessEq
            }
            '>' if self.peek() == Some('=') => {
                self.advance();
                TokenKind::GreaterEq
            }
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '|' => TokenKind::Pipe,
            other => return Err(self.error(ErrorCode::UNEXPECTED_CHARACTER, span, other)),
        };
        Ok(Token::new(kind, self.text_from(start), span))
    }

    /// `\d+(\.\d+)?`. The first digit is already consumed.
    fn scan_number(&mut self, start: usize, span: Span) -> Token {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            self.advance(); // consume '.'
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = self.text_from(start);
        let value = text.parse().unwrap_or(0.0);
        Token::new(TokenKind::Number(value), text, span)
    }

    /// A word, classified in priority order: section keyword, control
    /// keyword, vocabulary tag, identifier.
    fn scan_word(&mut self, start: usize, span: Span) -> Token {
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        // `Trade-off` is the only tag containing a hyphen. It wins only when
        // `-off` ends on a word boundary, so `Trade-offset` stays three tokens.
        if self.text_from(start) == "Trade"
            && self.peek() == Some('-')
            && self.peek_at(1) == Some('o')
            && self.peek_at(2) == Some('f')
            && self.peek_at(3) == Some('f')
            && !matches!(self.peek_at(4), Some(c) if c.is_alphanumeric() || c == '_')
        {
            for _ in 0..4 {
                self.advance();
            }
        }

        let text = self.text_from(start);
        let kind = if let Some(section) = Section::from_word(&text) {
            TokenKind::Section(section)
        } else if let Some(control) = TokenKind::from_control_word(&text) {
            control
        } else if let Some(tag) = Tag::from_word(&text) {
            TokenKind::Tag(tag)
        } else {
            TokenKind::Identifier(text.clone())
        };
        Token::new(kind, text, span)
    }

    /// Scan a string literal; the opening `"` is already consumed.
    /// Supports `\"` and `\\` escapes. Strings may not span lines.
    fn scan_string(&mut self, start: usize, span: Span) -> Result<Token, LexError> {
        let mut buf = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error(ErrorCode::UNTERMINATED_STRING, span, '"'));
                }
                Some('"') => {
                    self.advance();
                    return Ok(Token::new(TokenKind::Str(buf), self.text_from(start), span));
                }
                Some('\\') if matches!(self.peek_at(1), Some('"' | '\\')) => {
                    self.advance();
                    if let Some(escaped) = self.advance() {
                        buf.push(escaped);
                    }
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_input_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_lexeme_is_source_slice() {
        let tokens = tokenize("\"Ready\" 3.50").unwrap();
        assert_eq!(tokens[0].lexeme, "\"Ready\"");
        assert_eq!(tokens[0].kind, TokenKind::Str("Ready".into()));
        assert_eq!(tokens[1].lexeme, "3.50");
    }

    #[test]
    fn test_number_without_fraction_leaves_dot() {
        assert_eq!(
            kinds("3."),
            vec![TokenKind::Number(3.0), TokenKind::Dot, TokenKind::Eof]
        );
    }
}
