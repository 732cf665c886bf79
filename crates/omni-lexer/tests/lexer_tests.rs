//! Lexer tests: keywords, tags, literals, operators, list markers,
//! comments, line tracking and error reporting.

use omni_lexer::{tokenize, Section, Tag, TokenKind, SECTION_KEYWORDS};
use omni_types::ErrorCode;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .unwrap()
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.into())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_all_section_keywords() {
    for &kw in SECTION_KEYWORDS {
        let ks = kinds(kw);
        assert_eq!(ks.len(), 1, "{kw}");
        assert!(matches!(ks[0], TokenKind::Section(_)), "{kw}");
    }
}

#[test]
fn test_section_keywords_case_insensitive() {
    assert_eq!(kinds("intent"), vec![TokenKind::Section(Section::Intent)]);
    assert_eq!(kinds("Rule"), vec![TokenKind::Section(Section::Rule)]);
}

#[test]
fn test_control_keywords() {
    assert_eq!(
        kinds("IF then For while in"),
        vec![
            TokenKind::If,
            TokenKind::Then,
            TokenKind::For,
            TokenKind::While,
            TokenKind::In,
        ]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    assert_eq!(kinds("IFFY"), vec![ident("IFFY")]);
    assert_eq!(kinds("Rules"), vec![ident("Rules")]);
    assert_eq!(kinds("Intention"), vec![ident("Intention")]);
}

// ─────────────────────────────────────────────────────────────────────
// Tags
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_tags() {
    assert_eq!(
        kinds("Primary Legal Evidence"),
        vec![
            TokenKind::Tag(Tag::Primary),
            TokenKind::Tag(Tag::Legal),
            TokenKind::Tag(Tag::Evidence),
        ]
    );
}

#[test]
fn test_tags_case_sensitive() {
    assert_eq!(kinds("primary"), vec![ident("primary")]);
}

#[test]
fn test_trade_off_tag() {
    assert_eq!(
        kinds("Trade-off: cost"),
        vec![
            TokenKind::Tag(Tag::TradeOff),
            TokenKind::Colon,
            ident("cost"),
        ]
    );
}

#[test]
fn test_trade_off_needs_word_boundary() {
    assert_eq!(
        kinds("Trade-offset"),
        vec![ident("Trade"), TokenKind::Minus, ident("offset")]
    );
    assert_eq!(kinds("Trade"), vec![ident("Trade")]);
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("90 0.75 45.0"),
        vec![
            TokenKind::Number(90.0),
            TokenKind::Number(0.75),
            TokenKind::Number(45.0),
        ]
    );
}

#[test]
fn test_string_keeps_quotes_in_lexeme() {
    let tokens = tokenize(r#""Ready""#).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Str("Ready".into()));
    assert_eq!(tokens[0].lexeme, r#""Ready""#);
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""say \"hi\"""#),
        vec![TokenKind::Str("say \"hi\"".into())]
    );
}

#[test]
fn test_unicode_words_are_identifiers() {
    assert_eq!(kinds("Kota Bandung"), vec![ident("Kota"), ident("Bandung")]);
    assert_eq!(kinds("Zürich"), vec![ident("Zürich")]);
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comparison_operators() {
    assert_eq!(
        kinds("a == b != c <= d >= e < f > g = h"),
        vec![
            ident("a"),
            TokenKind::EqEq,
            ident("b"),
            TokenKind::BangEq,
            ident("c"),
            TokenKind::LessEq,
            ident("d"),
            TokenKind::GreaterEq,
            ident("e"),
            TokenKind::Less,
            ident("f"),
            TokenKind::Greater,
            ident("g"),
            TokenKind::Eq,
            ident("h"),
        ]
    );
}

#[test]
fn test_fat_arrow_and_pipe() {
    assert_eq!(
        kinds("|x| x => _"),
        vec![
            TokenKind::Pipe,
            ident("x"),
            TokenKind::Pipe,
            ident("x"),
            TokenKind::FatArrow,
            ident("_"),
        ]
    );
}

#[test]
fn test_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] : , . + * / %"),
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Colon,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Plus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// List markers & newlines
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_leading_dash_is_list_marker() {
    assert_eq!(
        kinds("  - x - 1"),
        vec![
            TokenKind::ListMarker,
            ident("x"),
            TokenKind::Minus,
            TokenKind::Number(1.0),
        ]
    );
}

#[test]
fn test_list_marker_after_newline() {
    assert_eq!(
        kinds("a\n- b"),
        vec![
            ident("a"),
            TokenKind::Newline,
            TokenKind::ListMarker,
            ident("b"),
        ]
    );
}

#[test]
fn test_line_numbers() {
    let tokens = tokenize("INTENT:\n\n  Keep safe").unwrap();
    let keep = tokens.iter().find(|t| t.lexeme == "Keep").unwrap();
    assert_eq!(keep.line(), 3);
    assert_eq!(keep.span.col, 3);
}

#[test]
fn test_stream_ends_with_eof() {
    let tokens = tokenize("RULE:\n").unwrap();
    assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

// ─────────────────────────────────────────────────────────────────────
// Comments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comments_are_discarded() {
    assert_eq!(
        kinds("a // trailing\n# whole line\nb"),
        vec![ident("a"), TokenKind::Newline, TokenKind::Newline, ident("b")]
    );
}

#[test]
fn test_single_slash_is_operator() {
    assert_eq!(
        kinds("a / b"),
        vec![ident("a"), TokenKind::Slash, ident("b")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_character() {
    let err = tokenize("INTENT: ok\nbad @ here").unwrap_err();
    assert_eq!(err.code, ErrorCode::UNEXPECTED_CHARACTER);
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 5);
    assert_eq!(err.character, '@');
}

#[test]
fn test_lone_bang_is_error() {
    let err = tokenize("!x").unwrap_err();
    assert_eq!(err.character, '!');
}

#[test]
fn test_unterminated_string() {
    let err = tokenize("\"open\nnext").unwrap_err();
    assert_eq!(err.code, ErrorCode::UNTERMINATED_STRING);
    assert_eq!(err.line, 1);
}

#[test]
fn test_determinism() {
    let src = "RULE:\n- IF match Status { \"Ready\" => true, _ => false } THEN Display \"ok\"\n";
    let first = tokenize(src).unwrap();
    for _ in 0..20 {
        assert_eq!(tokenize(src).unwrap(), first);
    }
}
