//! OmniLang lexer: converts policy text into a token stream.

pub mod lexer;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use token::{Section, Tag, Token, TokenKind, SECTION_KEYWORDS};
