//! OmniLang document parser: converts a token stream into a [`Policy`].
//!
//! The grammar is line oriented and not positional. Sections may appear in
//! any order and tokens outside a recognised section header are skipped.
//!
//! [`Policy`]: omni_types::ast::Policy

mod parse_rule;
mod parse_section;
mod parser;

pub use parser::{join_lexemes, parse, Parser};
