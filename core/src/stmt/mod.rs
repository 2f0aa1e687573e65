pub mod import;
mod stmt_impl;
pub mod stmt_parser;

#[cfg(test)]
mod stmt_recover_test;
#[cfg(test)]
mod stmt_test;
#[cfg(test)]
mod function_test;
#[cfg(test)]
mod import_parse_test;

pub use import::*;
pub use stmt_impl::*;
pub use stmt_parser::*;

use crate::token::{ParseError, Tokenizer};

/// Tokenize and parse `source`, returning the (possibly partial) tree and every
/// lexical and syntax error in source order.
pub fn parse_source(source: &str) -> (Program, Vec<ParseError>) {
    let lexed = Tokenizer::tokenize(source);
    let mut parser = StmtParser::new(&lexed.tokens, &lexed.spans);
    let program = parser.parse_program();
    let mut errors = lexed.errors;
    errors.extend(parser.into_errors());
    errors.sort_by(|a, b| a.span.start.cmp(&b.span.start));
    // an unclosed bracket is reported by both the lexer and the parser at the same spot
    errors.dedup_by(|a, b| a.message == b.message && a.span.start.line_col() == b.span.start.line_col());
    (program, errors)
}
