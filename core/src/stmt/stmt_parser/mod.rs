use crate::token::{ParseError, Span, Token};

/// Recovering statement parser over the token stream produced by the tokenizer.
/// Errors are collected rather than returned; the resulting tree is always usable.
pub struct StmtParser<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) spans: &'a [Span],
    pub(crate) pos: usize,
    pub(crate) len: usize,
    pub(crate) errors: Vec<ParseError>,
}

impl<'a> StmtParser<'a> {
    pub fn new(tokens: &'a [Token], spans: &'a [Span]) -> Self {
        let len = tokens.len();
        Self {
            tokens,
            spans,
            pos: 0,
            len,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

mod bindings;
mod blocks;
mod control;
mod declarations;
mod function;
mod helpers;
mod imports;
mod program;
