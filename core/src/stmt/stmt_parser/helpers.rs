use super::StmtParser;
use crate::{
    ast::{PResult, Parser as ExprParser},
    expr::Expr,
    token::{ParseError, Position, Span, Token},
};

impl<'a> StmtParser<'a> {
    /// Expression parser positioned at the current token.
    fn cursor(&self) -> ExprParser<'a> {
        ExprParser::at(self.tokens, self.spans, self.pos)
    }

    pub(super) fn peek(&self) -> &'a Token {
        self.cursor().peek()
    }

    pub(super) fn peek_ahead(&self, offset: usize) -> &'a Token {
        self.cursor().peek_ahead(offset)
    }

    pub(super) fn check(&self, token: &Token) -> bool {
        self.cursor().check(token)
    }

    pub(super) fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// True at `ENDMARKER` or past the end of the stream.
    pub(super) fn at_end(&self) -> bool {
        self.pos >= self.len || self.check(&Token::EndOfFile)
    }

    pub(super) fn current_span(&self) -> Span {
        self.cursor().current_span()
    }

    pub(super) fn start_pos(&self) -> Position {
        self.cursor().start_pos()
    }

    pub(super) fn span_from(&self, start: Position) -> Span {
        self.cursor().span_from(start)
    }

    pub(super) fn err(&self, msg: &str) -> ParseError {
        self.cursor().err(msg)
    }

    pub(super) fn record(&mut self, err: ParseError) {
        self.errors.push(err);
    }

    pub(super) fn expect(&mut self, expected: &Token) -> PResult<Span> {
        self.with_expr(|p| p.expect(expected))
    }

    /// A missing token is reported and parsing continues as if it were present.
    pub(super) fn expect_soft(&mut self, expected: &Token) {
        if let Err(e) = self.expect(expected) {
            self.record(e);
        }
    }

    pub(super) fn expect_name(&mut self) -> PResult<(String, Span)> {
        self.with_expr(|p| p.expect_name())
    }

    /// Run an expression-level parse at the current position, then adopt its
    /// final position and any errors it recovered from.
    pub(super) fn with_expr<T>(&mut self, f: impl FnOnce(&mut ExprParser<'a>) -> PResult<T>) -> PResult<T> {
        let mut parser = self.cursor();
        let result = f(&mut parser);
        self.pos = parser.pos();
        self.errors.extend(parser.take_errors());
        result
    }

    /// Like [`StmtParser::with_expr`] but a failure becomes an `Expr::Error` node
    /// covering the rest of the logical line.
    pub(super) fn expr_or_error(&mut self, f: impl FnOnce(&mut ExprParser<'a>) -> PResult<Expr>) -> Expr {
        let start = self.start_pos();
        match self.with_expr(f) {
            Ok(expr) => expr,
            Err(e) => {
                self.record(e);
                self.skip_to_line_end();
                Expr::error(self.span_from(start))
            }
        }
    }

    /// Header expressions (`if x:`, `while x:`): stop the error node before `:`
    /// so the suite after it still parses.
    pub(super) fn header_expr(&mut self, f: impl FnOnce(&mut ExprParser<'a>) -> PResult<Expr>) -> Expr {
        let start = self.start_pos();
        match self.with_expr(f) {
            Ok(expr) => expr,
            Err(e) => {
                self.record(e);
                while !self.at_end() && !self.check(&Token::Newline) && !self.check(&Token::Colon) {
                    self.pos += 1;
                }
                Expr::error(self.span_from(start))
            }
        }
    }

    /// Advance to the `NEWLINE` ending the current logical line without consuming it.
    pub(super) fn skip_to_line_end(&mut self) {
        while !self.at_end() && !self.check(&Token::Newline) {
            self.pos += 1;
        }
    }
}
