use super::StmtParser;
use crate::{
    ast::PResult,
    expr::{Expr, ExprKind},
    stmt::{ExceptHandler, Identifier, Stmt, StmtKind, WithItem},
    token::{Position, Token},
};

impl<'a> StmtParser<'a> {
    /// `if test: suite {elif test: suite} [else: suite]`
    pub fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.pos += 1; // consume 'if' or 'elif'
        let test = self.header_expr(|p| p.parse_named());
        self.expect_soft(&Token::Colon);
        let body = self.parse_suite("'if' statement");

        let orelse = if self.check(&Token::Elif) {
            vec![self.parse_if_stmt()?]
        } else if self.eat(&Token::Else) {
            self.expect_soft(&Token::Colon);
            self.parse_suite("'else' clause")
        } else {
            Vec::new()
        };

        Ok(Stmt::new(StmtKind::If { test, body, orelse }, self.span_from(start)))
    }

    /// `while test: suite [else: suite]`
    pub fn parse_while_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.pos += 1; // consume 'while'
        let test = self.header_expr(|p| p.parse_named());
        self.expect_soft(&Token::Colon);
        let body = self.parse_suite("'while' statement");
        let orelse = self.parse_else_clause();
        Ok(Stmt::new(StmtKind::While { test, body, orelse }, self.span_from(start)))
    }

    /// `[async] for targets in exprs: suite [else: suite]`
    pub fn parse_for_stmt(&mut self, is_async: bool, start: Position) -> PResult<Stmt> {
        self.expect(&Token::For)?;
        let target = self.with_expr(|p| p.parse_target_list())?;
        self.expect(&Token::In)?;
        let iter = self.header_expr(|p| p.parse_star_expressions());
        self.expect_soft(&Token::Colon);
        let body = self.parse_suite("'for' statement");
        let orelse = self.parse_else_clause();
        Ok(Stmt::new(
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            },
            self.span_from(start),
        ))
    }

    fn parse_else_clause(&mut self) -> Vec<Stmt> {
        if self.eat(&Token::Else) {
            self.expect_soft(&Token::Colon);
            self.parse_suite("'else' clause")
        } else {
            Vec::new()
        }
    }

    /// `try: suite (except [test [as name]]: suite)* [else: suite] [finally: suite]`
    pub fn parse_try_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.pos += 1; // consume 'try'
        self.expect_soft(&Token::Colon);
        let body = self.parse_suite("'try' statement");

        let mut handlers = Vec::new();
        while self.check(&Token::Except) {
            let handler_start = self.start_pos();
            self.pos += 1;
            self.eat(&Token::Star); // `except*` groups are checked like plain handlers
            let typ = if self.check(&Token::Colon) {
                None
            } else {
                Some(self.header_expr(|p| p.parse_test()))
            };
            let name = if self.eat(&Token::As) {
                let (name, span) = self.expect_name()?;
                Some(Identifier { name, span })
            } else {
                None
            };
            self.expect_soft(&Token::Colon);
            let handler_body = self.parse_suite("'except' clause");
            handlers.push(ExceptHandler {
                typ,
                name,
                body: handler_body,
                span: self.span_from(handler_start),
            });
        }

        let orelse = self.parse_else_clause();
        let finalbody = if self.eat(&Token::Finally) {
            self.expect_soft(&Token::Colon);
            self.parse_suite("'finally' clause")
        } else {
            Vec::new()
        };

        if handlers.is_empty() && finalbody.is_empty() {
            let err = self.err("Expected 'except' or 'finally' block");
            self.record(err);
        }

        Ok(Stmt::new(
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
            self.span_from(start),
        ))
    }

    /// `[async] with item {, item}: suite` where `item ::= test ['as' target]`
    pub fn parse_with_stmt(&mut self, is_async: bool, start: Position) -> PResult<Stmt> {
        self.expect(&Token::With)?;
        let mut items = Vec::new();
        loop {
            let context = self.header_expr(|p| p.parse_test());
            let vars = if self.eat(&Token::As) {
                Some(self.with_expr(|p| p.parse_bitor())?)
            } else {
                None
            };
            items.push(WithItem { context, vars });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect_soft(&Token::Colon);
        let body = self.parse_suite("'with' statement");
        Ok(Stmt::new(StmtKind::With { items, body, is_async }, self.span_from(start)))
    }

    /// `pass`, `break`, `continue`
    pub(super) fn parse_keyword_stmt(&mut self) -> PResult<Stmt> {
        let span = self.current_span();
        let kind = match self.peek() {
            Token::Pass => StmtKind::Pass,
            Token::Break => StmtKind::Break,
            _ => StmtKind::Continue,
        };
        self.pos += 1;
        Ok(Stmt::new(kind, span))
    }

    /// `return [exprs]`
    pub(super) fn parse_return_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.pos += 1; // consume 'return'
        let value = if self.starts_expression() {
            Some(self.expr_or_error(|p| p.parse_star_expressions()))
        } else {
            None
        };
        Ok(Stmt::new(StmtKind::Return(value), self.span_from(start)))
    }

    /// `del target {, target}`
    pub(super) fn parse_del_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.pos += 1; // consume 'del'
        let targets = self.with_expr(|p| p.parse_target_list())?;
        let targets = match targets.kind {
            ExprKind::Tuple(items) => items,
            _ => vec![targets],
        };
        Ok(Stmt::new(StmtKind::Delete(targets), self.span_from(start)))
    }

    /// `assert test [, msg]`
    pub(super) fn parse_assert_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.pos += 1; // consume 'assert'
        let test = self.expr_or_error(|p| p.parse_test());
        let msg = if self.eat(&Token::Comma) {
            Some(self.expr_or_error(|p| p.parse_test()))
        } else {
            None
        };
        Ok(Stmt::new(StmtKind::Assert { test, msg }, self.span_from(start)))
    }

    /// `raise [exc [from cause]]`
    pub(super) fn parse_raise_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.pos += 1; // consume 'raise'
        let mut cause = None;
        let exc = if self.starts_expression() {
            let exc: Expr = self.expr_or_error(|p| p.parse_test());
            if self.eat(&Token::From) {
                cause = Some(self.expr_or_error(|p| p.parse_test()));
            }
            Some(exc)
        } else {
            None
        };
        Ok(Stmt::new(StmtKind::Raise { exc, cause }, self.span_from(start)))
    }

    pub(super) fn starts_expression(&self) -> bool {
        crate::ast::Parser::at(self.tokens, self.spans, self.pos).starts_expression()
    }
}
