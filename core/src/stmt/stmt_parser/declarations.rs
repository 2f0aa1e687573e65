use super::StmtParser;
use crate::{
    ast::PResult,
    stmt::{ClassDef, Identifier, Stmt, StmtKind},
    token::{Position, Token},
};

impl<'a> StmtParser<'a> {
    /// `class Name[(bases)]: suite`
    pub fn parse_class_stmt(&mut self, decorators: Vec<crate::expr::Expr>, start: Position) -> PResult<Stmt> {
        self.expect(&Token::Class)?;
        let (name, name_span) = self.expect_name()?;

        let bases = if self.eat(&Token::LParen) {
            let args = self.with_expr(|p| p.parse_call_args())?;
            self.expect_soft(&Token::RParen);
            args
        } else {
            Vec::new()
        };

        self.expect_soft(&Token::Colon);
        let body = self.parse_suite("class definition");

        Ok(Stmt::new(
            StmtKind::ClassDef(Box::new(ClassDef {
                name,
                name_span,
                bases,
                body,
                decorators,
            })),
            self.span_from(start),
        ))
    }

    /// `@decorator NEWLINE` lines followed by a function or class definition.
    pub(super) fn parse_decorated(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        let mut decorators = Vec::new();
        while self.eat(&Token::At) {
            decorators.push(self.expr_or_error(|p| p.parse_named()));
            self.expect_soft(&Token::Newline);
        }
        match self.peek() {
            Token::Def => self.parse_function_stmt(decorators, false, start),
            Token::Class => self.parse_class_stmt(decorators, start),
            Token::Async if self.peek_ahead(1) == &Token::Def => {
                self.pos += 1;
                self.parse_function_stmt(decorators, true, start)
            }
            other => Err(self.err(&format!(
                "Expected a function or class definition after decorator, found {}",
                other.describe()
            ))),
        }
    }

    /// `global a, b` / `nonlocal a, b`
    pub(super) fn parse_scope_decl_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        let is_global = self.check(&Token::Global);
        self.pos += 1;
        let mut names = Vec::new();
        loop {
            let (name, span) = self.expect_name()?;
            names.push(Identifier { name, span });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        let kind = if is_global {
            StmtKind::Global(names)
        } else {
            StmtKind::Nonlocal(names)
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }
}
