use super::StmtParser;
use crate::{
    ast::PResult,
    expr::Expr,
    stmt::{FunctionDef, Stmt, StmtKind},
    token::{Position, Token},
};

impl<'a> StmtParser<'a> {
    /// `[async] def name(params) [-> returns]: suite`
    pub fn parse_function_stmt(&mut self, decorators: Vec<Expr>, is_async: bool, start: Position) -> PResult<Stmt> {
        self.expect(&Token::Def)?;
        let (name, name_span) = self.expect_name()?;

        let params = if self.eat(&Token::LParen) {
            let params = self.with_expr(|p| p.parse_parameters(false, &Token::RParen))?;
            self.expect_soft(&Token::RParen);
            params
        } else {
            let err = self.err(&format!("Expected '(', found {}", self.peek().describe()));
            self.record(err);
            Default::default()
        };

        let returns = if self.eat(&Token::Arrow) {
            Some(self.header_expr(|p| p.parse_test()))
        } else {
            None
        };

        self.expect_soft(&Token::Colon);
        let body = self.parse_suite("function definition");

        Ok(Stmt::new(
            StmtKind::FunctionDef(Box::new(FunctionDef {
                name,
                name_span,
                params,
                returns,
                body,
                decorators,
                is_async,
            })),
            self.span_from(start),
        ))
    }
}
