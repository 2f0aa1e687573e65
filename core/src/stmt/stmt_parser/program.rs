use super::StmtParser;
use crate::{
    ast::PResult,
    stmt::{Program, Stmt},
    token::{ParseError, Position, Token},
};

impl<'a> StmtParser<'a> {
    /// Parse the whole module. Never fails: syntax errors are collected in
    /// [`StmtParser::errors`] and malformed regions become `Stmt::Error` nodes.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        loop {
            statements.extend(self.parse_statements_until_dedent());
            // A dedent at module level closes an unexpected indent that was already reported.
            if self.eat(&Token::Dedent) {
                continue;
            }
            break;
        }
        Program::new(statements)
    }

    /// Statements of one block, stopping before the closing `DEDENT` or at end of input.
    pub(super) fn parse_statements_until_dedent(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.at_end() && !self.check(&Token::Dedent) {
            match self.peek() {
                Token::Newline | Token::Semicolon => {
                    self.pos += 1;
                }
                Token::Indent => {
                    let span = self.current_span();
                    self.record(ParseError::with_span("Unexpected indentation", span));
                    self.pos += 1;
                    statements.extend(self.parse_statements_until_dedent());
                    self.eat(&Token::Dedent);
                }
                _ => {
                    let before = self.pos;
                    statements.extend(self.parse_statement());
                    if self.pos == before {
                        // Nothing consumed: drop the token so the loop always makes progress.
                        let span = self.current_span();
                        self.record(ParseError::with_span(
                            format!("Unexpected token {}", self.peek().describe()),
                            span,
                        ));
                        self.pos += 1;
                    }
                }
            }
        }
        statements
    }

    /// One logical statement: a compound statement, or a `;`-separated line of simple ones.
    pub fn parse_statement(&mut self) -> Vec<Stmt> {
        let start = self.start_pos();
        let result = match self.peek() {
            Token::If => self.parse_if_stmt(),
            Token::While => self.parse_while_stmt(),
            Token::For => self.parse_for_stmt(false, start),
            Token::Try => self.parse_try_stmt(),
            Token::With => self.parse_with_stmt(false, start),
            Token::Def => self.parse_function_stmt(Vec::new(), false, start),
            Token::Class => self.parse_class_stmt(Vec::new(), start),
            Token::At => self.parse_decorated(),
            Token::Async => self.parse_async_stmt(),
            _ => return self.parse_simple_line(),
        };
        vec![self.recover_compound(result, start)]
    }

    fn parse_async_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.pos += 1; // consume 'async'
        match self.peek() {
            Token::Def => self.parse_function_stmt(Vec::new(), true, start),
            Token::For => self.parse_for_stmt(true, start),
            Token::With => self.parse_with_stmt(true, start),
            other => Err(self.err(&format!(
                "Expected 'def', 'for' or 'with' after 'async', found {}",
                other.describe()
            ))),
        }
    }

    /// A compound statement whose header could not be parsed: report, skip the rest
    /// of the header line and swallow the indented block that belongs to it.
    fn recover_compound(&mut self, result: PResult<Stmt>, start: Position) -> Stmt {
        match result {
            Ok(stmt) => stmt,
            Err(err) => {
                self.record(err);
                self.skip_to_line_end();
                self.eat(&Token::Newline);
                if self.eat(&Token::Indent) {
                    let _ = self.parse_statements_until_dedent();
                    self.eat(&Token::Dedent);
                }
                Stmt::error(self.span_from(start))
            }
        }
    }

    /// `simple_stmt {';' simple_stmt} NEWLINE`
    pub(super) fn parse_simple_line(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        loop {
            let start = self.start_pos();
            match self.parse_simple_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.record(err);
                    self.skip_to_line_end();
                    statements.push(Stmt::error(self.span_from(start)));
                }
            }
            if self.eat(&Token::Semicolon) {
                if self.check(&Token::Newline) || self.at_end() {
                    break;
                }
                continue;
            }
            break;
        }

        if !self.eat(&Token::Newline) && !self.at_end() && !self.check(&Token::Dedent) {
            let err = self.err("Simple statements must be separated by newlines or semicolons");
            self.record(err);
            let start = self.start_pos();
            self.skip_to_line_end();
            statements.push(Stmt::error(self.span_from(start)));
            self.eat(&Token::Newline);
        }
        statements
    }

    fn parse_simple_statement(&mut self) -> PResult<Stmt> {
        match self.peek() {
            Token::Pass | Token::Break | Token::Continue => self.parse_keyword_stmt(),
            Token::Return => self.parse_return_stmt(),
            Token::Del => self.parse_del_stmt(),
            Token::Global | Token::Nonlocal => self.parse_scope_decl_stmt(),
            Token::Assert => self.parse_assert_stmt(),
            Token::Raise => self.parse_raise_stmt(),
            Token::Import => self.parse_import_stmt(),
            Token::From => self.parse_from_import_stmt(),
            _ => self.parse_expr_or_assign_stmt(),
        }
    }
}
