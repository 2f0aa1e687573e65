use super::StmtParser;
use crate::{
    ast::PResult,
    stmt::{Alias, ImportStmt, Stmt, StmtKind},
    token::{Span, Token},
};

impl<'a> StmtParser<'a> {
    /// `import a.b [as c] {, ...}`
    pub fn parse_import_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.expect(&Token::Import)?;
        let mut names = Vec::new();
        loop {
            let (name, span) = self.parse_dotted_name()?;
            let (asname, asname_span) = self.parse_as_name()?;
            names.push(Alias {
                name,
                span,
                asname,
                asname_span,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(Stmt::new(StmtKind::Import(ImportStmt::Modules { names }), self.span_from(start)))
    }

    /// - `from m import a [as b], c`
    /// - `from m import (a, b,)`
    /// - `from ..pkg import *`
    pub fn parse_from_import_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        self.expect(&Token::From)?;

        let mut level = 0u32;
        loop {
            match self.peek() {
                Token::Dot => level += 1,
                Token::Ellipsis => level += 3,
                _ => break,
            }
            self.pos += 1;
        }
        let (module, module_span) = if matches!(self.peek(), Token::Name(_)) {
            let (name, span) = self.parse_dotted_name()?;
            (Some(name), Some(span))
        } else {
            if level == 0 {
                return Err(self.err(&format!("Expected a module name, found {}", self.peek().describe())));
            }
            (None, None)
        };

        self.expect(&Token::Import)?;

        let mut names = Vec::new();
        let mut wildcard = false;
        if self.eat(&Token::Star) {
            wildcard = true;
        } else {
            let parenthesized = self.eat(&Token::LParen);
            loop {
                if parenthesized && self.check(&Token::RParen) {
                    break;
                }
                let (name, span) = self.expect_name()?;
                let (asname, asname_span) = self.parse_as_name()?;
                names.push(Alias {
                    name,
                    span,
                    asname,
                    asname_span,
                });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            if parenthesized {
                self.expect_soft(&Token::RParen);
            }
        }

        Ok(Stmt::new(
            StmtKind::Import(ImportStmt::From {
                module,
                module_span,
                level,
                names,
                wildcard,
            }),
            self.span_from(start),
        ))
    }

    fn parse_dotted_name(&mut self) -> PResult<(String, Span)> {
        let (mut name, first) = self.expect_name()?;
        let mut span = first;
        while self.check(&Token::Dot) && matches!(self.peek_ahead(1), Token::Name(_)) {
            self.pos += 1;
            let (part, part_span) = self.expect_name()?;
            name.push('.');
            name.push_str(&part);
            span = span.cover(&part_span);
        }
        Ok((name, span))
    }

    fn parse_as_name(&mut self) -> PResult<(Option<String>, Option<Span>)> {
        if self.eat(&Token::As) {
            let (name, span) = self.expect_name()?;
            return Ok((Some(name), Some(span)));
        }
        Ok((None, None))
    }
}
