use super::StmtParser;
use crate::{stmt::Stmt, token::Token};

impl<'a> StmtParser<'a> {
    /// Body of a compound statement, after its `:`.
    ///
    /// - `NEWLINE INDENT statement+ DEDENT`
    /// - a simple statement line on the header's own line
    ///
    /// A missing block is reported and yields an empty body.
    pub(super) fn parse_suite(&mut self, owner: &str) -> Vec<Stmt> {
        if self.eat(&Token::Newline) {
            if self.eat(&Token::Indent) {
                let body = self.parse_statements_until_dedent();
                self.eat(&Token::Dedent);
                return body;
            }
            let err = self.err(&format!("Expected an indented block after {}", owner));
            self.record(err);
            return Vec::new();
        }
        if self.at_end() {
            let err = self.err(&format!("Expected an indented block after {}", owner));
            self.record(err);
            return Vec::new();
        }
        self.parse_simple_line()
    }
}
