use crate::{
    token::{ParseError, Span},
    typ::TypeError,
};
use serde::Serialize;
use std::fmt;

pub const PARSE_ERROR_CODE: &str = "parse-error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// A reported problem, flattened into the record shape handed to callers.
/// Lines and columns are 1-indexed; the end position is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub message: String,
    pub severity: Severity,
    pub code: String,
}

impl Diagnostic {
    pub fn new(span: Span, severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            start_line: span.start.line,
            start_column: span.start.column,
            end_line: span.end.line,
            end_column: span.end.column,
            message: message.into(),
            severity,
            code: code.into(),
        }
    }

    pub fn error(span: Span, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(span, Severity::Error, code, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Sort key: position first, then code and message so equal spans stay stable.
    fn sort_key(&self) -> (u32, u32, u32, u32, &str, &str) {
        (
            self.start_line,
            self.start_column,
            self.end_line,
            self.end_column,
            self.code.as_str(),
            self.message.as_str(),
        )
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        Diagnostic::error(err.span, PARSE_ERROR_CODE, format!("Parse error: {}", err.message))
    }
}

impl From<TypeError> for Diagnostic {
    fn from(err: TypeError) -> Self {
        Diagnostic::error(err.span, err.code.as_str(), err.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {} [{}]",
            self.start_line, self.start_column, self.severity, self.message, self.code
        )
    }
}

/// Order diagnostics by position, drop exact duplicates and keep at most `limit`.
pub fn normalize(mut diagnostics: Vec<Diagnostic>, limit: usize) -> Vec<Diagnostic> {
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    diagnostics.dedup();
    diagnostics.truncate(limit);
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Position;
    use crate::typ::ErrorCode;

    fn span(line: u32, start: u32, end: u32) -> Span {
        Span::new(Position::new(line, start, 0), Position::new(line, end, 0))
    }

    #[test]
    fn parse_errors_become_parse_error_diagnostics() {
        let d: Diagnostic = ParseError::with_span("Expected ':'", span(1, 10, 10)).into();
        assert_eq!(d.code, "parse-error");
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "Parse error: Expected ':'");
        assert_eq!((d.start_line, d.start_column), (1, 10));
    }

    #[test]
    fn type_errors_keep_their_code() {
        let err = TypeError {
            code: ErrorCode::BadAssignment,
            message: "'str' is not assignable to 'int'".into(),
            span: span(2, 10, 17),
        };
        let d = Diagnostic::from(err);
        assert_eq!(d.code, "bad-assignment");
        assert_eq!((d.end_line, d.end_column), (2, 17));
        assert_eq!(d.to_string(), "2:10: error: 'str' is not assignable to 'int' [bad-assignment]");
    }

    #[test]
    fn serializes_to_flat_record() {
        let d = Diagnostic::error(span(3, 1, 4), "unknown-name", "Could not find name 'foo'");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "start_line": 3,
                "start_column": 1,
                "end_line": 3,
                "end_column": 4,
                "message": "Could not find name 'foo'",
                "severity": "error",
                "code": "unknown-name",
            })
        );
    }

    #[test]
    fn normalize_sorts_dedups_and_caps() {
        let a = Diagnostic::error(span(2, 1, 2), "x", "second");
        let b = Diagnostic::error(span(1, 5, 6), "x", "first");
        let out = normalize(vec![a.clone(), b.clone(), a.clone()], 10);
        assert_eq!(out, vec![b.clone(), a.clone()]);
        assert_eq!(normalize(vec![a, b.clone()], 1), vec![b]);
    }
}
