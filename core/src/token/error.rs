use std::cmp::Ordering;
use std::fmt;

/// A location in the source buffer. `line` and `column` are 1-indexed, `offset` is a char index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }

    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Compare only the (line, column) pair, ignoring the offset.
    pub fn line_col(&self) -> (u32, u32) {
        (self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line_col().cmp(&other.line_col())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open source range; `end` points just past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        if end < start {
            return Self { start: end, end: start };
        }
        Self { start, end }
    }

    pub fn single(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Inclusive containment: a cursor sitting right after the last character is still inside.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start.line_col() == self.end.line_col()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line, self.start.column, self.end.column)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Syntax error produced by the lexer or the parser. Always carries a location.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn with_position(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            span: Span::single(position),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

impl std::error::Error for ParseError {}

/// Helper to convert character index to line/column position
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in text.chars().enumerate() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    Position::new(line, column, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_position() {
        let text = "line1\nline2\nline3";

        assert_eq!(offset_to_position(text, 0), Position::new(1, 1, 0));
        assert_eq!(offset_to_position(text, 5), Position::new(1, 6, 5)); // at '\n'
        assert_eq!(offset_to_position(text, 6), Position::new(2, 1, 6)); // start of line2
        assert_eq!(offset_to_position(text, 12), Position::new(3, 1, 12));
    }

    #[test]
    fn test_position_ordering_ignores_offset() {
        let a = Position::new(1, 5, 4);
        let b = Position::new(2, 1, 0);
        assert!(a < b);
        assert_eq!(Position::new(3, 3, 1).cmp(&Position::new(3, 3, 9)), Ordering::Equal);
    }

    #[test]
    fn test_span_display_and_contains() {
        let span1 = Span::new(Position::new(1, 5, 4), Position::new(1, 10, 9));
        assert_eq!(span1.to_string(), "1:5-10");
        assert!(span1.contains(Position::new(1, 10, 9)));
        assert!(!span1.contains(Position::new(1, 11, 10)));

        let span2 = Span::new(Position::new(1, 5, 4), Position::new(3, 2, 20));
        assert_eq!(span2.to_string(), "1:5-3:2");
    }

    #[test]
    fn test_parse_error_display() {
        let pos = Position::new(2, 10, 15);
        let err = ParseError::with_position("syntax error", pos);
        assert_eq!(err.to_string(), "syntax error at 2:10-10");
    }
}
