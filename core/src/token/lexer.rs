use std::fmt;

use crate::token::{ParseError, Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrKind {
    Str,
    Bytes,
    FString,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Name(String),         // identifier
    Int(String),          // 1, 0x1f, 1_000
    Float(String),        // 1.5, 1e3
    Imaginary(String),    // 2j
    Str { value: String, kind: StrKind },
    // Keywords
    False,
    None,
    True,
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,
    // Delimiters
    LParen,     // (
    RParen,     // )
    LBracket,   // [
    RBracket,   // ]
    LBrace,     // {
    RBrace,     // }
    Colon,      // :
    Comma,      // ,
    Semicolon,  // ;
    Dot,        // .
    Ellipsis,   // ...
    Arrow,      // ->
    At,         // @
    Assign,     // =
    ColonEqual, // :=
    // Operators
    Plus,        // +
    Minus,       // -
    Star,        // *
    DoubleStar,  // **
    Slash,       // /
    DoubleSlash, // //
    Percent,     // %
    Pipe,        // |
    Amp,         // &
    Caret,       // ^
    Tilde,       // ~
    LShift,      // <<
    RShift,      // >>
    Lt,          // <
    Gt,          // >
    Le,          // <=
    Ge,          // >=
    EqEq,        // ==
    NotEq,       // !=
    // Augmented assignment
    PlusEq,
    MinusEq,
    StarEq,
    DoubleStarEq,
    SlashEq,
    DoubleSlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LShiftEq,
    RShiftEq,
    AtEq,
    // Layout
    Newline,
    Indent,
    Dedent,
    EndOfFile,
}

pub const KEYWORDS: &[(&str, Token)] = &[
    ("False", Token::False),
    ("None", Token::None),
    ("True", Token::True),
    ("and", Token::And),
    ("as", Token::As),
    ("assert", Token::Assert),
    ("async", Token::Async),
    ("await", Token::Await),
    ("break", Token::Break),
    ("class", Token::Class),
    ("continue", Token::Continue),
    ("def", Token::Def),
    ("del", Token::Del),
    ("elif", Token::Elif),
    ("else", Token::Else),
    ("except", Token::Except),
    ("finally", Token::Finally),
    ("for", Token::For),
    ("from", Token::From),
    ("global", Token::Global),
    ("if", Token::If),
    ("import", Token::Import),
    ("in", Token::In),
    ("is", Token::Is),
    ("lambda", Token::Lambda),
    ("nonlocal", Token::Nonlocal),
    ("not", Token::Not),
    ("or", Token::Or),
    ("pass", Token::Pass),
    ("raise", Token::Raise),
    ("return", Token::Return),
    ("try", Token::Try),
    ("while", Token::While),
    ("with", Token::With),
    ("yield", Token::Yield),
];

// Longest operators first so that maximal munch works by linear scan.
const OPERATORS: &[(&str, Token)] = &[
    ("**=", Token::DoubleStarEq),
    ("//=", Token::DoubleSlashEq),
    (">>=", Token::RShiftEq),
    ("<<=", Token::LShiftEq),
    ("...", Token::Ellipsis),
    ("->", Token::Arrow),
    (":=", Token::ColonEqual),
    ("**", Token::DoubleStar),
    ("//", Token::DoubleSlash),
    ("<<", Token::LShift),
    (">>", Token::RShift),
    ("<=", Token::Le),
    (">=", Token::Ge),
    ("==", Token::EqEq),
    ("!=", Token::NotEq),
    ("+=", Token::PlusEq),
    ("-=", Token::MinusEq),
    ("*=", Token::StarEq),
    ("/=", Token::SlashEq),
    ("%=", Token::PercentEq),
    ("&=", Token::AmpEq),
    ("|=", Token::PipeEq),
    ("^=", Token::CaretEq),
    ("@=", Token::AtEq),
    ("(", Token::LParen),
    (")", Token::RParen),
    ("[", Token::LBracket),
    ("]", Token::RBracket),
    ("{", Token::LBrace),
    ("}", Token::RBrace),
    (":", Token::Colon),
    (",", Token::Comma),
    (";", Token::Semicolon),
    (".", Token::Dot),
    ("@", Token::At),
    ("=", Token::Assign),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Star),
    ("/", Token::Slash),
    ("%", Token::Percent),
    ("|", Token::Pipe),
    ("&", Token::Amp),
    ("^", Token::Caret),
    ("~", Token::Tilde),
    ("<", Token::Lt),
    (">", Token::Gt),
];

impl Token {
    pub fn keyword(word: &str) -> Option<Token> {
        KEYWORDS.iter().find(|(kw, _)| *kw == word).map(|(_, t)| t.clone())
    }

    pub fn is_keyword(&self) -> bool {
        KEYWORDS.iter().any(|(_, t)| t == self)
    }

    /// Tokens that terminate a logical line for recovery purposes.
    pub fn is_line_end(&self) -> bool {
        matches!(self, Token::Newline | Token::EndOfFile)
    }

    /// Human readable description used in parse error messages, e.g. `found newline`.
    pub fn describe(&self) -> String {
        match self {
            Token::Name(n) => format!("name '{}'", n),
            Token::Int(t) | Token::Float(t) | Token::Imaginary(t) => format!("number '{}'", t),
            Token::Str { .. } => "string literal".to_string(),
            Token::Newline => "newline".to_string(),
            Token::Indent => "indent".to_string(),
            Token::Dedent => "dedent".to_string(),
            Token::EndOfFile => "end of file".to_string(),
            other => format!("'{}'", other),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((kw, _)) = KEYWORDS.iter().find(|(_, t)| t == self) {
            return write!(f, "{}", kw);
        }
        if let Some((op, _)) = OPERATORS.iter().find(|(_, t)| t == self) {
            return write!(f, "{}", op);
        }
        match self {
            Token::Name(n) => write!(f, "{}", n),
            Token::Int(t) | Token::Float(t) | Token::Imaginary(t) => write!(f, "{}", t),
            Token::Str { value, .. } => write!(f, "{:?}", value),
            Token::Newline => write!(f, "NEWLINE"),
            Token::Indent => write!(f, "INDENT"),
            Token::Dedent => write!(f, "DEDENT"),
            Token::EndOfFile => write!(f, "ENDMARKER"),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// Output of a tokenizer run: tokens and spans aligned by index, plus lexical errors.
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub spans: Vec<Span>,
    pub errors: Vec<ParseError>,
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_string_prefix(s: &str) -> bool {
    if s.len() > 2 {
        return false;
    }
    let lower = s.to_ascii_lowercase();
    matches!(
        lower.as_str(),
        "r" | "b" | "u" | "f" | "rb" | "br" | "fr" | "rf"
    )
}

/// Error-tolerant Python tokenizer. It never fails: lexical problems are recorded in
/// [`Tokenized::errors`] and scanning continues.
pub struct Tokenizer {
    chars: Vec<char>,
    idx: usize,
    len: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    spans: Vec<Span>,
    errors: Vec<ParseError>,
    indents: Vec<u32>,
    /// Closer expected for each open bracket, innermost last
    brackets: Vec<Token>,
    at_line_start: bool,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        Self {
            len: chars.len(),
            chars,
            idx: 0,
            line: 1,
            column: 1,
            tokens: Vec::with_capacity(input.len() / 3),
            spans: Vec::with_capacity(input.len() / 3),
            errors: Vec::new(),
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
        }
    }

    /// Tokenize `s`, always producing a token stream terminated by `EndOfFile`.
    pub fn tokenize(s: &str) -> Tokenized {
        let mut t = Tokenizer::new(s);
        t.run();
        Tokenized {
            tokens: t.tokens,
            spans: t.spans,
            errors: t.errors,
        }
    }

    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column, self.idx)
    }

    fn eof(&self) -> bool {
        self.idx >= self.len
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.idx + n).copied()
    }

    fn advance_char(&mut self) {
        if !self.eof() && self.chars[self.idx] == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.idx += 1;
    }

    fn push_with_span(&mut self, token: Token, start: Position, end: Position) {
        self.tokens.push(token);
        self.spans.push(Span::new(start, end));
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(ParseError::with_span(message, span));
    }

    fn last_token(&self) -> Option<&Token> {
        self.tokens.last()
    }

    fn run(&mut self) {
        while !self.eof() {
            if self.at_line_start && self.brackets.is_empty() {
                self.handle_indentation();
                if self.eof() {
                    break;
                }
            }

            let c = self.chars[self.idx];
            match c {
                ' ' | '\t' | '\x0C' | '\r' => self.advance_char(),
                '#' => self.skip_comment(),
                '\n' => {
                    let start = self.current_position();
                    self.advance_char();
                    if self.brackets.is_empty() {
                        if !matches!(self.last_token(), None | Some(Token::Newline)) {
                            let end = Position::new(start.line, start.column + 1, start.offset + 1);
                            self.push_with_span(Token::Newline, start, end);
                        }
                        self.at_line_start = true;
                    } else if self.next_line_starts_statement() {
                        self.recover_unclosed_bracket(start);
                    }
                }
                '\\' => {
                    let start = self.current_position();
                    self.advance_char();
                    if self.peek() == Some('\r') {
                        self.advance_char();
                    }
                    if self.peek() == Some('\n') {
                        self.advance_char();
                    } else {
                        let end = self.current_position();
                        self.error("Expected a newline after line continuation character", Span::new(start, end));
                    }
                }
                '"' | '\'' => self.lex_string(String::new(), self.current_position()),
                c if c.is_ascii_digit() => self.lex_number(),
                '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.lex_number(),
                c if is_ident_start(c) => self.lex_name(),
                _ => self.lex_operator(),
            }
        }
        self.finish();
    }

    /// A bracket is still open at a line break that can only begin a new statement.
    /// Report the innermost missing closer once and end the logical line here.
    fn recover_unclosed_bracket(&mut self, newline_start: Position) {
        let at = self.spans.last().map_or(newline_start, |span| span.end);
        if let Some(closer) = self.brackets.last() {
            let message = format!("Expected '{}', found newline", closer);
            self.error(message, Span::single(at));
        }
        self.brackets.clear();
        let end = Position::new(newline_start.line, newline_start.column + 1, newline_start.offset + 1);
        self.push_with_span(Token::Newline, newline_start, end);
        self.at_line_start = true;
    }

    /// Look at the next non-blank line after a newline inside brackets. It starts a new
    /// statement when it opens with a keyword that has no place inside an expression,
    /// with a compound header ending in `:`, or with `name =`/`name:` at column 1 right
    /// after a line that ended on a complete operand.
    fn next_line_starts_statement(&self) -> bool {
        let mut j = self.idx;
        let line = loop {
            let line_end = self.chars[j..].iter().position(|c| *c == '\n').map_or(self.len, |n| j + n);
            let line = &self.chars[j..line_end];
            match line.iter().position(|c| !c.is_whitespace()) {
                Some(k) if line[k] != '#' => break line,
                _ if line_end >= self.len => return false,
                _ => j = line_end + 1,
            }
        };
        let indent = line.iter().take_while(|c| matches!(c, ' ' | '\t' | '\x0C')).count();
        let body: String = line[indent..].iter().collect();
        let code = body.split('#').next().unwrap_or_default().trim_end();
        let word: String = code.chars().take_while(|c| is_ident_continue(*c)).collect();
        match word.as_str() {
            "def" | "class" | "return" | "pass" | "import" | "raise" | "del" | "global" | "nonlocal" | "assert"
            | "break" | "continue" | "try" | "while" | "with" | "elif" | "except" | "finally" => true,
            // also valid inside comprehensions and conditional expressions
            "if" | "for" | "else" | "async" => code.ends_with(':'),
            "from" => code.contains(" import"),
            "" => false,
            _ if indent == 0 && !word.starts_with(|c: char| c.is_ascii_digit()) => {
                let rest = code[word.len()..].trim_start();
                let binds = rest.starts_with(':') || (rest.starts_with('=') && !rest.starts_with("=="));
                binds && self.ends_operand()
            }
            _ => false,
        }
    }

    /// The last token can end an expression, so the line does not continue on the next one.
    fn ends_operand(&self) -> bool {
        matches!(
            self.last_token(),
            Some(
                Token::Name(_)
                    | Token::Int(_)
                    | Token::Float(_)
                    | Token::Imaginary(_)
                    | Token::Str { .. }
                    | Token::RParen
                    | Token::RBracket
                    | Token::RBrace
                    | Token::True
                    | Token::False
                    | Token::None
                    | Token::Ellipsis
            )
        )
    }

    fn handle_indentation(&mut self) {
        let start = self.current_position();
        let mut width: u32 = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                '\x0C' => width = 0,
                _ => break,
            }
            self.advance_char();
        }
        // Blank and comment-only lines do not affect indentation.
        match self.peek() {
            None | Some('\n') | Some('#') => return,
            Some('\r') if self.peek_at(1) == Some('\n') => return,
            _ => {}
        }
        self.at_line_start = false;
        let end = self.current_position();
        let current = *self.indents.last().unwrap_or(&0);
        if width > current {
            self.indents.push(width);
            self.push_with_span(Token::Indent, start, end);
        } else if width < current {
            while self.indents.len() > 1 && *self.indents.last().unwrap_or(&0) > width {
                self.indents.pop();
                self.push_with_span(Token::Dedent, end, end);
            }
            if *self.indents.last().unwrap_or(&0) != width {
                self.error(
                    "Unindent does not match any outer indentation level",
                    Span::new(start, end),
                );
            }
        }
    }

    fn finish(&mut self) {
        let pos = self.current_position();
        if !matches!(self.last_token(), None | Some(Token::Newline)) {
            self.push_with_span(Token::Newline, pos, pos);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push_with_span(Token::Dedent, pos, pos);
        }
        self.push_with_span(Token::EndOfFile, pos, pos);
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance_char();
        }
    }

    fn lex_name(&mut self) {
        let start = self.current_position();
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                word.push(c);
                self.advance_char();
            } else {
                break;
            }
        }
        if matches!(self.peek(), Some('"') | Some('\'')) && is_string_prefix(&word) {
            self.lex_string(word, start);
            return;
        }
        let end = self.current_position();
        let token = Token::keyword(&word).unwrap_or(Token::Name(word));
        self.push_with_span(token, start, end);
    }

    fn lex_number(&mut self) {
        let start = self.current_position();
        let mut text = String::new();
        let mut is_float = false;

        let radix_prefix = self.peek() == Some('0')
            && matches!(self.peek_at(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));
        if radix_prefix {
            text.push('0');
            self.advance_char();
            if let Some(p) = self.peek() {
                text.push(p);
                self.advance_char();
            }
            while let Some(c) = self.peek() {
                if c.is_ascii_hexdigit() || c == '_' {
                    text.push(c);
                    self.advance_char();
                } else {
                    break;
                }
            }
        } else {
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() || c == '_' {
                    text.push(c);
                    self.advance_char();
                } else if c == '.' && !is_float && self.peek_at(1) != Some('.') {
                    is_float = true;
                    text.push(c);
                    self.advance_char();
                } else if matches!(c, 'e' | 'E')
                    && (self.peek_at(1).is_some_and(|n| n.is_ascii_digit())
                        || (matches!(self.peek_at(1), Some('+' | '-'))
                            && self.peek_at(2).is_some_and(|n| n.is_ascii_digit())))
                {
                    is_float = true;
                    text.push(c);
                    self.advance_char();
                    if let Some(sign @ ('+' | '-')) = self.peek() {
                        text.push(sign);
                        self.advance_char();
                    }
                } else {
                    break;
                }
            }
        }

        let token = if matches!(self.peek(), Some('j' | 'J')) {
            text.push('j');
            self.advance_char();
            Token::Imaginary(text)
        } else if is_float {
            Token::Float(text)
        } else {
            Token::Int(text)
        };
        let end = self.current_position();
        if self.peek().is_some_and(is_ident_start) {
            self.error("Invalid decimal literal", Span::new(start, end));
        }
        self.push_with_span(token, start, end);
    }

    fn lex_string(&mut self, prefix: String, start: Position) {
        let lower = prefix.to_ascii_lowercase();
        let raw = lower.contains('r');
        let kind = if lower.contains('b') {
            StrKind::Bytes
        } else if lower.contains('f') {
            StrKind::FString
        } else {
            StrKind::Str
        };

        let quote = self.chars[self.idx];
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        let quote_len = if triple { 3 } else { 1 };
        for _ in 0..quote_len {
            self.advance_char();
        }

        let mut value = String::new();
        loop {
            let Some(c) = self.peek() else {
                let end = self.current_position();
                let msg = if triple {
                    "Missing closing quote in triple-quoted string literal"
                } else {
                    "Missing closing quote in string literal"
                };
                self.error(msg, Span::new(start, end));
                self.push_with_span(Token::Str { value, kind }, start, end);
                return;
            };
            if c == quote {
                if !triple {
                    self.advance_char();
                    break;
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.advance_char();
                    self.advance_char();
                    self.advance_char();
                    break;
                }
                value.push(c);
                self.advance_char();
            } else if c == '\n' && !triple {
                let end = self.current_position();
                self.error("Missing closing quote in string literal", Span::new(start, end));
                self.push_with_span(Token::Str { value, kind }, start, end);
                return;
            } else if c == '\\' {
                self.advance_char();
                let Some(escaped) = self.peek() else { continue };
                if raw {
                    value.push('\\');
                    value.push(escaped);
                } else {
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '0' => value.push('\0'),
                        '\\' => value.push('\\'),
                        '\'' => value.push('\''),
                        '"' => value.push('"'),
                        '\n' => {}
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                }
                self.advance_char();
            } else {
                value.push(c);
                self.advance_char();
            }
        }
        let end = self.current_position();
        self.push_with_span(Token::Str { value, kind }, start, end);
    }

    fn lex_operator(&mut self) {
        let start = self.current_position();
        for (op, token) in OPERATORS {
            let n = op.chars().count();
            if self.idx + n <= self.len && op.chars().zip(&self.chars[self.idx..self.idx + n]).all(|(a, b)| a == *b) {
                for _ in 0..n {
                    self.advance_char();
                }
                match token {
                    Token::LParen => self.brackets.push(Token::RParen),
                    Token::LBracket => self.brackets.push(Token::RBracket),
                    Token::LBrace => self.brackets.push(Token::RBrace),
                    Token::RParen | Token::RBracket | Token::RBrace => {
                        self.brackets.pop();
                    }
                    _ => {}
                }
                let end = self.current_position();
                self.push_with_span(token.clone(), start, end);
                return;
            }
        }
        let c = self.chars[self.idx];
        self.advance_char();
        let end = self.current_position();
        self.error(format!("Got unexpected token {}", c), Span::new(start, end));
    }
}

