use crate::token::{Position, Token, Tokenized};

/// Syntactic situation at the cursor, decided from the text preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Comment, string literal, number, or a name being introduced (`def |`, `as |`)
    Silent,
    Expression {
        prefix: String,
    },
    /// `receiver.prefix`
    Attribute {
        receiver: Receiver,
        prefix: String,
    },
    /// After `import` or `from`; the prefix may be dotted (`os.pa`)
    ImportModule {
        prefix: String,
    },
    /// After `from <module> import`
    ImportMember {
        module: String,
        prefix: String,
    },
}

/// What stands before the dot of an attribute access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// `a.b.c`, outermost name first
    Path(Vec<String>),
    /// A string literal such as `'abc'`
    Str,
    /// Calls, subscripts and other expressions that are not resolved textually
    Unsupported,
}

#[inline]
fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Split `text` into everything before its trailing identifier and the identifier itself.
fn split_trailing_ident(text: &str) -> (&str, &str) {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map_or(text.len(), |(i, _)| i);
    text.split_at(start)
}

/// The last whitespace-separated word of `text` equals `word` and is followed by whitespace.
fn ends_with_word(text: &str, word: &str) -> bool {
    if !text.ends_with(char::is_whitespace) {
        return false;
    }
    let trimmed = text.trim_end();
    trimmed
        .strip_suffix(word)
        .is_some_and(|head| head.chars().next_back().is_none_or(|c| !is_ident_char(c)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Code,
    Comment,
    String,
}

/// Where a single line ends up after scanning `text`: still in code, inside a comment,
/// or inside a string opened on this line.
fn scan_line(text: &str) -> LineState {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    // (quote char, triple quoted)
    let mut open: Option<(char, bool)> = None;
    while i < chars.len() {
        let c = chars[i];
        match open {
            None => match c {
                '#' => return LineState::Comment,
                '\'' | '"' => {
                    let triple = chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c);
                    open = Some((c, triple));
                    i += if triple { 3 } else { 1 };
                    continue;
                }
                _ => {}
            },
            Some((quote, triple)) => {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == quote {
                    if !triple {
                        open = None;
                    } else if chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                        open = None;
                        i += 3;
                        continue;
                    }
                }
            }
        }
        i += 1;
    }
    if open.is_some() {
        LineState::String
    } else {
        LineState::Code
    }
}

/// True when `pos` lies strictly inside a string token, which catches triple-quoted
/// strings opened on an earlier line.
pub fn inside_string_token(lexed: &Tokenized, pos: Position) -> bool {
    lexed
        .tokens
        .iter()
        .zip(&lexed.spans)
        .any(|(tok, span)| matches!(tok, Token::Str { .. }) && span.start < pos && pos < span.end)
}

/// Module of a `from <module> import (` list still open at `pos`. Continuation lines
/// of such a list carry no `import` keyword of their own.
pub fn open_import_list(lexed: &Tokenized, pos: Position) -> Option<String> {
    let end = lexed.spans.iter().take_while(|span| span.start < pos).count();
    let tokens = &lexed.tokens[..end.min(lexed.tokens.len())];

    let mut depth = 0usize;
    let mut opener = None;
    for (i, tok) in tokens.iter().enumerate().rev() {
        match tok {
            Token::Newline | Token::Indent | Token::Dedent => return None,
            Token::RParen | Token::RBracket | Token::RBrace => depth += 1,
            Token::LParen | Token::LBracket | Token::LBrace if depth == 0 => {
                opener = Some(i);
                break;
            }
            Token::LParen | Token::LBracket | Token::LBrace => depth -= 1,
            _ => {}
        }
    }
    let opener = opener?;
    if tokens[opener] != Token::LParen || opener == 0 || tokens[opener - 1] != Token::Import {
        return None;
    }

    let mut parts = Vec::new();
    for tok in tokens[..opener - 1].iter().rev() {
        match tok {
            Token::From => {
                parts.reverse();
                return (!parts.is_empty()).then(|| parts.concat());
            }
            Token::Name(name) => parts.push(name.as_str()),
            Token::Dot => parts.push("."),
            Token::Ellipsis => parts.push("..."),
            _ => return None,
        }
    }
    None
}

fn attribute_receiver(before_dot: &str) -> Option<Receiver> {
    let mut segments = Vec::new();
    let mut rest = before_dot;
    loop {
        let (head, ident) = split_trailing_ident(rest);
        if ident.is_empty() {
            if !segments.is_empty() {
                return Some(Receiver::Unsupported);
            }
            return Some(match head.chars().next_back() {
                Some('\'' | '"') => Receiver::Str,
                _ => Receiver::Unsupported,
            });
        }
        if ident.starts_with(|c: char| c.is_ascii_digit()) {
            // `1.` is a float literal, `x.1.` is nonsense
            return None;
        }
        segments.push(ident.to_string());
        match head.strip_suffix('.') {
            Some(inner) => rest = inner,
            None => break,
        }
    }
    segments.reverse();
    Some(Receiver::Path(segments))
}

fn import_context(statement: &str, prefix: &str) -> Option<CompletionContext> {
    if let Some(names) = statement.strip_prefix("import").filter(|r| r.starts_with(char::is_whitespace)) {
        let segment = names.rsplit(',').next().unwrap_or(names).trim_start();
        if segment.contains(char::is_whitespace) {
            return Some(CompletionContext::Silent);
        }
        return Some(CompletionContext::ImportModule {
            prefix: format!("{segment}{prefix}"),
        });
    }

    let after_from = statement.strip_prefix("from").filter(|r| r.starts_with(char::is_whitespace))?;
    let after_from = after_from.trim_start();
    match after_from.find(" import") {
        Some(idx) => {
            let module = after_from[..idx].trim().to_string();
            let names = &after_from[idx + " import".len()..];
            if !names.starts_with(|c: char| c.is_whitespace() || c == '(') {
                return Some(CompletionContext::Silent);
            }
            let segment = names.rsplit([',', '(']).next().unwrap_or(names).trim_start();
            if segment.contains(char::is_whitespace) {
                return Some(CompletionContext::Silent);
            }
            Some(CompletionContext::ImportMember {
                module,
                prefix: prefix.to_string(),
            })
        }
        None if after_from.contains(char::is_whitespace) => Some(CompletionContext::Silent),
        None => Some(CompletionContext::ImportModule {
            prefix: format!("{after_from}{prefix}"),
        }),
    }
}

/// Classify the cursor from the text of its line up to the cursor.
pub fn classify(before: &str) -> CompletionContext {
    if scan_line(before) != LineState::Code {
        return CompletionContext::Silent;
    }
    let (rest, prefix) = split_trailing_ident(before);
    if prefix.starts_with(|c: char| c.is_ascii_digit()) {
        return CompletionContext::Silent;
    }

    let statement = rest.rsplit(';').next().unwrap_or(rest).trim_start();
    if let Some(context) = import_context(statement, prefix) {
        return context;
    }

    if ["def", "class", "as"].iter().any(|kw| ends_with_word(rest, kw)) {
        return CompletionContext::Silent;
    }

    if let Some(before_dot) = rest.strip_suffix('.') {
        return match attribute_receiver(before_dot) {
            Some(receiver) => CompletionContext::Attribute {
                receiver,
                prefix: prefix.to_string(),
            },
            None => CompletionContext::Silent,
        };
    }

    CompletionContext::Expression {
        prefix: prefix.to_string(),
    }
}
