use crate::{
    expr::{Arg, ArgKind, Comprehension, Constant, DictItem, Expr, ExprKind, Param, ParamKind, Parameters},
    op::{BinOp, BoolOp, CmpOp, UnaryOp},
    token::{ParseError, Position, Span, StrKind, Token},
};

pub type PResult<T> = std::result::Result<T, ParseError>;

static END_OF_FILE: Token = Token::EndOfFile;

/// Expression parser over a shared token stream. The statement parser hands it a cursor
/// and reads the position back once the expression is done.
pub struct Parser<'a> {
    tokens: &'a [Token],
    spans: &'a [Span],
    pos: usize,
    len: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], spans: &'a [Span]) -> Self {
        Self::at(tokens, spans, 0)
    }

    pub fn at(tokens: &'a [Token], spans: &'a [Span], pos: usize) -> Self {
        Self {
            tokens,
            spans,
            pos,
            len: tokens.len(),
            errors: Vec::new(),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Errors that did not abort the expression (missing closing brackets and the like).
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Parse one complete expression (a bare tuple is allowed) followed by end of input.
    pub fn parse(&mut self) -> PResult<Expr> {
        let expr = self.parse_star_expressions()?;
        while self.check(&Token::Newline) {
            self.pos += 1;
        }
        if !self.eof() && !self.check(&Token::EndOfFile) {
            return Err(self.err("Unexpected tokens at end"));
        }
        Ok(expr)
    }

    // ---- cursor helpers ----

    pub(crate) fn eof(&self) -> bool {
        self.pos >= self.len
    }

    pub(crate) fn peek(&self) -> &'a Token {
        self.tokens.get(self.pos).unwrap_or(&END_OF_FILE)
    }

    pub(crate) fn peek_ahead(&self, offset: usize) -> &'a Token {
        self.tokens.get(self.pos + offset).unwrap_or(&END_OF_FILE)
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.spans.get(self.pos).or_else(|| self.spans.last()) {
            Some(span) => *span,
            None => Span::default(),
        }
    }

    pub(crate) fn start_pos(&self) -> Position {
        self.current_span().start
    }

    /// End of the most recently consumed token, skipping layout tokens so that a
    /// block's extent stops at its last real token.
    pub(crate) fn prev_end(&self) -> Position {
        let mut idx = self.pos.min(self.len);
        while idx > 0 {
            idx -= 1;
            if matches!(
                self.tokens[idx],
                Token::Newline | Token::Indent | Token::Dedent | Token::EndOfFile
            ) {
                continue;
            }
            if let Some(span) = self.spans.get(idx) {
                return span.end;
            }
        }
        self.current_span().start
    }

    pub(crate) fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    /// Where an error about the current token should point. Layout tokens have no
    /// useful extent, so report at the end of the previous token instead.
    pub(crate) fn error_span(&self) -> Span {
        if self.pos > 0
            && matches!(
                self.peek(),
                Token::Newline | Token::EndOfFile | Token::Indent | Token::Dedent
            )
        {
            return Span::single(self.prev_end());
        }
        self.current_span()
    }

    pub(crate) fn err(&self, msg: &str) -> ParseError {
        ParseError::with_span(msg, self.error_span())
    }

    pub(crate) fn record(&mut self, err: ParseError) {
        self.errors.push(err);
    }

    pub(crate) fn expect(&mut self, expected: &Token) -> PResult<Span> {
        if self.check(expected) {
            let span = self.current_span();
            self.pos += 1;
            return Ok(span);
        }
        Err(self.err(&format!("Expected '{}', found {}", expected, self.peek().describe())))
    }

    /// Like [`Parser::expect`] but a missing token is only recorded, parsing goes on.
    pub(crate) fn expect_soft(&mut self, expected: &Token) {
        if let Err(e) = self.expect(expected) {
            self.record(e);
        }
    }

    pub(crate) fn expect_name(&mut self) -> PResult<(String, Span)> {
        match self.peek() {
            Token::Name(name) => {
                let span = self.current_span();
                self.pos += 1;
                Ok((name.clone(), span))
            }
            other => Err(self.err(&format!("Expected an identifier, found {}", other.describe()))),
        }
    }

    pub(crate) fn starts_expression(&self) -> bool {
        matches!(
            self.peek(),
            Token::Name(_)
                | Token::Int(_)
                | Token::Float(_)
                | Token::Imaginary(_)
                | Token::Str { .. }
                | Token::None
                | Token::True
                | Token::False
                | Token::Ellipsis
                | Token::LParen
                | Token::LBracket
                | Token::LBrace
                | Token::Minus
                | Token::Plus
                | Token::Tilde
                | Token::Not
                | Token::Lambda
                | Token::Await
                | Token::Star
                | Token::Yield
        )
    }

    // ---- expression lists ----

    /// `a, *b, c` without surrounding brackets; a single element is returned as-is.
    pub fn parse_star_expressions(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let first = self.parse_star_or_named()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if !self.starts_expression() || self.check(&Token::Yield) {
                break;
            }
            items.push(self.parse_star_or_named()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start)))
    }

    /// Assignment and loop targets: `a, (b, c), *d`. Stops before `in` and `=`.
    pub fn parse_target_list(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let first = self.parse_star_or_bitor()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.parse_star_or_bitor()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start)))
    }

    fn parse_star_or_bitor(&mut self) -> PResult<Expr> {
        if self.check(&Token::Star) {
            let start = self.start_pos();
            self.pos += 1;
            let inner = self.parse_bitor()?;
            return Ok(Expr::new(ExprKind::Starred(Box::new(inner)), self.span_from(start)));
        }
        self.parse_bitor()
    }

    fn parse_star_or_named(&mut self) -> PResult<Expr> {
        if self.check(&Token::Star) {
            return self.parse_star_or_bitor();
        }
        self.parse_named()
    }

    /// - `name := value`
    /// - otherwise a full conditional expression
    pub fn parse_named(&mut self) -> PResult<Expr> {
        if let Token::Name(target) = self.peek()
            && self.peek_ahead(1) == &Token::ColonEqual
        {
            let target_span = self.current_span();
            self.pos += 2;
            let value = self.parse_test()?;
            let span = target_span.cover(&value.span);
            return Ok(Expr::new(
                ExprKind::NamedExpr {
                    target: target.clone(),
                    target_span,
                    value: Box::new(value),
                },
                span,
            ));
        }
        self.parse_test()
    }

    /// - `body if test else orelse`
    /// - `lambda params: body`
    pub fn parse_test(&mut self) -> PResult<Expr> {
        if self.check(&Token::Lambda) {
            return self.parse_lambda();
        }
        let start = self.start_pos();
        let body = self.parse_or_test()?;
        if !self.check(&Token::If) {
            return Ok(body);
        }
        self.pos += 1;
        let test = self.parse_or_test()?;
        self.expect(&Token::Else)?;
        let orelse = self.parse_test()?;
        Ok(Expr::new(
            ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            self.span_from(start),
        ))
    }

    fn parse_lambda(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        self.pos += 1; // consume 'lambda'
        let params = self.parse_parameters(true, &Token::Colon)?;
        self.expect(&Token::Colon)?;
        let body = self.parse_test()?;
        Ok(Expr::new(
            ExprKind::Lambda {
                params,
                body: Box::new(body),
            },
            self.span_from(start),
        ))
    }

    /// Parameter list for `def` (annotations allowed) or `lambda`. Stops before `terminator`.
    pub fn parse_parameters(&mut self, for_lambda: bool, terminator: &Token) -> PResult<Parameters> {
        let mut params: Vec<Param> = Vec::new();
        let mut keyword_only = false;

        while !self.check(terminator) && !self.eof() {
            match self.peek() {
                Token::Slash => {
                    self.pos += 1;
                    for p in params.iter_mut() {
                        if p.kind == ParamKind::Positional {
                            p.kind = ParamKind::PositionalOnly;
                        }
                    }
                }
                Token::Star => {
                    self.pos += 1;
                    keyword_only = true;
                    if self.check(&Token::Comma) || self.check(terminator) {
                        // bare `*`
                    } else {
                        let param = self.parse_param(for_lambda, ParamKind::VarArgs)?;
                        params.push(param);
                    }
                }
                Token::DoubleStar => {
                    self.pos += 1;
                    let param = self.parse_param(for_lambda, ParamKind::KwArgs)?;
                    params.push(param);
                }
                Token::Name(_) => {
                    let kind = if keyword_only {
                        ParamKind::KeywordOnly
                    } else {
                        ParamKind::Positional
                    };
                    let param = self.parse_param(for_lambda, kind)?;
                    params.push(param);
                }
                other => {
                    return Err(self.err(&format!("Expected a parameter name, found {}", other.describe())));
                }
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(Parameters { params })
    }

    fn parse_param(&mut self, for_lambda: bool, kind: ParamKind) -> PResult<Param> {
        let (name, span) = self.expect_name()?;
        let annotation = if !for_lambda && self.eat(&Token::Colon) {
            Some(self.parse_test()?)
        } else {
            None
        };
        let default = if matches!(kind, ParamKind::Positional | ParamKind::KeywordOnly) && self.eat(&Token::Assign)
        {
            Some(self.parse_test()?)
        } else {
            None
        };
        Ok(Param {
            name,
            span,
            annotation,
            default,
            kind,
        })
    }

    // ---- boolean and comparison layers ----

    /// `expr or expr`
    pub fn parse_or_test(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let first = self.parse_and_test()?;
        if !self.check(&Token::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&Token::Or) {
            values.push(self.parse_and_test()?);
        }
        Ok(Expr::new(
            ExprKind::BoolOp {
                op: BoolOp::Or,
                values,
            },
            self.span_from(start),
        ))
    }

    /// `expr and expr`
    fn parse_and_test(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let first = self.parse_not_test()?;
        if !self.check(&Token::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&Token::And) {
            values.push(self.parse_not_test()?);
        }
        Ok(Expr::new(
            ExprKind::BoolOp {
                op: BoolOp::And,
                values,
            },
            self.span_from(start),
        ))
    }

    /// `not expr`
    fn parse_not_test(&mut self) -> PResult<Expr> {
        if self.check(&Token::Not) {
            let start = self.start_pos();
            self.pos += 1;
            let operand = self.parse_not_test()?;
            return Ok(Expr::new(
                ExprKind::UnaryOp {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                self.span_from(start),
            ));
        }
        self.parse_comparison()
    }

    /// - `a < b <= c` (chained)
    /// - `a not in b`, `a is not b`
    fn parse_comparison(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let left = self.parse_bitor()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        loop {
            let op = match self.peek() {
                Token::Not if self.peek_ahead(1) == &Token::In => {
                    self.pos += 2;
                    CmpOp::NotIn
                }
                Token::Is if self.peek_ahead(1) == &Token::Not => {
                    self.pos += 2;
                    CmpOp::IsNot
                }
                tok => match CmpOp::from_token(tok) {
                    Some(op) => {
                        self.pos += 1;
                        op
                    }
                    None => break,
                },
            };
            ops.push(op);
            comparators.push(self.parse_bitor()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            self.span_from(start),
        ))
    }

    // ---- binary operator layers, loosest first ----

    fn parse_binary_level(
        &mut self,
        ops: &[Token],
        next: fn(&mut Self) -> PResult<Expr>,
    ) -> PResult<Expr> {
        let start = self.start_pos();
        let mut expr = next(self)?;
        while ops.contains(self.peek()) {
            let Some(op) = BinOp::from_token(self.peek()) else { break };
            self.pos += 1;
            let right = next(self)?;
            expr = Expr::new(
                ExprKind::BinOp {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                self.span_from(start),
            );
        }
        Ok(expr)
    }

    /// `expr | expr`
    pub fn parse_bitor(&mut self) -> PResult<Expr> {
        self.parse_binary_level(&[Token::Pipe], Self::parse_bitxor)
    }

    /// `expr ^ expr`
    fn parse_bitxor(&mut self) -> PResult<Expr> {
        self.parse_binary_level(&[Token::Caret], Self::parse_bitand)
    }

    /// `expr & expr`
    fn parse_bitand(&mut self) -> PResult<Expr> {
        self.parse_binary_level(&[Token::Amp], Self::parse_shift)
    }

    /// `expr << expr`, `expr >> expr`
    fn parse_shift(&mut self) -> PResult<Expr> {
        self.parse_binary_level(&[Token::LShift, Token::RShift], Self::parse_arith)
    }

    /// `expr + expr`, `expr - expr`
    fn parse_arith(&mut self) -> PResult<Expr> {
        self.parse_binary_level(&[Token::Plus, Token::Minus], Self::parse_term)
    }

    /// `*`, `@`, `/`, `//`, `%`
    fn parse_term(&mut self) -> PResult<Expr> {
        self.parse_binary_level(
            &[
                Token::Star,
                Token::At,
                Token::Slash,
                Token::DoubleSlash,
                Token::Percent,
            ],
            Self::parse_factor,
        )
    }

    /// Unary `-x`, `+x`, `~x`
    fn parse_factor(&mut self) -> PResult<Expr> {
        if let Some(op) = UnaryOp::from_token(self.peek()) {
            let start = self.start_pos();
            self.pos += 1;
            let operand = self.parse_factor()?;
            return Ok(Expr::new(
                ExprKind::UnaryOp {
                    op,
                    operand: Box::new(operand),
                },
                self.span_from(start),
            ));
        }
        self.parse_power()
    }

    /// `await x`, `x ** y` (right-associative, binds tighter than unary on the left)
    fn parse_power(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let base = if self.eat(&Token::Await) {
            let inner = self.parse_postfix()?;
            Expr::new(ExprKind::Await(Box::new(inner)), self.span_from(start))
        } else {
            self.parse_postfix()?
        };
        if self.eat(&Token::DoubleStar) {
            let exponent = self.parse_factor()?;
            return Ok(Expr::new(
                ExprKind::BinOp {
                    left: Box::new(base),
                    op: BinOp::Pow,
                    right: Box::new(exponent),
                },
                self.span_from(start),
            ));
        }
        Ok(base)
    }

    // ---- postfix and atoms ----

    /// `f(args)`, `x.attr`, `x[index]`
    fn parse_postfix(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let mut expr = self.parse_atom()?;
        loop {
            match self.peek() {
                Token::LParen => {
                    self.pos += 1;
                    let args = self.parse_call_args()?;
                    self.expect_soft(&Token::RParen);
                    expr = Expr::new(
                        ExprKind::Call {
                            func: Box::new(expr),
                            args,
                        },
                        self.span_from(start),
                    );
                }
                Token::Dot => {
                    self.pos += 1;
                    let (attr, attr_span) = match self.expect_name() {
                        Ok(found) => found,
                        Err(e) => {
                            // keep `x.` as an attribute access with an empty name
                            self.record(e);
                            (String::new(), Span::single(self.prev_end()))
                        }
                    };
                    expr = Expr::new(
                        ExprKind::Attribute {
                            value: Box::new(expr),
                            attr,
                            attr_span,
                        },
                        self.span_from(start),
                    );
                }
                Token::LBracket => {
                    self.pos += 1;
                    let index = self.parse_subscript_list()?;
                    self.expect_soft(&Token::RBracket);
                    expr = Expr::new(
                        ExprKind::Subscript {
                            value: Box::new(expr),
                            index: Box::new(index),
                        },
                        self.span_from(start),
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    pub(crate) fn parse_call_args(&mut self) -> PResult<Vec<Arg>> {
        let mut args = Vec::new();
        while !self.check(&Token::RParen) && self.starts_argument() {
            let start = self.start_pos();
            let arg = match self.peek() {
                Token::Star => {
                    self.pos += 1;
                    let value = self.parse_test()?;
                    Arg {
                        name: None,
                        value,
                        kind: ArgKind::Star,
                        span: self.span_from(start),
                    }
                }
                Token::DoubleStar => {
                    self.pos += 1;
                    let value = self.parse_test()?;
                    Arg {
                        name: None,
                        value,
                        kind: ArgKind::DoubleStar,
                        span: self.span_from(start),
                    }
                }
                Token::Name(name) if self.peek_ahead(1) == &Token::Assign => {
                    self.pos += 2;
                    let value = self.parse_test()?;
                    Arg {
                        name: Some(name.clone()),
                        value,
                        kind: ArgKind::Keyword,
                        span: self.span_from(start),
                    }
                }
                _ => {
                    let mut value = self.parse_named()?;
                    if self.check(&Token::For) || self.check(&Token::Async) {
                        let generators = self.parse_comprehension_clauses()?;
                        value = Expr::new(
                            ExprKind::GeneratorExp {
                                elt: Box::new(value),
                                generators,
                            },
                            self.span_from(start),
                        );
                    }
                    Arg {
                        name: None,
                        value,
                        kind: ArgKind::Positional,
                        span: self.span_from(start),
                    }
                }
            };
            args.push(arg);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn starts_argument(&self) -> bool {
        self.starts_expression() || self.check(&Token::DoubleStar)
    }

    fn parse_subscript_list(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let first = self.parse_subscript_item()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.check(&Token::RBracket) {
                break;
            }
            items.push(self.parse_subscript_item()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start)))
    }

    /// `x`, `lo:hi`, `lo:hi:step`, any part optional
    fn parse_subscript_item(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let lower = if self.check(&Token::Colon) {
            None
        } else {
            let item = self.parse_star_or_named()?;
            if !self.check(&Token::Colon) {
                return Ok(item);
            }
            Some(Box::new(item))
        };
        self.pos += 1; // consume ':'
        let upper = if self.starts_expression() {
            Some(Box::new(self.parse_test()?))
        } else {
            None
        };
        let step = if self.eat(&Token::Colon) && self.starts_expression() {
            Some(Box::new(self.parse_test()?))
        } else {
            None
        };
        Ok(Expr::new(ExprKind::Slice { lower, upper, step }, self.span_from(start)))
    }

    fn parse_atom(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        let span = self.current_span();
        let constant = |c: Constant| Expr::new(ExprKind::Constant(c), span);
        match self.peek() {
            Token::Name(name) => {
                self.pos += 1;
                Ok(Expr::new(ExprKind::Name(name.clone()), span))
            }
            Token::Int(text) => {
                self.pos += 1;
                Ok(constant(Constant::Int(text.clone())))
            }
            Token::Float(text) => {
                self.pos += 1;
                Ok(constant(Constant::Float(text.clone())))
            }
            Token::Imaginary(text) => {
                self.pos += 1;
                Ok(constant(Constant::Complex(text.clone())))
            }
            Token::None => {
                self.pos += 1;
                Ok(constant(Constant::None))
            }
            Token::True => {
                self.pos += 1;
                Ok(constant(Constant::Bool(true)))
            }
            Token::False => {
                self.pos += 1;
                Ok(constant(Constant::Bool(false)))
            }
            Token::Ellipsis => {
                self.pos += 1;
                Ok(constant(Constant::Ellipsis))
            }
            Token::Str { .. } => Ok(self.parse_strings()),
            Token::LParen => self.parse_paren(),
            Token::LBracket => self.parse_list_display(),
            Token::LBrace => self.parse_brace_display(),
            Token::Yield => self.parse_yield(),
            Token::Star => {
                self.pos += 1;
                let inner = self.parse_bitor()?;
                Ok(Expr::new(ExprKind::Starred(Box::new(inner)), self.span_from(start)))
            }
            other => Err(self.err(&format!("Expected an expression, found {}", other.describe()))),
        }
    }

    /// Adjacent string literals concatenate; any f-string part makes the whole an f-string.
    fn parse_strings(&mut self) -> Expr {
        let start = self.start_pos();
        let mut text = String::new();
        let mut kind = StrKind::Str;
        while let Token::Str { value, kind: k } = self.peek() {
            text.push_str(value);
            match (kind, k) {
                (_, StrKind::Bytes) => kind = StrKind::Bytes,
                (StrKind::Str, StrKind::FString) => kind = StrKind::FString,
                _ => {}
            }
            self.pos += 1;
        }
        let expr_kind = match kind {
            StrKind::Str => ExprKind::Constant(Constant::Str(text)),
            StrKind::Bytes => ExprKind::Constant(Constant::Bytes(text)),
            StrKind::FString => ExprKind::FString(text),
        };
        Expr::new(expr_kind, self.span_from(start))
    }

    /// `yield`, `yield x`, `yield from x`
    pub fn parse_yield(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        self.expect(&Token::Yield)?;
        if self.eat(&Token::From) {
            let inner = self.parse_test()?;
            return Ok(Expr::new(ExprKind::YieldFrom(Box::new(inner)), self.span_from(start)));
        }
        let value = if self.starts_expression() {
            Some(Box::new(self.parse_star_expressions()?))
        } else {
            None
        };
        Ok(Expr::new(ExprKind::Yield(value), self.span_from(start)))
    }

    /// `()`, `(x)`, `(x,)`, `(x for x in y)`, `(yield x)`
    fn parse_paren(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        self.pos += 1; // consume '('
        if self.eat(&Token::RParen) {
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), self.span_from(start)));
        }
        if self.check(&Token::Yield) {
            let inner = self.parse_yield()?;
            self.expect_soft(&Token::RParen);
            return Ok(inner);
        }
        let first = self.parse_star_or_named()?;
        if self.check(&Token::For) || self.check(&Token::Async) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect_soft(&Token::RParen);
            return Ok(Expr::new(
                ExprKind::GeneratorExp {
                    elt: Box::new(first),
                    generators,
                },
                self.span_from(start),
            ));
        }
        if !self.check(&Token::Comma) {
            self.expect_soft(&Token::RParen);
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.parse_star_or_named()?);
        }
        self.expect_soft(&Token::RParen);
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start)))
    }

    /// `[a, b]` or `[x for x in y]`
    fn parse_list_display(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        self.pos += 1; // consume '['
        if self.eat(&Token::RBracket) {
            return Ok(Expr::new(ExprKind::List(Vec::new()), self.span_from(start)));
        }
        let first = self.parse_star_or_named()?;
        if self.check(&Token::For) || self.check(&Token::Async) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect_soft(&Token::RBracket);
            return Ok(Expr::new(
                ExprKind::ListComp {
                    elt: Box::new(first),
                    generators,
                },
                self.span_from(start),
            ));
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.parse_star_or_named()?);
        }
        self.expect_soft(&Token::RBracket);
        Ok(Expr::new(ExprKind::List(items), self.span_from(start)))
    }

    /// `{}`, `{k: v}`, `{**m}`, `{a, b}` and the comprehension forms
    fn parse_brace_display(&mut self) -> PResult<Expr> {
        let start = self.start_pos();
        self.pos += 1; // consume '{'
        if self.eat(&Token::RBrace) {
            return Ok(Expr::new(ExprKind::Dict(Vec::new()), self.span_from(start)));
        }

        let first_item = self.parse_dict_or_set_item()?;
        let (is_dict, first_key, first_value) = first_item;

        if self.check(&Token::For) || self.check(&Token::Async) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect_soft(&Token::RBrace);
            let kind = match (is_dict, first_key) {
                (true, Some(key)) => ExprKind::DictComp {
                    key: Box::new(key),
                    value: Box::new(first_value),
                    generators,
                },
                _ => ExprKind::SetComp {
                    elt: Box::new(first_value),
                    generators,
                },
            };
            return Ok(Expr::new(kind, self.span_from(start)));
        }

        if is_dict {
            let mut items = vec![DictItem {
                key: first_key,
                value: first_value,
            }];
            while self.eat(&Token::Comma) {
                if self.check(&Token::RBrace) || !self.starts_argument() {
                    break;
                }
                let (_, key, value) = self.parse_dict_or_set_item()?;
                items.push(DictItem { key, value });
            }
            self.expect_soft(&Token::RBrace);
            return Ok(Expr::new(ExprKind::Dict(items), self.span_from(start)));
        }

        let mut items = vec![first_value];
        while self.eat(&Token::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.parse_star_or_named()?);
        }
        self.expect_soft(&Token::RBrace);
        Ok(Expr::new(ExprKind::Set(items), self.span_from(start)))
    }

    /// Returns `(is_dict_item, key, value)`.
    fn parse_dict_or_set_item(&mut self) -> PResult<(bool, Option<Expr>, Expr)> {
        if self.eat(&Token::DoubleStar) {
            let value = self.parse_bitor()?;
            return Ok((true, None, value));
        }
        let first = self.parse_star_or_named()?;
        if self.eat(&Token::Colon) {
            let value = self.parse_test()?;
            return Ok((true, Some(first), value));
        }
        Ok((false, None, first))
    }

    /// One or more `[async] for target in iter {if cond}` clauses.
    pub(crate) fn parse_comprehension_clauses(&mut self) -> PResult<Vec<Comprehension>> {
        let mut generators = Vec::new();
        loop {
            let is_async = self.check(&Token::Async) && self.peek_ahead(1) == &Token::For;
            if is_async {
                self.pos += 1;
            }
            if !self.eat(&Token::For) {
                break;
            }
            let target = self.parse_target_list()?;
            self.expect(&Token::In)?;
            let iter = self.parse_or_test()?;
            let mut ifs = Vec::new();
            while self.eat(&Token::If) {
                ifs.push(self.parse_or_test()?);
            }
            generators.push(Comprehension {
                target,
                iter,
                ifs,
                is_async,
            });
        }
        Ok(generators)
    }
}
