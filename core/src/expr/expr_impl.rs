use crate::{
    ast::Parser,
    op::{BinOp, BoolOp, CmpOp, UnaryOp},
    token::{ParseError, Span, Tokenizer},
};
use std::fmt::Display;

/// Grammar (abridged, Python 3 expression subset):
/// named     ::= [name ':='] test
/// test      ::= or_test ['if' or_test 'else' test] | lambda
/// lambda    ::= 'lambda' [params] ':' test
/// or_test   ::= and_test {'or' and_test}
/// and_test  ::= not_test {'and' not_test}
/// not_test  ::= 'not' not_test | comparison
/// comparison::= bitor {cmp_op bitor}
/// bitor     ::= bitxor {'|' bitxor} ... shift ::= arith {('<<'|'>>') arith}
/// arith     ::= term {('+'|'-') term}
/// term      ::= factor {('*'|'@'|'/'|'//'|'%') factor}
/// factor    ::= ('+'|'-'|'~') factor | power
/// power     ::= ['await'] postfix ['**' factor]
/// postfix   ::= atom { call | '.' name | '[' subscript ']' }
/// atom      ::= name | number | string+ | '...' | None | True | False
///             | '(' [tuple | genexp | yield] ')' | '[' [list | listcomp] ']'
///             | '{' [dict | set | dictcomp | setcomp] '}'
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(String),
    Float(String),
    Complex(String),
    Str(String),
    Bytes(String),
    Bool(bool),
    None,
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Name(String),
    Constant(Constant),
    /// f-string; replacement fields are kept as raw text
    FString(String),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<DictItem>),
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
        attr_span: Span,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Arg>,
    },
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda {
        params: Parameters,
        body: Box<Expr>,
    },
    /// `name := value`
    NamedExpr {
        target: String,
        target_span: Span,
        value: Box<Expr>,
    },
    Starred(Box<Expr>),
    Await(Box<Expr>),
    Yield(Option<Box<Expr>>),
    YieldFrom(Box<Expr>),
    /// Placeholder for an expression that failed to parse.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictItem {
    /// `None` for `**mapping` unpacking
    pub key: Option<Expr>,
    pub value: Expr,
}

/// One `for target in iter if cond` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub is_async: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Positional,
    Keyword,
    /// `*args`
    Star,
    /// `**kwargs`
    DoubleStar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
    pub kind: ArgKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Ordinary parameter, may be passed positionally or by keyword
    Positional,
    /// Before a `/` marker
    PositionalOnly,
    /// `*args`
    VarArgs,
    /// After `*` or `*args`
    KeywordOnly,
    /// `**kwargs`
    KwArgs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub span: Span,
    pub annotation: Option<Expr>,
    pub default: Option<Expr>,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameters {
    pub params: Vec<Param>,
}

impl Parameters {
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    pub fn positional(&self) -> impl Iterator<Item = &Param> {
        self.params
            .iter()
            .filter(|p| matches!(p.kind, ParamKind::Positional | ParamKind::PositionalOnly))
    }

    pub fn has_var_args(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::VarArgs)
    }

    pub fn has_kw_args(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamKind::KwArgs)
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn error(span: Span) -> Self {
        Self {
            kind: ExprKind::Error,
            span,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, ExprKind::Error)
    }

    /// `a.b.c` as a string when the expression is a pure dotted chain of names.
    pub fn dotted_name(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Name(n) => Some(n.clone()),
            ExprKind::Attribute { value, attr, .. } => {
                let base = value.dotted_name()?;
                Some(format!("{}.{}", base, attr))
            }
            _ => None,
        }
    }

    /// Visit the direct sub-expressions of this node.
    pub fn for_each_child<'e>(&'e self, mut f: impl FnMut(&'e Expr)) {
        match &self.kind {
            ExprKind::Name(_) | ExprKind::Constant(_) | ExprKind::FString(_) | ExprKind::Error => {}
            ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Set(items) => items.iter().for_each(f),
            ExprKind::Dict(items) => {
                for item in items {
                    if let Some(k) = &item.key {
                        f(k);
                    }
                    f(&item.value);
                }
            }
            ExprKind::ListComp { elt, generators }
            | ExprKind::SetComp { elt, generators }
            | ExprKind::GeneratorExp { elt, generators } => {
                for g in generators {
                    f(&g.target);
                    f(&g.iter);
                    g.ifs.iter().for_each(&mut f);
                }
                f(elt);
            }
            ExprKind::DictComp { key, value, generators } => {
                for g in generators {
                    f(&g.target);
                    f(&g.iter);
                    g.ifs.iter().for_each(&mut f);
                }
                f(key);
                f(value);
            }
            ExprKind::Attribute { value, .. } => f(value),
            ExprKind::Subscript { value, index } => {
                f(value);
                f(index);
            }
            ExprKind::Slice { lower, upper, step } => {
                for part in [lower, upper, step].into_iter().flatten() {
                    f(part);
                }
            }
            ExprKind::Call { func, args } => {
                f(func);
                args.iter().for_each(|a| f(&a.value));
            }
            ExprKind::BinOp { left, right, .. } => {
                f(left);
                f(right);
            }
            ExprKind::UnaryOp { operand, .. } => f(operand),
            ExprKind::BoolOp { values, .. } => values.iter().for_each(f),
            ExprKind::Compare { left, comparators, .. } => {
                f(left);
                comparators.iter().for_each(f);
            }
            ExprKind::IfExp { test, body, orelse } => {
                f(test);
                f(body);
                f(orelse);
            }
            ExprKind::Lambda { params, body } => {
                for p in params.iter() {
                    if let Some(d) = &p.default {
                        f(d);
                    }
                }
                f(body);
            }
            ExprKind::NamedExpr { value, .. } => f(value),
            ExprKind::Starred(inner) | ExprKind::Await(inner) | ExprKind::YieldFrom(inner) => f(inner),
            ExprKind::Yield(inner) => {
                if let Some(inner) = inner {
                    f(inner);
                }
            }
        }
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Int(t) | Constant::Float(t) | Constant::Complex(t) => write!(f, "{}", t),
            Constant::Str(s) => write!(f, "{:?}", s),
            Constant::Bytes(s) => write!(f, "b{:?}", s),
            Constant::Bool(true) => write!(f, "True"),
            Constant::Bool(false) => write!(f, "False"),
            Constant::None => write!(f, "None"),
            Constant::Ellipsis => write!(f, "..."),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(f: &mut std::fmt::Formatter<'_>, items: &[Expr]) -> std::fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }
        match &self.kind {
            ExprKind::Name(n) => write!(f, "{}", n),
            ExprKind::Constant(c) => write!(f, "{}", c),
            ExprKind::FString(s) => write!(f, "f{:?}", s),
            ExprKind::List(items) => {
                write!(f, "[")?;
                join(f, items)?;
                write!(f, "]")
            }
            ExprKind::Tuple(items) => {
                write!(f, "(")?;
                join(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            ExprKind::Set(items) => {
                write!(f, "{{")?;
                join(f, items)?;
                write!(f, "}}")
            }
            ExprKind::Dict(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match &item.key {
                        Some(k) => write!(f, "{}: {}", k, item.value)?,
                        None => write!(f, "**{}", item.value)?,
                    }
                }
                write!(f, "}}")
            }
            ExprKind::ListComp { elt, .. } => write!(f, "[{} for ...]", elt),
            ExprKind::SetComp { elt, .. } => write!(f, "{{{} for ...}}", elt),
            ExprKind::DictComp { key, value, .. } => write!(f, "{{{}: {} for ...}}", key, value),
            ExprKind::GeneratorExp { elt, .. } => write!(f, "({} for ...)", elt),
            ExprKind::Attribute { value, attr, .. } => write!(f, "{}.{}", value, attr),
            ExprKind::Subscript { value, index } => write!(f, "{}[{}]", value, index),
            ExprKind::Slice { lower, upper, step } => {
                if let Some(l) = lower {
                    write!(f, "{}", l)?;
                }
                write!(f, ":")?;
                if let Some(u) = upper {
                    write!(f, "{}", u)?;
                }
                if let Some(s) = step {
                    write!(f, ":{}", s)?;
                }
                Ok(())
            }
            ExprKind::Call { func, args } => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match arg.kind {
                        ArgKind::Positional => write!(f, "{}", arg.value)?,
                        ArgKind::Keyword => write!(f, "{}={}", arg.name.as_deref().unwrap_or("_"), arg.value)?,
                        ArgKind::Star => write!(f, "*{}", arg.value)?,
                        ArgKind::DoubleStar => write!(f, "**{}", arg.value)?,
                    }
                }
                write!(f, ")")
            }
            ExprKind::BinOp { left, op, right } => write!(f, "({} {} {})", left, op, right),
            ExprKind::UnaryOp { op: UnaryOp::Not, operand } => write!(f, "not {}", operand),
            ExprKind::UnaryOp { op, operand } => write!(f, "{}{}", op, operand),
            ExprKind::BoolOp { op, values } => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op)?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
            ExprKind::Compare { left, ops, comparators } => {
                write!(f, "{}", left)?;
                for (op, c) in ops.iter().zip(comparators) {
                    write!(f, " {} {}", op, c)?;
                }
                Ok(())
            }
            ExprKind::IfExp { test, body, orelse } => write!(f, "{} if {} else {}", body, test, orelse),
            ExprKind::Lambda { body, .. } => write!(f, "lambda: {}", body),
            ExprKind::NamedExpr { target, value, .. } => write!(f, "({} := {})", target, value),
            ExprKind::Starred(inner) => write!(f, "*{}", inner),
            ExprKind::Await(inner) => write!(f, "await {}", inner),
            ExprKind::Yield(Some(inner)) => write!(f, "yield {}", inner),
            ExprKind::Yield(None) => write!(f, "yield"),
            ExprKind::YieldFrom(inner) => write!(f, "yield from {}", inner),
            ExprKind::Error => write!(f, "<error>"),
        }
    }
}

impl TryFrom<&str> for Expr {
    type Error = ParseError;

    /// Parse a single standalone expression, failing on the first syntax error.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let lexed = Tokenizer::tokenize(s);
        if let Some(err) = lexed.errors.into_iter().next() {
            return Err(err);
        }
        let mut parser = Parser::new(&lexed.tokens, &lexed.spans);
        let expr = parser.parse()?;
        match parser.take_errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(expr),
        }
    }
}
