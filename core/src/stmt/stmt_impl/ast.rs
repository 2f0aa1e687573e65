use crate::{
    expr::{Arg, Expr, Parameters},
    op::BinOp,
    stmt::ImportStmt,
    token::Span,
};

/// Statement AST node
///
/// Grammar (abridged):
/// program     ::= statement* ENDMARKER
/// statement   ::= compound_stmt | simple_stmt {';' simple_stmt} NEWLINE
/// simple_stmt ::= expr | assign | ann_assign | aug_assign | 'pass' | 'break' | 'continue'
///               | 'return' [exprs] | 'del' targets | 'global' names | 'nonlocal' names
///               | 'assert' test [',' test] | 'raise' [test ['from' test]] | import_stmt
/// compound    ::= if | while | for | try | with | funcdef | classdef | decorated
/// suite       ::= simple_stmt_line | NEWLINE INDENT statement+ DEDENT
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// expression statement
    Expr(Expr),
    /// `a = b = value` (targets in source order)
    Assign { targets: Vec<Expr>, value: Expr },
    /// `target: annotation [= value]`
    AnnAssign {
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
    },
    /// `target op= value`
    AugAssign { target: Expr, op: BinOp, value: Expr },
    Pass,
    Break,
    Continue,
    Return(Option<Expr>),
    Delete(Vec<Expr>),
    Global(Vec<Identifier>),
    Nonlocal(Vec<Identifier>),
    Assert { test: Expr, msg: Option<Expr> },
    Raise { exc: Option<Expr>, cause: Option<Expr> },
    Import(ImportStmt),
    /// `elif` chains are nested `If` statements in `orelse`
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        is_async: bool,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
    },
    With {
        items: Vec<WithItem>,
        body: Vec<Stmt>,
        is_async: bool,
    },
    FunctionDef(Box<FunctionDef>),
    ClassDef(Box<ClassDef>),
    /// A statement that could not be parsed; its diagnostic was already recorded.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    pub typ: Option<Expr>,
    pub name: Option<Identifier>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    pub context: Expr,
    pub vars: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub name_span: Span,
    pub params: Parameters,
    pub returns: Option<Expr>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub name_span: Span,
    pub bases: Vec<Arg>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn error(span: Span) -> Self {
        Self {
            kind: StmtKind::Error,
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, StmtKind::Error)
    }

    /// Expressions evaluated directly by this statement; nested blocks are not included.
    pub fn expressions(&self) -> Vec<&Expr> {
        match &self.kind {
            StmtKind::Expr(e) => vec![e],
            StmtKind::Assign { targets, value } => targets.iter().chain(std::iter::once(value)).collect(),
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
            } => std::iter::once(target).chain(Some(annotation)).chain(value).collect(),
            StmtKind::AugAssign { target, value, .. } => vec![target, value],
            StmtKind::Return(value) => value.iter().collect(),
            StmtKind::Delete(targets) => targets.iter().collect(),
            StmtKind::Assert { test, msg } => std::iter::once(test).chain(msg).collect(),
            StmtKind::Raise { exc, cause } => exc.iter().chain(cause).collect(),
            StmtKind::If { test, .. } | StmtKind::While { test, .. } => vec![test],
            StmtKind::For { target, iter, .. } => vec![target, iter],
            StmtKind::Try { handlers, .. } => handlers.iter().filter_map(|h| h.typ.as_ref()).collect(),
            StmtKind::With { items, .. } => items
                .iter()
                .flat_map(|item| std::iter::once(&item.context).chain(&item.vars))
                .collect(),
            StmtKind::FunctionDef(def) => {
                let mut out: Vec<&Expr> = def.decorators.iter().collect();
                for p in def.params.iter() {
                    out.extend(&p.annotation);
                    out.extend(&p.default);
                }
                out.extend(&def.returns);
                out
            }
            StmtKind::ClassDef(def) => def
                .decorators
                .iter()
                .chain(def.bases.iter().map(|b| &b.value))
                .collect(),
            StmtKind::Pass
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Global(_)
            | StmtKind::Nonlocal(_)
            | StmtKind::Import(_)
            | StmtKind::Error => Vec::new(),
        }
    }

    /// Nested statement lists owned by this statement (bodies, branches, handlers).
    pub fn child_blocks(&self) -> Vec<&[Stmt]> {
        match &self.kind {
            StmtKind::If { body, orelse, .. }
            | StmtKind::While { body, orelse, .. }
            | StmtKind::For { body, orelse, .. } => vec![body, orelse],
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                let mut blocks: Vec<&[Stmt]> = vec![body];
                blocks.extend(handlers.iter().map(|h| h.body.as_slice()));
                blocks.push(orelse);
                blocks.push(finalbody);
                blocks
            }
            StmtKind::With { body, .. } => vec![body],
            StmtKind::FunctionDef(def) => vec![&def.body],
            StmtKind::ClassDef(def) => vec![&def.body],
            _ => Vec::new(),
        }
    }
}

/// Parsed module: top-level statements in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Program { statements }
    }

    /// Pre-order walk over every statement, descending into all nested blocks.
    pub fn walk<'p>(&'p self, f: &mut impl FnMut(&'p Stmt)) {
        fn visit<'p>(stmts: &'p [Stmt], f: &mut impl FnMut(&'p Stmt)) {
            for stmt in stmts {
                f(stmt);
                for block in stmt.child_blocks() {
                    visit(block, f);
                }
            }
        }
        visit(&self.statements, f);
    }

    pub fn statement_count(&self) -> usize {
        let mut n = 0;
        self.walk(&mut |_| n += 1);
        n
    }
}
