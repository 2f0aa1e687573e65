use crate::{
    resolve::{ScopeId, ScopeKind, ScopeTree},
    stmt::Program,
    token::Span,
    typ::{ClassType, Type, builtins},
    util::fast_map::{FastHashMap, fast_hash_map_new},
};
use std::{fmt, sync::Arc};

mod calls;
mod expressions;
mod statements;

#[cfg(test)]
mod tests;

/// Stable identifier of the rule a [`TypeError`] violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadAssignment,
    BadReturn,
    BadArgumentType,
    BadArgumentCount,
    MissingArgument,
    UnexpectedKeyword,
    UnknownName,
    MissingAttribute,
    UnsupportedOperation,
    NotCallable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadAssignment => "bad-assignment",
            ErrorCode::BadReturn => "bad-return",
            ErrorCode::BadArgumentType => "bad-argument-type",
            ErrorCode::BadArgumentCount => "bad-argument-count",
            ErrorCode::MissingArgument => "missing-argument",
            ErrorCode::UnexpectedKeyword => "unexpected-keyword",
            ErrorCode::UnknownName => "unknown-name",
            ErrorCode::MissingAttribute => "missing-attribute",
            ErrorCode::UnsupportedOperation => "unsupported-operation",
            ErrorCode::NotCallable => "not-callable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options that influence type checking behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeCheckerOptions {
    /// Report reads of names bound nowhere (suppressed anyway below a wildcard import)
    pub report_unknown_names: bool,
    /// Check arity, keywords and annotated parameter types at call sites
    pub check_call_arguments: bool,
}

impl Default for TypeCheckerOptions {
    fn default() -> Self {
        Self {
            report_unknown_names: true,
            check_call_arguments: true,
        }
    }
}

/// Type checking error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type Error: {} [{}]", self.message, self.code)
    }
}

impl std::error::Error for TypeError {}

/// Return statements seen in the function body being checked.
#[derive(Debug)]
struct ReturnCtx {
    declared: Option<Type>,
    inferred: Vec<Type>,
    is_generator: bool,
}

/// Walks a program against its scope tree, writing inferred types onto the
/// bindings and collecting rule violations.
///
/// The walk is a single pass in source order. A binding's type is the join of
/// every value assigned to it so far, unless the name carries an annotation,
/// in which case the annotation wins and assignments are checked against it.
#[derive(Debug)]
pub struct TypeChecker<'t> {
    scopes: &'t mut ScopeTree,
    options: TypeCheckerOptions,
    errors: Vec<TypeError>,
    current: ScopeId,
    /// Annotated names and attributes, keyed by the scope owning them
    declared: FastHashMap<(ScopeId, String), Type>,
    /// Class types by class body scope
    classes: FastHashMap<ScopeId, Arc<ClassType>>,
    returns: Vec<ReturnCtx>,
}

/// Type-check `program`, attaching inferred types to `scopes`.
pub fn check(program: &Program, scopes: &mut ScopeTree, options: TypeCheckerOptions) -> Vec<TypeError> {
    TypeChecker::new(scopes, options).check_program(program)
}

impl<'t> TypeChecker<'t> {
    pub fn new(scopes: &'t mut ScopeTree, options: TypeCheckerOptions) -> Self {
        let current = scopes.root();
        Self {
            scopes,
            options,
            errors: Vec::new(),
            current,
            declared: fast_hash_map_new(),
            classes: fast_hash_map_new(),
            returns: Vec::new(),
        }
    }

    pub fn check_program(mut self, program: &Program) -> Vec<TypeError> {
        self.check_block(&program.statements);
        self.errors
    }

    fn report(&mut self, code: ErrorCode, message: String, span: Span) {
        self.errors.push(TypeError { code, message, span });
    }

    fn with_scope<R>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.current, scope);
        let out = f(self);
        self.current = saved;
        out
    }

    fn current_kind(&self) -> ScopeKind {
        self.scopes.get(self.current).map_or(ScopeKind::Module, |s| s.kind)
    }

    /// Scope a write to `name` from the current scope lands in.
    fn write_scope(&self, name: &str) -> ScopeId {
        self.write_scope_from(self.current, name)
    }

    fn write_scope_from(&self, from: ScopeId, name: &str) -> ScopeId {
        let Some(scope) = self.scopes.get(from) else {
            return from;
        };
        if scope.globals.contains(name) {
            return self.scopes.root();
        }
        if scope.nonlocals.contains(name)
            && let Some(binding) = self.scopes.lookup_enclosing_function(from, name)
        {
            return binding.scope;
        }
        from
    }

    /// Target scope of `:=`, which skips enclosing comprehensions.
    fn walrus_scope(&self, name: &str) -> ScopeId {
        let mut scope = self.current;
        while let Some(s) = self.scopes.get(scope)
            && s.kind == ScopeKind::Comprehension
            && let Some(parent) = s.parent
        {
            scope = parent;
        }
        self.write_scope_from(scope, name)
    }

    /// Type of the value bound to `name` as seen from the current scope,
    /// without reporting anything.
    fn peek_name(&self, name: &str) -> Option<Type> {
        match self.scopes.lookup(self.current, name) {
            Some(binding) => Some(binding.ty.clone().unwrap_or(Type::Unknown)),
            None => builtins::builtin(name).map(|entry| entry.ty.clone()),
        }
    }

    /// Record the type of `name` in `scope`, checking it against an annotation if one exists.
    fn assign_name(&mut self, scope: ScopeId, name: &str, ty: Type, value_span: Span) {
        if let Some(decl) = self.declared.get(&(scope, name.to_string())) {
            if !ty.is_assignable_to(decl) {
                let message = format!("'{ty}' is not assignable to '{decl}'");
                self.report(ErrorCode::BadAssignment, message, value_span);
            }
            return;
        }
        let existing = self
            .scopes
            .get(scope)
            .and_then(|s| s.binding(name))
            .and_then(|b| b.ty.clone());
        let joined = match existing {
            Some(prev) => Type::join(prev, ty),
            None => ty,
        };
        self.scopes.set_type(scope, name, joined);
    }

    fn declare(&mut self, scope: ScopeId, name: &str, ty: Type) {
        self.declared.insert((scope, name.to_string()), ty.clone());
        self.scopes.set_type(scope, name, ty);
    }

    /// Annotation declared for `attr` on `class` or one of its ancestors.
    fn declared_attribute(&self, class: &Arc<ClassType>, attr: &str) -> Option<Type> {
        class
            .linearize()
            .iter()
            .filter_map(|c| c.scope)
            .find_map(|scope| self.declared.get(&(scope, attr.to_string())).cloned())
    }
}
