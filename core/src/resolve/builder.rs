//! Symbol table construction.
//!
//! Walks the statement and expression tree once, creating a [`Scope`] for
//! every module, class, function, lambda and comprehension and recording each
//! name binding in the scope Python would place it in. Redefinitions replace
//! the earlier binding without a diagnostic. Error nodes left by the parser
//! are skipped.
//!
//! [`Scope`]: super::Scope

use super::{Binding, BindingKind, ScopeId, ScopeKind, ScopeTree};
use crate::{
    expr::{Comprehension, Expr, ExprKind, Parameters},
    stmt::{ClassDef, FunctionDef, ImportTarget, Program, Stmt, StmtKind},
    token::Span,
    typ::modules,
};

/// Receiver name of the method currently being walked, with the class it belongs to.
#[derive(Debug, Clone)]
struct MethodCtx {
    receiver: String,
    class_scope: ScopeId,
}

#[derive(Debug)]
pub struct ScopeBuilder {
    tree: ScopeTree,
    current: ScopeId,
    method: Option<MethodCtx>,
}

impl ScopeBuilder {
    /// Build the scope tree for a parsed module.
    pub fn build(program: &Program) -> ScopeTree {
        let region = match (program.statements.first(), program.statements.last()) {
            (Some(first), Some(last)) => first.span.cover(&last.span),
            _ => Span::default(),
        };
        let tree = ScopeTree::new(region);
        let mut builder = ScopeBuilder {
            current: tree.root(),
            tree,
            method: None,
        };
        builder.visit_block(&program.statements);
        builder.tree
    }

    fn with_scope<F>(&mut self, kind: ScopeKind, name: String, region: Span, f: F) -> ScopeId
    where
        F: FnOnce(&mut Self),
    {
        let id = self.tree.push_scope(self.current, kind, name, region);
        let saved = std::mem::replace(&mut self.current, id);
        f(self);
        self.current = saved;
        id
    }

    fn current_kind(&self) -> ScopeKind {
        self.tree.get(self.current).map_or(ScopeKind::Module, |s| s.kind)
    }

    /// Scope a plain binding of `name` lands in, honouring `global`/`nonlocal`.
    fn target_scope(&self, name: &str) -> ScopeId {
        let Some(scope) = self.tree.get(self.current) else {
            return self.current;
        };
        if scope.globals.contains(name) {
            return self.tree.root();
        }
        if scope.nonlocals.contains(name) {
            if let Some(binding) = self.tree.lookup_enclosing_function(self.current, name) {
                return binding.scope;
            }
            // Unbound nonlocal: fall back to the nearest enclosing function.
            let mut cur = scope.parent;
            while let Some(id) = cur {
                match self.tree.get(id) {
                    Some(s) if s.kind.is_function_like() => return id,
                    Some(s) => cur = s.parent,
                    None => break,
                }
            }
        }
        self.current
    }

    fn bind(&mut self, binding: Binding) -> ScopeId {
        let scope = self.target_scope(&binding.name);
        let binding = Binding { scope, ..binding };
        if let Some(s) = self.tree.get_mut(scope) {
            s.bindings.insert(binding);
        }
        scope
    }

    fn bind_name(&mut self, name: &str, kind: BindingKind, span: Span) {
        let binding = Binding::new(name, kind, span, self.current);
        self.bind(binding);
    }

    fn visit_block(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(e) => self.visit_expr(e),
            StmtKind::Assign { targets, value } => {
                self.visit_expr(value);
                for target in targets {
                    self.bind_target(target);
                }
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
            } => {
                self.visit_expr(annotation);
                if let Some(value) = value {
                    self.visit_expr(value);
                }
                self.bind_target(target);
            }
            StmtKind::AugAssign { target, value, .. } => {
                self.visit_expr(value);
                self.bind_target(target);
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            StmtKind::Delete(targets) => targets.iter().for_each(|t| self.visit_expr(t)),
            StmtKind::Assert { test, msg } => {
                self.visit_expr(test);
                if let Some(msg) = msg {
                    self.visit_expr(msg);
                }
            }
            StmtKind::Raise { exc, cause } => {
                for e in [exc, cause].into_iter().flatten() {
                    self.visit_expr(e);
                }
            }
            StmtKind::Global(names) => {
                if let Some(scope) = self.tree.get_mut(self.current) {
                    scope.globals.extend(names.iter().map(|n| n.name.clone()));
                }
            }
            StmtKind::Nonlocal(names) => {
                if let Some(scope) = self.tree.get_mut(self.current) {
                    scope.nonlocals.extend(names.iter().map(|n| n.name.clone()));
                }
            }
            StmtKind::Import(import) => {
                if import.is_wildcard()
                    && let Some(scope) = self.tree.get_mut(self.current)
                {
                    scope.has_wildcard_import = true;
                }
                for imported in import.bound_names() {
                    let kind = match &imported.target {
                        ImportTarget::Module(_) => BindingKind::Module,
                        ImportTarget::Member { module, member } if modules::is_submodule(module, member) => {
                            BindingKind::Module
                        }
                        ImportTarget::Member { .. } => BindingKind::Variable,
                    };
                    let mut binding = Binding::new(imported.local, kind, imported.span, self.current);
                    binding.import = Some(imported.target);
                    self.bind(binding);
                }
            }
            StmtKind::If { test, body, orelse } | StmtKind::While { test, body, orelse } => {
                self.visit_expr(test);
                self.visit_block(body);
                self.visit_block(orelse);
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                self.visit_expr(iter);
                self.bind_target(target);
                self.visit_block(body);
                self.visit_block(orelse);
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.visit_block(body);
                for handler in handlers {
                    if let Some(typ) = &handler.typ {
                        self.visit_expr(typ);
                    }
                    if let Some(name) = &handler.name {
                        self.bind_name(&name.name, BindingKind::Variable, name.span);
                    }
                    self.visit_block(&handler.body);
                }
                self.visit_block(orelse);
                self.visit_block(finalbody);
            }
            StmtKind::With { items, body, .. } => {
                for item in items {
                    self.visit_expr(&item.context);
                    if let Some(vars) = &item.vars {
                        self.bind_target(vars);
                    }
                }
                self.visit_block(body);
            }
            StmtKind::FunctionDef(def) => self.visit_function(def, stmt.span),
            StmtKind::ClassDef(def) => self.visit_class(def, stmt.span),
            StmtKind::Pass | StmtKind::Break | StmtKind::Continue | StmtKind::Error => {}
        }
    }

    /// Defaults, annotations and decorators are evaluated in the enclosing scope.
    fn visit_signature(&mut self, params: &Parameters) {
        for p in params.iter() {
            if let Some(annotation) = &p.annotation {
                self.visit_expr(annotation);
            }
            if let Some(default) = &p.default {
                self.visit_expr(default);
            }
        }
    }

    fn bind_params(&mut self, params: &Parameters) {
        for p in params.iter() {
            self.bind_name(&p.name, BindingKind::Parameter, p.span);
        }
    }

    fn visit_function(&mut self, def: &FunctionDef, span: Span) {
        def.decorators.iter().for_each(|d| self.visit_expr(d));
        self.visit_signature(&def.params);
        if let Some(returns) = &def.returns {
            self.visit_expr(returns);
        }

        let is_static = def
            .decorators
            .iter()
            .any(|d| d.dotted_name().as_deref() == Some("staticmethod"));
        let method = match (self.current_kind(), def.params.positional().next()) {
            (ScopeKind::Class, Some(first)) if !is_static => Some(MethodCtx {
                receiver: first.name.clone(),
                class_scope: self.current,
            }),
            _ => None,
        };

        let mut binding = Binding::new(&def.name, BindingKind::Function, def.name_span, self.current);
        let scope_target = self.bind(binding.clone());

        let saved_method = std::mem::replace(&mut self.method, method);
        let body_scope = self.with_scope(ScopeKind::Function, def.name.clone(), span, |this| {
            this.bind_params(&def.params);
            this.visit_block(&def.body);
        });
        self.method = saved_method;

        binding.defines = Some(body_scope);
        binding.scope = scope_target;
        if let Some(s) = self.tree.get_mut(scope_target) {
            s.bindings.insert(binding);
        }
    }

    fn visit_class(&mut self, def: &ClassDef, span: Span) {
        def.decorators.iter().for_each(|d| self.visit_expr(d));
        def.bases.iter().for_each(|b| self.visit_expr(&b.value));

        let mut binding = Binding::new(&def.name, BindingKind::Class, def.name_span, self.current);
        let scope_target = self.bind(binding.clone());

        let saved_method = self.method.take();
        let body_scope = self.with_scope(ScopeKind::Class, def.name.clone(), span, |this| {
            this.visit_block(&def.body);
        });
        self.method = saved_method;

        binding.defines = Some(body_scope);
        binding.scope = scope_target;
        if let Some(s) = self.tree.get_mut(scope_target) {
            s.bindings.insert(binding);
        }
    }

    /// Bind every name an assignment target introduces; other parts of the
    /// target (subscript indices, attribute receivers) are plain reads.
    fn bind_target(&mut self, target: &Expr) {
        match &target.kind {
            ExprKind::Name(name) => self.bind_name(name, BindingKind::Variable, target.span),
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                for item in items {
                    self.bind_target(item);
                }
            }
            ExprKind::Starred(inner) => self.bind_target(inner),
            ExprKind::Attribute { value, attr, attr_span } => {
                if let (ExprKind::Name(receiver), Some(ctx)) = (&value.kind, &self.method)
                    && *receiver == ctx.receiver
                    && !attr.is_empty()
                {
                    let class_scope = ctx.class_scope;
                    let binding = Binding::new(attr, BindingKind::Variable, *attr_span, class_scope);
                    if let Some(scope) = self.tree.get_mut(class_scope)
                        && !scope.attributes.contains(attr)
                    {
                        scope.attributes.insert(binding);
                    }
                }
                self.visit_expr(value);
            }
            _ => self.visit_expr(target),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Error => {}
            ExprKind::Lambda { params, body } => {
                self.visit_signature(params);
                self.with_scope(ScopeKind::Lambda, "<lambda>".to_string(), expr.span, |this| {
                    this.bind_params(params);
                    this.visit_expr(body);
                });
            }
            ExprKind::ListComp { elt, generators } => {
                self.visit_comprehension("<listcomp>", expr.span, generators, &[&**elt])
            }
            ExprKind::SetComp { elt, generators } => {
                self.visit_comprehension("<setcomp>", expr.span, generators, &[&**elt])
            }
            ExprKind::GeneratorExp { elt, generators } => {
                self.visit_comprehension("<genexpr>", expr.span, generators, &[&**elt])
            }
            ExprKind::DictComp { key, value, generators } => {
                self.visit_comprehension("<dictcomp>", expr.span, generators, &[&**key, &**value])
            }
            ExprKind::NamedExpr {
                target,
                target_span,
                value,
            } => {
                self.visit_expr(value);
                self.bind_walrus(target, *target_span);
            }
            _ => expr.for_each_child(|child| self.visit_expr(child)),
        }
    }

    /// The first iterable is evaluated outside the comprehension; everything
    /// else, including the targets, lives in its own scope.
    fn visit_comprehension(&mut self, name: &str, span: Span, generators: &[Comprehension], elts: &[&Expr]) {
        if let Some(first) = generators.first() {
            self.visit_expr(&first.iter);
        }
        self.with_scope(ScopeKind::Comprehension, name.to_string(), span, |this| {
            for (i, generator) in generators.iter().enumerate() {
                if i > 0 {
                    this.visit_expr(&generator.iter);
                }
                this.bind_target(&generator.target);
                generator.ifs.iter().for_each(|cond| this.visit_expr(cond));
            }
            elts.iter().for_each(|e| this.visit_expr(e));
        });
    }

    /// `:=` inside a comprehension binds in the nearest enclosing non-comprehension scope.
    fn bind_walrus(&mut self, name: &str, span: Span) {
        let saved = self.current;
        while self.current_kind() == ScopeKind::Comprehension {
            match self.tree.parent(self.current) {
                Some(parent) => self.current = parent,
                None => break,
            }
        }
        self.bind_name(name, BindingKind::Variable, span);
        self.current = saved;
    }
}
