use super::{ErrorCode, ReturnCtx, TypeChecker};
use crate::{
    expr::{Expr, ExprKind, ParamKind, Parameters},
    resolve::{ScopeId, ScopeKind},
    stmt::{ClassDef, FunctionDef, ImportTarget, Stmt, StmtKind},
    token::{Position, Span},
    typ::{
        ClassType, FunctionFlavor, FunctionType, MemberLookup, ParamType, Type, annotation::annotation_type, builtins,
        members::member_type, modules,
    },
};
use std::sync::Arc;

/// What a decorator list does to the binding of the decorated function.
enum Decorated {
    Plain(FunctionFlavor),
    /// `@prop.setter` and friends: the binding keeps the property
    Accessor,
    /// Anything the checker does not model
    Opaque,
}

fn decorated(def: &FunctionDef, in_class: bool) -> Decorated {
    let names: Vec<Option<String>> = def.decorators.iter().map(Expr::dotted_name).collect();
    match names.as_slice() {
        [] if in_class => Decorated::Plain(FunctionFlavor::Method),
        [] => Decorated::Plain(FunctionFlavor::Function),
        [Some(name)] if in_class => match name.as_str() {
            "staticmethod" => Decorated::Plain(FunctionFlavor::StaticMethod),
            "classmethod" => Decorated::Plain(FunctionFlavor::ClassMethod),
            "property" | "functools.cached_property" | "cached_property" => {
                Decorated::Plain(FunctionFlavor::Property)
            }
            n if n.ends_with(".setter") || n.ends_with(".deleter") || n.ends_with(".getter") => Decorated::Accessor,
            _ => Decorated::Opaque,
        },
        _ => Decorated::Opaque,
    }
}

/// True when the statement list ends every path with `return` or `raise`.
fn always_returns(block: &[Stmt]) -> bool {
    block.iter().any(|stmt| match &stmt.kind {
        StmtKind::Return(_) | StmtKind::Raise { .. } => true,
        StmtKind::If { body, orelse, .. } => always_returns(body) && always_returns(orelse),
        StmtKind::With { body, .. } => always_returns(body),
        StmtKind::Try {
            body,
            handlers,
            finalbody,
            ..
        } => (always_returns(body) && handlers.iter().all(|h| always_returns(&h.body))) || always_returns(finalbody),
        _ => false,
    })
}

fn expr_yields(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Yield(_) | ExprKind::YieldFrom(_) => true,
        ExprKind::Lambda { .. } => false,
        _ => {
            let mut found = false;
            expr.for_each_child(|child| found = found || expr_yields(child));
            found
        }
    }
}

/// `yield` anywhere in the body, not counting nested functions and classes.
fn contains_yield(block: &[Stmt]) -> bool {
    block.iter().any(|stmt| match &stmt.kind {
        StmtKind::FunctionDef(_) | StmtKind::ClassDef(_) => false,
        _ => stmt.expressions().into_iter().any(expr_yields) || stmt.child_blocks().into_iter().any(contains_yield),
    })
}

impl TypeChecker<'_> {
    pub(super) fn check_block(&mut self, stmts: &[Stmt]) {
        self.predeclare(stmts);
        for stmt in stmts {
            self.check_stmt(stmt);
        }
    }

    /// Give classes and functions defined directly in `stmts` their types before
    /// the block is walked, so earlier code can call later definitions.
    fn predeclare(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::ClassDef(def) => {
                    if let Some(body) = self.scopes.scope_for_node(stmt.span.start, ScopeKind::Class) {
                        let class = self.declare_class(def, body);
                        let scope = self.write_scope(&def.name);
                        self.scopes
                            .set_type(scope, &def.name, Type::class_of(Type::Instance(class)));
                    }
                }
                StmtKind::FunctionDef(def) => {
                    let in_class = self.current_kind() == ScopeKind::Class;
                    if let Decorated::Plain(flavor) = decorated(def, in_class) {
                        let returns = match &def.returns {
                            Some(annotation) => self.annotation(annotation),
                            None => Type::Unknown,
                        };
                        let function = self.signature(def, flavor, returns);
                        let scope = self.write_scope(&def.name);
                        self.scopes.set_type(scope, &def.name, Type::function(function));
                    }
                }
                _ => {}
            }
        }
    }

    pub(super) fn annotation(&self, expr: &Expr) -> Type {
        annotation_type(expr, &|name| self.peek_name(name))
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(e) => {
                self.infer(e);
            }
            StmtKind::Assign { targets, value } => {
                let ty = self.infer(value);
                for target in targets {
                    self.assign_to(target, ty.clone(), value.span);
                }
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
            } => self.check_ann_assign(target, annotation, value.as_ref()),
            StmtKind::AugAssign { target, op, value } => {
                let lhs = self.infer(target);
                let rhs = self.infer(value);
                let result = self.binop(*op, lhs, rhs, stmt.span);
                self.assign_to(target, result, value.span);
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), stmt.span),
            StmtKind::Delete(targets) => {
                for target in targets {
                    self.infer(target);
                }
            }
            StmtKind::Assert { test, msg } => {
                self.infer(test);
                if let Some(msg) = msg {
                    self.infer(msg);
                }
            }
            StmtKind::Raise { exc, cause } => {
                for e in [exc, cause].into_iter().flatten() {
                    self.infer(e);
                }
            }
            StmtKind::Import(import) => {
                for imported in import.bound_names() {
                    let ty = match &imported.target {
                        ImportTarget::Module(path) => Type::Module(path.clone()),
                        ImportTarget::Member { module, member } if modules::is_submodule(module, member) => {
                            Type::Module(format!("{module}.{member}"))
                        }
                        ImportTarget::Member { .. } => Type::Unknown,
                    };
                    let scope = self.write_scope(&imported.local);
                    self.scopes.set_type(scope, &imported.local, ty);
                }
            }
            StmtKind::If { test, body, orelse } | StmtKind::While { test, body, orelse } => {
                self.infer(test);
                self.check_block(body);
                self.check_block(orelse);
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            } => {
                let iterable = self.infer(iter);
                let element = if *is_async {
                    Type::Unknown
                } else {
                    builtins::iter_element(&iterable)
                };
                self.assign_to(target, element, iter.span);
                self.check_block(body);
                self.check_block(orelse);
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.check_block(body);
                for handler in handlers {
                    let caught = match &handler.typ {
                        Some(typ) => {
                            let ty = self.infer(typ);
                            exception_instance(&ty)
                        }
                        None => Type::Unknown,
                    };
                    if let Some(name) = &handler.name {
                        let scope = self.write_scope(&name.name);
                        self.assign_name(scope, &name.name, caught, name.span);
                    }
                    self.check_block(&handler.body);
                }
                self.check_block(orelse);
                self.check_block(finalbody);
            }
            StmtKind::With { items, body, is_async } => {
                for item in items {
                    let context = self.infer(&item.context);
                    let entered = if *is_async {
                        Type::Unknown
                    } else {
                        self.enter_type(&context)
                    };
                    if let Some(vars) = &item.vars {
                        self.assign_to(vars, entered, item.context.span);
                    }
                }
                self.check_block(body);
            }
            StmtKind::FunctionDef(def) => self.check_function(def, stmt.span.start),
            StmtKind::ClassDef(def) => self.check_class(def, stmt.span.start),
            StmtKind::Pass
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Global(_)
            | StmtKind::Nonlocal(_)
            | StmtKind::Error => {}
        }
    }

    fn check_ann_assign(&mut self, target: &Expr, annotation: &Expr, value: Option<&Expr>) {
        let declared = self.annotation(annotation);
        match &target.kind {
            ExprKind::Name(name) => {
                let scope = self.write_scope(name);
                self.declare(scope, name, declared.clone());
            }
            ExprKind::Attribute { value: receiver, attr, .. } => {
                if let Type::Instance(class) = self.infer(receiver)
                    && let Some(scope) = class.scope
                {
                    self.declared.insert((scope, attr.clone()), declared.clone());
                    self.scopes.set_attribute_type(scope, attr, declared.clone());
                }
            }
            _ => {
                self.infer(target);
            }
        }
        if let Some(value) = value {
            let ty = self.infer(value);
            if !ty.is_assignable_to(&declared) {
                let message = format!("'{ty}' is not assignable to '{declared}'");
                self.report(ErrorCode::BadAssignment, message, value.span);
            }
        }
    }

    /// Bind every name in an assignment target to its share of `ty`.
    pub(super) fn assign_to(&mut self, target: &Expr, ty: Type, value_span: Span) {
        match &target.kind {
            ExprKind::Name(name) => {
                let scope = self.write_scope(name);
                self.assign_name(scope, name, ty, value_span);
            }
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                let has_star = items.iter().any(|i| matches!(i.kind, ExprKind::Starred(_)));
                match &ty {
                    Type::Tuple(parts) if !has_star && parts.len() == items.len() => {
                        for (item, part) in items.iter().zip(parts.iter()) {
                            self.assign_to(item, part.clone(), value_span);
                        }
                    }
                    _ => {
                        let element = builtins::iter_element(&ty);
                        for item in items {
                            self.assign_to(item, element.clone(), value_span);
                        }
                    }
                }
            }
            ExprKind::Starred(inner) => self.assign_to(inner, Type::list(ty), value_span),
            ExprKind::Attribute { value, attr, .. } => {
                let receiver = self.infer(value);
                if let Type::Instance(class) = receiver {
                    if let Some(decl) = self.declared_attribute(&class, attr) {
                        if !ty.is_assignable_to(&decl) {
                            let message = format!("'{ty}' is not assignable to '{decl}'");
                            self.report(ErrorCode::BadAssignment, message, value_span);
                        }
                    } else if let Some(scope) = class.scope
                        && let Some(existing) = self.scopes.get(scope).and_then(|s| s.attributes.get(attr))
                    {
                        let joined = match existing.ty.clone() {
                            Some(prev) => Type::join(prev, ty),
                            None => ty,
                        };
                        self.scopes.set_attribute_type(scope, attr, joined);
                    }
                }
            }
            ExprKind::Subscript { value, index } => {
                self.infer(value);
                self.infer(index);
            }
            ExprKind::Error => {}
            _ => {
                self.infer(target);
            }
        }
    }

    fn check_return(&mut self, value: Option<&Expr>, stmt_span: Span) {
        let (ty, span) = match value {
            Some(value) => (self.infer(value), value.span),
            None => (Type::None, stmt_span),
        };
        let Some(ctx) = self.returns.last_mut() else {
            return;
        };
        ctx.inferred.push(ty.clone());
        if ctx.is_generator {
            return;
        }
        if let Some(declared) = ctx.declared.clone()
            && !ty.is_assignable_to(&declared)
        {
            let message = format!("Returned type '{ty}' is not assignable to declared return type '{declared}'");
            self.report(ErrorCode::BadReturn, message, span);
        }
    }

    /// Value bound by `with ctx as v`: the return type of `__enter__` when known.
    fn enter_type(&self, context: &Type) -> Type {
        match member_type(self.scopes, context, "__enter__") {
            MemberLookup::Found(Type::Function(f)) if matches!(context, Type::Instance(_)) => f.returns.clone(),
            _ => Type::Unknown,
        }
    }

    fn signature(&self, def: &FunctionDef, flavor: FunctionFlavor, returns: Type) -> FunctionType {
        FunctionType {
            name: def.name.clone(),
            params: self.param_types(&def.params),
            returns,
            flavor,
        }
    }

    pub(super) fn param_types(&self, params: &Parameters) -> Vec<ParamType> {
        params
            .iter()
            .map(|p| ParamType {
                name: p.name.clone(),
                ty: p.annotation.as_ref().map_or(Type::Unknown, |a| self.annotation(a)),
                kind: p.kind,
                has_default: p.default.is_some(),
                annotated: p.annotation.is_some(),
            })
            .collect()
    }

    /// Bind parameters inside the function or lambda scope that is current.
    /// `receiver` is the type of an implicit first parameter (`self`/`cls`).
    pub(super) fn bind_params(&mut self, params: &[ParamType], receiver: Option<Type>) {
        let mut receiver = receiver;
        for (i, p) in params.iter().enumerate() {
            let value = match p.kind {
                ParamKind::VarArgs => Type::VarTuple(Box::new(p.ty.clone())),
                ParamKind::KwArgs => Type::dict(Type::Str, p.ty.clone()),
                _ => p.ty.clone(),
            };
            let scope = self.current;
            if p.annotated {
                self.declare(scope, &p.name, value);
            } else if i == 0
                && matches!(p.kind, ParamKind::Positional | ParamKind::PositionalOnly)
                && let Some(recv) = receiver.take()
            {
                self.scopes.set_type(scope, &p.name, recv);
            } else {
                self.scopes.set_type(scope, &p.name, value);
            }
        }
    }

    fn check_function(&mut self, def: &FunctionDef, start: Position) {
        for decorator in &def.decorators {
            self.infer(decorator);
        }
        for default in def.params.iter().filter_map(|p| p.default.as_ref()) {
            self.infer(default);
        }
        let Some(body) = self.scopes.scope_for_node(start, ScopeKind::Function) else {
            return;
        };

        let in_class = self.current_kind() == ScopeKind::Class;
        let owner = self.write_scope(&def.name);
        let decoration = decorated(def, in_class);
        let flavor = match decoration {
            Decorated::Plain(flavor) => flavor,
            Decorated::Accessor => FunctionFlavor::Method,
            Decorated::Opaque => {
                self.scopes.set_type(owner, &def.name, Type::Unknown);
                if in_class {
                    FunctionFlavor::Method
                } else {
                    FunctionFlavor::Function
                }
            }
        };
        let declared = def.returns.as_ref().map(|r| self.annotation(r));
        let mut function = self.signature(def, flavor, declared.clone().unwrap_or(Type::Unknown));
        let receiver = match (flavor, self.classes.get(&self.current)) {
            (FunctionFlavor::Method | FunctionFlavor::Property, Some(class)) => Some(Type::Instance(class.clone())),
            (FunctionFlavor::ClassMethod, Some(class)) => Some(Type::class_of(Type::Instance(class.clone()))),
            _ => None,
        };
        let is_generator = contains_yield(&def.body);

        self.returns.push(ReturnCtx {
            declared: declared.clone(),
            inferred: Vec::new(),
            is_generator,
        });
        self.with_scope(body, |this| {
            this.bind_params(&function.params, receiver);
            this.check_block(&def.body);
        });
        let ctx = self.returns.pop();

        function.returns = if def.is_async || is_generator {
            Type::Unknown
        } else if let Some(declared) = declared {
            declared
        } else {
            let mut inferred = ctx.map(|c| c.inferred).unwrap_or_default();
            if !always_returns(&def.body) {
                inferred.push(Type::None);
            }
            Type::union(inferred)
        };
        if let Decorated::Plain(_) = decoration {
            self.scopes.set_type(owner, &def.name, Type::function(function));
        }
    }

    /// Class type for the class whose body scope is `body`, created on first use.
    fn declare_class(&mut self, def: &ClassDef, body: ScopeId) -> Arc<ClassType> {
        if let Some(class) = self.classes.get(&body) {
            return class.clone();
        }
        let mut bases = Vec::new();
        let mut fully_known = def.decorators.is_empty();
        for base in &def.bases {
            if base.name.is_some() || !matches!(base.value.kind, ExprKind::Name(_)) {
                fully_known = false;
                continue;
            }
            let ty = base.value.name().and_then(|n| self.peek_name(n)).unwrap_or(Type::Unknown);
            match ty {
                Type::ClassObject(inner) => match *inner {
                    Type::Instance(class) => bases.push(class),
                    Type::Object => {}
                    _ => fully_known = false,
                },
                _ => fully_known = false,
            }
        }
        let class = Arc::new(ClassType {
            name: def.name.clone(),
            scope: Some(body),
            bases,
            fully_known,
        });
        self.classes.insert(body, class.clone());
        class
    }

    fn check_class(&mut self, def: &ClassDef, start: Position) {
        for decorator in &def.decorators {
            self.infer(decorator);
        }
        for base in &def.bases {
            self.infer(&base.value);
        }
        let Some(body) = self.scopes.scope_for_node(start, ScopeKind::Class) else {
            return;
        };
        let class = self.declare_class(def, body);
        let scope = self.write_scope(&def.name);
        self.scopes
            .set_type(scope, &def.name, Type::class_of(Type::Instance(class)));
        self.with_scope(body, |this| this.check_block(&def.body));
    }
}

/// Instance type caught by an `except` clause naming `ty`.
fn exception_instance(ty: &Type) -> Type {
    match ty {
        Type::ClassObject(inner) => (**inner).clone(),
        Type::Tuple(items) => Type::union(items.iter().map(exception_instance).collect()),
        _ => Type::Unknown,
    }
}
