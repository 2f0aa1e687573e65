use super::{ErrorCode, TypeChecker};
use crate::{
    expr::{Comprehension, Constant, Expr, ExprKind, Parameters},
    op::{BinOp, UnaryOp},
    resolve::ScopeKind,
    token::Span,
    typ::{FunctionFlavor, FunctionType, MemberLookup, NumericHierarchy, Type, builtins, members::member_type},
};

/// Integer value of a constant index such as `0` or `-1`.
fn constant_index(expr: &Expr) -> Option<i64> {
    match &expr.kind {
        ExprKind::Constant(Constant::Int(text)) => text.replace('_', "").parse().ok(),
        ExprKind::UnaryOp {
            op: UnaryOp::Neg,
            operand,
        } => constant_index(operand).map(|v| -v),
        _ => None,
    }
}

/// Result of `lhs op rhs` for builtin value types; `None` when the operator is undefined.
fn builtin_binop(op: BinOp, lhs: &Type, rhs: &Type) -> Option<Type> {
    use Type::*;
    if let (Some(a), Some(b)) = (lhs.numeric_rank(), rhs.numeric_rank()) {
        return NumericHierarchy::result(op, a, b);
    }
    let is_int = |t: &Type| matches!(t, Int | Bool);
    match (lhs, rhs, op) {
        (Str, Str, BinOp::Add) => Some(Str),
        (Bytes, Bytes, BinOp::Add) => Some(Bytes),
        (Str, n, BinOp::Mul) | (n, Str, BinOp::Mul) if is_int(n) => Some(Str),
        (Bytes, n, BinOp::Mul) | (n, Bytes, BinOp::Mul) if is_int(n) => Some(Bytes),
        (Str, _, BinOp::Mod) => Some(Str),
        (Bytes, _, BinOp::Mod) => Some(Bytes),
        (List(a), List(b), BinOp::Add) => Some(Type::list(Type::join((**a).clone(), (**b).clone()))),
        (List(_), n, BinOp::Mul) if is_int(n) => Some(lhs.clone()),
        (n, List(_), BinOp::Mul) if is_int(n) => Some(rhs.clone()),
        (Tuple(a), Tuple(b), BinOp::Add) => Some(Tuple(a.iter().chain(b.iter()).cloned().collect())),
        (Tuple(_) | VarTuple(_), Tuple(_) | VarTuple(_), BinOp::Add) => {
            let element = Type::join(builtins::iter_element(lhs), builtins::iter_element(rhs));
            Some(VarTuple(Box::new(element)))
        }
        (Tuple(_) | VarTuple(_), n, BinOp::Mul) if is_int(n) => {
            Some(VarTuple(Box::new(builtins::iter_element(lhs))))
        }
        (Set(a), Set(b), BinOp::BitOr | BinOp::BitAnd | BinOp::BitXor | BinOp::Sub) => {
            Some(Type::set(Type::join((**a).clone(), (**b).clone())))
        }
        (Dict(ak, av), Dict(bk, bv), BinOp::BitOr) => Some(Type::dict(
            Type::join((**ak).clone(), (**bk).clone()),
            Type::join((**av).clone(), (**bv).clone()),
        )),
        _ => Option::None,
    }
}

/// `__add__` -> `__radd__`
fn reflected(dunder: &str) -> String {
    format!("__r{}", dunder.trim_start_matches("__"))
}

impl TypeChecker<'_> {
    /// Infer the type of `expr`, reporting any rule it violates.
    pub(super) fn infer(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Name(name) => self.infer_name(name, expr.span),
            ExprKind::Constant(constant) => match constant {
                Constant::Int(_) => Type::Int,
                Constant::Float(_) => Type::Float,
                Constant::Complex(_) => Type::Complex,
                Constant::Str(_) => Type::Str,
                Constant::Bytes(_) => Type::Bytes,
                Constant::Bool(_) => Type::Bool,
                Constant::None => Type::None,
                Constant::Ellipsis => Type::Unknown,
            },
            ExprKind::FString(_) => Type::Str,
            ExprKind::List(items) => Type::list(self.infer_elements(items)),
            ExprKind::Set(items) => Type::set(self.infer_elements(items)),
            ExprKind::Tuple(items) => {
                if items.iter().any(|i| matches!(i.kind, ExprKind::Starred(_))) {
                    Type::VarTuple(Box::new(self.infer_elements(items)))
                } else {
                    Type::Tuple(items.iter().map(|i| self.infer(i)).collect())
                }
            }
            ExprKind::Dict(items) => {
                let mut keys = Vec::with_capacity(items.len());
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let value = self.infer(&item.value);
                    match &item.key {
                        Some(key) => {
                            keys.push(self.infer(key));
                            values.push(value);
                        }
                        None => match value {
                            Type::Dict(k, v) => {
                                keys.push(*k);
                                values.push(*v);
                            }
                            _ => {
                                keys.push(Type::Unknown);
                                values.push(Type::Unknown);
                            }
                        },
                    }
                }
                Type::dict(
                    Type::join_all(keys).unwrap_or(Type::Unknown),
                    Type::join_all(values).unwrap_or(Type::Unknown),
                )
            }
            ExprKind::ListComp { elt, generators } => {
                let elem = self.infer_comprehension(expr, generators, |this| this.infer(elt));
                Type::list(elem.unwrap_or(Type::Unknown))
            }
            ExprKind::SetComp { elt, generators } => {
                let elem = self.infer_comprehension(expr, generators, |this| this.infer(elt));
                Type::set(elem.unwrap_or(Type::Unknown))
            }
            ExprKind::DictComp { key, value, generators } => {
                let (k, v) = self
                    .infer_comprehension(expr, generators, |this| (this.infer(key), this.infer(value)))
                    .unwrap_or((Type::Unknown, Type::Unknown));
                Type::dict(k, v)
            }
            ExprKind::GeneratorExp { elt, generators } => {
                self.infer_comprehension(expr, generators, |this| this.infer(elt));
                Type::Unknown
            }
            ExprKind::Attribute { value, attr, attr_span } => {
                let receiver = self.infer(value);
                if attr.is_empty() {
                    return Type::Unknown;
                }
                match member_type(self.scopes, &receiver, attr) {
                    MemberLookup::Found(ty) => ty,
                    MemberLookup::Missing => {
                        let message = format!("Object of class '{}' has no attribute '{attr}'", receiver.class_name());
                        self.report(ErrorCode::MissingAttribute, message, *attr_span);
                        Type::Unknown
                    }
                    MemberLookup::Unknown => Type::Unknown,
                }
            }
            ExprKind::Subscript { value, index } => {
                let container = self.infer(value);
                self.infer(index);
                self.subscript(&container, index)
            }
            ExprKind::Slice { lower, upper, step } => {
                for part in [lower, upper, step].into_iter().flatten() {
                    self.infer(part);
                }
                Type::Unknown
            }
            ExprKind::Call { func, args } => self.infer_call(expr, func, args),
            ExprKind::BinOp { left, op, right } => {
                let lhs = self.infer(left);
                let rhs = self.infer(right);
                self.binop(*op, lhs, rhs, expr.span)
            }
            ExprKind::UnaryOp { op, operand } => {
                let ty = self.infer(operand);
                self.unary(*op, &ty)
            }
            ExprKind::BoolOp { values, .. } => {
                let types: Vec<Type> = values.iter().map(|v| self.infer(v)).collect();
                Type::join_all(types).unwrap_or(Type::Unknown)
            }
            ExprKind::Compare { left, comparators, .. } => {
                self.infer(left);
                for comparator in comparators {
                    self.infer(comparator);
                }
                Type::Bool
            }
            ExprKind::IfExp { test, body, orelse } => {
                self.infer(test);
                let then = self.infer(body);
                let otherwise = self.infer(orelse);
                Type::join(then, otherwise)
            }
            ExprKind::Lambda { params, body } => self.infer_lambda(expr, params, body),
            ExprKind::NamedExpr {
                target,
                target_span,
                value,
            } => {
                let ty = self.infer(value);
                let scope = self.walrus_scope(target);
                self.assign_name(scope, target, ty.clone(), *target_span);
                ty
            }
            ExprKind::Starred(inner) | ExprKind::Await(inner) | ExprKind::YieldFrom(inner) => {
                self.infer(inner);
                Type::Unknown
            }
            ExprKind::Yield(inner) => {
                if let Some(inner) = inner {
                    self.infer(inner);
                }
                Type::Unknown
            }
            ExprKind::Error => Type::Unknown,
        }
    }

    fn infer_name(&mut self, name: &str, span: Span) -> Type {
        if let Some(ty) = self.peek_name(name) {
            return ty;
        }
        if self.options.report_unknown_names && !self.scopes.has_wildcard_import(self.current) {
            self.report(ErrorCode::UnknownName, format!("Could not find name '{name}'"), span);
        }
        Type::Unknown
    }

    /// Join of the element types of a display; `*xs` contributes the elements of `xs`.
    fn infer_elements(&mut self, items: &[Expr]) -> Type {
        let types: Vec<Type> = items
            .iter()
            .map(|item| match &item.kind {
                ExprKind::Starred(inner) => {
                    let ty = self.infer(inner);
                    builtins::iter_element(&ty)
                }
                _ => self.infer(item),
            })
            .collect();
        Type::join_all(types).unwrap_or(Type::Unknown)
    }

    /// Walk the `for` clauses of a comprehension inside its own scope and infer
    /// the element with `elt`. The first iterable is evaluated outside.
    fn infer_comprehension<R>(
        &mut self,
        expr: &Expr,
        generators: &[Comprehension],
        elt: impl FnOnce(&mut Self) -> R,
    ) -> Option<R> {
        let first = generators.first().map(|g| self.infer(&g.iter));
        let scope = self.scopes.scope_for_node(expr.span.start, ScopeKind::Comprehension)?;
        let result = self.with_scope(scope, |this| {
            for (i, generator) in generators.iter().enumerate() {
                let iterable = match (&first, i) {
                    (Some(ty), 0) => ty.clone(),
                    _ => this.infer(&generator.iter),
                };
                let element = if generator.is_async {
                    Type::Unknown
                } else {
                    builtins::iter_element(&iterable)
                };
                this.assign_to(&generator.target, element, generator.iter.span);
                for cond in &generator.ifs {
                    this.infer(cond);
                }
            }
            elt(this)
        });
        Some(result)
    }

    fn infer_lambda(&mut self, expr: &Expr, params: &Parameters, body: &Expr) -> Type {
        for default in params.iter().filter_map(|p| p.default.as_ref()) {
            self.infer(default);
        }
        let param_types = self.param_types(params);
        let Some(scope) = self.scopes.scope_for_node(expr.span.start, ScopeKind::Lambda) else {
            return Type::Unknown;
        };
        let returns = self.with_scope(scope, |this| {
            this.bind_params(&param_types, None);
            this.infer(body)
        });
        Type::function(FunctionType {
            name: "<lambda>".to_string(),
            params: param_types,
            returns,
            flavor: FunctionFlavor::Function,
        })
    }

    fn subscript(&self, container: &Type, index: &Expr) -> Type {
        let is_slice = matches!(index.kind, ExprKind::Slice { .. });
        match container {
            Type::List(_) | Type::VarTuple(_) if is_slice => container.clone(),
            Type::List(elem) | Type::VarTuple(elem) => (**elem).clone(),
            Type::Str => Type::Str,
            Type::Bytes if is_slice => Type::Bytes,
            Type::Bytes => Type::Int,
            Type::Dict(_, value) => (**value).clone(),
            Type::Tuple(items) if is_slice => {
                Type::VarTuple(Box::new(Type::join_all(items.iter().cloned()).unwrap_or(Type::Unknown)))
            }
            Type::Tuple(items) => {
                let len = items.len() as i64;
                match constant_index(index) {
                    Some(i) if (-len..len).contains(&i) => {
                        let at = if i < 0 { len + i } else { i };
                        items[at as usize].clone()
                    }
                    _ => Type::join_all(items.iter().cloned()).unwrap_or(Type::Unknown),
                }
            }
            Type::Instance(_) => match member_type(self.scopes, container, "__getitem__") {
                MemberLookup::Found(Type::Function(f)) => f.returns.clone(),
                _ => Type::Unknown,
            },
            _ => Type::Unknown,
        }
    }

    fn unary(&self, op: UnaryOp, operand: &Type) -> Type {
        match (op, operand) {
            (UnaryOp::Not, _) => Type::Bool,
            (UnaryOp::Neg | UnaryOp::Pos | UnaryOp::Invert, Type::Bool | Type::Int) => Type::Int,
            (UnaryOp::Neg | UnaryOp::Pos, Type::Float | Type::Complex) => operand.clone(),
            (_, Type::Instance(_)) => match member_type(self.scopes, operand, op.dunder()) {
                MemberLookup::Found(Type::Function(f)) => f.returns.clone(),
                _ => Type::Unknown,
            },
            _ => Type::Unknown,
        }
    }

    /// Result type of a binary operator, reporting operands of builtin types the
    /// operator is not defined for.
    pub(super) fn binop(&mut self, op: BinOp, lhs: Type, rhs: Type, span: Span) -> Type {
        if lhs.is_dynamic() || rhs.is_dynamic() {
            return Type::Unknown;
        }
        if let Some(result) = builtin_binop(op, &lhs, &rhs) {
            return result;
        }
        if let Some(result) = self.union_binop(op, &lhs, &rhs) {
            return result;
        }
        if let Type::Instance(_) = lhs
            && let MemberLookup::Found(Type::Function(f)) = member_type(self.scopes, &lhs, op.dunder())
        {
            return f.returns.clone();
        }
        if let Type::Instance(_) = rhs
            && let MemberLookup::Found(Type::Function(f)) = member_type(self.scopes, &rhs, &reflected(op.dunder()))
        {
            return f.returns.clone();
        }
        if lhs.is_builtin_value() && rhs.is_builtin_value() {
            let message = format!("Operator '{op}' is not supported between '{lhs}' and '{rhs}'");
            self.report(ErrorCode::UnsupportedOperation, message, span);
        }
        Type::Unknown
    }

    /// Distribute an operator over union operands; gives up unless every pair is defined.
    fn union_binop(&self, op: BinOp, lhs: &Type, rhs: &Type) -> Option<Type> {
        let split = |t: &Type| match t {
            Type::Union(items) => items.clone(),
            other => vec![other.clone()],
        };
        if !matches!(lhs, Type::Union(_)) && !matches!(rhs, Type::Union(_)) {
            return None;
        }
        let mut results = Vec::new();
        for l in split(lhs) {
            for r in split(rhs) {
                results.push(builtin_binop(op, &l, &r)?);
            }
        }
        Some(Type::union(results))
    }
}
