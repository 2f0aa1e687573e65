use super::{ErrorCode, TypeChecker};
use crate::{
    expr::{Arg, ArgKind, Expr, ParamKind},
    token::Span,
    typ::{FunctionType, MemberLookup, ParamType, Type, builtins, members::member_type},
};

impl TypeChecker<'_> {
    pub(super) fn infer_call(&mut self, call: &Expr, func: &Expr, args: &[Arg]) -> Type {
        let callee = self.infer(func);
        let arg_types: Vec<Type> = args.iter().map(|a| self.infer(&a.value)).collect();

        match &callee {
            Type::Function(f) => {
                self.check_arguments(f, &f.name, args, &arg_types, call.span);
                f.returns.clone()
            }
            Type::ClassObject(inner) => match inner.as_ref() {
                Type::Instance(class) if class.scope.is_some() => {
                    if let MemberLookup::Found(Type::Function(init)) = member_type(self.scopes, &callee, "__init__") {
                        let init = init.bound();
                        self.check_arguments(&init, &class.name, args, &arg_types, call.span);
                    }
                    (**inner).clone()
                }
                // `list(xs)`, `set(xs)` and `tuple(xs)` keep the element type of `xs`.
                Type::List(_) | Type::Set(_) | Type::VarTuple(_) if args.len() == 1 && args[0].kind == ArgKind::Positional => {
                    let element = builtins::iter_element(&arg_types[0]);
                    match inner.as_ref() {
                        Type::List(_) => Type::list(element),
                        Type::Set(_) => Type::set(element),
                        _ => Type::VarTuple(Box::new(element)),
                    }
                }
                other => other.clone(),
            },
            Type::Instance(_) => match member_type(self.scopes, &callee, "__call__") {
                MemberLookup::Found(Type::Function(f)) => {
                    self.check_arguments(&f, &f.name, args, &arg_types, call.span);
                    f.returns.clone()
                }
                _ => Type::Unknown,
            },
            ty if ty.is_builtin_value() || matches!(ty, Type::Module(_)) => {
                self.report(ErrorCode::NotCallable, format!("Expected a callable, got '{ty}'"), func.span);
                Type::Unknown
            }
            _ => Type::Unknown,
        }
    }

    /// Match call arguments against `f`'s parameters the way Python binds them.
    /// Calls that unpack `*args` or `**kwargs` are not checked.
    fn check_arguments(&mut self, f: &FunctionType, callee: &str, args: &[Arg], arg_types: &[Type], call_span: Span) {
        if !self.options.check_call_arguments
            || args.iter().any(|a| matches!(a.kind, ArgKind::Star | ArgKind::DoubleStar))
        {
            return;
        }
        let positional: Vec<usize> = f
            .params
            .iter()
            .enumerate()
            .filter(|(_, p)| matches!(p.kind, ParamKind::Positional | ParamKind::PositionalOnly))
            .map(|(i, _)| i)
            .collect();
        let var_args = f.params.iter().find(|p| p.kind == ParamKind::VarArgs);
        let kw_args = f.params.iter().find(|p| p.kind == ParamKind::KwArgs);
        let mut supplied = vec![false; f.params.len()];

        let given = args.iter().filter(|a| a.kind == ArgKind::Positional).count();
        let mut next = 0;
        for (arg, ty) in args.iter().zip(arg_types) {
            if arg.kind != ArgKind::Positional {
                continue;
            }
            if let Some(&idx) = positional.get(next) {
                supplied[idx] = true;
                self.check_argument_type(&f.params[idx], ty, arg.value.span);
            } else if let Some(var_args) = var_args {
                self.check_argument_type(var_args, ty, arg.value.span);
            } else if next == positional.len() {
                let message = format!("Expected {} positional argument(s), got {given}", positional.len());
                self.report(ErrorCode::BadArgumentCount, message, arg.span);
            }
            next += 1;
        }

        for (arg, ty) in args.iter().zip(arg_types) {
            let (ArgKind::Keyword, Some(name)) = (arg.kind, &arg.name) else {
                continue;
            };
            let matched = f
                .params
                .iter()
                .position(|p| &p.name == name && matches!(p.kind, ParamKind::Positional | ParamKind::KeywordOnly));
            if let Some(idx) = matched {
                supplied[idx] = true;
                self.check_argument_type(&f.params[idx], ty, arg.value.span);
            } else if let Some(kw_args) = kw_args {
                self.check_argument_type(kw_args, ty, arg.value.span);
            } else {
                let message = format!("Unexpected keyword argument '{name}' in call to '{callee}'");
                self.report(ErrorCode::UnexpectedKeyword, message, arg.span);
            }
        }

        for (p, given) in f.params.iter().zip(&supplied) {
            let required = matches!(
                p.kind,
                ParamKind::Positional | ParamKind::PositionalOnly | ParamKind::KeywordOnly
            ) && !p.has_default;
            if required && !given {
                let message = format!("Missing argument '{}' in call to '{callee}'", p.name);
                self.report(ErrorCode::MissingArgument, message, call_span);
            }
        }
    }

    fn check_argument_type(&mut self, param: &ParamType, ty: &Type, span: Span) {
        if param.annotated && !ty.is_assignable_to(&param.ty) {
            let message = format!(
                "Argument '{ty}' is not assignable to parameter '{}' with type '{}'",
                param.name, param.ty
            );
            self.report(ErrorCode::BadArgumentType, message, span);
        }
    }
}
