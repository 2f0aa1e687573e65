use crate::{
    expr::{Constant, Expr, ExprKind},
    op::BinOp,
    typ::Type,
};

/// Convert an annotation expression to a type.
///
/// `resolve` maps a user-visible name to the type of the value it is bound to
/// (a class binding yields `type[C]`); builtin and `typing` names are handled
/// here. Anything not understood becomes `Unknown` so it never causes a report.
pub fn annotation_type(expr: &Expr, resolve: &dyn Fn(&str) -> Option<Type>) -> Type {
    match &expr.kind {
        ExprKind::Constant(Constant::None) => Type::None,
        ExprKind::Constant(Constant::Str(text)) => match Expr::try_from(text.trim()) {
            Ok(inner) => annotation_type(&inner, resolve),
            Err(_) => Type::Unknown,
        },
        ExprKind::Name(name) => match resolve(name) {
            Some(Type::ClassObject(instance)) => *instance,
            Some(_) => Type::Unknown,
            None => named_type(name),
        },
        ExprKind::Attribute { attr, .. } => named_type(attr),
        ExprKind::BinOp {
            left,
            op: BinOp::BitOr,
            right,
        } => Type::union(vec![annotation_type(left, resolve), annotation_type(right, resolve)]),
        ExprKind::Subscript { value, index } => {
            let base = match &value.kind {
                ExprKind::Name(name) => name.as_str(),
                ExprKind::Attribute { attr, .. } => attr.as_str(),
                _ => return Type::Unknown,
            };
            let args: Vec<&Expr> = match &index.kind {
                ExprKind::Tuple(items) => items.iter().collect(),
                _ => vec![index.as_ref()],
            };
            generic_type(base, &args, resolve)
        }
        _ => Type::Unknown,
    }
}

fn named_type(name: &str) -> Type {
    match name {
        "int" => Type::Int,
        "float" => Type::Float,
        "complex" => Type::Complex,
        "str" => Type::Str,
        "bytes" => Type::Bytes,
        "bool" => Type::Bool,
        "object" => Type::Object,
        "None" => Type::None,
        "Any" => Type::Any,
        "list" | "List" => Type::list(Type::Unknown),
        "dict" | "Dict" => Type::dict(Type::Unknown, Type::Unknown),
        "set" | "Set" | "frozenset" | "FrozenSet" => Type::set(Type::Unknown),
        "tuple" | "Tuple" => Type::VarTuple(Box::new(Type::Unknown)),
        _ => Type::Unknown,
    }
}

fn generic_type(base: &str, args: &[&Expr], resolve: &dyn Fn(&str) -> Option<Type>) -> Type {
    let arg = |i: usize| args.get(i).map_or(Type::Unknown, |e| annotation_type(e, resolve));
    match base {
        "list" | "List" => Type::list(arg(0)),
        "set" | "Set" | "frozenset" | "FrozenSet" => Type::set(arg(0)),
        "dict" | "Dict" => Type::dict(arg(0), arg(1)),
        "tuple" | "Tuple" => match args {
            [elem, last] if matches!(last.kind, ExprKind::Constant(Constant::Ellipsis)) => {
                Type::VarTuple(Box::new(annotation_type(elem, resolve)))
            }
            _ => Type::Tuple(args.iter().map(|e| annotation_type(e, resolve)).collect()),
        },
        "Optional" => Type::optional(arg(0)),
        "Union" => Type::union(args.iter().map(|e| annotation_type(e, resolve)).collect()),
        "type" | "Type" => Type::class_of(arg(0)),
        "Annotated" | "ClassVar" | "Final" => arg(0),
        "Literal" => Type::union(args.iter().map(|e| literal_type(e)).collect()),
        _ => Type::Unknown,
    }
}

fn literal_type(expr: &Expr) -> Type {
    match &expr.kind {
        ExprKind::Constant(Constant::Int(_)) => Type::Int,
        ExprKind::Constant(Constant::Str(_)) => Type::Str,
        ExprKind::Constant(Constant::Bytes(_)) => Type::Bytes,
        ExprKind::Constant(Constant::Bool(_)) => Type::Bool,
        ExprKind::Constant(Constant::None) => Type::None,
        ExprKind::UnaryOp { operand, .. } => literal_type(operand),
        _ => Type::Unknown,
    }
}
