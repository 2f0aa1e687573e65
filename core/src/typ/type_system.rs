use crate::{expr::ParamKind, resolve::ScopeId, typ::NumericHierarchy};
use std::{fmt, sync::Arc};

/// Static type of a Python value as far as the checker can tell.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Explicit `Any`: compatible with everything in both directions
    Any,
    /// Nothing could be inferred; behaves like `Any` but is never reported
    Unknown,
    None,
    Object,
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    List(Box<Type>),
    Dict(Box<Type>, Box<Type>),
    Set(Box<Type>),
    /// Fixed-length heterogeneous tuple: `tuple[int, str]`
    Tuple(Vec<Type>),
    /// Homogeneous tuple of any length: `tuple[int, ...]`
    VarTuple(Box<Type>),
    Union(Vec<Type>),
    Function(Arc<FunctionType>),
    /// The class object itself (`type[C]`); the inner type is its instance type
    ClassObject(Box<Type>),
    Instance(Arc<ClassType>),
    Module(String),
}

/// How a function behaves when looked up through an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionFlavor {
    Function,
    Method,
    ClassMethod,
    StaticMethod,
    Property,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamType {
    pub name: String,
    pub ty: Type,
    pub kind: ParamKind,
    pub has_default: bool,
    /// False when the parameter carries no annotation; such parameters are never type-checked
    pub annotated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub name: String,
    pub params: Vec<ParamType>,
    pub returns: Type,
    pub flavor: FunctionFlavor,
}

/// A class known to the checker: user classes carry their body scope, builtin ones do not.
#[derive(Debug, Clone)]
pub struct ClassType {
    pub name: String,
    pub scope: Option<ScopeId>,
    pub bases: Vec<Arc<ClassType>>,
    /// Every base resolved to a known class and nothing (decorators, metaclasses,
    /// `__getattr__`) can add members behind the checker's back.
    pub fully_known: bool,
}

impl PartialEq for ClassType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.scope == other.scope
    }
}

impl ClassType {
    /// Builtin class without members the checker understands (`range`, exception types, ...).
    pub fn builtin(name: &str) -> Arc<ClassType> {
        Arc::new(ClassType {
            name: name.to_string(),
            scope: None,
            bases: Vec::new(),
            fully_known: false,
        })
    }

    pub fn is_subclass_of(&self, other: &ClassType) -> bool {
        self == other || self.bases.iter().any(|b| b.is_subclass_of(other))
    }

    /// Class and its known ancestors, nearest first, each once.
    pub fn linearize(self: &Arc<Self>) -> Vec<Arc<ClassType>> {
        let mut out: Vec<Arc<ClassType>> = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(class) = stack.pop() {
            if out.iter().any(|c| **c == *class) {
                continue;
            }
            for base in class.bases.iter().rev() {
                stack.push(base.clone());
            }
            out.push(class);
        }
        out
    }
}

impl FunctionType {
    /// Parameters seen by a caller once the implicit receiver is bound.
    pub fn bound(&self) -> FunctionType {
        let mut params = self.params.clone();
        if matches!(self.flavor, FunctionFlavor::Method | FunctionFlavor::ClassMethod | FunctionFlavor::Property)
            && params
                .first()
                .is_some_and(|p| matches!(p.kind, ParamKind::Positional | ParamKind::PositionalOnly))
        {
            params.remove(0);
        }
        FunctionType {
            name: self.name.clone(),
            params,
            returns: self.returns.clone(),
            flavor: FunctionFlavor::Function,
        }
    }

    /// `(x: int, y=...) -> str`
    pub fn signature(&self) -> String {
        let mut parts = Vec::with_capacity(self.params.len());
        let mut saw_star = false;
        for p in &self.params {
            let prefix = match p.kind {
                ParamKind::VarArgs => {
                    saw_star = true;
                    "*"
                }
                ParamKind::KwArgs => "**",
                ParamKind::KeywordOnly if !saw_star => {
                    saw_star = true;
                    parts.push("*".to_string());
                    ""
                }
                _ => "",
            };
            let mut s = format!("{prefix}{}", p.name);
            if p.annotated {
                s.push_str(&format!(": {}", p.ty));
            }
            if p.has_default {
                s.push_str("=...");
            }
            parts.push(s);
        }
        format!("({}) -> {}", parts.join(", "), self.returns)
    }
}

impl Type {
    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }

    pub fn set(elem: Type) -> Type {
        Type::Set(Box::new(elem))
    }

    pub fn dict(key: Type, value: Type) -> Type {
        Type::Dict(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: Type) -> Type {
        Type::union(vec![inner, Type::None])
    }

    pub fn function(f: FunctionType) -> Type {
        Type::Function(Arc::new(f))
    }

    pub fn class_of(instance: Type) -> Type {
        Type::ClassObject(Box::new(instance))
    }

    /// `Any` or `Unknown`
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Any | Type::Unknown)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Contains no `Unknown`/`Any` anywhere, so a mismatch is a real finding.
    pub fn is_precise(&self) -> bool {
        match self {
            Type::Any | Type::Unknown => false,
            Type::List(t) | Type::Set(t) | Type::VarTuple(t) | Type::ClassObject(t) => t.is_precise(),
            Type::Dict(k, v) => k.is_precise() && v.is_precise(),
            Type::Tuple(items) | Type::Union(items) => items.iter().all(Type::is_precise),
            _ => true,
        }
    }

    /// Builtin value types whose operator and member tables are fully known.
    pub fn is_builtin_value(&self) -> bool {
        matches!(
            self,
            Type::None
                | Type::Bool
                | Type::Int
                | Type::Float
                | Type::Complex
                | Type::Str
                | Type::Bytes
                | Type::List(_)
                | Type::Dict(..)
                | Type::Set(_)
                | Type::Tuple(_)
                | Type::VarTuple(_)
        )
    }

    /// Name of the runtime class, as used in `missing-attribute` messages.
    pub fn class_name(&self) -> String {
        match self {
            Type::None => "NoneType".to_string(),
            Type::List(_) => "list".to_string(),
            Type::Dict(..) => "dict".to_string(),
            Type::Set(_) => "set".to_string(),
            Type::Tuple(_) | Type::VarTuple(_) => "tuple".to_string(),
            Type::Instance(c) => c.name.clone(),
            Type::ClassObject(_) => "type".to_string(),
            Type::Function(_) => "function".to_string(),
            Type::Module(_) => "module".to_string(),
            other => other.to_string(),
        }
    }

    /// Flatten, deduplicate and collapse a set of alternatives.
    pub fn union(items: Vec<Type>) -> Type {
        let mut flat: Vec<Type> = Vec::with_capacity(items.len());
        fn collect(t: Type, acc: &mut Vec<Type>) {
            match t {
                Type::Union(vs) => vs.into_iter().for_each(|v| collect(v, acc)),
                other => {
                    if !acc.contains(&other) {
                        acc.push(other);
                    }
                }
            }
        }
        for item in items {
            collect(item, &mut flat);
        }
        if let Some(dynamic) = flat.iter().find(|t| t.is_dynamic()) {
            return dynamic.clone();
        }
        match flat.len() {
            0 => Type::Unknown,
            1 => flat.pop().unwrap_or(Type::Unknown),
            _ => Type::Union(flat),
        }
    }

    /// Smallest common type of two values stored in the same container or variable.
    pub fn join(a: Type, b: Type) -> Type {
        if a.is_assignable_to(&b) && !b.is_dynamic() {
            b
        } else if b.is_assignable_to(&a) && !a.is_dynamic() {
            a
        } else {
            Type::union(vec![a, b])
        }
    }

    pub fn join_all(items: impl IntoIterator<Item = Type>) -> Option<Type> {
        items.into_iter().reduce(Type::join)
    }

    /// Drop `None` from a union (`Optional[T]` -> `T`).
    pub fn without_none(&self) -> Type {
        match self {
            Type::Union(items) => Type::union(items.iter().filter(|t| **t != Type::None).cloned().collect()),
            other => other.clone(),
        }
    }

    pub fn is_assignable_to(&self, target: &Type) -> bool {
        match (self, target) {
            (_, Type::Any | Type::Unknown | Type::Object) => true,
            (Type::Any | Type::Unknown, _) => true,
            (a, b) if a == b => true,
            (Type::Union(items), t) => items.iter().all(|i| i.is_assignable_to(t)),
            (t, Type::Union(items)) => items.iter().any(|i| t.is_assignable_to(i)),
            (a, b) if a.numeric_rank().is_some() && b.numeric_rank().is_some() => {
                NumericHierarchy::widens_to(a, b)
            }
            (Type::List(a), Type::List(b)) | (Type::Set(a), Type::Set(b)) => a.is_assignable_to(b),
            (Type::Dict(ak, av), Type::Dict(bk, bv)) => ak.is_assignable_to(bk) && av.is_assignable_to(bv),
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.is_assignable_to(y))
            }
            (Type::Tuple(a), Type::VarTuple(b)) => a.iter().all(|x| x.is_assignable_to(b)),
            (Type::VarTuple(a), Type::VarTuple(b)) => a.is_assignable_to(b),
            (Type::Instance(a), Type::Instance(b)) => !a.fully_known || a.is_subclass_of(b),
            // A class with unresolved bases may derive from anything.
            (Type::Instance(a), _) => !a.fully_known,
            (Type::ClassObject(a), Type::ClassObject(b)) => a.is_assignable_to(b),
            (Type::Function(a), Type::Function(b)) => a.returns.is_assignable_to(&b.returns),
            _ => false,
        }
    }

    pub fn numeric_rank(&self) -> Option<crate::typ::NumericClass> {
        NumericHierarchy::classify(self)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(items: &[Type], sep: &str) -> String {
            items.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(sep)
        }
        match self {
            Type::Any => write!(f, "Any"),
            Type::Unknown => write!(f, "Unknown"),
            Type::None => write!(f, "None"),
            Type::Object => write!(f, "object"),
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Complex => write!(f, "complex"),
            Type::Str => write!(f, "str"),
            Type::Bytes => write!(f, "bytes"),
            Type::List(t) => write!(f, "list[{t}]"),
            Type::Dict(k, v) => write!(f, "dict[{k}, {v}]"),
            Type::Set(t) => write!(f, "set[{t}]"),
            Type::Tuple(items) if items.is_empty() => write!(f, "tuple[()]"),
            Type::Tuple(items) => write!(f, "tuple[{}]", join(items, ", ")),
            Type::VarTuple(t) => write!(f, "tuple[{t}, ...]"),
            Type::Union(items) => write!(f, "{}", join(items, " | ")),
            Type::Function(func) => write!(f, "{}", func.signature()),
            Type::ClassObject(inner) => write!(f, "type[{inner}]"),
            Type::Instance(class) => write!(f, "{}", class.name),
            Type::Module(name) => write!(f, "Module[{name}]"),
        }
    }
}
