use crate::{
    resolve::{Binding, BindingKind, ScopeTree},
    typ::{FunctionFlavor, Type, builtins, modules},
};

/// Outcome of looking up `receiver.name`.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberLookup {
    Found(Type),
    /// The receiver's members are fully known and `name` is not among them
    Missing,
    /// Nothing can be said about the receiver
    Unknown,
}

impl MemberLookup {
    pub fn into_type(self) -> Type {
        match self {
            MemberLookup::Found(ty) => ty,
            MemberLookup::Missing | MemberLookup::Unknown => Type::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Property,
    Variable,
    Class,
    Module,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub name: String,
    pub kind: MemberKind,
    pub ty: Option<Type>,
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Type of a class-body binding seen through an instance (`bound`) or the class object.
fn class_member_type(binding: &Binding, bound: bool) -> Type {
    match &binding.ty {
        Some(Type::Function(f)) => match f.flavor {
            FunctionFlavor::Property if bound => f.returns.clone(),
            FunctionFlavor::Method | FunctionFlavor::Property if !bound => Type::Function(f.clone()),
            FunctionFlavor::StaticMethod | FunctionFlavor::Function => Type::Function(f.clone()),
            _ => Type::function(f.bound()),
        },
        Some(ty) => ty.clone(),
        None => Type::Unknown,
    }
}

pub fn member_type(scopes: &ScopeTree, receiver: &Type, name: &str) -> MemberLookup {
    match receiver {
        Type::Instance(class) => {
            if class.scope.is_none() {
                return MemberLookup::Unknown;
            }
            let mut dynamic = !class.fully_known;
            for ancestor in class.linearize() {
                let Some(scope) = ancestor.scope.and_then(|id| scopes.get(id)) else {
                    dynamic = true;
                    continue;
                };
                if let Some(binding) = scope.binding(name) {
                    return MemberLookup::Found(class_member_type(binding, true));
                }
                if let Some(attr) = scope.attributes.get(name) {
                    return MemberLookup::Found(attr.ty.clone().unwrap_or(Type::Unknown));
                }
                if scope.binding("__getattr__").is_some() || scope.binding("__getattribute__").is_some() {
                    dynamic = true;
                }
            }
            if dynamic || is_dunder(name) {
                MemberLookup::Unknown
            } else {
                MemberLookup::Missing
            }
        }
        Type::ClassObject(inner) => match inner.as_ref() {
            Type::Instance(class) => class
                .linearize()
                .iter()
                .filter_map(|c| c.scope.and_then(|id| scopes.get(id)))
                .find_map(|scope| scope.binding(name))
                .map_or(MemberLookup::Unknown, |b| MemberLookup::Found(class_member_type(b, false))),
            _ => MemberLookup::Unknown,
        },
        Type::Module(module) => {
            if modules::is_submodule(module, name) {
                MemberLookup::Found(Type::Module(format!("{module}.{name}")))
            } else {
                MemberLookup::Found(Type::Unknown)
            }
        }
        Type::Union(items) => {
            let mut found = Vec::with_capacity(items.len());
            for item in items {
                match member_type(scopes, item, name) {
                    MemberLookup::Found(ty) => found.push(ty),
                    _ => return MemberLookup::Unknown,
                }
            }
            MemberLookup::Found(Type::union(found))
        }
        ty if ty.is_builtin_value() => match builtins::builtin_member(ty, name) {
            Some(member) => MemberLookup::Found(member),
            None => MemberLookup::Missing,
        },
        _ => MemberLookup::Unknown,
    }
}

fn binding_member(binding: &Binding, bound: bool) -> MemberInfo {
    let ty = class_member_type(binding, bound);
    let kind = match (&ty, binding.kind) {
        (_, BindingKind::Class) => MemberKind::Class,
        (_, BindingKind::Module) => MemberKind::Module,
        (Type::Function(_), _) => MemberKind::Method,
        _ if matches!(&binding.ty, Some(Type::Function(f)) if f.flavor == FunctionFlavor::Property) => {
            MemberKind::Property
        }
        (_, BindingKind::Function) => MemberKind::Method,
        _ => MemberKind::Variable,
    };
    MemberInfo {
        name: binding.name.clone(),
        kind,
        ty: (!ty.is_unknown()).then_some(ty),
    }
}

fn push_member(out: &mut Vec<MemberInfo>, info: MemberInfo) {
    if !is_dunder(&info.name) && !out.iter().any(|m| m.name == info.name) {
        out.push(info);
    }
}

/// Members offered after `receiver.`, sorted by name. Dunder names are left out.
pub fn member_names(scopes: &ScopeTree, receiver: &Type) -> Vec<MemberInfo> {
    let mut out: Vec<MemberInfo> = Vec::new();
    let class_receiver = match receiver {
        Type::Instance(class) => Some((class.clone(), true)),
        Type::ClassObject(inner) => match inner.as_ref() {
            Type::Instance(class) => Some((class.clone(), false)),
            _ => None,
        },
        _ => None,
    };

    if let Some((class, bound)) = class_receiver {
        for ancestor in class.linearize() {
            let Some(scope) = ancestor.scope.and_then(|id| scopes.get(id)) else {
                continue;
            };
            for binding in scope.bindings.iter() {
                push_member(&mut out, binding_member(binding, bound));
            }
            if bound {
                for attr in scope.attributes.iter() {
                    let info = MemberInfo {
                        name: attr.name.clone(),
                        kind: MemberKind::Property,
                        ty: attr.ty.clone().filter(|t| !t.is_unknown()),
                    };
                    push_member(&mut out, info);
                }
            }
        }
    } else if let Type::Module(module) = receiver {
        for &name in modules::module_members(module).unwrap_or(&[]) {
            let kind = if modules::is_submodule(module, name) {
                MemberKind::Module
            } else {
                MemberKind::Variable
            };
            let info = MemberInfo {
                name: name.to_string(),
                kind,
                ty: None,
            };
            push_member(&mut out, info);
        }
    } else if receiver.is_builtin_value() {
        for &name in builtins::member_names(receiver) {
            let member = builtins::builtin_member(receiver, name);
            let kind = match member {
                Some(Type::Function(_)) => MemberKind::Method,
                _ => MemberKind::Property,
            };
            let info = MemberInfo {
                name: name.to_string(),
                kind,
                ty: member,
            };
            push_member(&mut out, info);
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}
