//! Context-aware completion over an [`AnalysisModel`].

mod context;

#[cfg(test)]
mod completion_test;

pub use context::{CompletionContext, Receiver, classify, inside_string_token, open_import_list};

use crate::{
    analysis::AnalysisModel,
    config::AnalyzerConfig,
    resolve::{Binding, BindingKind, ScopeTree},
    stmt::ImportTarget,
    token::{KEYWORDS, Position, Tokenizer},
    typ::{
        MemberInfo, MemberKind, Type,
        builtins::{self, BuiltinKind},
        members::{member_names, member_type},
        modules,
    },
    util::fast_map::{FastHashSet, fast_hash_set_new},
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompletionKind {
    Variable,
    Function,
    Class,
    Module,
    Parameter,
    Keyword,
    Method,
    Property,
}

impl From<BindingKind> for CompletionKind {
    fn from(kind: BindingKind) -> Self {
        match kind {
            BindingKind::Variable => CompletionKind::Variable,
            BindingKind::Function => CompletionKind::Function,
            BindingKind::Class => CompletionKind::Class,
            BindingKind::Module => CompletionKind::Module,
            BindingKind::Parameter => CompletionKind::Parameter,
        }
    }
}

impl From<MemberKind> for CompletionKind {
    fn from(kind: MemberKind) -> Self {
        match kind {
            MemberKind::Method => CompletionKind::Method,
            MemberKind::Property => CompletionKind::Property,
            MemberKind::Variable => CompletionKind::Variable,
            MemberKind::Class => CompletionKind::Class,
            MemberKind::Module => CompletionKind::Module,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    pub insert_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind, detail: Option<String>) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            kind,
            detail,
        }
    }
}

fn type_detail(ty: &Type) -> Option<String> {
    match ty {
        Type::Unknown => None,
        Type::Module(_) => Some("module".to_string()),
        other => Some(other.to_string()),
    }
}

/// Type a binding stands for, falling back to the module an import names.
fn binding_type(binding: &Binding) -> Option<Type> {
    binding.ty.clone().or_else(|| match &binding.import {
        Some(ImportTarget::Module(module)) => Some(Type::Module(module.clone())),
        _ => None,
    })
}

/// Suggestions at the 1-indexed `line`/`column` of `model`. Positions outside the
/// buffer, comments and strings produce nothing.
pub fn complete(model: &AnalysisModel, line: u32, column: u32, config: &AnalyzerConfig) -> Vec<CompletionItem> {
    let Some(position) = model.position(line, column) else {
        trace!(line, column, "completion position outside buffer");
        return Vec::new();
    };
    let Some(text) = model.line(line) else {
        return Vec::new();
    };
    let before: String = text.chars().take(column as usize - 1).collect();
    let lexed = Tokenizer::tokenize(model.source());
    let context = if inside_string_token(&lexed, position) {
        CompletionContext::Silent
    } else {
        match classify(&before) {
            CompletionContext::Expression { prefix } => match open_import_list(&lexed, position) {
                Some(module) => CompletionContext::ImportMember { module, prefix },
                None => CompletionContext::Expression { prefix },
            },
            other => other,
        }
    };
    trace!(line, column, ?context, "completion context");

    let mut items = match context {
        CompletionContext::Silent => Vec::new(),
        CompletionContext::Expression { prefix } => expression_items(model.scopes(), position, &prefix, config),
        CompletionContext::Attribute { receiver, prefix } => {
            attribute_items(model.scopes(), position, &receiver, &prefix)
        }
        CompletionContext::ImportModule { prefix } => import_module_items(&prefix, config),
        CompletionContext::ImportMember { module, prefix } => {
            member_items(model.scopes(), &Type::Module(module), &prefix)
        }
    };
    if let Some(max) = config.max_completions {
        items.truncate(max);
    }
    items
}

/// Visible bindings innermost scope first, then builtins, then keywords.
fn expression_items(scopes: &ScopeTree, position: Position, prefix: &str, config: &AnalyzerConfig) -> Vec<CompletionItem> {
    let scope = scopes.scope_at(position);
    let mut seen: FastHashSet<String> = fast_hash_set_new();
    let mut items = Vec::new();

    for binding in scopes.visible_bindings(scope) {
        if !binding.name.starts_with(prefix) || !seen.insert(binding.name.clone()) {
            continue;
        }
        let detail = match binding_type(binding) {
            Some(ty) => type_detail(&ty),
            None if binding.kind == BindingKind::Module => Some("module".to_string()),
            None => None,
        };
        items.push(CompletionItem::new(binding.name.clone(), binding.kind.into(), detail));
    }

    if config.include_builtins {
        for name in builtins::builtin_names() {
            if !name.starts_with(prefix) || seen.contains(name) {
                continue;
            }
            let Some(entry) = builtins::builtin(name) else {
                continue;
            };
            let (kind, detail) = match entry.kind {
                BuiltinKind::Function => (CompletionKind::Function, type_detail(&entry.ty)),
                BuiltinKind::Class => (CompletionKind::Class, Some("class".to_string())),
                BuiltinKind::Constant => (CompletionKind::Variable, type_detail(&entry.ty)),
            };
            seen.insert(name.to_string());
            items.push(CompletionItem::new(name, kind, detail));
        }
    }

    if config.include_keywords {
        for (keyword, _) in KEYWORDS {
            if keyword.starts_with(prefix) && seen.insert(keyword.to_string()) {
                items.push(CompletionItem::new(*keyword, CompletionKind::Keyword, None));
            }
        }
    }
    items
}

fn member_items(scopes: &ScopeTree, receiver: &Type, prefix: &str) -> Vec<CompletionItem> {
    member_names(scopes, receiver)
        .into_iter()
        .filter(|m| m.name.starts_with(prefix))
        .map(|MemberInfo { name, kind, ty }| {
            let detail = match (&ty, kind) {
                (Some(ty), _) => type_detail(ty),
                (None, MemberKind::Module) => Some("module".to_string()),
                (None, _) => None,
            };
            CompletionItem::new(name, kind.into(), detail)
        })
        .collect()
}

/// Members of the receiver's inferred type; nothing when that type is unknown.
fn attribute_items(scopes: &ScopeTree, position: Position, receiver: &Receiver, prefix: &str) -> Vec<CompletionItem> {
    let ty = match receiver {
        Receiver::Str => Type::Str,
        Receiver::Unsupported => return Vec::new(),
        Receiver::Path(path) => {
            let Some((first, rest)) = path.split_first() else {
                return Vec::new();
            };
            let scope = scopes.scope_at(position);
            let root = match scopes.lookup(scope, first) {
                Some(binding) => binding_type(binding),
                None => builtins::builtin(first).map(|entry| entry.ty.clone()),
            };
            let Some(mut ty) = root else {
                return Vec::new();
            };
            for segment in rest {
                ty = member_type(scopes, &ty, segment).into_type();
            }
            ty
        }
    };
    if ty.is_dynamic() {
        return Vec::new();
    }
    member_items(scopes, &ty, prefix)
}

/// Module names for `import <prefix>`. A dotted prefix lists the children of its parent.
fn import_module_items(prefix: &str, config: &AnalyzerConfig) -> Vec<CompletionItem> {
    let mut known: Vec<&str> = Vec::new();
    for name in modules::module_names() {
        known.push(name);
    }
    for name in &config.known_modules {
        known.push(name);
    }
    let known = known.into_iter();
    let names: BTreeSet<&str> = match prefix.rsplit_once('.') {
        Some((parent, partial)) => known
            .filter_map(|name| name.strip_prefix(parent)?.strip_prefix('.'))
            .filter(|child| !child.contains('.') && child.starts_with(partial))
            .collect(),
        None => known
            .map(|name| name.split('.').next().unwrap_or(name))
            .filter(|top| top.starts_with(prefix))
            .collect(),
    };
    names
        .into_iter()
        .map(|name| CompletionItem::new(name, CompletionKind::Module, Some("module".to_string())))
        .collect()
}
