//! Text and JSON rendering for CLI results.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use pyrite_core::resolve::{ScopeKind, ScopeTree};
use pyrite_core::{CompletionItem, Diagnostic};
use serde::Serialize;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    out.push('\n');
    Ok(out)
}

/// One `file:line:col: severity: message [code]` line per diagnostic.
pub fn diagnostics_text(file: &Path, diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for d in diagnostics {
        let _ = writeln!(out, "{}:{d}", file.display());
    }
    out
}

pub fn completions_text(items: &[CompletionItem]) -> String {
    let mut out = String::new();
    for item in items {
        let kind = format!("{:?}", item.kind).to_lowercase();
        match &item.detail {
            Some(detail) => {
                let _ = writeln!(out, "{}\t{kind}\t{detail}", item.label);
            }
            None => {
                let _ = writeln!(out, "{}\t{kind}", item.label);
            }
        }
    }
    out
}

fn scope_kind_name(kind: ScopeKind) -> &'static str {
    match kind {
        ScopeKind::Module => "module",
        ScopeKind::Class => "class",
        ScopeKind::Function => "function",
        ScopeKind::Lambda => "lambda",
        ScopeKind::Comprehension => "comprehension",
    }
}

/// Scope tree in source order, indented by nesting depth.
pub fn symbols_text(scopes: &ScopeTree) -> String {
    let mut out = String::new();
    for scope in scopes.iter() {
        let indent = "  ".repeat(scopes.depth(scope.id));
        let _ = writeln!(out, "{indent}{} {}", scope_kind_name(scope.kind), scope.name);
        for binding in scope.bindings.iter() {
            let _ = write!(out, "{indent}  {}: {}", binding.name, binding.kind);
            if let Some(ty) = &binding.ty {
                let _ = write!(out, " = {ty}");
            }
            let _ = writeln!(out, " @{}", binding.span.start);
        }
        for attr in scope.attributes.iter() {
            let _ = write!(out, "{indent}  self.{}", attr.name);
            if let Some(ty) = &attr.ty {
                let _ = write!(out, " = {ty}");
            }
            let _ = writeln!(out, " @{}", attr.span.start);
        }
    }
    out
}
