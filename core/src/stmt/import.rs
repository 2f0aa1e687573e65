use crate::token::Span;

/// Import statement variants
///
/// 1. `import os` binds `os`
/// 2. `import os.path` binds `os` (the top-level package)
/// 3. `import os.path as p` binds `p` to the submodule itself
/// 4. `from os import path, sep as separator`
/// 5. `from . import sibling` (relative, `level` counts the dots)
/// 6. `from typing import *`
#[derive(Debug, Clone, PartialEq)]
pub enum ImportStmt {
    Modules {
        names: Vec<Alias>,
    },
    From {
        module: Option<String>,
        module_span: Option<Span>,
        level: u32,
        names: Vec<Alias>,
        wildcard: bool,
    },
}

/// `name [as asname]`; `name` may be dotted for plain imports.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: String,
    pub span: Span,
    pub asname: Option<String>,
    pub asname_span: Option<Span>,
}

/// What a name introduced by an import refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    Module(String),
    Member { module: String, member: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportBinding {
    pub local: String,
    pub span: Span,
    pub target: ImportTarget,
}

impl ImportStmt {
    /// Module path as written, with leading dots for relative imports.
    pub fn from_module_path(&self) -> Option<String> {
        match self {
            ImportStmt::Modules { .. } => None,
            ImportStmt::From { module, level, .. } => {
                let mut path = ".".repeat(*level as usize);
                if let Some(m) = module {
                    path.push_str(m);
                }
                Some(path)
            }
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ImportStmt::From { wildcard: true, .. })
    }

    /// Names this statement binds in the enclosing scope.
    pub fn bound_names(&self) -> Vec<ImportBinding> {
        match self {
            ImportStmt::Modules { names } => names
                .iter()
                .map(|alias| match (&alias.asname, alias.asname_span) {
                    (Some(asname), span) => ImportBinding {
                        local: asname.clone(),
                        span: span.unwrap_or(alias.span),
                        target: ImportTarget::Module(alias.name.clone()),
                    },
                    (None, _) => {
                        let top = alias.name.split('.').next().unwrap_or(&alias.name).to_string();
                        ImportBinding {
                            local: top.clone(),
                            span: alias.span,
                            target: ImportTarget::Module(top),
                        }
                    }
                })
                .collect(),
            ImportStmt::From { names, .. } => {
                let module = self.from_module_path().unwrap_or_default();
                names
                    .iter()
                    .map(|alias| ImportBinding {
                        local: alias.asname.clone().unwrap_or_else(|| alias.name.clone()),
                        span: alias.asname_span.unwrap_or(alias.span),
                        target: ImportTarget::Member {
                            module: module.clone(),
                            member: alias.name.clone(),
                        },
                    })
                    .collect()
            }
        }
    }
}

/// All module paths referenced by import statements at any depth of the program.
pub fn collect_program_imports(program: &crate::stmt::Program) -> Vec<String> {
    let mut out = Vec::new();
    program.walk(&mut |stmt| {
        if let crate::stmt::StmtKind::Import(import) = &stmt.kind {
            match import {
                ImportStmt::Modules { names } => out.extend(names.iter().map(|a| a.name.clone())),
                ImportStmt::From { .. } => out.extend(import.from_module_path()),
            }
        }
    });
    out.sort();
    out.dedup();
    out
}
