use crate::{
    stmt::ImportTarget,
    token::{Position, Span},
    typ::Type,
    util::fast_map::{FastHashMap, FastHashSet, fast_hash_map_new},
};
use serde::Serialize;
use std::fmt;

/// Index of a scope inside its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScopeKind {
    Module,
    Class,
    Function,
    Lambda,
    Comprehension,
}

impl ScopeKind {
    /// Scopes that own local variables for closures (`nonlocal` targets).
    pub fn is_function_like(self) -> bool {
        matches!(self, ScopeKind::Function | ScopeKind::Lambda)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BindingKind {
    Variable,
    Function,
    Class,
    Module,
    Parameter,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BindingKind::Variable => "variable",
            BindingKind::Function => "function",
            BindingKind::Class => "class",
            BindingKind::Module => "module",
            BindingKind::Parameter => "parameter",
        };
        f.write_str(s)
    }
}

/// A name declared in a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Span of the defining token (target name, `def`/`class` name, parameter, import alias)
    pub span: Span,
    /// Scope owning the binding
    pub scope: ScopeId,
    /// Filled in by the type checker; `None` until then or when nothing could be inferred
    pub ty: Option<Type>,
    /// Body scope for function and class bindings
    pub defines: Option<ScopeId>,
    pub import: Option<ImportTarget>,
}

impl Binding {
    pub fn new(name: impl Into<String>, kind: BindingKind, span: Span, scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            kind,
            span,
            scope,
            ty: None,
            defines: None,
            import: None,
        }
    }
}

/// Name table keeping first-definition order; redefinition replaces in place.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    entries: Vec<Binding>,
    index: FastHashMap<String, usize>,
}

impl BindingTable {
    pub fn insert(&mut self, binding: Binding) {
        if let Some(&i) = self.index.get(&binding.name) {
            self.entries[i] = binding;
        } else {
            self.index.insert(binding.name.clone(), self.entries.len());
            self.entries.push(binding);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.index.get(name).map(|&i| &mut self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// `<module>`, the function or class name, `<lambda>`, `<listcomp>`, ...
    pub name: String,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Source region the scope covers
    pub region: Span,
    pub bindings: BindingTable,
    /// Instance attributes assigned through `self` in methods (class scopes only)
    pub attributes: BindingTable,
    pub globals: FastHashSet<String>,
    pub nonlocals: FastHashSet<String>,
    /// A `from m import *` happened here, so any name might be bound
    pub has_wildcard_import: bool,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, name: String, parent: Option<ScopeId>, region: Span) -> Self {
        Self {
            id,
            kind,
            name,
            parent,
            children: Vec::new(),
            region,
            bindings: BindingTable::default(),
            attributes: BindingTable::default(),
            globals: FastHashSet::default(),
            nonlocals: FastHashSet::default(),
            has_wildcard_import: false,
        }
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }
}

/// Arena of scopes rooted at the module scope. Parent links are ids used for
/// lookup only; the tree owns every scope.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    /// Scope introduced by a syntax node, keyed by the node's start offset
    node_scopes: FastHashMap<(usize, ScopeKind), ScopeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new(Span::default())
    }
}

impl ScopeTree {
    pub fn new(module_region: Span) -> Self {
        let root = Scope::new(ScopeId(0), ScopeKind::Module, "<module>".to_string(), None, module_region);
        Self {
            scopes: vec![root],
            node_scopes: fast_hash_map_new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id.index())
    }

    /// Scopes in creation order (pre-order over the source).
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id).and_then(|s| s.parent)
    }

    /// Depth below the module scope.
    pub fn depth(&self, id: ScopeId) -> usize {
        let mut depth = 0;
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            depth += 1;
            cur = self.parent(p);
        }
        depth
    }

    pub(crate) fn push_scope(&mut self, parent: ScopeId, kind: ScopeKind, name: String, region: Span) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, kind, name, Some(parent), region));
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        self.node_scopes.insert((region.start.offset, kind), id);
        id
    }

    /// Scope created for the node of `kind` starting at `start`.
    pub fn scope_for_node(&self, start: Position, kind: ScopeKind) -> Option<ScopeId> {
        self.node_scopes.get(&(start.offset, kind)).copied()
    }

    /// Resolve `name` as read from scope `from`, following Python's LEGB rules:
    /// `global` jumps to the module, `nonlocal` searches enclosing functions, and
    /// class bodies are only visible from the class scope itself.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<&Binding> {
        let start = self.get(from)?;
        if start.globals.contains(name) {
            return self.scopes[0].binding(name);
        }
        if start.nonlocals.contains(name) {
            return self.lookup_enclosing_function(from, name);
        }

        let mut current = Some(from);
        let mut first = true;
        while let Some(id) = current {
            let scope = self.get(id)?;
            if (first || scope.kind != ScopeKind::Class)
                && let Some(binding) = scope.binding(name)
            {
                return Some(binding);
            }
            first = false;
            current = scope.parent;
        }
        None
    }

    /// Binding for a `nonlocal` name: nearest enclosing function-like scope, skipping classes.
    pub fn lookup_enclosing_function(&self, from: ScopeId, name: &str) -> Option<&Binding> {
        let mut current = self.parent(from);
        while let Some(id) = current {
            let scope = self.get(id)?;
            if scope.kind == ScopeKind::Module {
                return None;
            }
            if scope.kind.is_function_like()
                && let Some(binding) = scope.binding(name)
            {
                return Some(binding);
            }
            current = scope.parent;
        }
        None
    }

    /// True when `name` may be bound by a wildcard import visible from `from`.
    pub fn has_wildcard_import(&self, from: ScopeId) -> bool {
        let mut current = Some(from);
        while let Some(id) = current {
            match self.get(id) {
                Some(scope) if scope.has_wildcard_import => return true,
                Some(scope) => current = scope.parent,
                None => return false,
            }
        }
        false
    }

    /// Smallest scope whose region contains `pos`; the module scope when none does.
    pub fn scope_at(&self, pos: Position) -> ScopeId {
        let mut current = self.root();
        'descend: loop {
            let Some(scope) = self.get(current) else {
                return current;
            };
            for &child in &scope.children {
                if self.get(child).is_some_and(|c| c.region.contains(pos)) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Every binding visible from `from`, innermost scope first and alphabetical
    /// within a scope. A name shadowed by an inner scope is listed once.
    pub fn visible_bindings(&self, from: ScopeId) -> Vec<&Binding> {
        let mut seen: FastHashSet<&str> = FastHashSet::default();
        let mut out = Vec::new();
        let mut current = Some(from);
        let mut first = true;
        while let Some(id) = current {
            let Some(scope) = self.get(id) else { break };
            if first || scope.kind != ScopeKind::Class {
                let mut local: Vec<&Binding> = scope.bindings.iter().collect();
                local.sort_by(|a, b| a.name.cmp(&b.name));
                for binding in local {
                    if seen.insert(binding.name.as_str()) {
                        out.push(binding);
                    }
                }
            }
            first = false;
            current = scope.parent;
        }
        out
    }

    pub(crate) fn binding_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Binding> {
        self.get_mut(scope)?.bindings.get_mut(name)
    }

    /// Attach an inferred type to a binding; unknown bindings are ignored.
    pub fn set_type(&mut self, scope: ScopeId, name: &str, ty: Type) {
        if let Some(binding) = self.binding_mut(scope, name) {
            binding.ty = Some(ty);
        }
    }

    pub fn set_attribute_type(&mut self, class_scope: ScopeId, name: &str, ty: Type) {
        if let Some(binding) = self.get_mut(class_scope).and_then(|s| s.attributes.get_mut(name)) {
            binding.ty = Some(ty);
        }
    }

    /// Total number of bindings across all scopes.
    pub fn binding_count(&self) -> usize {
        self.scopes.iter().map(|s| s.bindings.len() + s.attributes.len()).sum()
    }
}
