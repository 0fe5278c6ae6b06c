// saga-ast - AST, symbol tables and diagnostics for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Per-scope symbol tables.
//!
//! One table per scope (global, script, imported-function-file,
//! function), each a fixed 317-bucket chained hash over case-folded
//! identifiers, with a parent link to the lexically enclosing scope.
//! Entries are back-references into the AST, never copies. Within one
//! scope no two declarations may share a case-insensitive name;
//! [`ScopeArena::insert`] rejects the duplicate and hands back the
//! existing entry.

use crate::ast::NodeId;

/// Bucket count. Fixed; the table never resizes.
const BUCKETS: usize = 317;

/// What a scope is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Script,
    ImportFile,
    Function,
}

/// Index of a scope in the [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind of declaration a symbol refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Const,
    Var,
    Arg,
    Func,
}

impl SymbolKind {
    /// True for the kinds an expression may read as a value.
    pub fn is_value(self) -> bool {
        !matches!(self, SymbolKind::Func)
    }

    /// True for the kinds an assignment or a by-reference argument may
    /// bind to.
    pub fn is_storage(self) -> bool {
        matches!(self, SymbolKind::Var | SymbolKind::Arg)
    }
}

/// A symbol-table entry payload: a tagged back-reference into the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub decl: NodeId,
}

/// One chain link. Chains insert at the head.
#[derive(Debug)]
struct Entry {
    /// Case-folded key.
    key: String,
    sym: Symbol,
    next: Option<Box<Entry>>,
}

/// One scope's table plus its parent link.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    buckets: Vec<Option<Box<Entry>>>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        let mut buckets = Vec::with_capacity(BUCKETS);
        buckets.resize_with(BUCKETS, || None);
        Self {
            kind,
            parent,
            buckets,
        }
    }

    fn lookup(&self, folded: &str, bucket: usize) -> Option<Symbol> {
        let mut entry = self.buckets[bucket].as_deref();
        while let Some(e) = entry {
            if e.key == folded {
                return Some(e.sym);
            }
            entry = e.next.as_deref();
        }
        None
    }
}

/// Case-fold an identifier. Saga identifiers are ASCII.
fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Left-shift-and-add polynomial hash over the folded bytes, reduced
/// modulo the bucket count.
fn bucket_of(folded: &str) -> usize {
    let mut h: u32 = 0;
    for &b in folded.as_bytes() {
        h = (h << 4).wrapping_add(b as u32);
    }
    (h % BUCKETS as u32) as usize
}

/// All scopes of a compilation, owned in one arena so parent links are
/// plain indices.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Create a scope, optionally linked to its lexically enclosing
    /// parent.
    pub fn create(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, parent));
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Insert-if-absent. On a case-insensitive conflict in this scope
    /// the table is left untouched and the existing entry is returned.
    pub fn insert(&mut self, scope: ScopeId, name: &str, sym: Symbol) -> Result<(), Symbol> {
        let folded = fold(name);
        let bucket = bucket_of(&folded);
        if let Some(existing) = self.scopes[scope.index()].lookup(&folded, bucket) {
            return Err(existing);
        }
        let slot = &mut self.scopes[scope.index()].buckets[bucket];
        let next = slot.take();
        *slot = Some(Box::new(Entry {
            key: folded,
            sym,
            next,
        }));
        Ok(())
    }

    /// Hierarchical lookup: walk from `scope` to the root, first match
    /// wins.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<Symbol> {
        let folded = fold(name);
        let bucket = bucket_of(&folded);
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.index()];
            if let Some(sym) = s.lookup(&folded, bucket) {
                return Some(sym);
            }
            current = s.parent;
        }
        None
    }

    /// Single-scope lookup, used to test for duplicates without
    /// escaping to parents.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<Symbol> {
        let folded = fold(name);
        self.scopes[scope.index()].lookup(&folded, bucket_of(&folded))
    }
}
