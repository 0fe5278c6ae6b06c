// saga-ast - AST, symbol tables and diagnostics for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Per-pass annotations, kept beside the tree instead of widening the
//! node variants.
//!
//! Each pass records its results in a [`NodeMap`] keyed by [`NodeId`]:
//! the resolver fills `resolutions`/`call_targets`/`scopes`, the type
//! checker fills `expr_ty`, the allocator fills `offsets`/`labels`/
//! `fn_indices`/`frames`, the depth analyzer fills `max_stack`.

use crate::ast::NodeId;
use crate::symtab::{ScopeId, SymbolKind};
use crate::types::Ty;

/// A numeric jump label assigned by the resource allocator and resolved
/// to an absolute opcode position by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub u32);

/// The two labels a control construct or branching expression may need.
/// Constructs that need only one use `first`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPair {
    pub first: LabelId,
    pub second: LabelId,
}

/// Index into the builtin signature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinId(pub u16);

/// Resolution of an identifier use: the declaring node and its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub kind: SymbolKind,
    pub decl: NodeId,
}

/// What a call expression ended up bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    /// A user-defined function (the declaring node).
    User(NodeId),
    /// A builtin API function.
    Builtin(BuiltinId),
    /// A builtin entity method.
    Method(BuiltinId),
}

/// Local-storage extent of a script or function frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub first_offset: u16,
    pub count: u16,
}

/// A dense node-keyed map. Grows on demand so cast nodes spliced in
/// mid-pass can be annotated too.
#[derive(Debug)]
pub struct NodeMap<T> {
    slots: Vec<Option<T>>,
}

// Not derived: the derive would demand `T: Default` even though an
// empty map needs no value at all.
impl<T> Default for NodeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodeMap<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.index()).and_then(|s| s.as_ref())
    }

    pub fn set(&mut self, id: NodeId, value: T) {
        if id.index() >= self.slots.len() {
            self.slots.resize_with(id.index() + 1, || None);
        }
        self.slots[id.index()] = Some(value);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }
}

impl<T: Copy> NodeMap<T> {
    pub fn copied(&self, id: NodeId) -> Option<T> {
        self.get(id).copied()
    }
}

/// All side tables of one compilation.
#[derive(Debug, Default)]
pub struct SideTables {
    /// Resolved type of every expression node (type checker).
    pub expr_ty: NodeMap<Ty>,
    /// Identifier-use resolutions (resolver pass 2).
    pub resolutions: NodeMap<Resolution>,
    /// Call-expression bindings (resolver pass 2).
    pub call_targets: NodeMap<CallTarget>,
    /// Scope owned by a unit/script/import/function node (resolver
    /// pass 1).
    pub scopes: NodeMap<ScopeId>,
    /// Frame storage offset of every const/var/param declaration
    /// (allocator).
    pub offsets: NodeMap<u16>,
    /// Jump labels of control constructs and branching expressions
    /// (allocator).
    pub labels: NodeMap<LabelPair>,
    /// 1-based per-script index of every invoked function (allocator);
    /// index 0 is the script's event entry point.
    pub fn_indices: NodeMap<u16>,
    /// Functions referenced by at least one resolved call (resolver
    /// pass 2). Uninvoked functions are skipped by all later passes.
    pub invoked: NodeMap<()>,
    /// Local-storage extent per script/function frame (allocator).
    pub frames: NodeMap<FrameInfo>,
    /// Peak operand-stack height per code part (depth analyzer).
    pub max_stack: NodeMap<u16>,
}

impl SideTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a function declaration was marked invoked.
    pub fn is_invoked(&self, func: NodeId) -> bool {
        self.invoked.contains(func)
    }
}
