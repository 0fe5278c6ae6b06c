// saga-ast - AST, symbol tables and diagnostics for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Shared data structures for the Saga compiler.
//!
//! Everything the later passes walk lives here:
//! - the arena AST ([`Ast`], [`NodeId`]) built by the external parser,
//! - the type lattice ([`Ty`]),
//! - event signatures ([`EventKind`]),
//! - per-scope symbol tables ([`ScopeArena`]),
//! - per-pass side tables ([`SideTables`]),
//! - the collecting diagnostics sink ([`Reporter`]).

pub mod ast;
pub mod diag;
pub mod events;
pub mod side;
pub mod symtab;
pub mod types;

pub use ast::{Ast, BinOp, CmpOp, Expr, LogOp, Node, NodeId, NodeKind, Stmt, UnOp};
pub use diag::{Diagnostic, Reporter, Severity};
pub use events::EventKind;
pub use side::{BuiltinId, CallTarget, FrameInfo, LabelId, LabelPair, NodeMap, Resolution, SideTables};
pub use symtab::{ScopeArena, ScopeId, ScopeKind, Symbol, SymbolKind};
pub use types::Ty;
