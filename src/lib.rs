// sagac - Bytecode compiler for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! # sagac
//!
//! A batch bytecode compiler for Saga, a small event-scripting language
//! attached to game entities. The external parser hands over an AST via
//! the [`Ast`] builder API; the pipeline weeds it, resolves names
//! against case-insensitive scope tables, type checks it over the
//! `void`/`number`/`string`/`entity` lattice, allocates storage and
//! labels, generates stack-machine code, verifies stack depths and
//! assembles two little-endian artifacts (a globals file and a scripts
//! file).
//!
//! ```rust
//! use sagac::{Ast, EventKind, Reporter, compile};
//!
//! let mut ast = Ast::new();
//! let body = ast.seq(1, vec![]);
//! let script = ast.script_decl(
//!     1, "greet", "greet.saga", EventKind::OnSpawn,
//!     vec![], vec![], vec![], body,
//! );
//! let unit = ast.unit_decl("greet.saga", vec![], vec![script]);
//!
//! let mut reporter = Reporter::new();
//! let result = compile(&mut ast, unit, &mut reporter);
//! assert!(!reporter.has_errors());
//!
//! let artifacts = result.artifacts.expect("clean compile emits artifacts");
//! assert_eq!(&artifacts.globals[0..4], b"SGLB");
//! assert_eq!(&artifacts.scripts[0..4], b"SSCR");
//! ```

pub mod pipeline;

pub use pipeline::{Artifacts, Compilation, CompileOptions, compile, compile_with};

// Re-export the data model and pass entry points for callers that need
// more than the pipeline.
pub use saga_ast::ast::{Ast, BinOp, CmpOp, Expr, LogOp, NodeId, NodeKind, Stmt, UnOp};
pub use saga_ast::diag::{Diagnostic, Reporter, Severity};
pub use saga_ast::events::EventKind;
pub use saga_ast::side::{CallTarget, Resolution, SideTables};
pub use saga_ast::symtab::{ScopeArena, ScopeKind, SymbolKind};
pub use saga_ast::types::Ty;
pub use saga_codegen::{Code, GeneratedUnit, Op, PartKind};
pub use saga_sem::{Builtins, resolve, typecheck, weed};
