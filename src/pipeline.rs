// sagac - Bytecode compiler for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! The sequential compilation pipeline.
//!
//! Stages run in a fixed order: weed, resolve (two internal passes,
//! both always run), typecheck, allocate, generate, depth-check,
//! assemble. Whenever the reporter holds any error after a stage, the
//! remaining stages are skipped and no artifacts are produced.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use saga_ast::ast::{Ast, NodeId};
use saga_ast::diag::Reporter;
use saga_ast::side::SideTables;
use saga_ast::symtab::ScopeArena;
use saga_codegen::{allocate, analyze_depth, assemble_globals, assemble_scripts, generate};
use saga_sem::{Builtins, resolve, typecheck, weed};

/// Pipeline knobs. The compiler itself has none; the options only
/// control artifact capture.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Assemble the binary artifacts on success. Disable for
    /// check-only runs.
    pub emit: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { emit: true }
    }
}

/// The two assembled output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// The globals file (`.sgl`).
    pub globals: Vec<u8>,
    /// The scripts file (`.ssc`).
    pub scripts: Vec<u8>,
}

impl Artifacts {
    /// Write both files as `<stem>.sgl` / `<stem>.ssc` under `dir`,
    /// returning their paths.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>, stem: &str) -> io::Result<(PathBuf, PathBuf)> {
        let dir = dir.as_ref();
        let globals_path = dir.join(format!("{}.sgl", stem));
        let scripts_path = dir.join(format!("{}.ssc", stem));
        fs::write(&globals_path, &self.globals)?;
        fs::write(&scripts_path, &self.scripts)?;
        Ok((globals_path, scripts_path))
    }
}

/// Everything a pipeline run produces besides diagnostics.
#[derive(Debug)]
pub struct Compilation {
    pub scopes: ScopeArena,
    pub tables: SideTables,
    /// `Some` only when every stage ran without errors and `emit` was
    /// on.
    pub artifacts: Option<Artifacts>,
}

/// Compile a unit with default options.
pub fn compile(ast: &mut Ast, unit: NodeId, reporter: &mut Reporter) -> Compilation {
    compile_with(ast, unit, reporter, &CompileOptions::default())
}

/// Compile a unit. Diagnostics accumulate in `reporter`; each stage is
/// skipped once any error has been reported.
pub fn compile_with(
    ast: &mut Ast,
    unit: NodeId,
    reporter: &mut Reporter,
    options: &CompileOptions,
) -> Compilation {
    let builtins = Builtins::new();
    let mut scopes = ScopeArena::new();
    let mut tables = SideTables::new();

    let failed = |scopes, tables| Compilation {
        scopes,
        tables,
        artifacts: None,
    };

    weed(ast, unit, reporter);
    if reporter.has_errors() {
        return failed(scopes, tables);
    }

    resolve(ast, unit, &builtins, &mut scopes, &mut tables, reporter);
    if reporter.has_errors() {
        return failed(scopes, tables);
    }

    typecheck(ast, unit, &builtins, &mut tables, reporter);
    if reporter.has_errors() {
        return failed(scopes, tables);
    }

    allocate(ast, unit, &mut tables, reporter);
    if reporter.has_errors() {
        return failed(scopes, tables);
    }

    let generated = generate(ast, unit, &tables);
    analyze_depth(ast, unit, &generated, &builtins, &mut tables, reporter);
    if reporter.has_errors() {
        return failed(scopes, tables);
    }

    let artifacts = options.emit.then(|| Artifacts {
        globals: assemble_globals(ast, unit, &tables, &generated),
        scripts: assemble_scripts(ast, &tables, &generated),
    });

    Compilation {
        scopes,
        tables,
        artifacts,
    }
}
