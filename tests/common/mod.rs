// sagac - Common test utilities
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Shared helpers for the end-to-end pipeline tests.

#![allow(dead_code)]

pub use sagac::{
    Artifacts, Ast, BinOp, CmpOp, Compilation, CompileOptions, EventKind, NodeId, Reporter, Ty,
    compile, compile_with,
};

/// Run the whole pipeline over a built unit. Returns the arena, the
/// unit's node, the diagnostics and the pipeline result.
pub fn compile_unit(
    build: impl FnOnce(&mut Ast) -> NodeId,
) -> (Ast, NodeId, Reporter, Compilation) {
    let mut ast = Ast::new();
    let unit = build(&mut ast);
    let mut reporter = Reporter::new();
    let result = compile(&mut ast, unit, &mut reporter);
    (ast, unit, reporter, result)
}

/// A unit with one script and no globals.
pub fn one_script_unit(
    ast: &mut Ast,
    event: EventKind,
    funcs: Vec<NodeId>,
    body: NodeId,
) -> NodeId {
    let script = ast.script_decl(1, "test", "test.saga", event, vec![], vec![], funcs, body);
    ast.unit_decl("test.saga", vec![], vec![script])
}

pub fn rd_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

pub fn rd_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// Byte offset of the first script record in a scripts artifact.
pub fn first_record(scripts: &[u8]) -> usize {
    let index_at = rd_u32(scripts, 8) as usize;
    assert!(rd_u16(scripts, index_at) >= 1, "no script records");
    let name_len = rd_u16(scripts, index_at + 2) as usize;
    rd_u32(scripts, index_at + 4 + name_len) as usize
}

/// Collect every diagnostic message into one string for `contains`
/// assertions.
pub fn messages(reporter: &Reporter) -> String {
    reporter
        .diagnostics()
        .iter()
        .map(|d| d.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
