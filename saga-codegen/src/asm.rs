// saga-codegen - Code generation and binary assembly for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Binary assembly of the two output artifacts.
//!
//! Everything is little-endian and fixed-width: u8 opcode bytes, u16
//! offsets/pool/builtin/function indices, u32 jump targets and table
//! offsets, f32 number literals. Jump targets are rewritten from labels
//! to the absolute index of the first real op at the bound label; label
//! pseudo-ops themselves are not encoded.
//!
//! **Globals file** (`.sgl`): magic `SGLB`, u16 major, u16 minor, u32
//! offset of the slot table; slot table (u16 count, then u8 type tag +
//! u16 offset per slot); initializer op stream; string table.
//!
//! **Scripts file** (`.ssc`): magic `SSCR`, u16 major, u16 minor, u32
//! offset of the trailing index table (backpatched); per script: u16
//! part count, then per part a u8 kind tag, the signature string, u16
//! local-storage count, u16 first offset, u16 max stack, op stream and
//! string table. The index table maps script file names to record
//! offsets.

use saga_ast::ast::{Ast, NodeId};
use saga_ast::side::SideTables;
use saga_ast::types::Ty;

use crate::code::Code;
use crate::emit::{GeneratedUnit, PartKind};
use crate::opcode::Op;

pub const GLOBALS_MAGIC: &[u8; 4] = b"SGLB";
pub const SCRIPTS_MAGIC: &[u8; 4] = b"SSCR";
pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;

fn wr_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

fn wr_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn wr_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn wr_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn wr_str(buf: &mut Vec<u8>, s: &str) {
    wr_u16(buf, s.len() as u16);
    buf.extend_from_slice(s.as_bytes());
}

fn patch_u32(buf: &mut Vec<u8>, at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

/// Assemble the globals artifact.
pub fn assemble_globals(
    ast: &Ast,
    unit: NodeId,
    tables: &SideTables,
    generated: &GeneratedUnit,
) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(GLOBALS_MAGIC);
    wr_u16(&mut buf, VERSION_MAJOR);
    wr_u16(&mut buf, VERSION_MINOR);
    // The slot table follows the 12-byte header directly.
    wr_u32(&mut buf, 12);

    let consts = &ast.unit(unit).consts;
    wr_u16(&mut buf, consts.len() as u16);
    for &c in consts {
        let decl = ast.const_decl(c);
        wr_u8(&mut buf, decl.ty.tag());
        wr_u16(
            &mut buf,
            tables.offsets.copied(c).expect("global has an offset"),
        );
    }

    write_ops(&mut buf, &generated.globals);
    write_strings(&mut buf, &generated.globals);
    buf
}

/// Assemble the scripts artifact.
pub fn assemble_scripts(
    ast: &Ast,
    tables: &SideTables,
    generated: &GeneratedUnit,
) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(SCRIPTS_MAGIC);
    wr_u16(&mut buf, VERSION_MAJOR);
    wr_u16(&mut buf, VERSION_MINOR);
    let index_offset_at = buf.len();
    wr_u32(&mut buf, 0);

    let mut records = Vec::with_capacity(generated.scripts.len());
    for script in &generated.scripts {
        let s = ast.script(script.node);
        records.push((s.file.clone(), buf.len() as u32));

        wr_u16(&mut buf, script.parts.len() as u16);
        for part in &script.parts {
            wr_u8(&mut buf, part.kind.tag());
            let signature = match part.kind {
                PartKind::Event => script_signature(ast, script.node),
                _ => function_signature(ast, part.node),
            };
            wr_str(&mut buf, &signature);

            let frame = tables
                .frames
                .copied(part.node)
                .expect("part has frame info");
            wr_u16(&mut buf, frame.count);
            wr_u16(&mut buf, frame.first_offset);
            wr_u16(
                &mut buf,
                tables
                    .max_stack
                    .copied(part.node)
                    .expect("part has a stack bound"),
            );

            write_ops(&mut buf, &part.code);
            write_strings(&mut buf, &part.code);
        }
    }

    let index_offset = buf.len() as u32;
    patch_u32(&mut buf, index_offset_at, index_offset);
    wr_u16(&mut buf, records.len() as u16);
    for (file, offset) in records {
        wr_str(&mut buf, &file);
        wr_u32(&mut buf, offset);
    }
    buf
}

fn write_ops(buf: &mut Vec<u8>, code: &Code) {
    let targets = code.label_targets();
    wr_u32(buf, code.real_len());
    for op in &code.ops {
        if matches!(op, Op::Label(_)) {
            continue;
        }
        wr_u8(buf, op.byte());
        if let Some(label) = op.jump_target() {
            wr_u32(buf, targets[&label]);
            continue;
        }
        match *op {
            Op::PushNum(v) => wr_f32(buf, v as f32),
            Op::PushStr(n)
            | Op::LoadNum(n)
            | Op::LoadStr(n)
            | Op::LoadEnt(n)
            | Op::StoreNum(n)
            | Op::StoreStr(n)
            | Op::StoreEnt(n)
            | Op::Call(n)
            | Op::CallApi(n)
            | Op::CallMethod(n) => wr_u16(buf, n),
            _ => {}
        }
    }
}

fn write_strings(buf: &mut Vec<u8>, code: &Code) {
    wr_u16(buf, code.strings.len() as u16);
    for s in &code.strings {
        wr_str(buf, s);
    }
}

/// Signature of an event part: return type `n` (the continuation),
/// then one character per script parameter, implicit ones included.
fn script_signature(ast: &Ast, script: NodeId) -> String {
    let s = ast.script(script);
    let mut sig = String::with_capacity(1 + s.params.len());
    sig.push(Ty::Number.sig_char(false));
    for &p in &s.params {
        let param = ast.param(p);
        sig.push(param.ty.sig_char(param.by_ref));
    }
    sig
}

/// Signature of a function part: return type first, parameters after,
/// uppercase where passed by reference.
fn function_signature(ast: &Ast, func: NodeId) -> String {
    let f = ast.function(func);
    let mut sig = String::with_capacity(1 + f.params.len());
    sig.push(f.ret.sig_char(false));
    for &p in &f.params {
        let param = ast.param(p);
        sig.push(param.ty.sig_char(param.by_ref));
    }
    sig
}
