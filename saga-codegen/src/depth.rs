// saga-codegen - Code generation and binary assembly for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Stack-depth analysis.
//!
//! A depth-first walk over each part's op list, following fallthrough
//! and jump edges, computes the operand stack's high-water mark for the
//! part header and verifies the generator's height invariant: every op
//! is reached at one consistent height, the height never goes negative,
//! and every `return` is reached at exactly the part's exit height
//! (1 for event bodies and the continuation value, return value plus
//! `ref` parameters for functions, 0 for the global initializer).

use std::collections::HashMap;

use saga_ast::ast::{Ast, NodeId};
use saga_ast::diag::Reporter;
use saga_ast::side::{BuiltinId, SideTables};
use saga_ast::types::Ty;
use saga_sem::Builtins;

use crate::emit::{GeneratedUnit, PartKind};
use crate::code::Code;
use crate::opcode::Op;

/// Analyze every part of a generated unit, recording per-part maxima
/// in the side tables.
pub fn analyze_depth(
    ast: &Ast,
    unit: NodeId,
    generated: &GeneratedUnit,
    builtins: &Builtins,
    tables: &mut SideTables,
    reporter: &mut Reporter,
) {
    let file = ast.unit(unit).file.clone();
    let no_user_calls = Vec::new();
    let max = measure(
        &generated.globals,
        &file,
        "globals",
        0,
        &no_user_calls,
        builtins,
        reporter,
    );
    tables.max_stack.set(unit, max);

    for script in &generated.scripts {
        let s = ast.script(script.node);
        // Per-function-index stack deltas for `call` ops. Index 0 is
        // the event entry point, which is never called.
        let mut call_deltas = vec![0i32; script.parts.len()];
        for part in &script.parts[1..] {
            let f = ast.function(part.node);
            let index = tables
                .fn_indices
                .copied(part.node)
                .expect("generated function has an index") as usize;
            call_deltas[index] = pushed_by(ast, part.node) - f.params.len() as i32;
        }

        for part in &script.parts {
            let (name, exit_height) = match part.kind {
                PartKind::Event => (s.name.clone(), 1),
                _ => (
                    ast.function(part.node).name.clone(),
                    pushed_by(ast, part.node),
                ),
            };
            let max = measure(
                &part.code,
                &s.file,
                &name,
                exit_height,
                &call_deltas,
                builtins,
                reporter,
            );
            tables.max_stack.set(part.node, max);
        }
    }
}

/// Values a function leaves on the caller's stack: the return value,
/// then one per `ref` parameter.
fn pushed_by(ast: &Ast, func: NodeId) -> i32 {
    let f = ast.function(func);
    let ret = (f.ret != Ty::Void) as i32;
    let refs = f
        .params
        .iter()
        .filter(|&&p| ast.param(p).by_ref)
        .count() as i32;
    ret + refs
}

fn measure(
    code: &Code,
    file: &str,
    name: &str,
    exit_height: i32,
    call_deltas: &[i32],
    builtins: &Builtins,
    reporter: &mut Reporter,
) -> u16 {
    // Position of each label pseudo-op in the raw op list.
    let mut labels = HashMap::new();
    for (i, op) in code.ops.iter().enumerate() {
        if let Op::Label(l) = op {
            labels.insert(*l, i);
        }
    }

    let mut visited: Vec<Option<i32>> = vec![None; code.ops.len()];
    let mut max = 0i32;
    let mut work = vec![(0usize, 0i32)];

    while let Some((i, height)) = work.pop() {
        if i >= code.ops.len() {
            reporter.error(file, Some(name), 0, "control falls off the end of the code");
            continue;
        }
        match visited[i] {
            Some(seen) if seen == height => continue,
            Some(seen) => {
                reporter.error(
                    file,
                    Some(name),
                    0,
                    format!(
                        "op {} reached at stack heights {} and {}",
                        i, seen, height
                    ),
                );
                continue;
            }
            None => visited[i] = Some(height),
        }

        let op = code.ops[i];
        let delta = match op {
            Op::Call(index) => call_deltas[index as usize],
            Op::CallApi(index) | Op::CallMethod(index) => builtins.stack_delta(BuiltinId(index)),
            other => other.stack_effect().unwrap_or(0),
        };
        let after = height + delta;
        if after < 0 {
            reporter.error(
                file,
                Some(name),
                0,
                format!("operand stack underflow at op {}", i),
            );
            continue;
        }
        max = max.max(after);

        if let Op::Return = op {
            if after != exit_height {
                reporter.error(
                    file,
                    Some(name),
                    0,
                    format!(
                        "stack height {} at return, expected {}",
                        after, exit_height
                    ),
                );
            }
            continue;
        }
        if let Some(target) = op.jump_target() {
            work.push((labels[&target], after));
        }
        if !op.ends_flow() {
            work.push((i + 1, after));
        }
    }

    max as u16
}
