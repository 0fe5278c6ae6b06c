// saga-codegen - Code generation and binary assembly for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Resource allocation: storage offsets, jump labels and per-script
//! function indices.
//!
//! Storage is a flat per-script slot space. Global constants occupy the
//! lowest slots; every script's frame continues after them with its
//! arguments and body declarations. Function frames are carved with a
//! save/restore of the running counter: imported functions start right
//! after the script's arguments, local functions right after the
//! script's own declarations, and sibling functions reuse each other's
//! range.
//!
//! Functions never marked invoked get no offsets, labels or index; the
//! later passes skip them entirely.

use saga_ast::ast::{Ast, Expr, NodeId, NodeKind, Stmt};
use saga_ast::diag::Reporter;
use saga_ast::side::{LabelId, LabelPair, SideTables};

/// Run the allocator over a type-checked unit.
pub fn allocate(ast: &Ast, unit: NodeId, tables: &mut SideTables, reporter: &mut Reporter) {
    let u = ast.unit(unit);
    let mut ctx = Allocator {
        ast,
        tables,
        reporter,
        file: u.file.clone(),
        offset: 0,
        next_label: 0,
        overflowed: false,
    };

    for &c in &u.consts {
        ctx.assign(c);
    }
    ctx.tables.frames.set(
        unit,
        saga_ast::FrameInfo {
            first_offset: 0,
            count: ctx.offset as u16,
        },
    );
    for &c in &u.consts {
        let init = ctx.ast.const_decl(c).init;
        ctx.label_expr(init);
    }

    let globals_end = ctx.offset;
    for &script_id in &u.scripts {
        ctx.allocate_script(script_id, globals_end);
    }
}

struct Allocator<'a> {
    ast: &'a Ast,
    tables: &'a mut SideTables,
    reporter: &'a mut Reporter,
    file: String,
    /// Running slot counter, saved and restored around function frames.
    offset: u32,
    /// Running label counter, unique across the whole unit.
    next_label: u32,
    /// One overflow diagnostic per unit is enough.
    overflowed: bool,
}

impl Allocator<'_> {
    fn allocate_script(&mut self, script_id: NodeId, globals_end: u32) {
        let script = self.ast.script(script_id);
        self.file = script.file.clone();
        self.offset = globals_end;
        self.overflowed = false;

        for &p in &script.params {
            self.assign(p);
        }
        let args_end = self.offset;

        // Function indices: 0 is the event entry point, then imported
        // functions in clause order, then local functions.
        self.tables.fn_indices.set(script_id, 0);
        let mut index = 1u16;

        for &import in &script.imports {
            for &f in &self.ast.import(import).funcs {
                if !self.tables.is_invoked(f) {
                    continue;
                }
                self.tables.fn_indices.set(f, index);
                index += 1;
                self.offset = args_end;
                self.allocate_function(f);
            }
        }

        self.offset = args_end;
        for &decl in &self.ast.collect_decls(script.body) {
            self.assign(decl);
        }
        self.tables.frames.set(
            script_id,
            saga_ast::FrameInfo {
                first_offset: globals_end as u16,
                count: (self.offset - globals_end) as u16,
            },
        );
        let script_end = self.offset;

        for &f in &script.funcs {
            if !self.tables.is_invoked(f) {
                continue;
            }
            self.tables.fn_indices.set(f, index);
            index += 1;
            self.offset = script_end;
            self.allocate_function(f);
        }

        // Labels, same invoked-only coverage as the offsets.
        for &import in &script.imports {
            for &f in &self.ast.import(import).funcs {
                if self.tables.is_invoked(f) {
                    self.label_stmt(self.ast.function(f).body);
                }
            }
        }
        for &f in &script.funcs {
            if self.tables.is_invoked(f) {
                self.label_stmt(self.ast.function(f).body);
            }
        }
        self.label_stmt(script.body);
    }

    fn allocate_function(&mut self, func: NodeId) {
        let f = self.ast.function(func);
        let start = self.offset;
        for &p in &f.params {
            self.assign(p);
        }
        for &decl in &self.ast.collect_decls(f.body) {
            self.assign(decl);
        }
        self.tables.frames.set(
            func,
            saga_ast::FrameInfo {
                first_offset: start as u16,
                count: (self.offset - start) as u16,
            },
        );
    }

    fn assign(&mut self, decl: NodeId) {
        if self.offset > u16::MAX as u32 {
            if !self.overflowed {
                self.overflowed = true;
                self.reporter.error(
                    &self.file.clone(),
                    Some(self.ast.decl_name(decl)),
                    self.ast.line(decl),
                    "too many local variables",
                );
            }
            return;
        }
        self.tables.offsets.set(decl, self.offset as u16);
        self.offset += 1;
    }

    // =========================================================================
    // Jump labels
    // =========================================================================

    fn fresh_pair(&mut self) -> LabelPair {
        let pair = LabelPair {
            first: LabelId(self.next_label),
            second: LabelId(self.next_label + 1),
        };
        self.next_label += 2;
        pair
    }

    fn label_stmt(&mut self, id: NodeId) {
        match &self.ast.node(id).kind {
            NodeKind::Const(c) => self.label_expr(c.init),
            NodeKind::Var(v) => {
                if let Some(init) = v.init {
                    self.label_expr(init);
                }
            }
            NodeKind::Stmt(stmt) => match stmt {
                Stmt::Seq(items) => {
                    for &item in items {
                        self.label_stmt(item);
                    }
                }
                Stmt::If {
                    cond,
                    then_body,
                    else_body,
                } => {
                    let pair = self.fresh_pair();
                    self.tables.labels.set(id, pair);
                    self.label_expr(*cond);
                    self.label_stmt(*then_body);
                    if let Some(else_body) = else_body {
                        self.label_stmt(*else_body);
                    }
                }
                Stmt::While { cond, body } => {
                    let pair = self.fresh_pair();
                    self.tables.labels.set(id, pair);
                    self.label_expr(*cond);
                    self.label_stmt(*body);
                }
                Stmt::Return(value) => {
                    if let Some(value) = value {
                        self.label_expr(*value);
                    }
                }
                Stmt::Expr(expr) => self.label_expr(*expr),
            },
            other => unreachable!("unexpected node in statement position: {:?}", other),
        }
    }

    fn label_expr(&mut self, id: NodeId) {
        match self.ast.expr(id) {
            Expr::Number(_) | Expr::Str(_) | Expr::Null | Expr::Ident(_) => {}
            Expr::Assign { target, value } => {
                self.label_expr(*target);
                self.label_expr(*value);
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.label_expr(*lhs);
                self.label_expr(*rhs);
            }
            Expr::Logical { lhs, rhs, .. } => {
                let pair = self.fresh_pair();
                self.tables.labels.set(id, pair);
                self.label_expr(*lhs);
                self.label_expr(*rhs);
            }
            Expr::Compare { lhs, rhs, .. } => {
                let pair = self.fresh_pair();
                self.tables.labels.set(id, pair);
                self.label_expr(*lhs);
                self.label_expr(*rhs);
            }
            Expr::Unary { operand, .. } | Expr::Cast { operand, .. } => {
                self.label_expr(*operand);
            }
            Expr::Call { args, .. } => {
                for &arg in args {
                    self.label_expr(arg);
                }
            }
            Expr::MethodCall { recv, args, .. } => {
                self.label_expr(*recv);
                for &arg in args {
                    self.label_expr(arg);
                }
            }
        }
    }
}
