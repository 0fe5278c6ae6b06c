// saga-codegen - Code generation and binary assembly for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Tree-walking code generation.
//!
//! Every statement nets zero operand-stack entries and every expression
//! nets exactly one; the depth analyzer re-derives this invariant from
//! the emitted ops.
//!
//! Calling convention: actuals are pushed left to right and popped into
//! the callee frame by `call`. The callee pushes its return value (if
//! any), then the final values of its `ref` parameters in declaration
//! order; the caller stores those back in reverse order.

use saga_ast::ast::{Ast, BinOp, CmpOp, Expr, LogOp, NodeId, NodeKind, Stmt, UnOp};
use saga_ast::side::{CallTarget, SideTables};
use saga_ast::types::Ty;

use crate::code::Code;
use crate::opcode::Op;

/// What a script part is, encoded into the scripts artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Event,
    LocalFn,
    ImportedFn,
}

impl PartKind {
    pub fn tag(self) -> u8 {
        match self {
            PartKind::Event => 0,
            PartKind::LocalFn => 1,
            PartKind::ImportedFn => 2,
        }
    }
}

/// One compiled code part of a script.
#[derive(Debug)]
pub struct GeneratedPart {
    /// The script node (event part) or function node.
    pub node: NodeId,
    pub kind: PartKind,
    pub code: Code,
}

/// All parts of one script: the event entry point at index 0, then the
/// invoked functions in function-index order.
#[derive(Debug)]
pub struct GeneratedScript {
    pub node: NodeId,
    pub parts: Vec<GeneratedPart>,
}

/// The compiled unit: the global initializer plus every script.
#[derive(Debug)]
pub struct GeneratedUnit {
    pub globals: Code,
    pub scripts: Vec<GeneratedScript>,
}

/// A script's invoked functions in function-index order: imported
/// functions in clause order first, then local functions. This ordering
/// is shared by the allocator's index assignment and the assembler's
/// part layout.
pub fn invoked_functions(
    ast: &Ast,
    tables: &SideTables,
    script: NodeId,
) -> Vec<(NodeId, PartKind)> {
    let s = ast.script(script);
    let mut out = Vec::new();
    for &import in &s.imports {
        for &f in &ast.import(import).funcs {
            if tables.is_invoked(f) {
                out.push((f, PartKind::ImportedFn));
            }
        }
    }
    for &f in &s.funcs {
        if tables.is_invoked(f) {
            out.push((f, PartKind::LocalFn));
        }
    }
    out
}

/// Generate code for a fully analyzed unit.
pub fn generate(ast: &Ast, unit: NodeId, tables: &SideTables) -> GeneratedUnit {
    let u = ast.unit(unit);

    let mut globals = Gen::new(ast, tables, true);
    for &c in &u.consts {
        let decl = ast.const_decl(c);
        globals.gen_expr(decl.init);
        let offset = globals.offset_of(c);
        globals.code.emit(Op::store(decl.ty, offset));
    }
    globals.code.emit(Op::Return);

    let mut scripts = Vec::with_capacity(u.scripts.len());
    for &script_id in &u.scripts {
        let script = ast.script(script_id);
        let mut parts = Vec::new();

        let mut event = Gen::new(ast, tables, true);
        event.gen_stmt(script.body);
        if !matches!(event.code.ops.last(), Some(Op::Return)) {
            // The body's tail is unreachable (every path returned
            // inside a branch); terminate the stream anyway.
            event.code.emit(Op::PushNum(0.0));
            event.code.emit(Op::Return);
        }
        parts.push(GeneratedPart {
            node: script_id,
            kind: PartKind::Event,
            code: event.code,
        });

        for (func, kind) in invoked_functions(ast, tables, script_id) {
            parts.push(GeneratedPart {
                node: func,
                kind,
                code: gen_function(ast, tables, func),
            });
        }
        scripts.push(GeneratedScript {
            node: script_id,
            parts,
        });
    }

    GeneratedUnit {
        globals: globals.code,
        scripts,
    }
}

fn gen_function(ast: &Ast, tables: &SideTables, func: NodeId) -> Code {
    let f = ast.function(func);
    let mut g = Gen::new(ast, tables, false);
    for &param in &f.params {
        let p = ast.param(param);
        if p.by_ref {
            g.refs.push((g.offset_of(param), p.ty));
        }
    }
    g.gen_stmt(f.body);
    if f.ret == Ty::Void && !matches!(g.code.ops.last(), Some(Op::Return)) {
        // Void functions may fall off the end.
        g.emit_ref_loads();
        g.code.emit(Op::Return);
    }
    g.code
}

struct Gen<'a> {
    ast: &'a Ast,
    tables: &'a SideTables,
    code: Code,
    /// Offsets and types of the current function's `ref` parameters,
    /// in declaration order.
    refs: Vec<(u16, Ty)>,
    in_script: bool,
}

impl<'a> Gen<'a> {
    fn new(ast: &'a Ast, tables: &'a SideTables, in_script: bool) -> Self {
        Self {
            ast,
            tables,
            code: Code::new(),
            refs: Vec::new(),
            in_script,
        }
    }

    fn offset_of(&self, decl: NodeId) -> u16 {
        self.tables
            .offsets
            .copied(decl)
            .expect("declaration has a storage offset")
    }

    fn ty_of(&self, expr: NodeId) -> Ty {
        self.tables
            .expr_ty
            .copied(expr)
            .expect("expression was typed")
    }

    fn emit_ref_loads(&mut self) {
        for &(offset, ty) in &self.refs {
            self.code.emit(Op::load(ty, offset));
        }
    }

    // =========================================================================
    // Statements (net stack delta 0)
    // =========================================================================

    fn gen_stmt(&mut self, id: NodeId) {
        match &self.ast.node(id).kind {
            NodeKind::Const(c) => {
                self.gen_expr(c.init);
                self.code.emit(Op::store(c.ty, self.offset_of(id)));
            }
            NodeKind::Var(v) => {
                let init = v.init.expect("weeded variable has an initializer");
                self.gen_expr(init);
                self.code.emit(Op::store(v.ty, self.offset_of(id)));
            }
            NodeKind::Stmt(stmt) => match stmt {
                Stmt::Seq(items) => {
                    for &item in items {
                        self.gen_stmt(item);
                    }
                }
                Stmt::If {
                    cond,
                    then_body,
                    else_body,
                } => {
                    let pair = self
                        .tables
                        .labels
                        .copied(id)
                        .expect("branch has allocated labels");
                    self.gen_expr(*cond);
                    match else_body {
                        None => {
                            self.code.emit(Op::JumpZero(pair.first));
                            self.gen_stmt(*then_body);
                            self.code.bind(pair.first);
                        }
                        Some(else_body) => {
                            self.code.emit(Op::JumpZero(pair.first));
                            self.gen_stmt(*then_body);
                            self.code.emit(Op::Jump(pair.second));
                            self.code.bind(pair.first);
                            self.gen_stmt(*else_body);
                            self.code.bind(pair.second);
                        }
                    }
                }
                Stmt::While { cond, body } => {
                    let pair = self
                        .tables
                        .labels
                        .copied(id)
                        .expect("loop has allocated labels");
                    self.code.bind(pair.first);
                    self.gen_expr(*cond);
                    self.code.emit(Op::JumpZero(pair.second));
                    self.gen_stmt(*body);
                    self.code.emit(Op::Jump(pair.first));
                    self.code.bind(pair.second);
                }
                Stmt::Return(value) => {
                    if self.in_script {
                        // Scripts always return a continuation number;
                        // a bare return means 0.
                        match value {
                            Some(value) => self.gen_expr(*value),
                            None => self.code.emit(Op::PushNum(0.0)),
                        }
                    } else if let Some(value) = value {
                        self.gen_expr(*value);
                    }
                    self.emit_ref_loads();
                    self.code.emit(Op::Return);
                }
                Stmt::Expr(expr) => {
                    self.gen_expr(*expr);
                    if self.ty_of(*expr) != Ty::Void {
                        self.code.emit(Op::Pop);
                    }
                }
            },
            other => unreachable!("unexpected node in statement position: {:?}", other),
        }
    }

    // =========================================================================
    // Expressions (net stack delta +1, or 0 for void calls)
    // =========================================================================

    fn gen_expr(&mut self, id: NodeId) {
        match self.ast.expr(id) {
            Expr::Number(v) => self.code.emit(Op::PushNum(*v)),
            Expr::Str(s) => {
                let index = self.code.intern(s);
                self.code.emit(Op::PushStr(index));
            }
            Expr::Null => self.code.emit(Op::PushNull),
            Expr::Ident(_) => {
                let res = self
                    .tables
                    .resolutions
                    .copied(id)
                    .expect("identifier was resolved");
                let ty = self.ast.decl_ty(res.decl);
                self.code.emit(Op::load(ty, self.offset_of(res.decl)));
            }
            Expr::Assign { target, value } => {
                let (target, value) = (*target, *value);
                self.gen_expr(value);
                self.code.emit(Op::Dup);
                let res = self
                    .tables
                    .resolutions
                    .copied(target)
                    .expect("assignment target was resolved");
                let ty = self.ast.decl_ty(res.decl);
                self.code.emit(Op::store(ty, self.offset_of(res.decl)));
            }
            Expr::Binary { op, lhs, rhs } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                self.gen_expr(lhs);
                self.gen_expr(rhs);
                let is_concat = op == BinOp::Add && self.ty_of(id) == Ty::String;
                self.code.emit(match op {
                    BinOp::Add if is_concat => Op::Concat,
                    BinOp::Add => Op::Add,
                    BinOp::Sub => Op::Sub,
                    BinOp::Mul => Op::Mul,
                    BinOp::Div => Op::Div,
                    BinOp::Mod => Op::Mod,
                });
            }
            Expr::Unary { op, operand } => {
                let (op, operand) = (*op, *operand);
                self.gen_expr(operand);
                self.code.emit(match op {
                    UnOp::Neg => Op::Neg,
                    UnOp::Not => Op::Not,
                });
            }
            Expr::Logical { op, lhs, rhs } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                let pair = self
                    .tables
                    .labels
                    .copied(id)
                    .expect("logical expression has allocated labels");
                // Short circuit: keep the deciding value, or replace it
                // with the right operand.
                self.gen_expr(lhs);
                self.code.emit(Op::Dup);
                self.code.emit(match op {
                    LogOp::And => Op::JumpZero(pair.first),
                    LogOp::Or => Op::JumpNonZero(pair.first),
                });
                self.code.emit(Op::Pop);
                self.gen_expr(rhs);
                self.code.bind(pair.first);
            }
            Expr::Compare { op, lhs, rhs } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                let pair = self
                    .tables
                    .labels
                    .copied(id)
                    .expect("comparison has allocated labels");
                self.gen_expr(lhs);
                self.gen_expr(rhs);
                let operand_ty = self.ty_of(lhs);
                self.code.emit(compare_jump(op, operand_ty, pair.first));
                self.code.emit(Op::PushNum(0.0));
                self.code.emit(Op::Jump(pair.second));
                self.code.bind(pair.first);
                self.code.emit(Op::PushNum(1.0));
                self.code.bind(pair.second);
            }
            Expr::Call { args, .. } => {
                let args = args.clone();
                match self
                    .tables
                    .call_targets
                    .copied(id)
                    .expect("call was resolved")
                {
                    CallTarget::User(decl) => self.gen_user_call(decl, &args),
                    CallTarget::Builtin(bid) => {
                        for &arg in &args {
                            self.gen_expr(arg);
                        }
                        self.code.emit(Op::CallApi(bid.0));
                    }
                    CallTarget::Method(_) => unreachable!("method target on a plain call"),
                }
            }
            Expr::MethodCall { recv, args, .. } => {
                let (recv, args) = (*recv, args.clone());
                let CallTarget::Method(bid) = self
                    .tables
                    .call_targets
                    .copied(id)
                    .expect("method call was resolved")
                else {
                    unreachable!("non-method target on a method call")
                };
                self.gen_expr(recv);
                for &arg in &args {
                    self.gen_expr(arg);
                }
                self.code.emit(Op::CallMethod(bid.0));
            }
            Expr::Cast { to, operand } => {
                let (to, operand) = (*to, *operand);
                self.gen_expr(operand);
                self.code.emit(match to {
                    Ty::String => Op::NumToStr,
                    Ty::Number => Op::StrToNum,
                    other => unreachable!("no cast to {}", other),
                });
            }
        }
    }

    fn gen_user_call(&mut self, decl: NodeId, args: &[NodeId]) {
        for &arg in args {
            self.gen_expr(arg);
        }
        let index = self
            .tables
            .fn_indices
            .copied(decl)
            .expect("invoked function has an index");
        self.code.emit(Op::Call(index));

        // The callee pushed its ref parameters in declaration order;
        // store them back last-pushed first.
        let params = self.ast.function(decl).params.clone();
        let mut stores = Vec::new();
        for (&param, &arg) in params.iter().zip(args) {
            let p = self.ast.param(param);
            if !p.by_ref {
                continue;
            }
            let res = self
                .tables
                .resolutions
                .copied(arg)
                .expect("ref argument resolved to storage");
            stores.push(Op::store(p.ty, self.offset_of(res.decl)));
        }
        for op in stores.into_iter().rev() {
            self.code.emit(op);
        }
    }
}

fn compare_jump(op: CmpOp, operand_ty: Ty, target: saga_ast::LabelId) -> Op {
    match (op, operand_ty) {
        (CmpOp::Eq, Ty::Number) => Op::JumpEqNum(target),
        (CmpOp::Ne, Ty::Number) => Op::JumpNeNum(target),
        (CmpOp::Lt, Ty::Number) => Op::JumpLtNum(target),
        (CmpOp::Le, Ty::Number) => Op::JumpLeNum(target),
        (CmpOp::Gt, Ty::Number) => Op::JumpGtNum(target),
        (CmpOp::Ge, Ty::Number) => Op::JumpGeNum(target),
        (CmpOp::Eq, Ty::String) => Op::JumpEqStr(target),
        (CmpOp::Ne, Ty::String) => Op::JumpNeStr(target),
        (CmpOp::Eq, Ty::Entity) => Op::JumpEqEnt(target),
        (CmpOp::Ne, Ty::Entity) => Op::JumpNeEnt(target),
        (op, ty) => unreachable!("comparison {:?} over {}", op, ty),
    }
}
