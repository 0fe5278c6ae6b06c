// saga-sem - Static analysis passes for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Type checking and coercion insertion.
//!
//! A bottom-up walk computes every expression's type into the
//! `expr_ty` side table. Where a number meets a string slot (or the
//! other way around in concatenation) an explicit [`Expr::Cast`] node
//! is spliced into the tree, so code generation never coerces
//! implicitly. Any ill-typed expression is reported once and given the
//! `undefined` recovery type, which satisfies every later check in its
//! subtree's ancestors.

use saga_ast::ast::{Ast, BinOp, CmpOp, Expr, LogOp, NodeId, NodeKind, Stmt, UnOp};
use saga_ast::diag::Reporter;
use saga_ast::side::{CallTarget, SideTables};
use saga_ast::types::Ty;

use crate::builtins::Builtins;

/// Run the type checker over a compilation unit.
pub fn typecheck(
    ast: &mut Ast,
    unit: NodeId,
    builtins: &Builtins,
    tables: &mut SideTables,
    reporter: &mut Reporter,
) {
    let u = ast.unit(unit).clone();
    let mut checker = TypeChecker {
        ast,
        builtins,
        tables,
        reporter,
        file: u.file.clone(),
        ret: Ty::Void,
        in_script: false,
    };

    for &c in &u.consts {
        checker.check_decl_init(c);
    }

    for &script_id in &u.scripts {
        let script = checker.ast.script(script_id).clone();
        checker.file = script.file.clone();

        for &import in &script.imports {
            let funcs = checker.ast.import(import).funcs.clone();
            for f in funcs {
                checker.check_function(f);
            }
        }
        for &f in &script.funcs {
            checker.check_function(f);
        }

        // Script bodies return the continuation number.
        checker.ret = Ty::Number;
        checker.in_script = true;
        checker.check_stmt(script.body);
    }
}

struct TypeChecker<'a> {
    ast: &'a mut Ast,
    builtins: &'a Builtins,
    tables: &'a mut SideTables,
    reporter: &'a mut Reporter,
    file: String,
    ret: Ty,
    in_script: bool,
}

impl TypeChecker<'_> {
    fn check_function(&mut self, func: NodeId) {
        let f = self.ast.function(func).clone();
        self.ret = f.ret;
        self.in_script = false;
        self.check_stmt(f.body);
    }

    fn error(&mut self, fragment: Option<&str>, line: u32, message: impl Into<String>) {
        self.reporter.error(&self.file.clone(), fragment, line, message);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn check_stmt(&mut self, id: NodeId) {
        match self.ast.node(id).kind.clone() {
            NodeKind::Const(_) | NodeKind::Var(_) => self.check_decl_init(id),
            NodeKind::Stmt(stmt) => match stmt {
                Stmt::Seq(items) => {
                    for item in items {
                        self.check_stmt(item);
                    }
                }
                Stmt::If {
                    cond,
                    then_body,
                    else_body,
                } => {
                    self.check_cond(cond);
                    self.check_stmt(then_body);
                    if let Some(else_body) = else_body {
                        self.check_stmt(else_body);
                    }
                }
                Stmt::While { cond, body } => {
                    self.check_cond(cond);
                    self.check_stmt(body);
                }
                Stmt::Return(value) => {
                    if let Some(value) = value {
                        let found = self.check_expr(value);
                        let expected = self.ret;
                        if expected == Ty::Void {
                            // Reported by the weeder already.
                            return;
                        }
                        if !expected.assignable_from(found) {
                            self.error(
                                None,
                                self.ast.line(id),
                                format!(
                                    "return type mismatch: expected {}, found {}",
                                    expected, found
                                ),
                            );
                        } else {
                            let coerced = self.coerce(value, found, expected);
                            if let Stmt::Return(v) = self.ast.stmt_mut(id) {
                                *v = Some(coerced);
                            }
                        }
                    }
                }
                Stmt::Expr(expr) => {
                    self.check_expr(expr);
                }
            },
            other => unreachable!("unexpected node in statement position: {:?}", other),
        }
    }

    fn check_decl_init(&mut self, decl: NodeId) {
        let (name, ty, init) = match &self.ast.node(decl).kind {
            NodeKind::Const(c) => (c.name.clone(), c.ty, c.init),
            // Weeded: every var has an initializer by now.
            NodeKind::Var(v) => (v.name.clone(), v.ty, v.init.unwrap()),
            other => unreachable!("not a declaration: {:?}", other),
        };
        let found = self.check_expr(init);
        if !ty.assignable_from(found) {
            self.error(
                Some(&name),
                self.ast.line(decl),
                format!("cannot assign {} to {}", found, ty),
            );
            return;
        }
        let coerced = self.coerce(init, found, ty);
        if coerced != init {
            if matches!(self.ast.node(decl).kind, NodeKind::Const(_)) {
                self.ast.const_decl_mut(decl).init = coerced;
            } else {
                self.ast.var_decl_mut(decl).init = Some(coerced);
            }
        }
    }

    fn check_cond(&mut self, cond: NodeId) {
        let t = self.check_expr(cond);
        if t != Ty::Number && !t.is_undefined() {
            self.error(None, self.ast.line(cond), "condition must be a number");
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn check_expr(&mut self, id: NodeId) -> Ty {
        let ty = match self.ast.expr(id).clone() {
            Expr::Number(_) => Ty::Number,
            Expr::Str(_) => Ty::String,
            Expr::Null => Ty::Entity,
            Expr::Ident(_) => match self.tables.resolutions.copied(id) {
                Some(res) => self.ast.decl_ty(res.decl),
                // Unresolved: the resolver reported it.
                None => Ty::Undefined,
            },
            Expr::Assign { target, value } => self.check_assign(id, target, value),
            Expr::Binary { op, lhs, rhs } => self.check_binary(id, op, lhs, rhs),
            Expr::Unary { op, operand } => self.check_unary(id, op, operand),
            Expr::Logical { op, lhs, rhs } => self.check_logical(id, op, lhs, rhs),
            Expr::Compare { op, lhs, rhs } => self.check_compare(id, op, lhs, rhs),
            Expr::Call { name, args } => self.check_call(id, &name, &args),
            Expr::MethodCall { recv, name, args } => self.check_method(id, recv, &name, &args),
            // Only this pass makes casts, and it never revisits them.
            Expr::Cast { to, .. } => to,
        };
        self.tables.expr_ty.set(id, ty);
        ty
    }

    fn check_assign(&mut self, id: NodeId, target: NodeId, value: NodeId) -> Ty {
        let target_ty = self.check_expr(target);
        let value_ty = self.check_expr(value);
        if !target_ty.assignable_from(value_ty) {
            let fragment = match self.ast.expr(target) {
                Expr::Ident(name) => Some(name.clone()),
                _ => None,
            };
            self.error(
                fragment.as_deref(),
                self.ast.line(id),
                format!("cannot assign {} to {}", value_ty, target_ty),
            );
            return Ty::Undefined;
        }
        let coerced = self.coerce(value, value_ty, target_ty);
        if let Expr::Assign { value, .. } = self.ast.expr_mut(id) {
            *value = coerced;
        }
        target_ty
    }

    fn check_binary(&mut self, id: NodeId, op: BinOp, lhs: NodeId, rhs: NodeId) -> Ty {
        let lt = self.check_expr(lhs);
        let rt = self.check_expr(rhs);
        if lt.is_undefined() || rt.is_undefined() {
            return Ty::Undefined;
        }
        if op == BinOp::Add && (lt == Ty::String || rt == Ty::String) {
            // Concatenation: the number side, if any, is coerced.
            if !Ty::String.ge(lt) || !Ty::String.ge(rt) {
                self.error(
                    None,
                    self.ast.line(id),
                    "operator '+' requires number or string operands",
                );
                return Ty::Undefined;
            }
            let new_lhs = self.coerce(lhs, lt, Ty::String);
            let new_rhs = self.coerce(rhs, rt, Ty::String);
            if let Expr::Binary { lhs, rhs, .. } = self.ast.expr_mut(id) {
                *lhs = new_lhs;
                *rhs = new_rhs;
            }
            return Ty::String;
        }
        if lt != Ty::Number || rt != Ty::Number {
            self.error(
                None,
                self.ast.line(id),
                format!("operator '{}' requires number operands", bin_op_symbol(op)),
            );
            return Ty::Undefined;
        }
        Ty::Number
    }

    fn check_unary(&mut self, id: NodeId, op: UnOp, operand: NodeId) -> Ty {
        let t = self.check_expr(operand);
        if t.is_undefined() {
            return Ty::Undefined;
        }
        if t != Ty::Number {
            let symbol = match op {
                UnOp::Neg => "-",
                UnOp::Not => "!",
            };
            self.error(
                None,
                self.ast.line(id),
                format!("operator '{}' requires a number operand", symbol),
            );
            return Ty::Undefined;
        }
        Ty::Number
    }

    fn check_logical(&mut self, id: NodeId, op: LogOp, lhs: NodeId, rhs: NodeId) -> Ty {
        let lt = self.check_expr(lhs);
        let rt = self.check_expr(rhs);
        if lt.is_undefined() || rt.is_undefined() {
            return Ty::Undefined;
        }
        if lt != Ty::Number || rt != Ty::Number {
            let symbol = match op {
                LogOp::And => "&&",
                LogOp::Or => "||",
            };
            self.error(
                None,
                self.ast.line(id),
                format!("operator '{}' requires number operands", symbol),
            );
            return Ty::Undefined;
        }
        Ty::Number
    }

    fn check_compare(&mut self, id: NodeId, op: CmpOp, lhs: NodeId, rhs: NodeId) -> Ty {
        let lt = self.check_expr(lhs);
        let rt = self.check_expr(rhs);
        let Some(common) = lt.common(rt) else {
            self.error(
                None,
                self.ast.line(id),
                format!("cannot compare {} and {}", lt, rt),
            );
            return Ty::Undefined;
        };
        if common.is_undefined() {
            return Ty::Undefined;
        }
        let relational = matches!(op, CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge);
        if relational && common != Ty::Number {
            self.error(
                None,
                self.ast.line(id),
                format!("operator '{}' requires number operands", cmp_op_symbol(op)),
            );
            return Ty::Undefined;
        }
        let new_lhs = self.coerce(lhs, lt, common);
        let new_rhs = self.coerce(rhs, rt, common);
        if let Expr::Compare { lhs, rhs, .. } = self.ast.expr_mut(id) {
            *lhs = new_lhs;
            *rhs = new_rhs;
        }
        Ty::Number
    }

    fn check_call(&mut self, id: NodeId, name: &str, args: &[NodeId]) -> Ty {
        match self.tables.call_targets.copied(id) {
            Some(CallTarget::User(decl)) => self.check_user_call(id, decl, args),
            Some(CallTarget::Builtin(bid)) => self.check_builtin_call(id, name, bid, args, 0),
            Some(CallTarget::Method(_)) => unreachable!("method target on a plain call"),
            // Unresolved callee: check the arguments for their own
            // errors, the call itself was already reported.
            None => {
                for &arg in args {
                    self.check_expr(arg);
                }
                Ty::Undefined
            }
        }
    }

    fn check_user_call(&mut self, id: NodeId, decl: NodeId, args: &[NodeId]) -> Ty {
        let f = self.ast.function(decl).clone();
        let mut new_args = Vec::with_capacity(args.len());
        for (i, &arg) in args.iter().enumerate() {
            let found = self.check_expr(arg);
            let Some(&param) = f.params.get(i) else {
                // Arity mismatch was reported by the resolver.
                new_args.push(arg);
                continue;
            };
            let p = self.ast.param(param).clone();
            if p.by_ref {
                // Write-back requires the exact slot type.
                if found != p.ty && !found.is_undefined() {
                    self.error(
                        Some(&p.name),
                        self.ast.line(arg),
                        format!("reference parameter '{}' expects {}", p.name, p.ty),
                    );
                }
                new_args.push(arg);
            } else if !p.ty.assignable_from(found) {
                self.error(
                    Some(&p.name),
                    self.ast.line(arg),
                    format!("parameter '{}' expects {}, found {}", p.name, p.ty, found),
                );
                new_args.push(arg);
            } else {
                new_args.push(self.coerce(arg, found, p.ty));
            }
        }
        if let Expr::Call { args, .. } = self.ast.expr_mut(id) {
            *args = new_args;
        }
        f.ret
    }

    /// Check a builtin call's arity and argument types. `skip` is the
    /// number of leading signature parameters bound elsewhere (the
    /// receiver, for methods).
    fn check_builtin_call(
        &mut self,
        id: NodeId,
        name: &str,
        bid: saga_ast::BuiltinId,
        args: &[NodeId],
        skip: usize,
    ) -> Ty {
        let sig = self.builtins.sig(bid);
        let params = &sig.params[skip..];
        if args.len() < params.len() {
            self.error(
                Some(name),
                self.ast.line(id),
                format!("missing parameters in call to '{}'", name),
            );
        } else if args.len() > params.len() {
            self.error(
                Some(name),
                self.ast.line(id),
                format!("extra parameters in call to '{}'", name),
            );
        }

        let mut new_args = Vec::with_capacity(args.len());
        for (i, &arg) in args.iter().enumerate() {
            let found = self.check_expr(arg);
            let Some(&expected) = params.get(i) else {
                new_args.push(arg);
                continue;
            };
            if !expected.assignable_from(found) {
                self.error(
                    Some(name),
                    self.ast.line(arg),
                    format!(
                        "parameter {} of '{}' expects {}, found {}",
                        i + 1,
                        name,
                        expected,
                        found
                    ),
                );
                new_args.push(arg);
            } else {
                new_args.push(self.coerce(arg, found, expected));
            }
        }
        match self.ast.expr_mut(id) {
            Expr::Call { args, .. } | Expr::MethodCall { args, .. } => *args = new_args,
            _ => unreachable!(),
        }
        sig.ret
    }

    fn check_method(&mut self, id: NodeId, recv: NodeId, name: &str, args: &[NodeId]) -> Ty {
        let recv_ty = self.check_expr(recv);
        if recv_ty != Ty::Entity && !recv_ty.is_undefined() {
            self.error(
                Some(name),
                self.ast.line(id),
                "method receiver must be an entity",
            );
        }
        match self.tables.call_targets.copied(id) {
            Some(CallTarget::Method(bid)) => self.check_builtin_call(id, name, bid, args, 1),
            // Unknown method, reported by the resolver.
            _ => {
                for &arg in args {
                    self.check_expr(arg);
                }
                Ty::Undefined
            }
        }
    }

    /// Splice a cast node above `expr` when a number/string coercion is
    /// needed, returning the node the parent should now point at.
    fn coerce(&mut self, expr: NodeId, from: Ty, to: Ty) -> NodeId {
        let needed = from != to
            && matches!(from, Ty::Number | Ty::String)
            && matches!(to, Ty::Number | Ty::String);
        if !needed {
            return expr;
        }
        let line = self.ast.line(expr);
        let cast = self.ast.push(line, NodeKind::Expr(Expr::Cast { to, operand: expr }));
        self.tables.expr_ty.set(cast, to);
        cast
    }
}

fn bin_op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
    }
}

fn cmp_op_symbol(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::Ne => "!=",
        CmpOp::Lt => "<",
        CmpOp::Le => "<=",
        CmpOp::Gt => ">",
        CmpOp::Ge => ">=",
    }
}
