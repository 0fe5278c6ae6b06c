// saga-sem - Static analysis passes for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Weeding: cheap structural checks over the raw AST.
//!
//! One walk per scope body, before any name or type information exists:
//! - fill a type-specific zero value into every uninitialized variable,
//! - reject division whose right operand is literally zero,
//! - check that every control path of a non-void body ends in a return
//!   (code after a returning path is a warning; a value returned from a
//!   void function is an error),
//! - append the implicit `return;` to script bodies that fall through:
//!   scripts always succeed unless they say otherwise.

use saga_ast::ast::{Ast, BinOp, Expr, NodeId, NodeKind, Stmt};
use saga_ast::diag::Reporter;
use saga_ast::types::Ty;

/// Run the weeder over a compilation unit.
pub fn weed(ast: &mut Ast, unit: NodeId, reporter: &mut Reporter) {
    let u = ast.unit(unit).clone();
    let mut weeder = Weeder {
        ast,
        reporter,
        file: u.file.clone(),
        ret: Ty::Void,
        in_script: false,
        owner: String::new(),
    };

    for &c in &u.consts {
        let init = weeder.ast.const_decl(c).init;
        weeder.weed_expr(init);
    }

    for &script_id in &u.scripts {
        let script = weeder.ast.script(script_id).clone();
        weeder.file = script.file.clone();

        for &import in &script.imports {
            let funcs = weeder.ast.import(import).funcs.clone();
            for f in funcs {
                weeder.weed_function(f);
            }
        }
        for &f in &script.funcs {
            weeder.weed_function(f);
        }

        weeder.weed_script_body(&script, script_id);
    }
}

struct Weeder<'a> {
    ast: &'a mut Ast,
    reporter: &'a mut Reporter,
    file: String,
    /// Return type of the body being weeded.
    ret: Ty,
    /// Script bodies return a continuation number but a bare `return;`
    /// is legal.
    in_script: bool,
    /// Name of the enclosing function/script, for diagnostics.
    owner: String,
}

impl Weeder<'_> {
    fn weed_function(&mut self, func: NodeId) {
        let f = self.ast.function(func).clone();
        self.ret = f.ret;
        self.in_script = false;
        self.owner = f.name.clone();

        self.weed_stmt(f.body);
        let all_return = self.returns(f.body);
        if f.ret != Ty::Void && !all_return {
            self.reporter.error(
                &self.file.clone(),
                Some(&f.name),
                self.ast.line(func),
                "not all control paths return a value",
            );
        }
    }

    fn weed_script_body(&mut self, script: &saga_ast::ast::Script, script_id: NodeId) {
        self.ret = Ty::Number;
        self.in_script = true;
        self.owner = script.name.clone();

        self.weed_stmt(script.body);
        if !self.returns(script.body) {
            // Scripts implicitly succeed: append `return;`.
            let line = self.ast.line(script.body);
            let ret = self.ast.ret(line, None);
            match self.ast.stmt_mut(script.body) {
                Stmt::Seq(items) => items.push(ret),
                _ => {
                    let old_body = script.body;
                    let new_body = self.ast.seq(line, vec![old_body, ret]);
                    self.ast.script_mut(script_id).body = new_body;
                }
            }
        }
    }

    // =========================================================================
    // Statement walk: default values, literal checks, return arity
    // =========================================================================

    fn weed_stmt(&mut self, id: NodeId) {
        match self.ast.node(id).kind.clone() {
            NodeKind::Var(v) => match v.init {
                Some(init) => self.weed_expr(init),
                None => {
                    let zero = self.zero_value(v.ty, self.ast.line(id));
                    self.ast.var_decl_mut(id).init = Some(zero);
                }
            },
            NodeKind::Const(c) => self.weed_expr(c.init),
            NodeKind::Stmt(stmt) => match stmt {
                Stmt::Seq(items) => {
                    for item in items {
                        self.weed_stmt(item);
                    }
                }
                Stmt::If {
                    cond,
                    then_body,
                    else_body,
                } => {
                    self.weed_expr(cond);
                    self.weed_stmt(then_body);
                    if let Some(else_body) = else_body {
                        self.weed_stmt(else_body);
                    }
                }
                Stmt::While { cond, body } => {
                    self.weed_expr(cond);
                    self.weed_stmt(body);
                }
                Stmt::Return(value) => {
                    let line = self.ast.line(id);
                    if let Some(value) = value {
                        self.weed_expr(value);
                        if self.ret == Ty::Void && !self.in_script {
                            self.reporter.error(
                                &self.file.clone(),
                                Some(&self.owner.clone()),
                                line,
                                "cannot return a value from a void function",
                            );
                        }
                    } else if self.ret != Ty::Void && !self.in_script {
                        self.reporter.error(
                            &self.file.clone(),
                            Some(&self.owner.clone()),
                            line,
                            "return value expected",
                        );
                    }
                }
                Stmt::Expr(expr) => self.weed_expr(expr),
            },
            other => unreachable!("unexpected node in statement position: {:?}", other),
        }
    }

    fn weed_expr(&mut self, id: NodeId) {
        match self.ast.expr(id).clone() {
            Expr::Number(_) | Expr::Str(_) | Expr::Null | Expr::Ident(_) => {}
            Expr::Assign { target, value } => {
                self.weed_expr(target);
                self.weed_expr(value);
            }
            Expr::Binary { op, lhs, rhs } => {
                if matches!(op, BinOp::Div | BinOp::Mod)
                    && matches!(self.ast.expr(rhs), Expr::Number(v) if *v == 0.0)
                {
                    self.reporter.error(
                        &self.file.clone(),
                        None,
                        self.ast.line(id),
                        "division by zero",
                    );
                }
                self.weed_expr(lhs);
                self.weed_expr(rhs);
            }
            Expr::Unary { operand, .. } => self.weed_expr(operand),
            Expr::Logical { lhs, rhs, .. } | Expr::Compare { lhs, rhs, .. } => {
                // Destructure shares field names; walk both children.
                self.weed_expr(lhs);
                self.weed_expr(rhs);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    self.weed_expr(arg);
                }
            }
            Expr::MethodCall { recv, args, .. } => {
                self.weed_expr(recv);
                for arg in args {
                    self.weed_expr(arg);
                }
            }
            Expr::Cast { operand, .. } => self.weed_expr(operand),
        }
    }

    fn zero_value(&mut self, ty: Ty, line: u32) -> NodeId {
        match ty {
            Ty::Number => self.ast.number(line, 0.0),
            Ty::String => self.ast.string(line, ""),
            Ty::Entity => self.ast.null(line),
            // Variables cannot be declared void/undefined; the parser
            // guarantees a value type here.
            Ty::Void | Ty::Undefined => unreachable!("variable of type {}", ty),
        }
    }

    // =========================================================================
    // All-paths-return analysis
    // =========================================================================

    /// Whether every control path through `id` ends in a return.
    /// Statements reachable after a returning prefix of a sequence are
    /// flagged as unreachable (a warning, not an error).
    fn returns(&mut self, id: NodeId) -> bool {
        match self.ast.node(id).kind.clone() {
            NodeKind::Var(_) | NodeKind::Const(_) => false,
            NodeKind::Stmt(stmt) => match stmt {
                Stmt::Seq(items) => {
                    let mut returned = false;
                    for item in items {
                        if returned {
                            let line = self.ast.line(item);
                            self.reporter
                                .warning(&self.file.clone(), line, "unreachable code");
                            break;
                        }
                        returned = self.returns(item);
                    }
                    returned
                }
                Stmt::If {
                    then_body,
                    else_body,
                    ..
                } => {
                    let then_returns = self.returns(then_body);
                    match else_body {
                        Some(else_body) => {
                            let else_returns = self.returns(else_body);
                            then_returns && else_returns
                        }
                        // Without an else the condition may fall through.
                        None => false,
                    }
                }
                // A while body may never run.
                Stmt::While { .. } => false,
                Stmt::Return(_) => true,
                Stmt::Expr(_) => false,
            },
            other => unreachable!("unexpected node in statement position: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga_ast::EventKind;

    fn weed_script(build: impl FnOnce(&mut Ast) -> NodeId) -> (Ast, Reporter, NodeId) {
        let mut ast = Ast::new();
        let body = build(&mut ast);
        let script = ast.script_decl(
            1,
            "test",
            "test.saga",
            EventKind::OnSpawn,
            vec![],
            vec![],
            vec![],
            body,
        );
        let unit = ast.unit_decl("test.saga", vec![], vec![script]);
        let mut reporter = Reporter::new();
        weed(&mut ast, unit, &mut reporter);
        (ast, reporter, script)
    }

    #[test]
    fn uninitialized_variables_get_zero_values() {
        let (ast, reporter, script) = weed_script(|ast| {
            let n = ast.var_item(2, "hp", Ty::Number, None);
            let s = ast.var_item(3, "name", Ty::String, None);
            let e = ast.var_item(4, "target", Ty::Entity, None);
            ast.seq(1, vec![n, s, e])
        });
        assert!(!reporter.has_errors());

        let body = ast.script(script).body;
        let decls = ast.collect_decls(body);
        let inits: Vec<_> = decls
            .iter()
            .map(|&d| ast.var_decl(d).init.expect("default init"))
            .collect();
        assert!(matches!(ast.expr(inits[0]), Expr::Number(v) if *v == 0.0));
        assert!(matches!(ast.expr(inits[1]), Expr::Str(s) if s.is_empty()));
        assert!(matches!(ast.expr(inits[2]), Expr::Null));
    }

    #[test]
    fn literal_division_by_zero_is_rejected() {
        let (_, reporter, _) = weed_script(|ast| {
            let one = ast.number(2, 1.0);
            let zero = ast.number(2, 0.0);
            let div = ast.binary(2, BinOp::Div, one, zero);
            let stmt = ast.expr_stmt(2, div);
            ast.seq(1, vec![stmt])
        });
        assert_eq!(reporter.error_count(), 1);
        assert!(reporter.diagnostics()[0].message.contains("division by zero"));
    }

    #[test]
    fn script_without_return_gets_one_appended() {
        let (ast, reporter, script) = weed_script(|ast| {
            let call = ast.call(2, "stop_music", vec![]);
            let stmt = ast.expr_stmt(2, call);
            ast.seq(1, vec![stmt])
        });
        assert!(!reporter.has_errors());

        let body = ast.script(script).body;
        match ast.stmt(body) {
            Stmt::Seq(items) => {
                let last = *items.last().unwrap();
                assert!(matches!(ast.stmt(last), Stmt::Return(None)));
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn code_after_return_is_a_warning_not_an_error() {
        let (_, reporter, _) = weed_script(|ast| {
            let ret = ast.ret(2, None);
            let call = ast.call(3, "stop_music", vec![]);
            let stmt = ast.expr_stmt(3, call);
            ast.seq(1, vec![ret, stmt])
        });
        assert_eq!(reporter.error_count(), 0);
        assert_eq!(reporter.warning_count(), 1);
        assert!(reporter.diagnostics()[0].message.contains("unreachable"));
    }

    #[test]
    fn non_void_function_must_return_on_all_paths() {
        let mut ast = Ast::new();
        // fn f() -> number { if (1) { return 1; } }  -- may fall through
        let one = ast.number(2, 1.0);
        let ret_val = ast.number(2, 1.0);
        let ret = ast.ret(2, Some(ret_val));
        let then_body = ast.seq(2, vec![ret]);
        let if_stmt = ast.if_stmt(2, one, then_body, None);
        let fn_body = ast.seq(2, vec![if_stmt]);
        let func = ast.function_decl(2, "f", Ty::Number, vec![], fn_body);

        let script_body = ast.seq(1, vec![]);
        let script = ast.script_decl(
            1,
            "test",
            "test.saga",
            EventKind::OnSpawn,
            vec![],
            vec![],
            vec![func],
            script_body,
        );
        let unit = ast.unit_decl("test.saga", vec![], vec![script]);

        let mut reporter = Reporter::new();
        weed(&mut ast, unit, &mut reporter);
        assert_eq!(reporter.error_count(), 1);
        assert!(
            reporter.diagnostics()[0]
                .message
                .contains("not all control paths return")
        );
    }

    #[test]
    fn void_function_cannot_return_a_value() {
        let mut ast = Ast::new();
        let v = ast.number(2, 1.0);
        let ret = ast.ret(2, Some(v));
        let body = ast.seq(2, vec![ret]);
        let func = ast.function_decl(2, "f", Ty::Void, vec![], body);

        let script_body = ast.seq(1, vec![]);
        let script = ast.script_decl(
            1,
            "test",
            "test.saga",
            EventKind::OnSpawn,
            vec![],
            vec![],
            vec![func],
            script_body,
        );
        let unit = ast.unit_decl("test.saga", vec![], vec![script]);

        let mut reporter = Reporter::new();
        weed(&mut ast, unit, &mut reporter);
        assert_eq!(reporter.error_count(), 1);
        assert!(
            reporter.diagnostics()[0]
                .message
                .contains("cannot return a value")
        );
    }

    #[test]
    fn both_branches_returning_satisfies_the_check() {
        let mut ast = Ast::new();
        let cond = ast.number(2, 1.0);
        let a = ast.number(3, 1.0);
        let ra = ast.ret(3, Some(a));
        let then_body = ast.seq(3, vec![ra]);
        let b = ast.number(4, 2.0);
        let rb = ast.ret(4, Some(b));
        let else_body = ast.seq(4, vec![rb]);
        let if_stmt = ast.if_stmt(2, cond, then_body, Some(else_body));
        let fn_body = ast.seq(2, vec![if_stmt]);
        let func = ast.function_decl(2, "f", Ty::Number, vec![], fn_body);

        let script_body = ast.seq(1, vec![]);
        let script = ast.script_decl(
            1,
            "test",
            "test.saga",
            EventKind::OnSpawn,
            vec![],
            vec![],
            vec![func],
            script_body,
        );
        let unit = ast.unit_decl("test.saga", vec![], vec![script]);

        let mut reporter = Reporter::new();
        weed(&mut ast, unit, &mut reporter);
        assert_eq!(reporter.error_count(), 0);
    }
}
