// saga-sem - Static analysis passes for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Name resolution, in two passes over the whole unit.
//!
//! Pass 1 builds the scope tree and declares every symbol: the global
//! scope holds the unit constants, each script scope holds its
//! arguments, body declarations and both local and imported functions,
//! each import gets a file scope hanging off the global scope, and each
//! function scope holds arguments and body declarations. Pass 2 walks
//! every expression and binds identifier uses and call sites.
//!
//! Both passes always run. A duplicate declaration in pass 1 leaves the
//! first symbol in place, so pass 2 still resolves uses against it and
//! can report further, independent errors in the same run.

use saga_ast::ast::{Ast, Expr, NodeId, NodeKind, Stmt};
use saga_ast::diag::Reporter;
use saga_ast::side::{CallTarget, Resolution, SideTables};
use saga_ast::symtab::{ScopeArena, ScopeId, ScopeKind, Symbol, SymbolKind};

use crate::builtins::Builtins;

/// Run both resolver passes over a compilation unit.
pub fn resolve(
    ast: &Ast,
    unit: NodeId,
    builtins: &Builtins,
    scopes: &mut ScopeArena,
    tables: &mut SideTables,
    reporter: &mut Reporter,
) {
    let mut resolver = Resolver {
        ast,
        builtins,
        scopes,
        tables,
        reporter,
        file: ast.unit(unit).file.clone(),
    };
    resolver.declare_unit(unit);
    resolver.resolve_unit(unit);
}

struct Resolver<'a> {
    ast: &'a Ast,
    builtins: &'a Builtins,
    scopes: &'a mut ScopeArena,
    tables: &'a mut SideTables,
    reporter: &'a mut Reporter,
    file: String,
}

impl Resolver<'_> {
    // =========================================================================
    // Pass 1: declare
    // =========================================================================

    fn declare_unit(&mut self, unit: NodeId) {
        let u = self.ast.unit(unit);
        let global = self.scopes.create(ScopeKind::Global, None);
        self.tables.scopes.set(unit, global);

        self.file = u.file.clone();
        for &c in &u.consts {
            self.declare(global, c, SymbolKind::Const);
        }
        for &script in &u.scripts {
            self.declare_script(global, script);
        }
    }

    fn declare_script(&mut self, global: ScopeId, script_id: NodeId) {
        let script = self.ast.script(script_id);
        self.file = script.file.clone();

        let sscope = self.scopes.create(ScopeKind::Script, Some(global));
        self.tables.scopes.set(script_id, sscope);

        for &p in &script.params {
            self.declare(sscope, p, SymbolKind::Arg);
        }

        // Imported functions are visible both inside their own file
        // scope and from the importing script. Their file scope hangs
        // off the global scope, not the script scope: a function from
        // another file must not resolve the script's own arguments,
        // constants or variables.
        for &import in &script.imports {
            let iscope = self.scopes.create(ScopeKind::ImportFile, Some(global));
            self.tables.scopes.set(import, iscope);
            for &f in &self.ast.import(import).funcs {
                if self.declare(iscope, f, SymbolKind::Func) {
                    self.declare(sscope, f, SymbolKind::Func);
                }
                self.declare_function(iscope, f);
            }
        }

        for &decl in &self.ast.collect_decls(script.body) {
            let kind = self.decl_kind(decl);
            self.declare(sscope, decl, kind);
        }
        for &f in &script.funcs {
            self.declare(sscope, f, SymbolKind::Func);
            self.declare_function(sscope, f);
        }
    }

    fn declare_function(&mut self, parent: ScopeId, func: NodeId) {
        let f = self.ast.function(func);
        let fscope = self.scopes.create(ScopeKind::Function, Some(parent));
        self.tables.scopes.set(func, fscope);

        for &p in &f.params {
            self.declare(fscope, p, SymbolKind::Arg);
        }
        for &decl in &self.ast.collect_decls(f.body) {
            let kind = self.decl_kind(decl);
            self.declare(fscope, decl, kind);
        }
    }

    /// Insert one symbol, reporting the duplicate if the slot is taken.
    /// On conflict the first declaration wins. Returns whether the
    /// insertion happened.
    fn declare(&mut self, scope: ScopeId, decl: NodeId, kind: SymbolKind) -> bool {
        let name = self.ast.decl_name(decl).to_string();
        match self.scopes.insert(scope, &name, Symbol { kind, decl }) {
            Ok(()) => true,
            Err(_) => {
                self.reporter.error(
                    &self.file.clone(),
                    Some(&name),
                    self.ast.line(decl),
                    format!("identifier '{}' already declared in this scope", name),
                );
                false
            }
        }
    }

    fn decl_kind(&self, decl: NodeId) -> SymbolKind {
        match &self.ast.node(decl).kind {
            NodeKind::Const(_) => SymbolKind::Const,
            NodeKind::Var(_) => SymbolKind::Var,
            other => unreachable!("not a body declaration: {:?}", other),
        }
    }

    // =========================================================================
    // Pass 2: bind uses
    // =========================================================================

    fn resolve_unit(&mut self, unit: NodeId) {
        let u = self.ast.unit(unit);
        let global = self.tables.scopes.copied(unit).unwrap();

        self.file = u.file.clone();
        for &c in &u.consts {
            let init = self.ast.const_decl(c).init;
            self.resolve_expr(global, init);
        }

        for &script_id in &u.scripts {
            let script = self.ast.script(script_id);
            self.file = script.file.clone();
            let sscope = self.tables.scopes.copied(script_id).unwrap();

            for &import in &script.imports {
                for &f in &self.ast.import(import).funcs {
                    self.resolve_function_body(f);
                }
            }
            for &f in &script.funcs {
                self.resolve_function_body(f);
            }
            self.resolve_stmt(sscope, script.body);
        }
    }

    fn resolve_function_body(&mut self, func: NodeId) {
        let fscope = self.tables.scopes.copied(func).unwrap();
        let body = self.ast.function(func).body;
        self.resolve_stmt(fscope, body);
    }

    fn resolve_stmt(&mut self, scope: ScopeId, id: NodeId) {
        match &self.ast.node(id).kind {
            NodeKind::Const(c) => self.resolve_expr(scope, c.init),
            NodeKind::Var(v) => {
                // The weeder filled in defaults, so every var has one.
                if let Some(init) = v.init {
                    self.resolve_expr(scope, init);
                }
            }
            NodeKind::Stmt(stmt) => match stmt {
                Stmt::Seq(items) => {
                    for &item in items {
                        self.resolve_stmt(scope, item);
                    }
                }
                Stmt::If {
                    cond,
                    then_body,
                    else_body,
                } => {
                    self.resolve_expr(scope, *cond);
                    self.resolve_stmt(scope, *then_body);
                    if let Some(else_body) = else_body {
                        self.resolve_stmt(scope, *else_body);
                    }
                }
                Stmt::While { cond, body } => {
                    self.resolve_expr(scope, *cond);
                    self.resolve_stmt(scope, *body);
                }
                Stmt::Return(value) => {
                    if let Some(value) = value {
                        self.resolve_expr(scope, *value);
                    }
                }
                Stmt::Expr(expr) => self.resolve_expr(scope, *expr),
            },
            other => unreachable!("unexpected node in statement position: {:?}", other),
        }
    }

    fn resolve_expr(&mut self, scope: ScopeId, id: NodeId) {
        match self.ast.expr(id) {
            Expr::Number(_) | Expr::Str(_) | Expr::Null => {}
            Expr::Ident(name) => self.resolve_value_use(scope, id, name.clone()),
            Expr::Assign { target, value } => {
                self.resolve_assign_target(scope, *target);
                self.resolve_expr(scope, *value);
            }
            Expr::Binary { lhs, rhs, .. }
            | Expr::Logical { lhs, rhs, .. }
            | Expr::Compare { lhs, rhs, .. } => {
                let (lhs, rhs) = (*lhs, *rhs);
                self.resolve_expr(scope, lhs);
                self.resolve_expr(scope, rhs);
            }
            Expr::Unary { operand, .. } | Expr::Cast { operand, .. } => {
                self.resolve_expr(scope, *operand);
            }
            Expr::Call { name, args } => {
                let (name, args) = (name.clone(), args.clone());
                self.resolve_call(scope, id, &name, &args);
            }
            Expr::MethodCall { recv, name, args } => {
                let (recv, name, args) = (*recv, name.clone(), args.clone());
                self.resolve_expr(scope, recv);
                match self.builtins.lookup_method(&name) {
                    Some(bid) => self.tables.call_targets.set(id, CallTarget::Method(bid)),
                    None => self.reporter.error(
                        &self.file.clone(),
                        Some(&name),
                        self.ast.line(id),
                        format!("unknown method '{}'", name),
                    ),
                }
                for arg in args {
                    self.resolve_expr(scope, arg);
                }
            }
        }
    }

    fn resolve_value_use(&mut self, scope: ScopeId, id: NodeId, name: String) {
        match self.scopes.lookup(scope, &name) {
            None => self.reporter.error(
                &self.file.clone(),
                Some(&name),
                self.ast.line(id),
                format!("identifier '{}' not declared", name),
            ),
            Some(sym) if !sym.kind.is_value() => self.reporter.error(
                &self.file.clone(),
                Some(&name),
                self.ast.line(id),
                format!("'{}' is a function and cannot be used as a value", name),
            ),
            Some(sym) => self.tables.resolutions.set(
                id,
                Resolution {
                    kind: sym.kind,
                    decl: sym.decl,
                },
            ),
        }
    }

    fn resolve_assign_target(&mut self, scope: ScopeId, target: NodeId) {
        let Expr::Ident(name) = self.ast.expr(target) else {
            self.reporter.error(
                &self.file.clone(),
                None,
                self.ast.line(target),
                "assignment target must be a variable",
            );
            return;
        };
        let name = name.clone();
        match self.scopes.lookup(scope, &name) {
            None => self.reporter.error(
                &self.file.clone(),
                Some(&name),
                self.ast.line(target),
                format!("identifier '{}' not declared", name),
            ),
            Some(sym) if sym.kind == SymbolKind::Const => self.reporter.error(
                &self.file.clone(),
                Some(&name),
                self.ast.line(target),
                format!("cannot assign to constant '{}'", name),
            ),
            Some(sym) if !sym.kind.is_storage() => self.reporter.error(
                &self.file.clone(),
                Some(&name),
                self.ast.line(target),
                format!("'{}' cannot be assigned to", name),
            ),
            Some(sym) => self.tables.resolutions.set(
                target,
                Resolution {
                    kind: sym.kind,
                    decl: sym.decl,
                },
            ),
        }
    }

    /// Bind a call: a user function shadows a builtin of the same name.
    /// When the callee is unknown the arguments are still resolved so
    /// their own errors surface, but no arity or reference checking is
    /// possible.
    fn resolve_call(&mut self, scope: ScopeId, id: NodeId, name: &str, args: &[NodeId]) {
        match self.scopes.lookup(scope, name) {
            Some(sym) if sym.kind == SymbolKind::Func => {
                self.tables.call_targets.set(id, CallTarget::User(sym.decl));
                self.tables.invoked.set(sym.decl, ());
                self.check_user_call(scope, id, name, sym.decl, args);
            }
            Some(_) => {
                self.reporter.error(
                    &self.file.clone(),
                    Some(name),
                    self.ast.line(id),
                    format!("'{}' is not a function", name),
                );
            }
            None => match self.builtins.lookup_api(name) {
                Some(bid) => self.tables.call_targets.set(id, CallTarget::Builtin(bid)),
                None => self.reporter.error(
                    &self.file.clone(),
                    Some(name),
                    self.ast.line(id),
                    format!("identifier '{}' not declared", name),
                ),
            },
        }
        for &arg in args {
            self.resolve_expr(scope, arg);
        }
    }

    fn check_user_call(
        &mut self,
        scope: ScopeId,
        id: NodeId,
        name: &str,
        decl: NodeId,
        args: &[NodeId],
    ) {
        let params = self.ast.function(decl).params.clone();
        if args.len() < params.len() {
            self.reporter.error(
                &self.file.clone(),
                Some(name),
                self.ast.line(id),
                format!("missing parameters in call to '{}'", name),
            );
        } else if args.len() > params.len() {
            self.reporter.error(
                &self.file.clone(),
                Some(name),
                self.ast.line(id),
                format!("extra parameters in call to '{}'", name),
            );
        }

        // A by-reference parameter needs a storage location to write
        // back into.
        for (&param, &arg) in params.iter().zip(args) {
            let p = self.ast.param(param);
            if !p.by_ref {
                continue;
            }
            let pname = p.name.clone();
            let storage = match self.ast.expr(arg) {
                Expr::Ident(aname) => self
                    .scopes
                    .lookup(scope, aname)
                    .is_some_and(|sym| sym.kind.is_storage()),
                _ => false,
            };
            if !storage {
                self.reporter.error(
                    &self.file.clone(),
                    Some(&pname),
                    self.ast.line(arg),
                    format!("reference parameter '{}' requires a variable", pname),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga_ast::EventKind;
    use saga_ast::types::Ty;

    struct Resolved {
        ast: Ast,
        unit: NodeId,
        scopes: ScopeArena,
        tables: SideTables,
        reporter: Reporter,
    }

    fn run(build: impl FnOnce(&mut Ast) -> NodeId) -> Resolved {
        let mut ast = Ast::new();
        let unit = build(&mut ast);
        let builtins = Builtins::new();
        let mut scopes = ScopeArena::new();
        let mut tables = SideTables::new();
        let mut reporter = Reporter::new();
        resolve(
            &ast,
            unit,
            &builtins,
            &mut scopes,
            &mut tables,
            &mut reporter,
        );
        Resolved {
            ast,
            unit,
            scopes,
            tables,
            reporter,
        }
    }

    fn simple_script(
        ast: &mut Ast,
        funcs: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        let script = ast.script_decl(
            1,
            "test",
            "test.saga",
            EventKind::OnSpawn,
            vec![],
            vec![],
            funcs,
            body,
        );
        ast.unit_decl("test.saga", vec![], vec![script])
    }

    #[test]
    fn undeclared_identifier_is_reported() {
        let r = run(|ast| {
            let use_x = ast.ident(2, "x");
            let stmt = ast.expr_stmt(2, use_x);
            let body = ast.seq(1, vec![stmt]);
            simple_script(ast, vec![], body)
        });
        assert_eq!(r.reporter.error_count(), 1);
        assert!(r.reporter.diagnostics()[0].message.contains("not declared"));
    }

    #[test]
    fn variable_use_resolves_to_its_declaration() {
        let r = run(|ast| {
            let init = ast.number(2, 1.0);
            let decl = ast.var_item(2, "hp", Ty::Number, Some(init));
            let use_hp = ast.ident(3, "hp");
            let stmt = ast.expr_stmt(3, use_hp);
            let body = ast.seq(1, vec![decl, stmt]);
            simple_script(ast, vec![], body)
        });
        assert!(!r.reporter.has_errors());

        let script = r.ast.unit(r.unit).scripts[0];
        let body = r.ast.script(script).body;
        let decls = r.ast.collect_decls(body);
        let Stmt::Seq(items) = r.ast.stmt(body) else {
            panic!()
        };
        let Stmt::Expr(use_hp) = r.ast.stmt(items[1]) else {
            panic!()
        };
        let res = r.tables.resolutions.copied(*use_hp).unwrap();
        assert_eq!(res.decl, decls[0]);
        assert_eq!(res.kind, SymbolKind::Var);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let r = run(|ast| {
            let init = ast.number(2, 1.0);
            let decl = ast.var_item(2, "Counter", Ty::Number, Some(init));
            let use_it = ast.ident(3, "COUNTER");
            let stmt = ast.expr_stmt(3, use_it);
            let body = ast.seq(1, vec![decl, stmt]);
            simple_script(ast, vec![], body)
        });
        assert!(!r.reporter.has_errors());
    }

    #[test]
    fn duplicate_declaration_keeps_the_first_symbol() {
        let r = run(|ast| {
            let i1 = ast.number(2, 1.0);
            let d1 = ast.var_item(2, "x", Ty::Number, Some(i1));
            let i2 = ast.string(3, "two");
            let d2 = ast.var_item(3, "x", Ty::String, Some(i2));
            let use_x = ast.ident(4, "x");
            let stmt = ast.expr_stmt(4, use_x);
            let body = ast.seq(1, vec![d1, d2, stmt]);
            simple_script(ast, vec![], body)
        });
        assert_eq!(r.reporter.error_count(), 1);
        assert!(
            r.reporter.diagnostics()[0]
                .message
                .contains("already declared")
        );

        let script = r.ast.unit(r.unit).scripts[0];
        let sscope = r.tables.scopes.copied(script).unwrap();
        let sym = r.scopes.lookup(sscope, "x").unwrap();
        // First declaration wins; it declares a number.
        assert_eq!(r.ast.decl_ty(sym.decl), Ty::Number);
    }

    #[test]
    fn assigning_to_a_constant_is_an_error() {
        let r = run(|ast| {
            let init = ast.number(2, 3.0);
            let decl = ast.const_item(2, "MAX", Ty::Number, init);
            let target = ast.ident(3, "MAX");
            let value = ast.number(3, 4.0);
            let assign = ast.assign(3, target, value);
            let stmt = ast.expr_stmt(3, assign);
            let body = ast.seq(1, vec![decl, stmt]);
            simple_script(ast, vec![], body)
        });
        assert_eq!(r.reporter.error_count(), 1);
        assert!(
            r.reporter.diagnostics()[0]
                .message
                .contains("cannot assign to constant")
        );
    }

    #[test]
    fn user_function_shadows_builtin_and_is_marked_invoked() {
        let r = run(|ast| {
            // fn random() -> number { return 4; }
            let four = ast.number(2, 4.0);
            let ret = ast.ret(2, Some(four));
            let fbody = ast.seq(2, vec![ret]);
            let func = ast.function_decl(2, "random", Ty::Number, vec![], fbody);
            let call = ast.call(3, "random", vec![]);
            let stmt = ast.expr_stmt(3, call);
            let body = ast.seq(1, vec![stmt]);
            simple_script(ast, vec![func], body)
        });
        assert!(!r.reporter.has_errors());

        let script = r.ast.unit(r.unit).scripts[0];
        let func = r.ast.script(script).funcs[0];
        assert!(r.tables.is_invoked(func));

        let body = r.ast.script(script).body;
        let Stmt::Seq(items) = r.ast.stmt(body) else {
            panic!()
        };
        let Stmt::Expr(call) = r.ast.stmt(items[0]) else {
            panic!()
        };
        assert_eq!(
            r.tables.call_targets.copied(*call),
            Some(CallTarget::User(func))
        );
    }

    #[test]
    fn unknown_call_falls_back_to_builtin_table() {
        let r = run(|ast| {
            let arg = ast.number(2, 2.0);
            let call = ast.call(2, "sqrt", vec![arg]);
            let stmt = ast.expr_stmt(2, call);
            let body = ast.seq(1, vec![stmt]);
            simple_script(ast, vec![], body)
        });
        assert!(!r.reporter.has_errors());
    }

    #[test]
    fn arguments_of_an_undeclared_call_are_still_resolved() {
        let r = run(|ast| {
            let bad_arg = ast.ident(2, "nope");
            let call = ast.call(2, "no_such_function", vec![bad_arg]);
            let stmt = ast.expr_stmt(2, call);
            let body = ast.seq(1, vec![stmt]);
            simple_script(ast, vec![], body)
        });
        // One error for the callee, one for the argument.
        assert_eq!(r.reporter.error_count(), 2);
    }

    #[test]
    fn reference_argument_must_be_storage() {
        let r = run(|ast| {
            // fn bump(ref n: number) -> void { n = n + 1; return; }
            let p = ast.param_decl(2, "n", Ty::Number, true);
            let target = ast.ident(2, "n");
            let lhs = ast.ident(2, "n");
            let one = ast.number(2, 1.0);
            let sum = ast.binary(2, saga_ast::BinOp::Add, lhs, one);
            let assign = ast.assign(2, target, sum);
            let astmt = ast.expr_stmt(2, assign);
            let ret = ast.ret(2, None);
            let fbody = ast.seq(2, vec![astmt, ret]);
            let func = ast.function_decl(2, "bump", Ty::Void, vec![p], fbody);

            // bump(5) -- a literal is not storage
            let five = ast.number(3, 5.0);
            let call = ast.call(3, "bump", vec![five]);
            let stmt = ast.expr_stmt(3, call);
            let body = ast.seq(1, vec![stmt]);
            simple_script(ast, vec![func], body)
        });
        assert_eq!(r.reporter.error_count(), 1);
        assert!(
            r.reporter.diagnostics()[0]
                .message
                .contains("requires a variable")
        );
    }

    #[test]
    fn implicit_event_params_are_in_scope() {
        let r = run(|ast| {
            let use_it = ast.ident(2, "attacker");
            let stmt = ast.expr_stmt(2, use_it);
            let body = ast.seq(1, vec![stmt]);
            let script = ast.script_decl(
                1,
                "hurt",
                "hurt.saga",
                EventKind::OnDamage,
                vec![],
                vec![],
                vec![],
                body,
            );
            ast.unit_decl("hurt.saga", vec![], vec![script])
        });
        assert!(!r.reporter.has_errors());
    }

    #[test]
    fn imported_functions_cannot_see_script_locals() {
        let r = run(|ast| {
            // lib.saga:  function number helper(number p) { return x; }
            let p = ast.param_decl(1, "p", Ty::Number, false);
            let use_x = ast.ident(2, "x");
            let ret = ast.ret(2, Some(use_x));
            let fbody = ast.seq(1, vec![ret]);
            let helper = ast.function_decl(1, "helper", Ty::Number, vec![p], fbody);
            let import = ast.import_decl(1, "lib.saga", vec![helper]);

            // test.saga:  var number x := 1; helper(x);
            let init = ast.number(2, 1.0);
            let x = ast.var_item(2, "x", Ty::Number, Some(init));
            let arg = ast.ident(3, "x");
            let call = ast.call(3, "helper", vec![arg]);
            let stmt = ast.expr_stmt(3, call);
            let body = ast.seq(1, vec![x, stmt]);
            let script = ast.script_decl(
                1,
                "test",
                "test.saga",
                EventKind::OnSpawn,
                vec![],
                vec![import],
                vec![],
                body,
            );
            ast.unit_decl("test.saga", vec![], vec![script])
        });
        // The script-side uses resolve; the one inside helper must not.
        assert_eq!(r.reporter.error_count(), 1);
        assert!(
            r.reporter.diagnostics()[0]
                .message
                .contains("'x' not declared")
        );
    }

    #[test]
    fn imported_functions_still_see_unit_constants() {
        let r = run(|ast| {
            let use_c = ast.ident(2, "limit");
            let ret = ast.ret(2, Some(use_c));
            let fbody = ast.seq(1, vec![ret]);
            let helper = ast.function_decl(1, "helper", Ty::Number, vec![], fbody);
            let import = ast.import_decl(1, "lib.saga", vec![helper]);

            let call = ast.call(2, "helper", vec![]);
            let stmt = ast.expr_stmt(2, call);
            let body = ast.seq(1, vec![stmt]);
            let script = ast.script_decl(
                1,
                "test",
                "test.saga",
                EventKind::OnSpawn,
                vec![],
                vec![import],
                vec![],
                body,
            );
            let init = ast.number(1, 10.0);
            let limit = ast.const_item(1, "limit", Ty::Number, init);
            ast.unit_decl("test.saga", vec![limit], vec![script])
        });
        assert!(!r.reporter.has_errors());
    }
}
