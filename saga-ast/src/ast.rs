// saga-ast - AST, symbol tables and diagnostics for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! The arena AST.
//!
//! The external parser delivers a tree of tagged nodes stored in a
//! single arena and addressed by [`NodeId`]. Passes annotate nodes
//! through the side tables in [`crate::side`] rather than widening the
//! variants; the only structural mutations after parse are the weeder's
//! default-value insertion, its synthesized script returns, and the type
//! checker's cast splices.

use crate::events::EventKind;
use crate::types::Ty;

/// Index of a node in the [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One arena node: a source line plus the tagged payload.
#[derive(Debug, Clone)]
pub struct Node {
    /// 1-based source line for diagnostics.
    pub line: u32,
    pub kind: NodeKind,
}

/// Tagged node payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Unit(Unit),
    Script(Script),
    Import(Import),
    Function(Function),
    Param(Param),
    Const(ConstDecl),
    Var(VarDecl),
    Stmt(Stmt),
    Expr(Expr),
}

/// A whole compilation unit: global constants plus scripts.
#[derive(Debug, Clone)]
pub struct Unit {
    /// Source file name, used in diagnostics and artifact headers.
    pub file: String,
    /// Global constant declarations.
    pub consts: Vec<NodeId>,
    pub scripts: Vec<NodeId>,
}

/// An event script attached to a game entity.
#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    /// Source file the script came from; recorded in the script index.
    pub file: String,
    pub event: EventKind,
    /// Implicit event parameters followed by explicit ones.
    pub params: Vec<NodeId>,
    pub imports: Vec<NodeId>,
    /// Script-level function declarations.
    pub funcs: Vec<NodeId>,
    /// Body statement sequence. Constant and variable declarations
    /// appear in statement position and scope to the script frame.
    pub body: NodeId,
}

/// An imported function file, inlined by the external parser.
#[derive(Debug, Clone)]
pub struct Import {
    pub file: String,
    pub funcs: Vec<NodeId>,
}

/// A user-defined function.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub ret: Ty,
    pub params: Vec<NodeId>,
    pub body: NodeId,
}

/// A function or script parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
    /// Pass by reference: the callee's final value is written back into
    /// the caller's variable after the call returns.
    pub by_ref: bool,
    /// True for event parameters synthesized by the script builder.
    pub implicit: bool,
}

/// A constant declaration. Constants always carry an initializer.
#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub name: String,
    pub ty: Ty,
    pub init: NodeId,
}

/// A variable declaration. The weeder fills a type-specific zero value
/// into `init` when the source had none.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub ty: Ty,
    pub init: Option<NodeId>,
}

/// A statement. Sequences may also contain `Const` and `Var` nodes in
/// statement position.
#[derive(Debug, Clone)]
pub enum Stmt {
    Seq(Vec<NodeId>),
    If {
        cond: NodeId,
        then_body: NodeId,
        else_body: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    Return(Option<NodeId>),
    Expr(NodeId),
}

/// An expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64),
    Str(String),
    /// The null entity handle.
    Null,
    Ident(String),
    /// `target := value`; yields the stored value.
    Assign { target: NodeId, value: NodeId },
    Binary { op: BinOp, lhs: NodeId, rhs: NodeId },
    Unary { op: UnOp, operand: NodeId },
    Logical { op: LogOp, lhs: NodeId, rhs: NodeId },
    Compare { op: CmpOp, lhs: NodeId, rhs: NodeId },
    /// User-function or builtin API call; the resolver decides which.
    Call { name: String, args: Vec<NodeId> },
    /// `recv.name(args)` where `recv` is an entity identifier.
    MethodCall {
        recv: NodeId,
        name: String,
        args: Vec<NodeId>,
    },
    /// Inserted by the type checker; never produced by the parser.
    Cast { to: Ty, operand: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// The node arena. Built once, annotated in place by the passes, and
/// dropped as a unit after assembly.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of nodes in the arena (side tables size themselves off
    /// this).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, line: u32, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { line, kind });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn line(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].line
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================
    //
    // Asking for the wrong kind is a compiler bug, not a user error, so
    // these panic with the node id rather than returning Result.

    pub fn unit(&self, id: NodeId) -> &Unit {
        match &self.node(id).kind {
            NodeKind::Unit(u) => u,
            other => unreachable!("node {:?} is not a unit: {:?}", id, other),
        }
    }

    pub fn script(&self, id: NodeId) -> &Script {
        match &self.node(id).kind {
            NodeKind::Script(s) => s,
            other => unreachable!("node {:?} is not a script: {:?}", id, other),
        }
    }

    pub fn script_mut(&mut self, id: NodeId) -> &mut Script {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Script(s) => s,
            other => unreachable!("node {:?} is not a script: {:?}", id, other),
        }
    }

    pub fn import(&self, id: NodeId) -> &Import {
        match &self.node(id).kind {
            NodeKind::Import(i) => i,
            other => unreachable!("node {:?} is not an import: {:?}", id, other),
        }
    }

    pub fn function(&self, id: NodeId) -> &Function {
        match &self.node(id).kind {
            NodeKind::Function(f) => f,
            other => unreachable!("node {:?} is not a function: {:?}", id, other),
        }
    }

    pub fn param(&self, id: NodeId) -> &Param {
        match &self.node(id).kind {
            NodeKind::Param(p) => p,
            other => unreachable!("node {:?} is not a param: {:?}", id, other),
        }
    }

    pub fn const_decl(&self, id: NodeId) -> &ConstDecl {
        match &self.node(id).kind {
            NodeKind::Const(c) => c,
            other => unreachable!("node {:?} is not a const: {:?}", id, other),
        }
    }

    pub fn const_decl_mut(&mut self, id: NodeId) -> &mut ConstDecl {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Const(c) => c,
            other => unreachable!("node {:?} is not a const: {:?}", id, other),
        }
    }

    pub fn var_decl(&self, id: NodeId) -> &VarDecl {
        match &self.node(id).kind {
            NodeKind::Var(v) => v,
            other => unreachable!("node {:?} is not a var: {:?}", id, other),
        }
    }

    pub fn var_decl_mut(&mut self, id: NodeId) -> &mut VarDecl {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Var(v) => v,
            other => unreachable!("node {:?} is not a var: {:?}", id, other),
        }
    }

    pub fn stmt(&self, id: NodeId) -> &Stmt {
        match &self.node(id).kind {
            NodeKind::Stmt(s) => s,
            other => unreachable!("node {:?} is not a stmt: {:?}", id, other),
        }
    }

    pub fn stmt_mut(&mut self, id: NodeId) -> &mut Stmt {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Stmt(s) => s,
            other => unreachable!("node {:?} is not a stmt: {:?}", id, other),
        }
    }

    pub fn expr(&self, id: NodeId) -> &Expr {
        match &self.node(id).kind {
            NodeKind::Expr(e) => e,
            other => unreachable!("node {:?} is not an expr: {:?}", id, other),
        }
    }

    pub fn expr_mut(&mut self, id: NodeId) -> &mut Expr {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Expr(e) => e,
            other => unreachable!("node {:?} is not an expr: {:?}", id, other),
        }
    }

    /// The declared name of a const/var/param/function node, for
    /// diagnostics and symbol insertion.
    pub fn decl_name(&self, id: NodeId) -> &str {
        match &self.node(id).kind {
            NodeKind::Const(c) => &c.name,
            NodeKind::Var(v) => &v.name,
            NodeKind::Param(p) => &p.name,
            NodeKind::Function(f) => &f.name,
            other => unreachable!("node {:?} is not a declaration: {:?}", id, other),
        }
    }

    /// The declared type of a const/var/param node.
    pub fn decl_ty(&self, id: NodeId) -> Ty {
        match &self.node(id).kind {
            NodeKind::Const(c) => c.ty,
            NodeKind::Var(v) => v.ty,
            NodeKind::Param(p) => p.ty,
            other => unreachable!("node {:?} has no declared type: {:?}", id, other),
        }
    }

    // =========================================================================
    // Builder (the interface the external parser targets)
    // =========================================================================

    pub fn number(&mut self, line: u32, value: f64) -> NodeId {
        self.push(line, NodeKind::Expr(Expr::Number(value)))
    }

    pub fn string(&mut self, line: u32, value: impl Into<String>) -> NodeId {
        self.push(line, NodeKind::Expr(Expr::Str(value.into())))
    }

    pub fn null(&mut self, line: u32) -> NodeId {
        self.push(line, NodeKind::Expr(Expr::Null))
    }

    pub fn ident(&mut self, line: u32, name: impl Into<String>) -> NodeId {
        self.push(line, NodeKind::Expr(Expr::Ident(name.into())))
    }

    pub fn assign(&mut self, line: u32, target: NodeId, value: NodeId) -> NodeId {
        self.push(line, NodeKind::Expr(Expr::Assign { target, value }))
    }

    pub fn binary(&mut self, line: u32, op: BinOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(line, NodeKind::Expr(Expr::Binary { op, lhs, rhs }))
    }

    pub fn unary(&mut self, line: u32, op: UnOp, operand: NodeId) -> NodeId {
        self.push(line, NodeKind::Expr(Expr::Unary { op, operand }))
    }

    pub fn logical(&mut self, line: u32, op: LogOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(line, NodeKind::Expr(Expr::Logical { op, lhs, rhs }))
    }

    pub fn compare(&mut self, line: u32, op: CmpOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(line, NodeKind::Expr(Expr::Compare { op, lhs, rhs }))
    }

    pub fn call(&mut self, line: u32, name: impl Into<String>, args: Vec<NodeId>) -> NodeId {
        self.push(
            line,
            NodeKind::Expr(Expr::Call {
                name: name.into(),
                args,
            }),
        )
    }

    pub fn method_call(
        &mut self,
        line: u32,
        recv: NodeId,
        name: impl Into<String>,
        args: Vec<NodeId>,
    ) -> NodeId {
        self.push(
            line,
            NodeKind::Expr(Expr::MethodCall {
                recv,
                name: name.into(),
                args,
            }),
        )
    }

    pub fn seq(&mut self, line: u32, items: Vec<NodeId>) -> NodeId {
        self.push(line, NodeKind::Stmt(Stmt::Seq(items)))
    }

    pub fn if_stmt(
        &mut self,
        line: u32,
        cond: NodeId,
        then_body: NodeId,
        else_body: Option<NodeId>,
    ) -> NodeId {
        self.push(
            line,
            NodeKind::Stmt(Stmt::If {
                cond,
                then_body,
                else_body,
            }),
        )
    }

    pub fn while_stmt(&mut self, line: u32, cond: NodeId, body: NodeId) -> NodeId {
        self.push(line, NodeKind::Stmt(Stmt::While { cond, body }))
    }

    pub fn ret(&mut self, line: u32, value: Option<NodeId>) -> NodeId {
        self.push(line, NodeKind::Stmt(Stmt::Return(value)))
    }

    pub fn expr_stmt(&mut self, line: u32, expr: NodeId) -> NodeId {
        self.push(line, NodeKind::Stmt(Stmt::Expr(expr)))
    }

    pub fn param_decl(&mut self, line: u32, name: impl Into<String>, ty: Ty, by_ref: bool) -> NodeId {
        self.push(
            line,
            NodeKind::Param(Param {
                name: name.into(),
                ty,
                by_ref,
                implicit: false,
            }),
        )
    }

    pub fn const_item(&mut self, line: u32, name: impl Into<String>, ty: Ty, init: NodeId) -> NodeId {
        self.push(
            line,
            NodeKind::Const(ConstDecl {
                name: name.into(),
                ty,
                init,
            }),
        )
    }

    pub fn var_item(
        &mut self,
        line: u32,
        name: impl Into<String>,
        ty: Ty,
        init: Option<NodeId>,
    ) -> NodeId {
        self.push(
            line,
            NodeKind::Var(VarDecl {
                name: name.into(),
                ty,
                init,
            }),
        )
    }

    pub fn function_decl(
        &mut self,
        line: u32,
        name: impl Into<String>,
        ret: Ty,
        params: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.push(
            line,
            NodeKind::Function(Function {
                name: name.into(),
                ret,
                params,
                body,
            }),
        )
    }

    pub fn import_decl(&mut self, line: u32, file: impl Into<String>, funcs: Vec<NodeId>) -> NodeId {
        self.push(
            line,
            NodeKind::Import(Import {
                file: file.into(),
                funcs,
            }),
        )
    }

    /// Build a script node. The event's implicit parameters are
    /// synthesized here and prepended to `explicit_params`, so they
    /// participate in resolution and allocation like any other argument.
    #[allow(clippy::too_many_arguments)]
    pub fn script_decl(
        &mut self,
        line: u32,
        name: impl Into<String>,
        file: impl Into<String>,
        event: EventKind,
        explicit_params: Vec<NodeId>,
        imports: Vec<NodeId>,
        funcs: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        let mut params = Vec::with_capacity(event.implicit_params().len() + explicit_params.len());
        for &(pname, pty) in event.implicit_params() {
            params.push(self.push(
                line,
                NodeKind::Param(Param {
                    name: pname.to_string(),
                    ty: pty,
                    by_ref: false,
                    implicit: true,
                }),
            ));
        }
        params.extend(explicit_params);
        self.push(
            line,
            NodeKind::Script(Script {
                name: name.into(),
                file: file.into(),
                event,
                params,
                imports,
                funcs,
                body,
            }),
        )
    }

    pub fn unit_decl(&mut self, file: impl Into<String>, consts: Vec<NodeId>, scripts: Vec<NodeId>) -> NodeId {
        self.push(
            0,
            NodeKind::Unit(Unit {
                file: file.into(),
                consts,
                scripts,
            }),
        )
    }

    /// Collect the const/var declarations reachable in a body, in
    /// source order. Declarations may sit inside `if`/`while` bodies;
    /// they still scope to the enclosing frame (there are no block
    /// scopes).
    pub fn collect_decls(&self, body: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_decls_into(body, &mut out);
        out
    }

    fn collect_decls_into(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match &self.node(id).kind {
            NodeKind::Const(_) | NodeKind::Var(_) => out.push(id),
            NodeKind::Stmt(stmt) => match stmt {
                Stmt::Seq(items) => {
                    for &item in items {
                        self.collect_decls_into(item, out);
                    }
                }
                Stmt::If {
                    then_body,
                    else_body,
                    ..
                } => {
                    self.collect_decls_into(*then_body, out);
                    if let Some(else_body) = else_body {
                        self.collect_decls_into(*else_body, out);
                    }
                }
                Stmt::While { body, .. } => self.collect_decls_into(*body, out),
                Stmt::Return(_) | Stmt::Expr(_) => {}
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_builder_prepends_implicit_params() {
        let mut ast = Ast::new();
        let explicit = ast.param_decl(3, "count", Ty::Number, false);
        let body = ast.seq(3, vec![]);
        let script = ast.script_decl(
            3,
            "take",
            "take.saga",
            EventKind::OnGetItem,
            vec![explicit],
            vec![],
            vec![],
            body,
        );

        let s = ast.script(script);
        assert_eq!(s.params.len(), 3);
        assert!(ast.param(s.params[0]).implicit);
        assert_eq!(ast.param(s.params[0]).name, "taker");
        assert_eq!(ast.param(s.params[1]).name, "item");
        assert!(!ast.param(s.params[2]).implicit);
        assert_eq!(ast.param(s.params[2]).name, "count");
    }

    #[test]
    fn collect_decls_descends_into_control_bodies() {
        let mut ast = Ast::new();
        let zero = ast.number(1, 0.0);
        let outer = ast.var_item(1, "x", Ty::Number, Some(zero));
        let inner_init = ast.number(3, 1.0);
        let inner = ast.var_item(3, "y", Ty::Number, Some(inner_init));
        let while_body = ast.seq(2, vec![inner]);
        let cond = ast.number(2, 1.0);
        let loop_stmt = ast.while_stmt(2, cond, while_body);
        let body = ast.seq(1, vec![outer, loop_stmt]);

        let decls = ast.collect_decls(body);
        assert_eq!(decls, vec![outer, inner]);
    }
}
