// saga-sem - Property-based tests for the weeder
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Property-based tests for the weeding pass.
//!
//! Tests the following properties:
//! - A literal division rejects exactly the zero right operand
//! - Statements after a `return;` always draw the unreachable warning
//! - A body that ends in `return;` never draws it

use proptest::prelude::*;
use saga_ast::ast::{Ast, BinOp, NodeId};
use saga_ast::diag::Reporter;
use saga_ast::events::EventKind;
use saga_ast::types::Ty;
use saga_sem::weed;

// =============================================================================
// Strategies and helpers
// =============================================================================

/// Generate finite f64 literals.
fn arb_number() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("must be finite", |f| f.is_finite())
}

fn one_script(ast: &mut Ast, body: NodeId) -> NodeId {
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
    ast.unit_decl("test.saga", vec![], vec![script])
}

fn weed_unit(build: impl FnOnce(&mut Ast) -> NodeId) -> Reporter {
    let mut ast = Ast::new();
    let unit = build(&mut ast);
    let mut reporter = Reporter::new();
    weed(&mut ast, unit, &mut reporter);
    reporter
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// `a / b` with literal operands is rejected exactly when b is
    /// (positive or negative) zero.
    #[test]
    fn literal_division_rejects_only_zero(a in arb_number(), b in arb_number()) {
        let reporter = weed_unit(|ast| {
            let lhs = ast.number(2, a);
            let rhs = ast.number(2, b);
            let div = ast.binary(2, BinOp::Div, lhs, rhs);
            let decl = ast.var_item(2, "x", Ty::Number, Some(div));
            let body = ast.seq(1, vec![decl]);
            one_script(ast, body)
        });
        if b == 0.0 {
            prop_assert_eq!(reporter.error_count(), 1);
        } else {
            prop_assert_eq!(reporter.error_count(), 0);
        }
    }

    /// Any statement after a bare `return;` is unreachable; a body
    /// that merely ends in one is fine.
    #[test]
    fn code_after_return_is_flagged(trailing in 0usize..4) {
        let reporter = weed_unit(|ast| {
            let ret = ast.ret(2, None);
            let mut stmts = vec![ret];
            for _ in 0..trailing {
                let lit = ast.number(3, 1.0);
                stmts.push(ast.expr_stmt(3, lit));
            }
            let body = ast.seq(1, stmts);
            one_script(ast, body)
        });
        prop_assert_eq!(reporter.error_count(), 0);
        if trailing == 0 {
            prop_assert_eq!(reporter.warning_count(), 0);
        } else {
            prop_assert!(reporter.warning_count() >= 1);
        }
    }
}
