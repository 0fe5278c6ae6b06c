// saga-ast - Property-based tests for the symbol tables
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Property-based tests for the scope arena.
//!
//! Tests the following properties:
//! - Lookup is case-insensitive: any case variant finds the symbol
//! - Insertion is first-wins: a duplicate never replaces the original
//! - Child scopes see parent symbols; parents never see child symbols

use proptest::prelude::*;
use saga_ast::ast::{Ast, NodeId};
use saga_ast::symtab::{ScopeArena, ScopeKind, Symbol, SymbolKind};

// =============================================================================
// Strategies for generating identifiers
// =============================================================================

/// Generate identifiers in the shape the language allows.
fn arb_ident() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,15}"
}

/// Flip each character of an identifier to a random case.
fn arb_case_variant(name: String) -> impl Strategy<Value = String> {
    let len = name.len();
    prop::collection::vec(any::<bool>(), len).prop_map(move |flips| {
        name.chars()
            .zip(flips)
            .map(|(c, up)| {
                if up {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}

fn sym(kind: SymbolKind, decl: NodeId) -> Symbol {
    Symbol { kind, decl }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any case variant of a declared name resolves to the same symbol.
    #[test]
    fn lookup_ignores_case(
        (name, variant) in arb_ident().prop_flat_map(|n| {
            let variants = arb_case_variant(n.clone());
            (Just(n), variants)
        }),
    ) {
        let mut ast = Ast::new();
        let decl = ast.number(1, 0.0);
        let mut scopes = ScopeArena::new();
        let global = scopes.create(ScopeKind::Global, None);

        scopes.insert(global, &name, sym(SymbolKind::Var, decl)).unwrap();
        let found = scopes.lookup(global, &variant);
        prop_assert_eq!(found, Some(sym(SymbolKind::Var, decl)));
    }

    /// A conflicting insertion fails and leaves the first symbol in
    /// place, whatever the casing of the second.
    #[test]
    fn duplicate_insertion_keeps_the_first_symbol(
        (name, variant) in arb_ident().prop_flat_map(|n| {
            let variants = arb_case_variant(n.clone());
            (Just(n), variants)
        }),
    ) {
        let mut ast = Ast::new();
        let first = ast.number(1, 1.0);
        let second = ast.number(2, 2.0);
        let mut scopes = ScopeArena::new();
        let global = scopes.create(ScopeKind::Global, None);

        scopes.insert(global, &name, sym(SymbolKind::Const, first)).unwrap();
        let clash = scopes.insert(global, &variant, sym(SymbolKind::Var, second));
        prop_assert_eq!(clash, Err(sym(SymbolKind::Const, first)));
        prop_assert_eq!(
            scopes.lookup(global, &name),
            Some(sym(SymbolKind::Const, first))
        );
    }

    /// Hierarchical lookup reaches parent symbols; local lookup and
    /// parent-scope lookup never reach a child's symbols.
    #[test]
    fn lookup_walks_up_but_never_down(name in arb_ident(), other in arb_ident()) {
        prop_assume!(!name.eq_ignore_ascii_case(&other));

        let mut ast = Ast::new();
        let outer_decl = ast.number(1, 1.0);
        let inner_decl = ast.number(2, 2.0);
        let mut scopes = ScopeArena::new();
        let global = scopes.create(ScopeKind::Global, None);
        let script = scopes.create(ScopeKind::Script, Some(global));

        scopes.insert(global, &name, sym(SymbolKind::Const, outer_decl)).unwrap();
        scopes.insert(script, &other, sym(SymbolKind::Var, inner_decl)).unwrap();

        prop_assert_eq!(
            scopes.lookup(script, &name),
            Some(sym(SymbolKind::Const, outer_decl))
        );
        prop_assert_eq!(scopes.lookup_local(script, &name), None);
        prop_assert_eq!(scopes.lookup(global, &other), None);
    }
}
