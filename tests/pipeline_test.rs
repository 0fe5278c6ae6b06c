// sagac - Pipeline driver tests
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! Driver-level behavior: fail-fast staging, artifact capture and
//! file output.

mod common;

use common::*;

#[test]
fn warnings_do_not_block_artifacts() {
    let (_, _, reporter, result) = compile_unit(|ast| {
        // return; stop_music();  -- the trailing call is unreachable.
        let ret = ast.ret(2, None);
        let call = ast.call(3, "stop_music", vec![]);
        let stmt = ast.expr_stmt(3, call);
        let body = ast.seq(1, vec![ret, stmt]);
        one_script_unit(ast, EventKind::OnSpawn, vec![], body)
    });
    assert_eq!(reporter.error_count(), 0);
    assert_eq!(reporter.warning_count(), 1);
    assert!(result.artifacts.is_some());
}

#[test]
fn check_only_runs_skip_assembly() {
    let mut ast = Ast::new();
    let ret = ast.ret(2, None);
    let body = ast.seq(1, vec![ret]);
    let unit = one_script_unit(&mut ast, EventKind::OnSpawn, vec![], body);

    let mut reporter = Reporter::new();
    let options = CompileOptions { emit: false };
    let result = compile_with(&mut ast, unit, &mut reporter, &options);
    assert_eq!(reporter.error_count(), 0);
    assert!(result.artifacts.is_none());
}

#[test]
fn later_stage_diagnostics_are_suppressed_after_an_error() {
    // The undeclared identifier would also be a type error and an
    // unallocatable slot downstream; only the resolver reports.
    let (_, _, reporter, _) = compile_unit(|ast| {
        let bad = ast.ident(2, "ghost");
        let init = ast.number(2, 0.0);
        let decl = ast.var_item(2, "x", Ty::Number, Some(init));
        let target = ast.ident(3, "x");
        let assign = ast.assign(3, target, bad);
        let stmt = ast.expr_stmt(3, assign);
        let body = ast.seq(1, vec![decl, stmt]);
        one_script_unit(ast, EventKind::OnSpawn, vec![], body)
    });
    assert_eq!(reporter.error_count(), 1);
    assert!(messages(&reporter).contains("'ghost' not declared"));
}

#[test]
fn artifacts_write_both_files() {
    let (_, _, reporter, result) = compile_unit(|ast| {
        let ret = ast.ret(2, None);
        let body = ast.seq(1, vec![ret]);
        one_script_unit(ast, EventKind::OnSpawn, vec![], body)
    });
    assert_eq!(reporter.error_count(), 0);
    let artifacts = result.artifacts.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let (globals_path, scripts_path) = artifacts.write_to_dir(dir.path(), "unit").unwrap();
    assert_eq!(globals_path.file_name().unwrap(), "unit.sgl");
    assert_eq!(scripts_path.file_name().unwrap(), "unit.ssc");

    let globals = std::fs::read(&globals_path).unwrap();
    let scripts = std::fs::read(&scripts_path).unwrap();
    assert_eq!(globals, artifacts.globals);
    assert_eq!(scripts, artifacts.scripts);
    assert_eq!(&globals[0..4], b"SGLB");
    assert_eq!(&scripts[0..4], b"SSCR");
}

#[test]
fn rendered_diagnostics_end_with_the_tally() {
    let (_, _, reporter, _) = compile_unit(|ast| {
        let one = ast.number(2, 1.0);
        let call = ast.call(2, "foo", vec![one]);
        let stmt = ast.expr_stmt(2, call);
        let body = ast.seq(1, vec![stmt]);
        one_script_unit(ast, EventKind::OnSpawn, vec![], body)
    });
    let rendered = reporter.render();
    assert!(rendered.contains("test.saga:2"));
    assert!(rendered.ends_with("1 error(s), 0 warning(s)\n"));
}
