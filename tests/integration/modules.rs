mod common;
use common::*;

use asmcheck::ast::build::*;
use asmcheck::ast::{AssignOp, Expr};
use asmcheck::diagnostics::ErrorKind;
use asmcheck::span::{Span, Spanned};
use asmcheck::typeck::types::{Arrow, ValueType};

fn inc_body() -> Vec<S> {
    vec![int_param("x"), ret(or0(add(id("x"), int(1))))]
}

#[test]
fn end_to_end_increment() {
    let m = module("m", &["stdlib"], vec![use_asm(), func("f", &["x"], inc_body()), ret(id("f"))]);
    let report = validate_ok(&m);
    assert_eq!(report.get_function("f"), Some(&Arrow::new(vec![ValueType::Int], ValueType::Signed)));
    assert!(report.is_single_export());
    assert_eq!(report.get_export(), Some("f"));
}

#[test]
fn end_to_end_missing_coercion_fails_at_return() {
    let span = Span::line(1, 66, 79);
    let body = vec![int_param("x"), at(ret(add(id("x"), int(1))), span)];
    let m = module("m", &["stdlib"], vec![use_asm(), func("f", &["x"], body), ret(id("f"))]);
    let err = validate_err(&m);
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.span(), Some(span));
}

#[test]
fn missing_directive() {
    let m = module("m", &[], vec![func("f", &[], vec![]), ret(id("f"))]);
    validate_should_fail(&m, ErrorKind::Structural, "use asm");
}

#[test]
fn wrong_directive_string() {
    let m = module("m", &[], vec![expr_stmt(string("use strict")), func("f", &[], vec![]), ret(id("f"))]);
    validate_should_fail(&m, ErrorKind::Structural, "use asm");
}

#[test]
fn duplicate_directive() {
    let m = module("m", &[], vec![use_asm(), use_asm(), func("f", &[], vec![]), ret(id("f"))]);
    validate_should_fail(&m, ErrorKind::Structural, "single \"use asm\" directive");
}

#[test]
fn too_many_parameters() {
    let m = module("m", &["a", "b", "c", "d"], vec![use_asm(), func("f", &[], vec![]), ret(id("f"))]);
    validate_should_fail(&m, ErrorKind::Structural, "at most 3 parameters");
}

#[test]
fn global_after_function() {
    let m = module(
        "m",
        &[],
        vec![use_asm(), func("f", &[], vec![]), var(vec![("g", int(0))]), func("h", &[], vec![]), ret(id("f"))],
    );
    validate_should_fail(&m, ErrorKind::Structural, "unexpected");
}

#[test]
fn missing_export() {
    let m = module("m", &[], vec![use_asm(), func("f", &[], vec![])]);
    validate_should_fail(&m, ErrorKind::Structural, "missing export clause");
}

#[test]
fn second_return() {
    let m = module("m", &[], vec![use_asm(), func("f", &[], vec![]), ret(id("f")), ret(id("f"))]);
    validate_should_fail(&m, ErrorKind::Structural, "second return");
}

#[test]
fn empty_statements_are_ignored() {
    let m = module(
        "m",
        &[],
        vec![empty(), use_asm(), empty(), func("f", &[], vec![empty()]), empty(), ret(id("f"))],
    );
    validate_ok(&m);
}

#[test]
fn module_named_eval() {
    let m = module("eval", &[], vec![use_asm(), func("empty", &[], vec![]), ret(id("empty"))]);
    validate_should_fail(&m, ErrorKind::Binding, "illegal");
}

#[test]
fn function_named_eval() {
    let m = module("m", &[], vec![use_asm(), func("eval", &[], vec![]), ret(id("eval"))]);
    validate_should_fail(&m, ErrorKind::Binding, "illegal");
}

#[test]
fn local_named_arguments() {
    let m = one_function("f", &[], vec![var(vec![("arguments", int(0))])]);
    validate_should_fail(&m, ErrorKind::Binding, "illegal");
}

#[test]
fn parameter_named_eval() {
    let m = module("m", &["eval"], vec![use_asm(), func("f", &[], vec![]), ret(id("f"))]);
    validate_should_fail(&m, ErrorKind::Binding, "illegal");
}

#[test]
fn duplicate_function() {
    let m = module("m", &[], vec![use_asm(), func("f", &[], vec![]), func("f", &[], vec![]), ret(id("f"))]);
    validate_should_fail(&m, ErrorKind::Binding, "duplicate binding 'f'");
}

#[test]
fn parameter_types() {
    let m = one_function("f", &["x", "y", "z"], vec![int_param("x"), double_param("y"), unsigned_param("z")]);
    let report = validate_ok(&m);
    assert_eq!(
        report.get_function("f"),
        Some(&Arrow::new(vec![ValueType::Int, ValueType::Double, ValueType::Unsigned], ValueType::Void))
    );
}

#[test]
fn missing_parameter_annotation() {
    let m = one_function("f", &["x"], vec![ret(or0(id("x")))]);
    validate_should_fail(&m, ErrorKind::Type, "parameter 'x'");
}

#[test]
fn negative_literal_returns() {
    let report = validate_ok(&one_function("f", &[], vec![ret(neg(int(42)))]));
    assert_eq!(report.get_function("f").unwrap().result, ValueType::Signed);
    let report = validate_ok(&one_function("f", &[], vec![ret(neg(num(42.1)))]));
    assert_eq!(report.get_function("f").unwrap().result, ValueType::Double);
}

#[test]
fn mutually_recursive_functions() {
    let m = module(
        "m",
        &[],
        vec![
            use_asm(),
            func("even", &["n"], vec![
                int_param("n"),
                if_(bin(asmcheck::ast::BinaryOp::Eq, or0(id("n")), int(0)), ret(int(1)), None),
                ret(or0(call(id("odd"), vec![or0(sub(id("n"), int(1)))]))),
            ]),
            func("odd", &["n"], vec![
                int_param("n"),
                if_(bin(asmcheck::ast::BinaryOp::Eq, or0(id("n")), int(0)), ret(int(0)), None),
                ret(or0(call(id("even"), vec![or0(sub(id("n"), int(1)))]))),
            ]),
            ret(object(vec![("even", id("even")), ("odd", id("odd"))])),
        ],
    );
    let report = validate_ok(&m);
    assert_eq!(report.functions().len(), 2);
}

#[test]
fn validation_is_repeatable() {
    let m = module("m", &["stdlib"], vec![use_asm(), func("f", &["x"], inc_body()), ret(id("f"))]);
    assert_eq!(validate_ok(&m), validate_ok(&m));
}

#[test]
fn presence_coverage_accepts_partial_paths() {
    use asmcheck::config::{ReturnCoverage, ValidatorConfig};
    let body = vec![int_param("x"), if_(id("x"), ret(int(1)), None)];
    let m = one_function("f", &["x"], body);
    let config = ValidatorConfig { return_coverage: ReturnCoverage::Presence, ..Default::default() };
    assert!(asmcheck::validate_with_config(&m, config).is_ok());
    validate_should_fail(&m, ErrorKind::Type, "missing return");
}

#[test]
fn config_from_toml() {
    use asmcheck::config::ValidatorConfig;
    let config = ValidatorConfig::from_toml_str("max_additive_operands = 3").unwrap();
    let body = vec![
        var(vec![("a", int(0))]),
        set("a", or0(add(add(add(id("a"), id("a")), id("a")), id("a")))),
    ];
    let m = one_function("f", &[], body);
    let err = asmcheck::validate_with_config(&m, config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(validate_ok(&m).is_single_export());
}

#[test]
fn compound_assignment_annotation_rejected() {
    let annotation = Spanned::dummy(Expr::Assign {
        operator: AssignOp::AddAssign,
        left: Box::new(id("x")),
        right: Box::new(or0(id("x"))),
    });
    let m = one_function("f", &["x"], vec![expr_stmt(annotation), ret(or0(id("x")))]);
    validate_should_fail(&m, ErrorKind::Type, "malformed annotation for parameter 'x'");
}
