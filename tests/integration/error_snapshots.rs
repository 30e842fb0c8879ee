//! Snapshot tests for error message formatting.
//!
//! Uses insta to capture error messages and detect regressions.
//! Run `cargo insta review` to review changes.

mod common;
use common::*;

use asmcheck::ast::build::*;
use asmcheck::ast::{AssignOp, BinaryOp, Expr};
use asmcheck::span::Spanned;
use insta::assert_snapshot;

fn error_text(module: &Spanned<asmcheck::ast::Function>) -> String {
    validate_err(module).to_string()
}

#[test]
fn assignment_of_intish() {
    let m = one_function("f", &["x"], vec![int_param("x"), set("x", add(id("x"), int(1)))]);
    assert_snapshot!(error_text(&m), @"type error: expected int in assignment, got intish");
}

#[test]
fn uncoerced_return() {
    let m = one_function("f", &["x"], vec![int_param("x"), ret(add(id("x"), int(1)))]);
    assert_snapshot!(
        error_text(&m),
        @"type error: return value must be coerced with |0, >>>0 or unary +, or be a numeric literal"
    );
}

#[test]
fn unbound_variable() {
    let m = one_function("f", &[], vec![ret(or0(id("y")))]);
    assert_snapshot!(error_text(&m), @"binding error: unbound variable 'y'");
}

#[test]
fn integer_literal_out_of_range() {
    let m = one_function("f", &[], vec![ret(int(4294967296))]);
    assert_snapshot!(error_text(&m), @"range error: integer literal 4294967296 out of range");
}

#[test]
fn compound_assignment() {
    let compound = Spanned::dummy(Expr::Assign {
        operator: AssignOp::AddAssign,
        left: Box::new(id("x")),
        right: Box::new(int(1)),
    });
    let m = one_function("f", &["x"], vec![int_param("x"), expr_stmt(compound)]);
    assert_snapshot!(error_text(&m), @"unsupported construct: compound assignment '+='");
}

#[test]
fn wrong_directive() {
    let m = module("m", &[], vec![expr_stmt(string("use strict")), func("f", &[], vec![]), ret(id("f"))]);
    assert_snapshot!(error_text(&m), @r#"structural error: expected "use asm" directive"#);
}

#[test]
fn missing_return() {
    let m = one_function("f", &["x"], vec![int_param("x"), if_(id("x"), ret(int(1)), None)]);
    assert_snapshot!(error_text(&m), @"type error: missing return in function 'f' returning signed");
}

#[test]
fn table_mask() {
    let unary = |name: &str| func(name, &["x"], vec![int_param("x"), ret(int(0))]);
    let dispatch = func(
        "dispatch",
        &["i"],
        vec![
            int_param("i"),
            ret(or0(call(index(id("t"), bin(BinaryOp::BitAnd, id("i"), int(3))), vec![id("i")]))),
        ],
    );
    let m = asm_module(
        vec![unary("a"), unary("b"), dispatch, var(vec![("t", array(vec![id("a"), id("b")]))])],
        id("dispatch"),
    );
    assert_snapshot!(error_text(&m), @"type error: function table mask should be 1, got 3");
}

#[test]
fn export_of_global() {
    let m = asm_module(vec![var(vec![("g", int(0))]), func("f", &[], vec![])], id("g"));
    assert_snapshot!(error_text(&m), @"type error: cannot export 'g': expected function, got int");
}
