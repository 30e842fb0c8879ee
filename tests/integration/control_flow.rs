mod common;
use common::*;

use asmcheck::ast::BinaryOp;
use asmcheck::ast::build::*;
use asmcheck::diagnostics::ErrorKind;
use asmcheck::typeck::types::ValueType;

fn lt(a: E, b: E) -> E {
    bin(BinaryOp::Lt, a, b)
}

fn ge(a: E, b: E) -> E {
    bin(BinaryOp::GtEq, a, b)
}

fn counters() -> S {
    var(vec![("i", int(0)), ("j", int(0))])
}

/// `i|0 < 10`, which parses as `i | (0 < 10)`.
fn loose_test() -> E {
    bin(BinaryOp::BitOr, id("i"), lt(int(0), int(10)))
}

/// `x = x|0 + 1`, which parses as `x = x | (0 + 1)`.
fn loose_increment(x: &str) -> S {
    set(x, bin(BinaryOp::BitOr, id(x), add(int(0), int(1))))
}

#[test]
fn if_condition_is_int() {
    let m = one_function("f", &["x", "y"], vec![
        int_param("x"),
        int_param("y"),
        if_(id("x"), block(vec![set("y", int(3))]), None),
    ]);
    validate_ok(&m);
}

#[test]
fn double_condition_rejected() {
    let m = one_function("f", &["d"], vec![double_param("d"), if_(id("d"), block(vec![]), None)]);
    validate_should_fail(&m, ErrorKind::Type, "expected boolish in if test, got double");
}

#[test]
fn empty_statements() {
    let m = one_function("f", &[], vec![
        empty(),
        empty(),
        block(vec![]),
        empty(),
        if_(int(0), empty(), None),
        if_(int(0), block(vec![]), None),
    ]);
    validate_ok(&m);
}

#[test]
fn for_without_init() {
    let m = one_function("f", &[], vec![
        counters(),
        for_(None, Some(loose_test()), Some(assign(id("i"), or0(add(id("i"), int(1))))), block(vec![
            set("j", bin(BinaryOp::BitOr, id("j"), add(int(0), id("i")))),
        ])),
    ]);
    validate_ok(&m);
}

#[test]
fn for_without_test() {
    let m = one_function("f", &[], vec![
        counters(),
        for_(Some(assign(id("i"), int(0))), None, Some(assign(id("i"), or0(add(id("i"), int(1))))), block(vec![
            if_(ge(or0(id("i")), int(10)), break_(None), None),
            loose_increment("j"),
        ])),
    ]);
    validate_ok(&m);
}

#[test]
fn for_without_update() {
    let m = one_function("f", &[], vec![
        counters(),
        for_(Some(assign(id("i"), int(0))), Some(loose_test()), None, block(vec![
            loose_increment("j"),
            loose_increment("i"),
        ])),
    ]);
    validate_ok(&m);
}

#[test]
fn for_var_head_rejected() {
    let m = one_function("f", &[], vec![for_var(var_decl(vec![("i", int(0))]), None, None, block(vec![]))]);
    validate_should_fail(&m, ErrorKind::Structural, "for-loop head");
}

#[test]
fn double_function_missing_return() {
    let m = one_function("f", &["x"], vec![
        double_param("x"),
        if_(lt(id("x"), num(0.0)), ret(plus(id("x"))), None),
    ]);
    validate_should_fail(&m, ErrorKind::Type, "missing return");
}

#[test]
fn double_function_all_paths_return() {
    let m = one_function("f", &["x"], vec![
        double_param("x"),
        if_(lt(id("x"), num(0.0)), ret(plus(id("x"))), Some(ret(num(0.0)))),
    ]);
    let report = validate_ok(&m);
    assert_eq!(report.get_function("f").unwrap().result, ValueType::Double);
}

#[test]
fn return_inside_loop_is_not_enough() {
    let m = one_function("f", &[], vec![while_(int(1), block(vec![ret(int(1))]))]);
    validate_should_fail(&m, ErrorKind::Type, "missing return");
}

#[test]
fn do_while_body_returns() {
    let m = one_function("f", &[], vec![do_while(block(vec![ret(int(1))]), int(1))]);
    validate_ok(&m);
}

#[test]
fn labeled_loops() {
    let m = one_function("f", &[], vec![
        counters(),
        labeled("outer", while_(int(1), block(vec![
            while_(int(1), block(vec![
                if_(id("i"), break_(Some("outer")), None),
                if_(id("j"), continue_(Some("outer")), None),
                break_(None),
            ])),
        ]))),
        ret(int(0)),
    ]);
    validate_ok(&m);
}

#[test]
fn labeled_break_skips_return() {
    let m = one_function("f", &[], vec![
        counters(),
        labeled("done", block(vec![
            if_(id("i"), break_(Some("done")), None),
            ret(int(1)),
        ])),
    ]);
    validate_should_fail(&m, ErrorKind::Type, "missing return");
}

#[test]
fn duplicate_nested_label() {
    let m = one_function("f", &[], vec![labeled("l", labeled("l", block(vec![])))]);
    validate_should_fail(&m, ErrorKind::Binding, "duplicate label");
}

#[test]
fn sibling_labels_may_repeat() {
    let m = one_function("f", &[], vec![
        labeled("l", block(vec![break_(Some("l"))])),
        labeled("l", block(vec![break_(Some("l"))])),
    ]);
    validate_ok(&m);
}

#[test]
fn break_outside_loop() {
    let m = one_function("f", &[], vec![break_(None)]);
    validate_should_fail(&m, ErrorKind::Structural, "break outside");
}

#[test]
fn continue_to_block_label() {
    let m = one_function("f", &[], vec![labeled("b", block(vec![while_(int(1), continue_(Some("b")))]))]);
    validate_should_fail(&m, ErrorKind::Structural, "not a loop");
}

#[test]
fn switch_returning_on_every_path() {
    let m = one_function("f", &["x"], vec![
        int_param("x"),
        switch(or0(id("x")), vec![
            (Some(int(0)), vec![]),
            (Some(int(1)), vec![ret(int(10))]),
            (None, vec![ret(int(20))]),
        ]),
    ]);
    validate_ok(&m);
}

#[test]
fn switch_with_break_does_not_return() {
    let m = one_function("f", &["x"], vec![
        int_param("x"),
        switch(or0(id("x")), vec![(Some(int(1)), vec![break_(None)]), (None, vec![ret(int(20))])]),
    ]);
    validate_should_fail(&m, ErrorKind::Type, "missing return");
}

#[test]
fn switch_break_to_outer_label() {
    let m = one_function("f", &["x"], vec![
        int_param("x"),
        labeled("out", block(vec![
            switch(or0(id("x")), vec![(Some(int(1)), vec![break_(Some("out"))]), (None, vec![ret(int(2))])]),
        ])),
        ret(int(0)),
    ]);
    validate_ok(&m);
}

#[test]
fn switch_case_type_mismatch() {
    let m = one_function("f", &["x"], vec![
        int_param("x"),
        switch(or0(id("x")), vec![(Some(num(1.5)), vec![])]),
    ]);
    validate_should_fail(&m, ErrorKind::Type, "does not match discriminant");
}

#[test]
fn switch_on_double() {
    let m = one_function("f", &["d"], vec![
        double_param("d"),
        switch(id("d"), vec![(Some(num(1.5)), vec![ret(num(1.0))]), (None, vec![ret(num(0.0))])]),
    ]);
    validate_ok(&m);
}

#[test]
fn var_after_statement() {
    let m = one_function("f", &[], vec![counters(), set("i", int(1)), var(vec![("k", int(0))])]);
    validate_should_fail(&m, ErrorKind::Structural, "must precede");
}

#[test]
fn nested_function() {
    let m = one_function("f", &[], vec![func("g", &[], vec![])]);
    validate_should_fail(&m, ErrorKind::Structural, "module level");
}

#[test]
fn void_return_in_signed_function() {
    let m = one_function("f", &[], vec![counters(), if_(id("i"), ret_void(), None), ret(int(1))]);
    validate_should_fail(&m, ErrorKind::Type, "return type mismatch");
}
