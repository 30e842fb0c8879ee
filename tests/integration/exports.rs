mod common;
use common::*;

use asmcheck::ast::build::*;
use asmcheck::diagnostics::ErrorKind;
use asmcheck::report::{ExportEntry, Exports};

fn two_functions() -> Vec<S> {
    vec![
        func("f", &["x"], vec![int_param("x"), ret(or0(add(id("x"), int(1))))]),
        func("g", &[], vec![ret(num(0.5))]),
    ]
}

#[test]
fn single_export() {
    let report = validate_ok(&asm_module(two_functions(), id("g")));
    assert!(report.is_single_export());
    assert_eq!(report.get_export(), Some("g"));
    assert!(report.internal_name("g").is_none());
}

#[test]
fn aliased_exports() {
    let m = asm_module(two_functions(), object(vec![("a", id("f")), ("b", id("f")), ("c", id("g"))]));
    let report = validate_ok(&m);
    assert!(!report.is_single_export());
    assert_eq!(report.exported_as("f"), ["a".to_string(), "b".to_string()]);
    assert_eq!(report.get_export_for("f"), Some("a"));
    assert_eq!(report.internal_name("b"), Some("f"));
    assert_eq!(report.internal_name("c"), Some("g"));
}

#[test]
fn export_entries_in_source_order() {
    let m = asm_module(two_functions(), object(vec![("z", id("g")), ("y", id("f"))]));
    let report = validate_ok(&m);
    assert_eq!(
        report.exports(),
        &Exports::Multiple {
            entries: vec![
                ExportEntry { external: "z".into(), internal: "g".into() },
                ExportEntry { external: "y".into(), internal: "f".into() },
            ]
        }
    );
}

#[test]
fn empty_export_object() {
    let report = validate_ok(&asm_module(two_functions(), object(vec![])));
    assert_eq!(report.exports(), &Exports::Multiple { entries: vec![] });
    assert_eq!(report.functions().len(), 2);
}

#[test]
fn export_global_variable() {
    let mut body = vec![var(vec![("counter", int(0))])];
    body.extend(two_functions());
    validate_should_fail(&asm_module(body, id("counter")), ErrorKind::Type, "cannot export 'counter'");
}

#[test]
fn export_import_rejected() {
    let mut body = imports();
    body.extend(two_functions());
    let m = asm_module(body, object(vec![("sqrt", id("sqrt"))]));
    validate_should_fail(&m, ErrorKind::Type, "expected function");
}

#[test]
fn export_of_math_import_rejected() {
    let mut body = imports();
    body.extend(two_functions());
    let m = asm_module(body.clone(), object(vec![("imul", id("imul"))]));
    validate_should_fail(&m, ErrorKind::Type, "cannot export 'imul': not a module function");
    let m = asm_module(body, id("imul"));
    validate_should_fail(&m, ErrorKind::Type, "not a module function");
}

#[test]
fn export_unknown_function() {
    validate_should_fail(&asm_module(two_functions(), id("h")), ErrorKind::Binding, "unbound variable 'h'");
}

#[test]
fn duplicate_external_name() {
    let m = asm_module(two_functions(), object(vec![("a", id("f")), ("a", id("g"))]));
    validate_should_fail(&m, ErrorKind::Structural, "duplicate export name 'a'");
}

#[test]
fn export_expression_rejected() {
    let m = asm_module(two_functions(), object(vec![("a", or0(id("f")))]));
    validate_should_fail(&m, ErrorKind::Structural, "must name a module function");
    let m = asm_module(two_functions(), int(1));
    validate_should_fail(&m, ErrorKind::Structural, "export clause");
}

#[test]
fn report_json() {
    let m = asm_module(two_functions(), object(vec![("inc", id("f"))]));
    let json: serde_json::Value = serde_json::from_str(&validate_ok(&m).to_json().unwrap()).unwrap();
    assert_eq!(json["exports"]["kind"], "multiple");
    assert_eq!(json["exports"]["entries"][0]["internal"], "f");
    assert_eq!(json["functions"]["g"]["result"], "double");
}
