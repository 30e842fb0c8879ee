use asmcheck::ast::Program;
use asmcheck::config::ValidatorConfig;
use asmcheck::diagnostics::ErrorKind;
use asmcheck::span::{Position, Span};
use asmcheck::typeck::types::{Arrow, ValueType};
use asmcheck::{validate_estree_json, validate_program};

const ADD_JSON: &str = include_str!("../fixtures/add.json");
const ADD_UNCOERCED_JSON: &str = include_str!("../fixtures/add_uncoerced.json");
const ADD_UNCOERCED_JS: &str = include_str!("../fixtures/add_uncoerced.js");

#[test]
fn estree_module_validates() {
    let report = validate_estree_json(ADD_JSON, ValidatorConfig::default()).unwrap();
    assert_eq!(
        report.get_function("add"),
        Some(&Arrow::new(vec![ValueType::Int, ValueType::Int], ValueType::Signed))
    );
    assert_eq!(report.get_export(), Some("add"));
}

#[test]
fn estree_locations_are_kept() {
    let program = Program::from_json(ADD_JSON).unwrap();
    let span = program.body[0].span;
    assert_eq!(span.start, Position::new(1, 0));
    assert_eq!(span.end, Position::new(9, 1));
}

#[test]
fn error_points_at_return_statement() {
    let err = validate_estree_json(ADD_UNCOERCED_JSON, ValidatorConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.span(), Some(Span::line(6, 8, 19)));
    assert_eq!(err.excerpt(ADD_UNCOERCED_JS).unwrap(), "        return x+y;\n        ^");
}

#[test]
fn rendered_error_names_file() {
    let err = validate_estree_json(ADD_UNCOERCED_JSON, ValidatorConfig::default()).unwrap_err();
    let rendered = err.render(ADD_UNCOERCED_JS, "add_uncoerced.js");
    assert!(rendered.contains("add_uncoerced.js"), "{rendered}");
    assert!(rendered.contains("return value must be coerced"), "{rendered}");
}

#[test]
fn malformed_json_is_input_error() {
    let err = validate_estree_json("{\"type\": \"Program\", \"body\": [", ValidatorConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.span().is_none());
}

#[test]
fn program_must_hold_one_function() {
    let json = r#"{"type": "Program", "body": []}"#;
    let err = validate_estree_json(json, ValidatorConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.message().contains("got 0 statements"));

    let json = r#"{"type": "Program", "body": [{"type": "EmptyStatement"}]}"#;
    let err = validate_estree_json(json, ValidatorConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
}

#[test]
fn parenthesized_function_expression() {
    let mut program = Program::from_json(ADD_JSON).unwrap();
    let decl = program.body.remove(0);
    let asmcheck::ast::Stmt::Function(func) = decl.node else {
        panic!("expected function declaration");
    };
    let wrapped = format!(
        r#"{{"type": "Program", "body": [{{"type": "ExpressionStatement", "expression": {}}}]}}"#,
        serde_json::json!({
            "type": "FunctionExpression",
            "id": null,
            "params": func.params,
            "body": func.body,
        })
    );
    let report = validate_program(&Program::from_json(&wrapped).unwrap(), ValidatorConfig::default()).unwrap();
    assert_eq!(report.get_export(), Some("add"));
}

#[test]
fn unknown_node_kind_is_unsupported() {
    let json = ADD_JSON.replacen("\"ReturnStatement\"", "\"ThrowStatement\"", 1);
    let err = validate_estree_json(&json, ValidatorConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

/// ESTree for `function M(stdlib) { "use asm"; function f(x) { x = x|0;
/// return (x+x+...+x)|0; } return f; }` with `operands` additive operands.
fn long_chain_module(operands: usize) -> String {
    let x = r#"{"type": "Identifier", "name": "x"}"#;
    let mut chain = x.to_string();
    for _ in 1..operands {
        chain = format!(r#"{{"type": "BinaryExpression", "operator": "+", "left": {chain}, "right": {x}}}"#);
    }
    let zero = r#"{"type": "Literal", "value": 0, "raw": "0"}"#;
    let annotation = format!(
        r#"{{"type": "ExpressionStatement", "expression": {{"type": "AssignmentExpression", "operator": "=", "left": {x}, "right": {{"type": "BinaryExpression", "operator": "|", "left": {x}, "right": {zero}}}}}}}"#
    );
    let ret = format!(
        r#"{{"type": "ReturnStatement", "argument": {{"type": "BinaryExpression", "operator": "|", "left": {chain}, "right": {zero}}}}}"#
    );
    format!(
        r#"{{"type": "Program", "body": [{{"type": "FunctionDeclaration", "id": {{"type": "Identifier", "name": "M"}},
        "params": [{{"type": "Identifier", "name": "stdlib"}}],
        "body": {{"type": "BlockStatement", "body": [
            {{"type": "ExpressionStatement", "expression": {{"type": "Literal", "value": "use asm", "raw": "\"use asm\""}}}},
            {{"type": "FunctionDeclaration", "id": {{"type": "Identifier", "name": "f"}}, "params": [{x}],
              "body": {{"type": "BlockStatement", "body": [{annotation}, {ret}]}}}},
            {{"type": "ReturnStatement", "argument": {{"type": "Identifier", "name": "f"}}}}
        ]}}}}]}}"#
    )
}

#[test]
fn deeply_nested_additive_chain() {
    let report = validate_estree_json(&long_chain_module(200), ValidatorConfig::default()).unwrap();
    assert_eq!(report.get_function("f"), Some(&Arrow::new(vec![ValueType::Int], ValueType::Signed)));
}

#[test]
fn very_deep_chain_decodes() {
    let report = validate_estree_json(&long_chain_module(2000), ValidatorConfig::default()).unwrap();
    assert_eq!(report.get_export(), Some("f"));
}

#[test]
fn deep_chain_still_bounded_by_config() {
    let config = ValidatorConfig { max_additive_operands: 100, ..ValidatorConfig::default() };
    let err = validate_estree_json(&long_chain_module(200), config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(err.message().contains("200 > maximum 100"));
}
