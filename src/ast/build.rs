//! Constructors for building syntax trees in code.
//!
//! Nodes built here carry dummy spans. They mirror what an ESTree parser
//! produces for the same source, including the `raw` text of literals.

use super::*;
use crate::span::{Span, Spanned};

pub type E = Spanned<Expr>;
pub type S = Spanned<Stmt>;

pub fn ident(name: &str) -> Spanned<Ident> {
    Spanned::dummy(Ident { name: name.to_string() })
}

pub fn id(name: &str) -> E {
    Spanned::dummy(Expr::Identifier(Ident { name: name.to_string() }))
}

/// Integer literal, written without a decimal point.
pub fn int(n: i64) -> E {
    Spanned::dummy(Expr::Literal {
        value: LitValue::Number(n as f64),
        raw: Some(n.to_string()),
    })
}

/// Decimal literal, always written with a decimal point.
pub fn num(x: f64) -> E {
    let raw = if x.fract() == 0.0 { format!("{x:.1}") } else { x.to_string() };
    Spanned::dummy(Expr::Literal { value: LitValue::Number(x), raw: Some(raw) })
}

pub fn string(s: &str) -> E {
    Spanned::dummy(Expr::Literal {
        value: LitValue::String(s.to_string()),
        raw: Some(format!("{s:?}")),
    })
}

pub fn bin(operator: BinaryOp, left: E, right: E) -> E {
    Spanned::dummy(Expr::Binary { operator, left: Box::new(left), right: Box::new(right) })
}

pub fn add(left: E, right: E) -> E {
    bin(BinaryOp::Add, left, right)
}

pub fn sub(left: E, right: E) -> E {
    bin(BinaryOp::Sub, left, right)
}

/// `e|0`
pub fn or0(e: E) -> E {
    bin(BinaryOp::BitOr, e, int(0))
}

/// `e>>>0`
pub fn ushr0(e: E) -> E {
    bin(BinaryOp::UShr, e, int(0))
}

pub fn unary(operator: UnaryOp, argument: E) -> E {
    Spanned::dummy(Expr::Unary { operator, argument: Box::new(argument) })
}

/// `+e`
pub fn plus(e: E) -> E {
    unary(UnaryOp::Plus, e)
}

pub fn neg(e: E) -> E {
    unary(UnaryOp::Minus, e)
}

/// `~~e`
pub fn tilde2(e: E) -> E {
    unary(UnaryOp::BitNot, unary(UnaryOp::BitNot, e))
}

pub fn assign(left: E, right: E) -> E {
    Spanned::dummy(Expr::Assign {
        operator: AssignOp::Assign,
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// `object.property`
pub fn dot(object: E, property: &str) -> E {
    Spanned::dummy(Expr::Member {
        object: Box::new(object),
        property: Box::new(id(property)),
        computed: false,
    })
}

/// `object[index]`
pub fn index(object: E, index: E) -> E {
    Spanned::dummy(Expr::Member {
        object: Box::new(object),
        property: Box::new(index),
        computed: true,
    })
}

pub fn call(callee: E, arguments: Vec<E>) -> E {
    Spanned::dummy(Expr::Call { callee: Box::new(callee), arguments })
}

pub fn new_(callee: E, arguments: Vec<E>) -> E {
    Spanned::dummy(Expr::New { callee: Box::new(callee), arguments })
}

pub fn cond(test: E, consequent: E, alternate: E) -> E {
    Spanned::dummy(Expr::Conditional {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
    })
}

pub fn seq(expressions: Vec<E>) -> E {
    Spanned::dummy(Expr::Sequence { expressions })
}

pub fn array(elements: Vec<E>) -> E {
    Spanned::dummy(Expr::Array { elements: elements.into_iter().map(Some).collect() })
}

pub fn object(properties: Vec<(&str, E)>) -> E {
    let properties = properties
        .into_iter()
        .map(|(key, value)| {
            Spanned::dummy(Property {
                key: Box::new(id(key)),
                value: Box::new(value),
                kind: PropertyKind::Init,
            })
        })
        .collect();
    Spanned::dummy(Expr::Object { properties })
}

pub fn empty() -> S {
    Spanned::dummy(Stmt::Empty)
}

pub fn expr_stmt(e: E) -> S {
    Spanned::dummy(Stmt::Expression { expression: Box::new(e) })
}

/// `"use asm";`
pub fn use_asm() -> S {
    expr_stmt(string("use asm"))
}

pub fn ret(e: E) -> S {
    Spanned::dummy(Stmt::Return { argument: Some(Box::new(e)) })
}

pub fn ret_void() -> S {
    Spanned::dummy(Stmt::Return { argument: None })
}

pub fn var(declarations: Vec<(&str, E)>) -> S {
    Spanned::dummy(Stmt::Var(var_decl(declarations)))
}

pub fn var_decl(declarations: Vec<(&str, E)>) -> VarDecl {
    VarDecl {
        declarations: declarations
            .into_iter()
            .map(|(name, init)| {
                Spanned::dummy(VarDeclarator { id: ident(name), init: Some(Box::new(init)) })
            })
            .collect(),
        kind: "var".to_string(),
    }
}

pub fn block(body: Vec<S>) -> S {
    Spanned::dummy(Stmt::Block(Block { body }))
}

pub fn if_(test: E, consequent: S, alternate: Option<S>) -> S {
    Spanned::dummy(Stmt::If {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: alternate.map(Box::new),
    })
}

pub fn while_(test: E, body: S) -> S {
    Spanned::dummy(Stmt::While { test: Box::new(test), body: Box::new(body) })
}

pub fn do_while(body: S, test: E) -> S {
    Spanned::dummy(Stmt::DoWhile { body: Box::new(body), test: Box::new(test) })
}

/// `for (init; test; update) body` with an expression init.
pub fn for_(init: Option<E>, test: Option<E>, update: Option<E>, body: S) -> S {
    Spanned::dummy(Stmt::For {
        init: init.map(|e| Box::new(ForInit::Expr(e))),
        test: test.map(Box::new),
        update: update.map(Box::new),
        body: Box::new(body),
    })
}

/// `for (var ...; test; update) body`, which the validator rejects.
pub fn for_var(decl: VarDecl, test: Option<E>, update: Option<E>, body: S) -> S {
    Spanned::dummy(Stmt::For {
        init: Some(Box::new(ForInit::Decl(Spanned::dummy(DeclNode::Var(decl))))),
        test: test.map(Box::new),
        update: update.map(Box::new),
        body: Box::new(body),
    })
}

pub fn labeled(label: &str, body: S) -> S {
    Spanned::dummy(Stmt::Labeled { label: ident(label), body: Box::new(body) })
}

pub fn break_(label: Option<&str>) -> S {
    Spanned::dummy(Stmt::Break { label: label.map(ident) })
}

pub fn continue_(label: Option<&str>) -> S {
    Spanned::dummy(Stmt::Continue { label: label.map(ident) })
}

/// `switch (disc) { ... }`; a `None` test is the `default:` clause.
pub fn switch(discriminant: E, cases: Vec<(Option<E>, Vec<S>)>) -> S {
    Spanned::dummy(Stmt::Switch {
        discriminant: Box::new(discriminant),
        cases: cases
            .into_iter()
            .map(|(test, consequent)| {
                Spanned::dummy(SwitchCase { test: test.map(Box::new), consequent })
            })
            .collect(),
    })
}

pub fn function(name: &str, params: &[&str], body: Vec<S>) -> Function {
    Function {
        id: Some(ident(name)),
        params: params.iter().map(|p| ident(p)).collect(),
        body: Spanned::dummy(Block { body }),
    }
}

/// `function name(params) { body }` as a declaration statement.
pub fn func(name: &str, params: &[&str], body: Vec<S>) -> S {
    Spanned::dummy(Stmt::Function(function(name, params, body)))
}

/// A module function expression: `function name(params) { "use asm"; ... }`.
/// The directive is not added implicitly.
pub fn module(name: &str, params: &[&str], body: Vec<S>) -> Spanned<Function> {
    Spanned::dummy(function(name, params, body))
}

/// Attach a span to a node built here.
pub fn at<T>(node: Spanned<T>, span: Span) -> Spanned<T> {
    Spanned::new(node.node, span)
}
