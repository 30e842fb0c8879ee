pub mod check;
pub mod env;
pub mod exports;
pub mod flow;
pub mod globals;
pub mod heap;
pub mod infer;
pub mod module;
pub mod signature;
pub mod tables;
pub mod types;

use std::collections::BTreeMap;

use crate::ast::Function;
use crate::config::ValidatorConfig;
use crate::diagnostics::ValidationError;
use crate::report::Report;
use crate::span::{Span, Spanned};
use env::{Binding, TypeEnv, check_name};
use types::{Arrow, Type, ValueType};

/// `actual` must be a subtype of `expected`.
pub fn check_subtype(actual: ValueType, expected: ValueType, what: &str, span: Span) -> Result<(), ValidationError> {
    if actual.subtype(expected) {
        Ok(())
    } else {
        Err(ValidationError::type_err(format!("expected {expected} in {what}, got {actual}"), span))
    }
}

/// Apply `callee` to arguments of the given types and return the result.
pub fn check_arguments(args: &[ValueType], callee: &Type, what: &str, span: Span) -> Result<ValueType, ValidationError> {
    match callee {
        Type::Arrow(arrow) => check_arrow_arguments(args, arrow, what, span),
        Type::Overloaded(overloaded) => overloaded.resolve(args).map(|alt| alt.result).ok_or_else(|| {
            let args = args.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            ValidationError::type_err(
                format!("no matching overload for {what} with ({args}); expected {overloaded}"),
                span,
            )
        }),
        other => Err(ValidationError::type_err(format!("{what}: {other} is not callable"), span)),
    }
}

pub fn check_arrow_arguments(args: &[ValueType], arrow: &Arrow, what: &str, span: Span) -> Result<ValueType, ValidationError> {
    if args.len() != arrow.params.len() {
        return Err(ValidationError::type_err(
            format!("{what} expects {} arguments, got {}", arrow.params.len(), args.len()),
            span,
        ));
    }
    for (i, (arg, param)) in args.iter().zip(&arrow.params).enumerate() {
        check_subtype(*arg, *param, &format!("argument {} of {what}", i + 1), span)?;
    }
    Ok(arrow.result)
}

/// Validate a module function and report its functions and exports.
pub fn validate_module(module: &Spanned<Function>, config: ValidatorConfig) -> Result<Report, ValidationError> {
    let sections = module::decompose(module)?;
    if let Some(id) = &module.node.id {
        check_name(&id.node.name, id.span)?;
    }

    let mut env = TypeEnv::new(config);

    // Pass 0: Module parameters, by position
    for (i, param) in module.node.params.iter().enumerate() {
        let name = &param.node.name;
        env.define(name, Binding::immutable(Type::ModuleParameter), param.span)?;
        let slot = match i {
            0 => &mut env.roots.stdlib,
            1 => &mut env.roots.foreign,
            _ => &mut env.roots.heap,
        };
        *slot = Some(name.clone());
    }

    // Pass 1: Globals and imports
    globals::bind_globals(&sections.globals, &mut env)?;

    // Pass 2: Function signatures, so bodies can call forward
    let mut functions = BTreeMap::new();
    for func in &sections.functions {
        let id = func
            .node
            .id
            .as_ref()
            .ok_or_else(|| ValidationError::structural("module functions must be named", func.span))?;
        let arrow = signature::infer_signature(func)?;
        env.define(&id.node.name, Binding::immutable(arrow.clone()), id.span)?;
        functions.insert(id.node.name.clone(), arrow);
    }

    // Pass 3: Function tables
    globals::bind_tables(&sections.tables, &mut env)?;

    // Pass 4: Function bodies
    for func in &sections.functions {
        check::check_function(func, &mut env)?;
    }

    // Pass 5: Export clause
    let exports = exports::resolve_exports(sections.exports, &functions, &env)?;

    tracing::debug!(
        module = module.node.name().unwrap_or("<anonymous>"),
        functions = functions.len(),
        "validated module"
    );
    Ok(Report::new(functions, exports))
}
