use crate::ast::{AssignOp, BinaryOp, Expr, NumLit, UnaryOp};
use crate::diagnostics::ValidationError;
use crate::span::{Span, Spanned};

use super::env::TypeEnv;
use super::heap::infer_heap_access;
use super::tables;
use super::types::{Type, ValueType};
use super::{check_arguments, check_arrow_arguments, check_subtype};

/// Type of a numeric literal used as an expression.
pub fn infer_number(lit: NumLit, span: Span) -> Result<ValueType, ValidationError> {
    if lit.is_double {
        Ok(ValueType::Double)
    } else if lit.is_int_in_range() {
        Ok(ValueType::Fixnum)
    } else {
        Err(ValidationError::range(format!("integer literal {} out of range", lit.value), span))
    }
}

pub fn infer_expr(expr: &Spanned<Expr>, env: &TypeEnv) -> Result<ValueType, ValidationError> {
    stacker::maybe_grow(64 * 1024, 2 * 1024 * 1024, || infer_expr_inner(expr, env))
}

fn infer_expr_inner(expr: &Spanned<Expr>, env: &TypeEnv) -> Result<ValueType, ValidationError> {
    if let Some(lit) = expr.node.as_number() {
        return infer_number(lit, expr.span);
    }
    match &expr.node {
        Expr::Literal { .. } => Err(ValidationError::type_err(
            "only numeric literals are allowed in expressions",
            expr.span,
        )),
        Expr::Identifier(id) => env.resolve_value(&id.name, expr.span),
        Expr::Assign { operator, left, right } => infer_assign(expr, *operator, left, right, env),
        Expr::Member { .. } => infer_heap_access(expr, env),
        Expr::Conditional { test, consequent, alternate } => {
            check_subtype(infer_expr(test, env)?, ValueType::Boolish, "conditional test", test.span)?;
            let cons = infer_expr(consequent, env)?;
            let alt = infer_expr(alternate, env)?;
            if cons.subtype(ValueType::Int) && alt.subtype(ValueType::Int) {
                Ok(ValueType::Int)
            } else if cons.subtype(ValueType::Double) && alt.subtype(ValueType::Double) {
                Ok(ValueType::Double)
            } else {
                Err(ValidationError::type_err(
                    format!("type mismatch between conditional branches: {cons} and {alt}"),
                    expr.span,
                ))
            }
        }
        Expr::Sequence { expressions } => {
            let (last, init) = expressions
                .split_last()
                .ok_or_else(|| ValidationError::type_err("empty sequence expression", expr.span))?;
            for e in init {
                infer_effect(e, env)?;
            }
            infer_expr(last, env)
        }
        Expr::Unary { operator, argument } => infer_unary(expr, *operator, argument, env),
        Expr::Binary { operator, left, right } => infer_binary(expr, *operator, left, right, env),
        Expr::Call { .. } => Err(ValidationError::type_err(
            "function call must be coerced: use f(...)|0, +f(...) or a call statement",
            expr.span,
        )),
        Expr::New { .. } | Expr::Array { .. } | Expr::Object { .. } | Expr::Function(_) => {
            Err(ValidationError::unsupported(
                format!("{} is not allowed in a function body", expr.node.kind_name()),
                expr.span,
            ))
        }
        Expr::Unsupported => Err(ValidationError::unsupported("expression kind outside asm.js", expr.span)),
    }
}

/// An expression evaluated for its effect: a call statement or a
/// non-final element of a comma expression.
pub fn infer_effect(expr: &Spanned<Expr>, env: &TypeEnv) -> Result<ValueType, ValidationError> {
    if expr.node.is_call() {
        check_call(expr, ValueType::Void, env)
    } else {
        infer_expr(expr, env)
    }
}

fn infer_assign(
    expr: &Spanned<Expr>,
    operator: AssignOp,
    left: &Spanned<Expr>,
    right: &Spanned<Expr>,
    env: &TypeEnv,
) -> Result<ValueType, ValidationError> {
    if operator != AssignOp::Assign {
        return Err(ValidationError::unsupported(
            format!("compound assignment '{operator}'"),
            expr.span,
        ));
    }
    let target = match &left.node {
        Expr::Identifier(id) => {
            let binding = env.resolve(&id.name, left.span)?;
            if !binding.mutable {
                return Err(ValidationError::type_err(
                    format!("cannot assign to immutable binding '{}'", id.name),
                    left.span,
                ));
            }
            env.resolve_value(&id.name, left.span)?
        }
        Expr::Member { .. } => infer_heap_access(left, env)?,
        _ => {
            return Err(ValidationError::type_err("invalid assignment target", left.span));
        }
    };
    let value = infer_expr(right, env)?;
    check_subtype(value, target, "assignment", expr.span)?;
    Ok(value)
}

fn infer_unary(
    expr: &Spanned<Expr>,
    operator: UnaryOp,
    argument: &Spanned<Expr>,
    env: &TypeEnv,
) -> Result<ValueType, ValidationError> {
    match (operator, &argument.node) {
        // ~~e
        (UnaryOp::BitNot, Expr::Unary { operator: UnaryOp::BitNot, argument: inner }) => {
            check_subtype(infer_expr(inner, env)?, ValueType::Double, "double->signed coercion", inner.span)?;
            Ok(ValueType::Signed)
        }
        // +f(...)
        (UnaryOp::Plus, Expr::Call { .. }) => {
            check_call(argument, ValueType::Double, env)?;
            Ok(ValueType::Double)
        }
        _ => {
            let sig = tables::unary(operator).ok_or_else(|| {
                ValidationError::unsupported(format!("unary operator '{operator}'"), expr.span)
            })?;
            let arg = infer_expr(argument, env)?;
            check_arguments(&[arg], &Type::Overloaded(sig), &format!("operator {operator}"), expr.span)
        }
    }
}

fn infer_binary(
    expr: &Spanned<Expr>,
    operator: BinaryOp,
    left: &Spanned<Expr>,
    right: &Spanned<Expr>,
    env: &TypeEnv,
) -> Result<ValueType, ValidationError> {
    match operator {
        // f(...)|0
        BinaryOp::BitOr if left.node.is_call() && right.node.is_int_literal(0.0) => {
            check_call(left, ValueType::Signed, env)?;
            Ok(ValueType::Signed)
        }
        BinaryOp::Add | BinaryOp::Sub => {
            let operands = flatten_additive(expr);
            if operands.len() > 2 {
                return infer_additive_chain(expr, &operands, env);
            }
            resolve_binary(expr, operator, left, right, env)
        }
        _ => resolve_binary(expr, operator, left, right, env),
    }
}

fn resolve_binary(
    expr: &Spanned<Expr>,
    operator: BinaryOp,
    left: &Spanned<Expr>,
    right: &Spanned<Expr>,
    env: &TypeEnv,
) -> Result<ValueType, ValidationError> {
    let sig = tables::binary(operator).ok_or_else(|| {
        ValidationError::unsupported(format!("binary operator '{operator}'"), expr.span)
    })?;
    let args = [infer_expr(left, env)?, infer_expr(right, env)?];
    check_arguments(&args, &Type::Overloaded(sig), &format!("operator {operator}"), expr.span)
}

/// Operands of a `+`/`-` chain, left to right.
fn flatten_additive(expr: &Spanned<Expr>) -> Vec<&Spanned<Expr>> {
    let mut operands = Vec::new();
    let mut todo = vec![expr];
    while let Some(e) = todo.pop() {
        match &e.node {
            Expr::Binary { operator: BinaryOp::Add | BinaryOp::Sub, left, right } => {
                todo.push(right);
                todo.push(left);
            }
            _ => operands.push(e),
        }
    }
    operands
}

/// A chain of three or more additive operands: all doubles, or a bounded
/// number of ints yielding intish.
fn infer_additive_chain(
    expr: &Spanned<Expr>,
    operands: &[&Spanned<Expr>],
    env: &TypeEnv,
) -> Result<ValueType, ValidationError> {
    let (first, rest) = operands
        .split_first()
        .ok_or_else(|| ValidationError::internal("empty additive chain"))?;
    let head = infer_expr(first, env)?;
    let (expected, result) = if head.subtype(ValueType::Double) {
        (ValueType::Double, ValueType::Double)
    } else if head.subtype(ValueType::Int) {
        let max = env.config.max_additive_operands;
        if operands.len() > max {
            return Err(ValidationError::range(
                format!(
                    "too many additive operations without coercion: {} > maximum {max}",
                    operands.len()
                ),
                expr.span,
            ));
        }
        (ValueType::Int, ValueType::Intish)
    } else {
        return Err(ValidationError::type_err(
            format!("expected int or double in additive operand, got {head}"),
            first.span,
        ));
    };
    for operand in rest {
        check_subtype(infer_expr(operand, env)?, expected, "additive operand", operand.span)?;
    }
    Ok(result)
}

/// Check a call whose result is consumed in `context`: `Void` for call
/// statements, `Signed` under `|0`, `Double` under unary `+`. Returns the
/// callee's declared result.
pub fn check_call(call: &Spanned<Expr>, context: ValueType, env: &TypeEnv) -> Result<ValueType, ValidationError> {
    let Expr::Call { callee, arguments } = &call.node else {
        return Err(ValidationError::internal(format!(
            "expected call expression, got {}",
            call.node.kind_name()
        )));
    };

    let result = match &callee.node {
        Expr::Identifier(id) => {
            let binding = env.resolve(&id.name, callee.span)?;
            if binding.ty == Type::Function {
                // Foreign functions: any number of extern arguments, result
                // fixed by the coercion at the call site.
                for arg in arguments {
                    let what = format!("argument to foreign function '{}'", id.name);
                    check_subtype(infer_expr(arg, env)?, ValueType::Extern, &what, arg.span)?;
                }
                return Ok(context);
            }
            let args = infer_arguments(arguments, env)?;
            check_arguments(&args, &binding.ty, &format!("call to '{}'", id.name), call.span)?
        }
        Expr::Member { object, property, computed: true } => {
            check_indirect_call(call.span, object, property, arguments, env)?
        }
        _ => {
            return Err(ValidationError::type_err(
                "callee must be a function name or a masked function table access",
                callee.span,
            ));
        }
    };

    check_call_result(result, context, call.span)?;
    Ok(result)
}

/// `table[index & mask](args)`
fn check_indirect_call(
    span: Span,
    object: &Spanned<Expr>,
    property: &Spanned<Expr>,
    arguments: &[Spanned<Expr>],
    env: &TypeEnv,
) -> Result<ValueType, ValidationError> {
    let name = object.node.as_ident().ok_or_else(|| {
        ValidationError::type_err("function table must be named directly", object.span)
    })?;
    let binding = env.resolve(name, object.span)?;
    let Type::Table(table) = &binding.ty else {
        return Err(ValidationError::type_err(
            format!("expected function table for '{name}', got {}", binding.ty),
            object.span,
        ));
    };
    let Expr::Binary { operator: BinaryOp::BitAnd, left: index, right: mask } = &property.node else {
        return Err(ValidationError::type_err(
            format!("function table index must be masked: {name}[index & {}]", table.length - 1),
            property.span,
        ));
    };
    check_subtype(infer_expr(index, env)?, ValueType::Intish, "function table index", index.span)?;
    let mask_value = mask
        .node
        .as_number()
        .and_then(|lit| lit.as_u32())
        .ok_or_else(|| ValidationError::type_err("function table mask must be an integer literal", mask.span))?;
    if u64::from(mask_value) + 1 != u64::from(table.length) {
        return Err(ValidationError::type_err(
            format!("function table mask should be {}, got {mask_value}", table.length - 1),
            mask.span,
        ));
    }
    let args = infer_arguments(arguments, env)?;
    check_arrow_arguments(&args, &table.arrow, &format!("call through table '{name}'"), span)
}

fn infer_arguments(arguments: &[Spanned<Expr>], env: &TypeEnv) -> Result<Vec<ValueType>, ValidationError> {
    arguments.iter().map(|arg| infer_expr(arg, env)).collect()
}

fn check_call_result(result: ValueType, context: ValueType, span: Span) -> Result<(), ValidationError> {
    let (ok, what) = match context {
        ValueType::Void => (result == ValueType::Void, "call statement"),
        ValueType::Signed => (result.subtype(ValueType::Intish), "signed-coerced call"),
        ValueType::Double => (result.subtype(ValueType::Doublish), "double-coerced call"),
        other => {
            return Err(ValidationError::internal(format!("unexpected call context {other}")));
        }
    };
    if ok {
        Ok(())
    } else {
        let expected = match context {
            ValueType::Void => ValueType::Void,
            ValueType::Signed => ValueType::Intish,
            _ => ValueType::Doublish,
        };
        Err(ValidationError::type_err(
            format!("expected {expected} result in {what}, got {result}"),
            span,
        ))
    }
}
