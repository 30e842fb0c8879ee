use crate::ast::{AssignOp, BinaryOp, Expr, Function, Stmt, UnaryOp};
use crate::diagnostics::ValidationError;
use crate::span::{Span, Spanned};

use super::types::{Arrow, ValueType};

/// Parameter and return types of `func`, read off its coercion idioms.
pub fn infer_signature(func: &Spanned<&Function>) -> Result<Arrow, ValidationError> {
    let name = func.node.name().unwrap_or("<anonymous>");
    let body = func.node.statements();
    let params = &func.node.params;
    if body.len() < params.len() {
        return Err(ValidationError::type_err(
            format!("not enough annotations for parameters of '{name}'"),
            func.span,
        ));
    }

    let param_types = params
        .iter()
        .zip(&body)
        .map(|(param, stmt)| param_type(&param.node.name, stmt))
        .collect::<Result<Vec<_>, _>>()?;

    let mut result: Option<(ValueType, Span)> = None;
    for_each_return(&func.node.body.node.body, &mut |argument: Option<&Spanned<Expr>>, span: Span| {
        let ty = return_type(argument, span)?;
        result = Some(match result {
            None => (ty, span),
            Some((prev, prev_span)) => {
                // Narrower wins.
                if ty.subtype(prev) {
                    (ty, span)
                } else if prev.subtype(ty) {
                    (prev, prev_span)
                } else {
                    return Err(ValidationError::type_err(
                        format!("return type mismatch in '{name}': {prev} and {ty}"),
                        span,
                    ));
                }
            }
        });
        Ok(())
    })?;

    let arrow = Arrow::new(param_types, result.map_or(ValueType::Void, |(ty, _)| ty));
    tracing::debug!(function = name, signature = %arrow, "inferred signature");
    Ok(arrow)
}

/// Type fixed by the annotation statement `p = p|0`, `p = p>>>0` or `p = +p`.
pub fn param_type(param: &str, stmt: &Spanned<Stmt>) -> Result<ValueType, ValidationError> {
    let malformed = || {
        ValidationError::type_err(
            format!("missing or malformed annotation for parameter '{param}'"),
            stmt.span,
        )
    };
    let Stmt::Expression { expression } = &stmt.node else {
        return Err(malformed());
    };
    let Expr::Assign { operator: AssignOp::Assign, left, right } = &expression.node else {
        return Err(malformed());
    };
    if left.node.as_ident() != Some(param) {
        return Err(malformed());
    }
    match &right.node {
        Expr::Binary { operator: BinaryOp::BitOr, left, right }
            if left.node.as_ident() == Some(param) && right.node.is_int_literal(0.0) =>
        {
            Ok(ValueType::Int)
        }
        Expr::Binary { operator: BinaryOp::UShr, left, right }
            if left.node.as_ident() == Some(param) && right.node.is_int_literal(0.0) =>
        {
            Ok(ValueType::Unsigned)
        }
        Expr::Unary { operator: UnaryOp::Plus, argument } if argument.node.as_ident() == Some(param) => {
            Ok(ValueType::Double)
        }
        _ => Err(malformed()),
    }
}

/// Type announced by a `return` argument's coercion.
pub fn return_type(argument: Option<&Spanned<Expr>>, span: Span) -> Result<ValueType, ValidationError> {
    let Some(argument) = argument else {
        return Ok(ValueType::Void);
    };
    if let Some(lit) = argument.node.as_number() {
        if lit.is_double {
            return Ok(ValueType::Double);
        }
        if lit.is_int_in_range() {
            return Ok(ValueType::Signed);
        }
        return Err(ValidationError::range(
            format!("integer literal {} out of range", lit.value),
            argument.span,
        ));
    }
    match &argument.node {
        Expr::Binary { operator: BinaryOp::BitOr, right, .. } if right.node.is_int_literal(0.0) => {
            Ok(ValueType::Signed)
        }
        Expr::Binary { operator: BinaryOp::UShr, right, .. } if right.node.is_int_literal(0.0) => {
            Ok(ValueType::Unsigned)
        }
        Expr::Unary { operator: UnaryOp::Plus, .. } => Ok(ValueType::Double),
        _ => Err(ValidationError::type_err(
            "return value must be coerced with |0, >>>0 or unary +, or be a numeric literal",
            span,
        )),
    }
}

/// Visit every `return` in `stmts`, at any nesting depth.
fn for_each_return<F>(stmts: &[Spanned<Stmt>], f: &mut F) -> Result<(), ValidationError>
where
    F: FnMut(Option<&Spanned<Expr>>, Span) -> Result<(), ValidationError>,
{
    for stmt in stmts {
        visit_returns(stmt, f)?;
    }
    Ok(())
}

fn visit_returns<F>(stmt: &Spanned<Stmt>, f: &mut F) -> Result<(), ValidationError>
where
    F: FnMut(Option<&Spanned<Expr>>, Span) -> Result<(), ValidationError>,
{
    match &stmt.node {
        Stmt::Return { argument } => f(argument.as_deref(), stmt.span),
        Stmt::Block(block) => for_each_return(&block.body, f),
        Stmt::If { consequent, alternate, .. } => {
            visit_returns(consequent, f)?;
            match alternate {
                Some(alternate) => visit_returns(alternate, f),
                None => Ok(()),
            }
        }
        Stmt::Labeled { body, .. }
        | Stmt::While { body, .. }
        | Stmt::DoWhile { body, .. }
        | Stmt::For { body, .. } => visit_returns(body, f),
        Stmt::Switch { cases, .. } => {
            for case in cases {
                for_each_return(&case.node.consequent, f)?;
            }
            Ok(())
        }
        Stmt::Empty
        | Stmt::Expression { .. }
        | Stmt::Break { .. }
        | Stmt::Continue { .. }
        | Stmt::Var(_)
        | Stmt::Function(_)
        | Stmt::Unsupported => Ok(()),
    }
}
