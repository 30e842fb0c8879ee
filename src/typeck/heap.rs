use crate::ast::{BinaryOp, Expr};
use crate::diagnostics::ValidationError;
use crate::span::Spanned;

use super::env::TypeEnv;
use super::infer::infer_expr;
use super::types::{Type, ValueType, View};
use super::check_subtype;

/// Element type of a heap access `view[index]`. The same shapes are valid
/// for loads and for store targets.
pub fn infer_heap_access(expr: &Spanned<Expr>, env: &TypeEnv) -> Result<ValueType, ValidationError> {
    let Expr::Member { object, property, computed: true } = &expr.node else {
        return Err(ValidationError::type_err(
            "expected heap access of the form view[index]",
            expr.span,
        ));
    };
    let name = object.node.as_ident().ok_or_else(|| {
        ValidationError::type_err("heap access must index a view by name", object.span)
    })?;
    let binding = env.resolve(name, object.span)?;
    let Type::View(view) = &binding.ty else {
        return Err(ValidationError::type_err(
            format!("expected view type for '{name}', got {}", binding.ty),
            object.span,
        ));
    };

    check_index(view, property, env)?;
    Ok(view.elem)
}

fn check_index(view: &View, index: &Spanned<Expr>, env: &TypeEnv) -> Result<(), ValidationError> {
    // view[n]
    if let Some(lit) = index.node.as_number() {
        return match lit.as_u32() {
            Some(_) => Ok(()),
            None => Err(ValidationError::type_err(
                "constant heap index must be a non-negative integer literal",
                index.span,
            )),
        };
    }

    // view[addr >> k]
    if let Expr::Binary { operator: BinaryOp::Shr, left, right } = &index.node {
        let shift = right
            .node
            .as_number()
            .and_then(|lit| lit.as_u32())
            .ok_or_else(|| ValidationError::type_err("heap access shift must be an integer literal", right.span))?;
        if shift != view.shift() {
            return Err(ValidationError::type_err(
                format!("expected shift of {} bits for {view}, got {shift}", view.shift()),
                right.span,
            ));
        }
        return check_address(left, env);
    }

    // view[addr], byte views only
    if view.bytes != 1 {
        return Err(ValidationError::type_err(
            format!("expected shift of {} bits for {view}, got an unshifted index", view.shift()),
            index.span,
        ));
    }
    check_address(index, env)
}

/// `addr` or the bounds-checked `addr & mask`.
fn check_address(addr: &Spanned<Expr>, env: &TypeEnv) -> Result<(), ValidationError> {
    if let Expr::Binary { operator: BinaryOp::BitAnd, left, right } = &addr.node {
        if let Some(mask) = right.node.as_number() {
            check_mask(mask.as_u32(), mask.value, right)?;
            return check_subtype(infer_expr(left, env)?, ValueType::Intish, "heap address", left.span);
        }
    }
    check_subtype(infer_expr(addr, env)?, ValueType::Intish, "heap address", addr.span)
}

/// A bounds mask is all binary ones: `2^k - 1`.
fn check_mask(mask: Option<u32>, value: f64, at: &Spanned<Expr>) -> Result<(), ValidationError> {
    match mask {
        Some(mask) if (u64::from(mask) + 1).is_power_of_two() => Ok(()),
        _ => Err(ValidationError::range(
            format!("heap bounds mask must be of the form 2^k-1, got {value}"),
            at.span,
        )),
    }
}
