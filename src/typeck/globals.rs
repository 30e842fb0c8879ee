use crate::ast::{BinaryOp, Expr, UnaryOp, VarDecl, VarDeclarator};
use crate::diagnostics::ValidationError;
use crate::span::Spanned;

use super::env::{Binding, TypeEnv};
use super::tables;
use super::types::{Table, Type, ValueType};

/// `object.property` with a plain identifier property.
fn dotted(expr: &Expr) -> Option<(&Expr, &str)> {
    match expr {
        Expr::Member { object, property, computed: false } => {
            Some((&object.node, property.node.as_ident()?))
        }
        _ => None,
    }
}

fn is_root(expr: &Expr, root: Option<&str>) -> bool {
    root.is_some() && expr.as_ident() == root
}

/// `foreign.<name>`
fn foreign_import<'a>(expr: &'a Expr, env: &TypeEnv) -> Option<&'a str> {
    let (object, name) = dotted(expr)?;
    is_root(object, env.roots.foreign.as_deref()).then_some(name)
}

/// Bind every declarator of the module's global `var` section.
pub fn bind_globals(decls: &[Spanned<&VarDecl>], env: &mut TypeEnv) -> Result<(), ValidationError> {
    for decl in decls {
        for declarator in &decl.node.declarations {
            let binding = infer_global(declarator, env)?;
            let id = &declarator.node.id;
            env.define(&id.node.name, binding, id.span)?;
        }
    }
    Ok(())
}

/// Classify a global initializer by shape.
pub fn infer_global(decl: &Spanned<VarDeclarator>, env: &TypeEnv) -> Result<Binding, ValidationError> {
    let name = &decl.node.id.node.name;
    let init = decl.node.init.as_ref().ok_or_else(|| {
        ValidationError::type_err(format!("global variable '{name}' missing initializer"), decl.span)
    })?;
    let span = init.span;

    if let Some(lit) = init.node.as_number() {
        if lit.is_double {
            return Ok(Binding::mutable(ValueType::Double));
        }
        if lit.is_int_in_range() {
            return Ok(Binding::mutable(ValueType::Int));
        }
        return Err(ValidationError::range(
            format!("integer literal {} out of range for global '{name}'", lit.value),
            span,
        ));
    }

    match &init.node {
        // stdlib.Math.<name>, stdlib.<name>, foreign.<name>
        Expr::Member { .. } => {
            if let Some((object, member)) = dotted(&init.node) {
                if let Some((root, "Math")) = dotted(object) {
                    if is_root(root, env.roots.stdlib.as_deref()) {
                        return tables::math(member).map(Binding::immutable).ok_or_else(|| {
                            ValidationError::type_err(format!("unknown Math member '{member}'"), span)
                        });
                    }
                }
                if is_root(object, env.roots.stdlib.as_deref()) {
                    return tables::stdlib_constant(member).map(Binding::immutable).ok_or_else(|| {
                        ValidationError::type_err(format!("unknown stdlib member '{member}'"), span)
                    });
                }
                if is_root(object, env.roots.foreign.as_deref()) {
                    return Ok(Binding::immutable(Type::Function));
                }
            }
        }
        // foreign.<name>|0
        Expr::Binary { operator: BinaryOp::BitOr, left, right }
            if right.node.is_int_literal(0.0) && foreign_import(&left.node, env).is_some() =>
        {
            return Ok(Binding::immutable(ValueType::Int));
        }
        // +foreign.<name>
        Expr::Unary { operator: UnaryOp::Plus, argument } if foreign_import(&argument.node, env).is_some() => {
            return Ok(Binding::immutable(ValueType::Double));
        }
        // new stdlib.<View>(heap)
        Expr::New { callee, arguments } => {
            if let Some((object, ctor)) = dotted(&callee.node) {
                if is_root(object, env.roots.stdlib.as_deref()) {
                    let view = tables::view_constructor(ctor).ok_or_else(|| {
                        ValidationError::type_err(format!("unknown heap view constructor '{ctor}'"), callee.span)
                    })?;
                    return match arguments.as_slice() {
                        [arg] if is_root(&arg.node, env.roots.heap.as_deref()) => {
                            Ok(Binding::immutable(Type::View(view)))
                        }
                        _ => Err(ValidationError::type_err(
                            format!("heap view '{name}' must be constructed from the heap parameter"),
                            span,
                        )),
                    };
                }
            }
        }
        _ => {}
    }

    Err(ValidationError::type_err(format!("invalid global initializer for '{name}'"), span))
}

/// Bind every declarator of the function-table section.
pub fn bind_tables(decls: &[Spanned<&VarDecl>], env: &mut TypeEnv) -> Result<(), ValidationError> {
    for decl in decls {
        for declarator in &decl.node.declarations {
            let table = infer_table(declarator, env)?;
            let id = &declarator.node.id;
            tracing::trace!(table = %id.node.name, length = table.length, "function table");
            env.define(&id.node.name, Binding::immutable(Type::Table(table)), id.span)?;
        }
    }
    Ok(())
}

/// A function table: a non-empty, power-of-two array of functions that all
/// share one signature.
pub fn infer_table(decl: &Spanned<VarDeclarator>, env: &TypeEnv) -> Result<Table, ValidationError> {
    let name = &decl.node.id.node.name;
    let init = decl.node.init.as_ref().ok_or_else(|| {
        ValidationError::type_err(format!("function table '{name}' missing initializer"), decl.span)
    })?;
    let Expr::Array { elements } = &init.node else {
        return Err(ValidationError::type_err(
            format!("function table '{name}' must be an array literal of functions"),
            init.span,
        ));
    };

    let mut arrow = None;
    for element in elements {
        let element = element.as_ref().ok_or_else(|| {
            ValidationError::type_err(format!("hole in function table '{name}'"), init.span)
        })?;
        let entry = element.node.as_ident().ok_or_else(|| {
            ValidationError::type_err("function table entries must be function names", element.span)
        })?;
        let binding = env.lookup_global(entry).ok_or_else(|| {
            ValidationError::binding(format!("unbound function '{entry}'"), element.span)
        })?;
        let entry_arrow = binding.ty.as_arrow().ok_or_else(|| {
            ValidationError::type_err(
                format!("function table entry '{entry}' is not a function, got {}", binding.ty),
                element.span,
            )
        })?;
        match &arrow {
            None => arrow = Some(entry_arrow.clone()),
            Some(expected) if expected != entry_arrow => {
                return Err(ValidationError::type_err(
                    format!(
                        "function table '{name}' entries must share one signature: expected {expected}, got {entry_arrow} for '{entry}'"
                    ),
                    element.span,
                ));
            }
            Some(_) => {}
        }
    }

    let length = elements.len();
    let arrow = arrow.ok_or_else(|| {
        ValidationError::range(format!("function table '{name}' must not be empty"), init.span)
    })?;
    if !length.is_power_of_two() {
        return Err(ValidationError::range(
            format!("function table '{name}' length {length} is not a power of two"),
            init.span,
        ));
    }
    let length = u32::try_from(length).map_err(|_| {
        ValidationError::range(format!("function table '{name}' is too long"), init.span)
    })?;
    Ok(Table { arrow, length })
}
