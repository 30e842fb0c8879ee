use std::collections::{BTreeMap, HashSet};

use crate::ast::{Expr, PropertyKind};
use crate::diagnostics::ValidationError;
use crate::report::{ExportEntry, Exports};
use crate::span::{Span, Spanned};

use super::env::TypeEnv;
use super::types::{Arrow, Type};

/// Read the export clause: a single function name, or an object literal of
/// `external: internal` pairs. Every target must be one of `functions`.
pub fn resolve_exports(
    clause: &Spanned<Expr>,
    functions: &BTreeMap<String, Arrow>,
    env: &TypeEnv,
) -> Result<Exports, ValidationError> {
    match &clause.node {
        Expr::Identifier(id) => {
            check_exported(&id.name, functions, env, clause.span)?;
            Ok(Exports::Single { name: id.name.clone() })
        }
        Expr::Object { properties } => {
            let mut seen = HashSet::new();
            let mut entries = Vec::with_capacity(properties.len());
            for prop in properties {
                if prop.node.kind != PropertyKind::Init {
                    return Err(ValidationError::structural(
                        "export object may not contain getters or setters",
                        prop.span,
                    ));
                }
                let external = prop.node.key_name().ok_or_else(|| {
                    ValidationError::structural("export name must be an identifier or string", prop.node.key.span)
                })?;
                let internal = prop.node.value.node.as_ident().ok_or_else(|| {
                    ValidationError::structural(
                        format!("export '{external}' must name a module function"),
                        prop.node.value.span,
                    )
                })?;
                if !seen.insert(external) {
                    return Err(ValidationError::structural(
                        format!("duplicate export name '{external}'"),
                        prop.span,
                    ));
                }
                check_exported(internal, functions, env, prop.node.value.span)?;
                entries.push(ExportEntry { external: external.to_string(), internal: internal.to_string() });
            }
            Ok(Exports::Multiple { entries })
        }
        other => Err(ValidationError::structural(
            format!("export clause must be a function name or object literal, got {}", other.kind_name()),
            clause.span,
        )),
    }
}

fn check_exported(
    name: &str,
    functions: &BTreeMap<String, Arrow>,
    env: &TypeEnv,
    span: Span,
) -> Result<(), ValidationError> {
    let binding = env.resolve(name, span)?;
    match binding.ty {
        Type::Arrow(_) if functions.contains_key(name) => Ok(()),
        Type::Arrow(_) => Err(ValidationError::type_err(
            format!("cannot export '{name}': not a module function"),
            span,
        )),
        ref other => Err(ValidationError::type_err(
            format!("cannot export '{name}': expected function, got {other}"),
            span,
        )),
    }
}
