use crate::ast::{Expr, Function, LitValue, Stmt, VarDecl};
use crate::diagnostics::ValidationError;
use crate::span::Spanned;

pub const USE_ASM: &str = "use asm";

/// Module parameters beyond these are rejected: stdlib, foreign, heap.
pub const MAX_MODULE_PARAMS: usize = 3;

/// The module body split into its ordered sections.
#[derive(Debug)]
pub struct ModuleSections<'a> {
    pub globals: Vec<Spanned<&'a VarDecl>>,
    pub functions: Vec<Spanned<&'a Function>>,
    pub tables: Vec<Spanned<&'a VarDecl>>,
    pub exports: &'a Spanned<Expr>,
}

/// A `VariableDeclaration` statement viewed as its payload.
fn as_var(stmt: &Spanned<Stmt>) -> Option<Spanned<&VarDecl>> {
    match &stmt.node {
        Stmt::Var(decl) => Some(Spanned::new(decl, stmt.span)),
        _ => None,
    }
}

fn is_directive(stmt: &Spanned<Stmt>) -> bool {
    matches!(
        &stmt.node,
        Stmt::Expression { expression }
            if matches!(&expression.node, Expr::Literal { value: LitValue::String(s), .. } if s == USE_ASM)
    )
}

/// Split `module` into directive, globals, functions, tables and export
/// clause, in that textual order.
pub fn decompose(module: &Spanned<Function>) -> Result<ModuleSections<'_>, ValidationError> {
    let func = &module.node;
    if func.params.len() > MAX_MODULE_PARAMS {
        return Err(ValidationError::structural(
            format!(
                "module takes at most {MAX_MODULE_PARAMS} parameters (stdlib, foreign, heap), got {}",
                func.params.len()
            ),
            module.span,
        ));
    }

    let body = func.statements();
    let mut rest = body.into_iter().peekable();

    let directives: Vec<_> = std::iter::from_fn(|| {
        rest.next_if(|s| matches!(s.node, Stmt::Expression { .. }))
    })
    .collect();
    if directives.len() != 1 {
        return Err(ValidationError::structural(
            format!(
                "expected single \"use asm\" directive, got {} expression statements",
                directives.len()
            ),
            directives.get(1).map_or(func.body.span, |s| s.span),
        ));
    }
    if !is_directive(directives[0]) {
        return Err(ValidationError::structural(
            "expected \"use asm\" directive",
            directives[0].span,
        ));
    }

    let globals = take_vars(&mut rest);
    let functions: Vec<_> = std::iter::from_fn(|| {
        rest.next_if(|s| matches!(s.node, Stmt::Function(_))).and_then(|s| match &s.node {
            Stmt::Function(f) => Some(Spanned::new(f, s.span)),
            _ => None,
        })
    })
    .collect();
    let tables = take_vars(&mut rest);

    let export = rest.next().ok_or_else(|| {
        ValidationError::structural("missing export clause: expected a final return statement", func.body.span)
    })?;
    let exports = match &export.node {
        Stmt::Return { argument: Some(argument) } => argument.as_ref(),
        Stmt::Return { argument: None } => {
            return Err(ValidationError::structural("export clause must return a value", export.span));
        }
        other => {
            return Err(ValidationError::structural(
                format!("unexpected {} in module body", other.kind_name()),
                export.span,
            ));
        }
    };

    if let Some(extra) = rest.next() {
        let msg = match &extra.node {
            Stmt::Return { .. } => "expected single export clause, got a second return statement".to_string(),
            other => format!("unexpected {} after export clause", other.kind_name()),
        };
        return Err(ValidationError::structural(msg, extra.span));
    }

    tracing::debug!(
        globals = globals.len(),
        functions = functions.len(),
        tables = tables.len(),
        "decomposed module"
    );

    Ok(ModuleSections { globals, functions, tables, exports })
}

/// Consume the leading run of `var` statements.
fn take_vars<'a, I>(rest: &mut std::iter::Peekable<I>) -> Vec<Spanned<&'a VarDecl>>
where
    I: Iterator<Item = &'a Spanned<Stmt>>,
{
    std::iter::from_fn(|| rest.next_if(|s| matches!(s.node, Stmt::Var(_))).and_then(as_var)).collect()
}
