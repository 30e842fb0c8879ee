use crate::ast::{Expr, ForInit, Function, Stmt, SwitchCase, VarDeclarator};
use crate::config::ReturnCoverage;
use crate::diagnostics::ValidationError;
use crate::span::Spanned;

use super::check_subtype;
use super::env::{Binding, TypeEnv};
use super::flow::{Flow, Sequence, Target};
use super::infer::{infer_effect, infer_expr, infer_number};
use super::types::ValueType;

/// Check one module function against the signature already bound for it.
pub fn check_function(func: &Spanned<&Function>, env: &mut TypeEnv) -> Result<(), ValidationError> {
    let name = func
        .node
        .name()
        .ok_or_else(|| ValidationError::structural("module functions must be named", func.span))?;
    let arrow = env
        .lookup_global(name)
        .and_then(|b| b.ty.as_arrow())
        .cloned()
        .ok_or_else(|| ValidationError::internal(format!("no signature bound for function '{name}'")))?;

    env.enter_function(name, arrow.result);
    let result = check_body(func, &arrow.params, env);
    env.exit_function();
    result
}

fn check_body(func: &Spanned<&Function>, params: &[ValueType], env: &mut TypeEnv) -> Result<(), ValidationError> {
    let name = env.function_name()?.to_string();
    for (param, ty) in func.node.params.iter().zip(params) {
        env.define(&param.node.name, Binding::mutable(*ty), param.span)?;
    }

    // Parameter annotations were validated with the signature.
    let mut stmts = func.node.statements().into_iter().skip(params.len()).peekable();

    while let Some(stmt) = stmts.next_if(|s| matches!(s.node, Stmt::Var(_))) {
        if let Stmt::Var(decl) = &stmt.node {
            for declarator in &decl.declarations {
                let ty = infer_local(declarator)?;
                let id = &declarator.node.id;
                env.define(&id.node.name, Binding::mutable(ty), id.span)?;
            }
        }
    }

    let mut seq = Sequence::new();
    for stmt in stmts {
        seq.push(check_stmt(stmt, env)?);
    }
    let flow = seq.finish();

    let result = env.result_type()?;
    if result != ValueType::Void && env.config.return_coverage == ReturnCoverage::Precise && !flow.is_return() {
        return Err(ValidationError::type_err(
            format!("missing return in function '{name}' returning {result}"),
            func.node.body.span,
        ));
    }
    tracing::debug!(function = %name, "checked function body");
    Ok(())
}

/// Type fixed by a local's initializer, which must be a numeric literal.
fn infer_local(decl: &Spanned<VarDeclarator>) -> Result<ValueType, ValidationError> {
    let name = &decl.node.id.node.name;
    let init = decl.node.init.as_ref().ok_or_else(|| {
        ValidationError::type_err(format!("local variable '{name}' missing initializer"), decl.span)
    })?;
    let lit = init.node.as_number().ok_or_else(|| {
        ValidationError::type_err(
            format!("local variable '{name}' must be initialized with a numeric literal"),
            init.span,
        )
    })?;
    Ok(match infer_number(lit, init.span)? {
        ValueType::Double => ValueType::Double,
        _ => ValueType::Int,
    })
}

pub fn check_block(stmts: &[Spanned<Stmt>], env: &mut TypeEnv) -> Result<Flow, ValidationError> {
    let mut seq = Sequence::new();
    for stmt in stmts {
        seq.push(check_stmt(stmt, env)?);
    }
    Ok(seq.finish())
}

pub fn check_stmt(stmt: &Spanned<Stmt>, env: &mut TypeEnv) -> Result<Flow, ValidationError> {
    match &stmt.node {
        Stmt::Empty => Ok(Flow::fallthrough()),
        Stmt::Block(block) => check_block(&block.body, env),
        Stmt::Expression { expression } => {
            infer_effect(expression, env)?;
            Ok(Flow::fallthrough())
        }
        Stmt::If { test, consequent, alternate } => {
            check_test(test, "if test", env)?;
            let then_flow = check_stmt(consequent, env)?;
            let else_flow = match alternate {
                Some(alternate) => check_stmt(alternate, env)?,
                None => Flow::fallthrough(),
            };
            Ok(then_flow.union(else_flow))
        }
        Stmt::While { test, body } => {
            check_test(test, "while test", env)?;
            check_loop_body(body, stmt, env)
        }
        Stmt::DoWhile { body, test } => {
            let flow = check_loop_body_raw(body, stmt, env)?;
            check_test(test, "do-while test", env)?;
            if flow.is_return() {
                return Ok(Flow::Return);
            }
            Ok(flow.without(&Target::Anonymous).without(&Target::Continue))
        }
        Stmt::For { init, test, update, body } => {
            match init.as_deref() {
                Some(ForInit::Decl(decl)) => {
                    return Err(ValidationError::structural(
                        "variable declarations are not allowed in a for-loop head",
                        decl.span,
                    ));
                }
                Some(ForInit::Expr(e)) => {
                    infer_effect(e, env)?;
                }
                None => {}
            }
            if let Some(test) = test {
                check_test(test, "for test", env)?;
            }
            if let Some(update) = update {
                infer_effect(update, env)?;
            }
            check_loop_body(body, stmt, env)
        }
        Stmt::Labeled { label, body } => {
            let target = Target::Label(label.node.name.clone());
            env.push_frame(target.clone(), body.node.is_loop(), label.span)?;
            let flow = check_stmt(body, env);
            env.pop_frame()?;
            Ok(flow?.without(&target))
        }
        Stmt::Break { label } => {
            let label = label.as_ref().map(|l| l.node.name.as_str());
            Ok(Flow::break_to(env.break_target(label, stmt.span)?))
        }
        Stmt::Continue { label } => {
            let label = label.as_ref().map(|l| l.node.name.as_str());
            Ok(Flow::break_to(env.continue_target(label, stmt.span)?))
        }
        Stmt::Switch { discriminant, cases } => check_switch(discriminant, cases, env),
        Stmt::Return { argument } => {
            let result = env.result_type()?;
            match argument {
                Some(argument) => {
                    let ty = infer_expr(argument, env)?;
                    check_subtype(ty, result, "return statement", stmt.span)?;
                }
                None if result != ValueType::Void => {
                    return Err(ValidationError::type_err(
                        format!("expected {result} in return statement, got void"),
                        stmt.span,
                    ));
                }
                None => {}
            }
            Ok(Flow::Return)
        }
        Stmt::Var(_) => Err(ValidationError::structural(
            format!(
                "variable declarations must precede other statements in function '{}'",
                env.function_name()?
            ),
            stmt.span,
        )),
        Stmt::Function(_) => Err(ValidationError::structural(
            "function declarations may only appear at module level",
            stmt.span,
        )),
        Stmt::Unsupported => Err(ValidationError::unsupported("statement kind outside asm.js", stmt.span)),
    }
}

fn check_test(test: &Spanned<Expr>, what: &str, env: &TypeEnv) -> Result<(), ValidationError> {
    check_subtype(infer_expr(test, env)?, ValueType::Boolish, what, test.span)
}

/// Body of a `while` or `for`: it may run zero times, so the loop never
/// counts as returning.
fn check_loop_body(body: &Spanned<Stmt>, stmt: &Spanned<Stmt>, env: &mut TypeEnv) -> Result<Flow, ValidationError> {
    let flow = check_loop_body_raw(body, stmt, env)?;
    Ok(flow
        .without(&Target::Anonymous)
        .without(&Target::Continue)
        .union(Flow::fallthrough()))
}

fn check_loop_body_raw(body: &Spanned<Stmt>, stmt: &Spanned<Stmt>, env: &mut TypeEnv) -> Result<Flow, ValidationError> {
    env.push_frame(Target::Anonymous, true, stmt.span)?;
    let flow = check_stmt(body, env);
    env.pop_frame()?;
    flow
}

fn check_switch(
    discriminant: &Spanned<Expr>,
    cases: &[Spanned<SwitchCase>],
    env: &mut TypeEnv,
) -> Result<Flow, ValidationError> {
    let disc = infer_expr(discriminant, env)?;
    if disc != ValueType::Signed && disc != ValueType::Double {
        return Err(ValidationError::type_err(
            format!("switch discriminant must be signed or double, got {disc}"),
            discriminant.span,
        ));
    }

    env.push_frame(Target::Anonymous, false, discriminant.span)?;
    let outcome = check_cases(disc, cases, env);
    env.pop_frame()?;
    let (escaped, last_returns) = outcome?;

    let ends_in_default = cases.last().is_some_and(|c| c.node.test.is_none());
    if escaped.targets().is_some_and(|t| t.is_empty()) && ends_in_default && last_returns {
        return Ok(Flow::Return);
    }
    Ok(escaped.without(&Target::Anonymous).union(Flow::fallthrough()))
}

/// Check each case; returns the targets escaping any case and whether the
/// last case returns.
fn check_cases(
    disc: ValueType,
    cases: &[Spanned<SwitchCase>],
    env: &mut TypeEnv,
) -> Result<(Flow, bool), ValidationError> {
    let mut escaped = Flow::fallthrough();
    let mut last_returns = false;
    for (i, case) in cases.iter().enumerate() {
        match &case.node.test {
            Some(test) => {
                let ty = case_type(test)?;
                if ty != disc {
                    return Err(ValidationError::type_err(
                        format!("switch case type {ty} does not match discriminant type {disc}"),
                        test.span,
                    ));
                }
            }
            None if i + 1 != cases.len() => {
                return Err(ValidationError::structural("default must be the last switch case", case.span));
            }
            None => {}
        }
        let flow = check_block(&case.node.consequent, env)?;
        last_returns = flow.is_return();
        // Return is the identity for union; only break targets accumulate.
        escaped = escaped.union(flow);
    }
    Ok((escaped, last_returns))
}

/// Case labels are numeric literals: integers are signed, decimals double.
fn case_type(test: &Spanned<Expr>) -> Result<ValueType, ValidationError> {
    let lit = test
        .node
        .as_number()
        .ok_or_else(|| ValidationError::type_err("switch case label must be a numeric literal", test.span))?;
    Ok(match infer_number(lit, test.span)? {
        ValueType::Double => ValueType::Double,
        _ => ValueType::Signed,
    })
}
