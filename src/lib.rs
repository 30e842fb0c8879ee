pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod report;
pub mod span;
pub mod typeck;

use ast::{Expr, Function, Program, Stmt};
use config::ValidatorConfig;
use diagnostics::ValidationError;
use report::Report;
use span::Spanned;

/// Validate an asm.js module function with default settings.
pub fn validate(module: &Spanned<Function>) -> Result<Report, ValidationError> {
    validate_with_config(module, ValidatorConfig::default())
}

pub fn validate_with_config(module: &Spanned<Function>, config: ValidatorConfig) -> Result<Report, ValidationError> {
    typeck::validate_module(module, config)
}

/// Validate a program whose only statement is the module function, either
/// declared or as a (parenthesized) function expression.
pub fn validate_program(program: &Program, config: ValidatorConfig) -> Result<Report, ValidationError> {
    let [stmt] = program.body.as_slice() else {
        return Err(ValidationError::input(format!(
            "expected a program with exactly one module function, got {} statements",
            program.body.len()
        )));
    };
    let module = match &stmt.node {
        Stmt::Function(func) => Spanned::new(func.clone(), stmt.span),
        Stmt::Expression { expression } => match &expression.node {
            Expr::Function(func) => Spanned::new(func.clone(), expression.span),
            other => {
                return Err(ValidationError::input(format!(
                    "expected module function expression, got {}",
                    other.kind_name()
                )));
            }
        },
        other => {
            return Err(ValidationError::input(format!(
                "expected module function, got {}",
                other.kind_name()
            )));
        }
    };
    validate_with_config(&module, config)
}

/// Decode an ESTree `Program` from JSON and validate it.
pub fn validate_estree_json(json: &str, config: ValidatorConfig) -> Result<Report, ValidationError> {
    let program = Program::from_json(json)?;
    validate_program(&program, config)
}
