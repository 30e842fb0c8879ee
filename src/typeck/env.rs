use std::collections::HashMap;

use crate::config::ValidatorConfig;
use crate::diagnostics::ValidationError;
use crate::span::Span;

use super::flow::{Frame, Target};
use super::types::{Type, ValueType};

/// Names that may not be bound anywhere in a module.
pub const ILLEGAL_NAMES: [&str; 2] = ["arguments", "eval"];

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub mutable: bool,
    pub ty: Type,
}

impl Binding {
    pub fn mutable(ty: impl Into<Type>) -> Self {
        Self { mutable: true, ty: ty.into() }
    }

    pub fn immutable(ty: impl Into<Type>) -> Self {
        Self { mutable: false, ty: ty.into() }
    }
}

/// Local names of the module parameters, by position.
#[derive(Debug, Clone, Default)]
pub struct Roots {
    pub stdlib: Option<String>,
    pub foreign: Option<String>,
    pub heap: Option<String>,
}

/// State of the function whose body is being checked.
#[derive(Debug)]
struct FunctionContext {
    name: String,
    result: ValueType,
    frames: Vec<Frame>,
}

/// Scopes for one validation pass. The bottom scope holds module globals;
/// one scope is pushed per function body.
#[derive(Debug)]
pub struct TypeEnv {
    scopes: Vec<HashMap<String, Binding>>,
    pub roots: Roots,
    pub config: ValidatorConfig,
    function: Option<FunctionContext>,
}

impl TypeEnv {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            scopes: vec![HashMap::new()],
            roots: Roots::default(),
            config,
            function: None,
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    #[cfg(test)]
    pub(crate) fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in the innermost scope.
    pub fn define(&mut self, name: &str, binding: Binding, span: Span) -> Result<(), ValidationError> {
        check_name(name, span)?;
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| ValidationError::internal("scope stack is empty"))?;
        if scope.contains_key(name) {
            return Err(ValidationError::binding(format!("duplicate binding '{name}'"), span));
        }
        tracing::trace!(name, ty = %binding.ty, mutable = binding.mutable, "bind");
        scope.insert(name.to_string(), binding);
        Ok(())
    }

    /// Innermost binding of `name`: locals shadow globals.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_global(&self, name: &str) -> Option<&Binding> {
        self.scopes.first().and_then(|scope| scope.get(name))
    }

    /// Like `lookup`, but an unbound name is a binding error.
    pub fn resolve(&self, name: &str, span: Span) -> Result<&Binding, ValidationError> {
        self.lookup(name)
            .ok_or_else(|| ValidationError::binding(format!("unbound variable '{name}'"), span))
    }

    /// Resolve a name used as an expression; it must have a value type.
    pub fn resolve_value(&self, name: &str, span: Span) -> Result<ValueType, ValidationError> {
        let binding = self.resolve(name, span)?;
        binding.ty.as_value().ok_or_else(|| {
            ValidationError::type_err(
                format!("expected value type for '{name}', got {}", binding.ty),
                span,
            )
        })
    }

    pub fn enter_function(&mut self, name: &str, result: ValueType) {
        self.function = Some(FunctionContext {
            name: name.to_string(),
            result,
            frames: Vec::new(),
        });
        self.push_scope();
    }

    pub fn exit_function(&mut self) {
        self.pop_scope();
        self.function = None;
    }

    fn current(&self) -> Result<&FunctionContext, ValidationError> {
        self.function
            .as_ref()
            .ok_or_else(|| ValidationError::internal("statement checked outside a function body"))
    }

    fn current_mut(&mut self) -> Result<&mut FunctionContext, ValidationError> {
        self.function
            .as_mut()
            .ok_or_else(|| ValidationError::internal("statement checked outside a function body"))
    }

    pub fn function_name(&self) -> Result<&str, ValidationError> {
        Ok(&self.current()?.name)
    }

    /// Result type of the function being checked.
    pub fn result_type(&self) -> Result<ValueType, ValidationError> {
        Ok(self.current()?.result)
    }

    /// Enter a construct `break`/`continue` can target.
    pub fn push_frame(&mut self, target: Target, is_loop: bool, span: Span) -> Result<(), ValidationError> {
        let ctx = self.current_mut()?;
        if let Target::Label(name) = &target {
            if ctx.frames.iter().any(|f| f.target == target) {
                return Err(ValidationError::binding(format!("duplicate label '{name}'"), span));
            }
        }
        ctx.frames.push(Frame { target, is_loop });
        Ok(())
    }

    pub fn pop_frame(&mut self) -> Result<(), ValidationError> {
        self.current_mut()?
            .frames
            .pop()
            .map(|_| ())
            .ok_or_else(|| ValidationError::internal("break target stack underflow"))
    }

    /// Target of a `break`, which must name an enclosing construct.
    pub fn break_target(&self, label: Option<&str>, span: Span) -> Result<Target, ValidationError> {
        let frames = &self.current()?.frames;
        match label {
            None => frames
                .iter()
                .any(|f| f.target == Target::Anonymous)
                .then_some(Target::Anonymous)
                .ok_or_else(|| ValidationError::structural("break outside of a loop or switch", span)),
            Some(name) => {
                let target = Target::Label(name.to_string());
                frames
                    .iter()
                    .any(|f| f.target == target)
                    .then_some(target)
                    .ok_or_else(|| ValidationError::binding(format!("undefined label '{name}'"), span))
            }
        }
    }

    /// Target of a `continue`, which must name an enclosing loop.
    pub fn continue_target(&self, label: Option<&str>, span: Span) -> Result<Target, ValidationError> {
        let frames = &self.current()?.frames;
        match label {
            None => frames
                .iter()
                .any(|f| f.is_loop && f.target == Target::Anonymous)
                .then_some(Target::Continue)
                .ok_or_else(|| ValidationError::structural("continue outside of a loop", span)),
            Some(name) => {
                let target = Target::Label(name.to_string());
                match frames.iter().find(|f| f.target == target) {
                    Some(frame) if frame.is_loop => Ok(target),
                    Some(_) => Err(ValidationError::structural(
                        format!("continue target '{name}' is not a loop"),
                        span,
                    )),
                    None => Err(ValidationError::binding(format!("undefined label '{name}'"), span)),
                }
            }
        }
    }
}

/// Reject the reserved names `arguments` and `eval`.
pub fn check_name(name: &str, span: Span) -> Result<(), ValidationError> {
    if ILLEGAL_NAMES.contains(&name) {
        return Err(ValidationError::binding(format!("illegal binding name '{name}'"), span));
    }
    Ok(())
}
