//! ESTree-shaped syntax tree consumed by the validator.
//!
//! The tree is produced by an external JavaScript parser. Node kinds are
//! closed enums tagged by the ESTree `type` member; any kind outside the
//! asm.js grammar decodes to an `Unsupported` variant, which the checker
//! rejects with its own error instead of falling through.

pub mod build;

use serde::{Deserialize, Serialize};

use crate::diagnostics::ValidationError;
use crate::span::Spanned;

/// Largest magnitude accepted for an integer literal: `[-2^31, 2^32)`.
pub const INT_LITERAL_MIN: f64 = -2147483648.0;
pub const INT_LITERAL_END: f64 = 4294967296.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Spanned<Stmt>>,
}

impl Program {
    /// Decode an ESTree `Program` from JSON. Nesting depth is unbounded;
    /// deep documents run on a growing stack.
    pub fn from_json(json: &str) -> Result<Program, ValidationError> {
        let input = |e: serde_json::Error| ValidationError::input(e.to_string());
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let program = Program::deserialize(serde_stacker::Deserializer::new(&mut de)).map_err(input)?;
        de.end().map_err(input)?;
        Ok(program)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
}

/// A function declaration or expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub id: Option<Spanned<Ident>>,
    #[serde(default)]
    pub params: Vec<Spanned<Ident>>,
    pub body: Spanned<Block>,
}

impl Function {
    pub fn name(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.node.name.as_str())
    }

    /// Body statements with empty statements removed.
    pub fn statements(&self) -> Vec<&Spanned<Stmt>> {
        non_empty(&self.body.node.body)
    }
}

/// `BlockStatement` payload, also used for function bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub body: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub declarations: Vec<Spanned<VarDeclarator>>,
    #[serde(default = "default_var_kind")]
    pub kind: String,
}

fn default_var_kind() -> String {
    "var".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDeclarator {
    pub id: Spanned<Ident>,
    #[serde(default)]
    pub init: Option<Box<Spanned<Expr>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    #[serde(default)]
    pub test: Option<Box<Spanned<Expr>>>,
    pub consequent: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    #[serde(rename = "EmptyStatement")]
    Empty,
    #[serde(rename = "BlockStatement")]
    Block(Block),
    #[serde(rename = "ExpressionStatement")]
    Expression { expression: Box<Spanned<Expr>> },
    #[serde(rename = "IfStatement")]
    If {
        test: Box<Spanned<Expr>>,
        consequent: Box<Spanned<Stmt>>,
        #[serde(default)]
        alternate: Option<Box<Spanned<Stmt>>>,
    },
    #[serde(rename = "LabeledStatement")]
    Labeled { label: Spanned<Ident>, body: Box<Spanned<Stmt>> },
    #[serde(rename = "BreakStatement")]
    Break {
        #[serde(default)]
        label: Option<Spanned<Ident>>,
    },
    #[serde(rename = "ContinueStatement")]
    Continue {
        #[serde(default)]
        label: Option<Spanned<Ident>>,
    },
    #[serde(rename = "SwitchStatement")]
    Switch { discriminant: Box<Spanned<Expr>>, cases: Vec<Spanned<SwitchCase>> },
    #[serde(rename = "ReturnStatement")]
    Return {
        #[serde(default)]
        argument: Option<Box<Spanned<Expr>>>,
    },
    #[serde(rename = "WhileStatement")]
    While { test: Box<Spanned<Expr>>, body: Box<Spanned<Stmt>> },
    #[serde(rename = "DoWhileStatement")]
    DoWhile { body: Box<Spanned<Stmt>>, test: Box<Spanned<Expr>> },
    #[serde(rename = "ForStatement")]
    For {
        #[serde(default)]
        init: Option<Box<ForInit>>,
        #[serde(default)]
        test: Option<Box<Spanned<Expr>>>,
        #[serde(default)]
        update: Option<Box<Spanned<Expr>>>,
        body: Box<Spanned<Stmt>>,
    },
    #[serde(rename = "VariableDeclaration")]
    Var(VarDecl),
    #[serde(rename = "FunctionDeclaration")]
    Function(Function),
    #[serde(other)]
    Unsupported,
}

impl Stmt {
    /// ESTree name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Empty => "EmptyStatement",
            Stmt::Block(_) => "BlockStatement",
            Stmt::Expression { .. } => "ExpressionStatement",
            Stmt::If { .. } => "IfStatement",
            Stmt::Labeled { .. } => "LabeledStatement",
            Stmt::Break { .. } => "BreakStatement",
            Stmt::Continue { .. } => "ContinueStatement",
            Stmt::Switch { .. } => "SwitchStatement",
            Stmt::Return { .. } => "ReturnStatement",
            Stmt::While { .. } => "WhileStatement",
            Stmt::DoWhile { .. } => "DoWhileStatement",
            Stmt::For { .. } => "ForStatement",
            Stmt::Var(_) => "VariableDeclaration",
            Stmt::Function(_) => "FunctionDeclaration",
            Stmt::Unsupported => "unsupported statement",
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, Stmt::While { .. } | Stmt::DoWhile { .. } | Stmt::For { .. })
    }
}

/// Filter out `EmptyStatement`s, which asm.js ignores everywhere.
pub fn non_empty(stmts: &[Spanned<Stmt>]) -> Vec<&Spanned<Stmt>> {
    stmts.iter().filter(|s| !matches!(s.node, Stmt::Empty)).collect()
}

/// `ForStatement.init`: a declaration or an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForInit {
    Decl(Spanned<DeclNode>),
    Expr(Spanned<Expr>),
}

/// Tagged wrapper so an untagged `ForInit` only accepts real declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeclNode {
    #[serde(rename = "VariableDeclaration")]
    Var(VarDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    Identifier(Ident),
    Literal {
        value: LitValue,
        #[serde(default)]
        raw: Option<String>,
    },
    #[serde(rename = "AssignmentExpression")]
    Assign { operator: AssignOp, left: Box<Spanned<Expr>>, right: Box<Spanned<Expr>> },
    #[serde(rename = "BinaryExpression")]
    Binary { operator: BinaryOp, left: Box<Spanned<Expr>>, right: Box<Spanned<Expr>> },
    #[serde(rename = "UnaryExpression")]
    Unary { operator: UnaryOp, argument: Box<Spanned<Expr>> },
    #[serde(rename = "ConditionalExpression")]
    Conditional {
        test: Box<Spanned<Expr>>,
        consequent: Box<Spanned<Expr>>,
        alternate: Box<Spanned<Expr>>,
    },
    #[serde(rename = "SequenceExpression")]
    Sequence { expressions: Vec<Spanned<Expr>> },
    #[serde(rename = "CallExpression")]
    Call { callee: Box<Spanned<Expr>>, arguments: Vec<Spanned<Expr>> },
    #[serde(rename = "NewExpression")]
    New { callee: Box<Spanned<Expr>>, arguments: Vec<Spanned<Expr>> },
    #[serde(rename = "MemberExpression")]
    Member {
        object: Box<Spanned<Expr>>,
        property: Box<Spanned<Expr>>,
        #[serde(default)]
        computed: bool,
    },
    #[serde(rename = "ArrayExpression")]
    Array { elements: Vec<Option<Spanned<Expr>>> },
    #[serde(rename = "ObjectExpression")]
    Object { properties: Vec<Spanned<Property>> },
    #[serde(rename = "FunctionExpression")]
    Function(Function),
    #[serde(other)]
    Unsupported,
}

impl Expr {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "Identifier",
            Expr::Literal { .. } => "Literal",
            Expr::Assign { .. } => "AssignmentExpression",
            Expr::Binary { .. } => "BinaryExpression",
            Expr::Unary { .. } => "UnaryExpression",
            Expr::Conditional { .. } => "ConditionalExpression",
            Expr::Sequence { .. } => "SequenceExpression",
            Expr::Call { .. } => "CallExpression",
            Expr::New { .. } => "NewExpression",
            Expr::Member { .. } => "MemberExpression",
            Expr::Array { .. } => "ArrayExpression",
            Expr::Object { .. } => "ObjectExpression",
            Expr::Function(_) => "FunctionExpression",
            Expr::Unsupported => "unsupported expression",
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }

    /// The numeric literal this expression denotes, folding a unary minus
    /// applied directly to a numeric literal.
    pub fn as_number(&self) -> Option<NumLit> {
        match self {
            Expr::Literal { value: LitValue::Number(n), raw } => Some(NumLit {
                value: *n,
                is_double: match raw {
                    Some(raw) => raw.contains('.'),
                    None => n.fract() != 0.0,
                },
            }),
            Expr::Unary { operator: UnaryOp::Minus, argument } => match &argument.node {
                Expr::Literal { .. } => argument.node.as_number().map(|lit| NumLit {
                    value: -lit.value,
                    ..lit
                }),
                _ => None,
            },
            _ => None,
        }
    }

    /// Is this the integer literal `n` (written without a decimal point)?
    pub fn is_int_literal(&self, n: f64) -> bool {
        matches!(self.as_number(), Some(lit) if !lit.is_double && lit.value == n)
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call { .. })
    }
}

/// A numeric literal after sign folding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumLit {
    pub value: f64,
    /// Written with a decimal point, e.g. `1.0`.
    pub is_double: bool,
}

impl NumLit {
    /// Integer literal inside `[-2^31, 2^32)`.
    pub fn is_int_in_range(&self) -> bool {
        !self.is_double
            && self.value.fract() == 0.0
            && self.value >= INT_LITERAL_MIN
            && self.value < INT_LITERAL_END
    }

    /// The literal as an `u32`, for shifts, masks and constant indices.
    pub fn as_u32(&self) -> Option<u32> {
        if self.is_double || self.value.fract() != 0.0 || self.value < 0.0 || self.value > u32::MAX as f64 {
            return None;
        }
        Some(self.value as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LitValue {
    Bool(bool),
    Number(f64),
    String(String),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: Box<Spanned<Expr>>,
    pub value: Box<Spanned<Expr>>,
    #[serde(default)]
    pub kind: PropertyKind,
}

impl Property {
    /// Property name for an identifier or string-literal key.
    pub fn key_name(&self) -> Option<&str> {
        match &self.key.node {
            Expr::Identifier(id) => Some(&id.name),
            Expr::Literal { value: LitValue::String(s), .. } => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    #[default]
    Init,
    Get,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = ">>>")]
    UShr,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "===")]
    StrictEq,
    #[serde(rename = "!==")]
    StrictNotEq,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "instanceof")]
    InstanceOf,
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "typeof")]
    TypeOf,
    #[serde(rename = "void")]
    Void,
    #[serde(rename = "delete")]
    Delete,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOp {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubAssign,
    #[serde(rename = "*=")]
    MulAssign,
    #[serde(rename = "/=")]
    DivAssign,
    #[serde(rename = "%=")]
    ModAssign,
    #[serde(rename = "|=")]
    BitOrAssign,
    #[serde(rename = "&=")]
    BitAndAssign,
    #[serde(rename = "^=")]
    BitXorAssign,
    #[serde(rename = "<<=")]
    ShlAssign,
    #[serde(rename = ">>=")]
    ShrAssign,
    #[serde(rename = ">>>=")]
    UShrAssign,
}

impl std::fmt::Display for AssignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
            AssignOp::BitOrAssign => "|=",
            AssignOp::BitAndAssign => "&=",
            AssignOp::BitXorAssign => "^=",
            AssignOp::ShlAssign => "<<=",
            AssignOp::ShrAssign => ">>=",
            AssignOp::UShrAssign => ">>>=",
        };
        f.write_str(s)
    }
}
