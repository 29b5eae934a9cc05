//! Abstract syntax tree consumed by the interpreter.
//!
//! The tree owns its names and literal payloads. The runtime only borrows
//! from it: literals are copied into fresh values, and procedure bodies and
//! parameter lists are referenced in place for as long as the script lives.

use std::fmt;

use serde::Serialize;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_str("-"),
        }
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// `true` for the six comparison operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Neq
                | BinaryOp::Gt
                | BinaryOp::Gte
                | BinaryOp::Lt
                | BinaryOp::Lte
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A literal constant as written in the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<Literal>),
}

/// Expression nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// A literal: `$T`, `42`, `1.5`, `"hi"`, `[1, 2]`.
    Literal(Literal),

    /// Read of a named binding.
    Variable(String),

    /// Call of a named function: `name(args...)`.
    Call { name: String, args: Vec<Expr> },

    /// Prefix operator expression: `-x`.
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Infix operator expression: `a + b`, `x <= y`.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Positional access: `items[i]`.
    Index { target: Box<Expr>, index: Box<Expr> },
}

impl Expr {
    /// `true` when this expression is a bare function call.
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call { .. })
    }
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// `module "name"` (reserved).
    ModuleDecl(String),

    /// `use "name"`: make a function group visible.
    ModuleUse(String),

    /// `let name = expr` / `const name = expr`.
    VarDecl {
        name: String,
        is_const: bool,
        initializer: Expr,
    },

    /// `name = expr`.
    VarAssign { name: String, value: Expr },

    /// `proc name(params) ... end`.
    FuncDecl {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },

    /// A sequence of statements.
    Block(Vec<Stmt>),

    /// `if cond ... end` with an optional `otherwise ... end`.
    If {
        condition: Expr,
        then_block: Vec<Stmt>,
        otherwise: Option<Vec<Stmt>>,
    },

    /// `while cond ... end`.
    While { condition: Expr, body: Vec<Stmt> },

    /// `break`.
    Break,

    /// `return expr`.
    Return(Expr),

    /// A bare expression.
    Expression(Expr),
}

/// A parsed program: ordered top-level statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    pub name: String,
    pub statements: Vec<Stmt>,
}

impl Script {
    pub fn new<S: Into<String>>(name: S, statements: Vec<Stmt>) -> Self {
        Script {
            name: name.into(),
            statements,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
