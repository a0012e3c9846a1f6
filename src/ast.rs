//! Syntax tree produced by the [`crate::parser::Parser`] and walked by the
//! resolver and interpreter.
//!
//! Both node families are closed sum types; every pass matches on them
//! directly.  Nodes own their children.  The only shared nodes are function
//! declarations, held through `Rc` so a function value can keep its body
//! alive after the statement list that defined it is dropped.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a variable‑access or assignment node.  Keys the interpreter's
/// table of resolved scope distances.  Ids are unique for the whole process
/// so separately parsed REPL lines never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix operator: `!ready`, `-42`, `+x`.
    Unary { operator: Token, right: Box<Expr> },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Variable read.
    Variable { id: ExprId, name: Token },

    /// `identifier "=" expression`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Call expression: `callee(arguments…)`.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// `fun (params) { body }` used as a value.
    AnonymousFunction(Rc<FunctionDecl>),
}

/// Parameters and body shared by named and anonymous functions.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// `None` for anonymous functions.
    pub name: Option<Token>,

    /// The `fun` keyword.
    pub keyword: Token,

    pub params: Vec<Token>,

    /// Statements of the body block.  Executed directly in the call frame,
    /// which already is the body's scope.
    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    pub fn display_name(&self) -> &str {
        self.name
            .as_ref()
            .map(|t| t.lexeme.as_str())
            .unwrap_or("anonymous")
    }
}

/// **Abstract‑Syntax‑Tree node** for *statements*.  A program is a sequence
/// of these returned by [`crate::parser::Parser::parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.  `for` loops are desugared into this as well.
    While { condition: Expr, body: Box<Stmt> },

    /// Named function declaration; `name` is always set.
    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },
}
