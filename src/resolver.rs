//! Static resolver pass.
//!
//! One walk over the program that
//! 1. tracks lexical scopes (a stack of `HashMap<String, Binding>`),
//! 2. reports static errors (reading a variable in its own initializer when
//!    no other binding is visible or when it re-declares a name already
//!    defined in the same scope, `return` outside a function),
//! 3. tells the interpreter, for every local variable occurrence, how many
//!    frames separate it from its declaration.
//!
//! Names found in no scope are left unresolved on purpose: the interpreter
//! treats them as globals and looks them up dynamically, so a function may
//! refer to a global that is only defined later (or on a later REPL line).

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;

/// Are we inside a function body?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
}

/// State of a name within one scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Binding {
    /// Declared; its initializer is being resolved.
    Declared,
    /// Like `Declared`, but the scope already held a defined binding of the
    /// same name, which the frame still holds while the initializer runs.
    Redeclared,
    /// Usable.
    Defined,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances by calling back into the interpreter.
pub struct Resolver<'i> {
    interpreter: &'i mut Interpreter,
    scopes: Vec<HashMap<String, Binding>>,
    /// Top‑level names declared so far in this run.
    globals: HashMap<String, Binding>,
    current_function: FunctionType,
    errors: Vec<LoxError>,
}

impl<'i> Resolver<'i> {
    pub fn new(interpreter: &'i mut Interpreter) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            scopes: Vec::new(),
            globals: HashMap::new(),
            current_function: FunctionType::None,
            errors: Vec::new(),
        }
    }

    /// Walk all top‑level statements and return every error found.  An
    /// empty list means the program may be executed.
    pub fn resolve(mut self, statements: &[Stmt]) -> Vec<LoxError> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.resolve_stmts(statements);

        info!("Resolve pass found {} error(s)", self.errors.len());
        self.errors
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(decl) => {
                // Bound before the body so the function can call itself.
                if let Some(name) = &decl.name {
                    debug!("Resolving function '{}'", name.lexeme);
                    self.declare(name);
                    self.define(name);
                }
                self.resolve_function(decl);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.errors.push(LoxError::resolve(
                        keyword,
                        "Can't return from top-level code.",
                    ));
                }
                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => self.resolve_read(*id, name),

            Expr::Assign { id, name, value } => {
                // Value first, then bind the target like a read would.
                self.resolve_expr(value);
                self.resolve_local(*id, name, 0);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::AnonymousFunction(decl) => self.resolve_function(decl),
        }
    }

    /// A read directly inside its own `var` initializer skips the
    /// half‑declared binding and must find another one further out.  When
    /// the declaration shadows a binding of the same scope there is nothing
    /// to skip to, so that read is always an error.
    fn resolve_read(&mut self, id: ExprId, name: &Token) {
        let state: Option<Binding> = match self.scopes.last() {
            Some(scope) => scope.get(&name.lexeme).copied(),
            None => self.globals.get(&name.lexeme).copied(),
        };

        match state {
            Some(Binding::Declared) => {
                let skip: usize = if self.scopes.is_empty() { 0 } else { 1 };

                if self.resolve_local(id, name, skip) || self.is_known_global(&name.lexeme) {
                    return;
                }
            }

            Some(Binding::Redeclared) => {}

            Some(Binding::Defined) | None => {
                self.resolve_local(id, name, 0);
                return;
            }
        }

        self.errors.push(LoxError::resolve(
            name,
            "Cannot use variable name in its own initializer.",
        ));
    }

    fn is_known_global(&self, name: &str) -> bool {
        self.globals.get(name) == Some(&Binding::Defined)
            || self.interpreter.is_global_defined(name)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Fresh scope for the parameters; the body statements share it, matching
    /// the single frame the interpreter creates per call.
    fn resolve_function(&mut self, decl: &FunctionDecl) {
        let enclosing: FunctionType = self.current_function;
        self.current_function = FunctionType::Function;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        match self.scopes.last_mut() {
            Some(scope) => {
                let state: Binding = match scope.get(&name.lexeme) {
                    Some(Binding::Defined) => Binding::Redeclared,
                    _ => Binding::Declared,
                };
                scope.insert(name.lexeme.clone(), state);
            }
            None => {
                // Re‑declaring a global keeps the old binding readable.
                let state: Binding = if self.interpreter.is_global_defined(&name.lexeme) {
                    Binding::Defined
                } else {
                    Binding::Declared
                };
                self.globals.entry(name.lexeme.clone()).or_insert(state);
            }
        }
    }

    fn define(&mut self, name: &Token) {
        match self.scopes.last_mut() {
            Some(scope) => scope.insert(name.lexeme.clone(), Binding::Defined),
            None => self.globals.insert(name.lexeme.clone(), Binding::Defined),
        };
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Search scopes innermost → outermost, ignoring the `skip` innermost
    /// ones.  On a hit, record the distance and return `true`; otherwise the
    /// name stays a global.
    fn resolve_local(&mut self, id: ExprId, name: &Token, skip: usize) -> bool {
        for (depth, scope) in self.scopes.iter().rev().enumerate().skip(skip) {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.resolve(id, depth);
                return true;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::scan_tokens;

    fn resolve_source(src: &str) -> (Interpreter, Vec<Stmt>, Vec<LoxError>) {
        let (tokens, _) = scan_tokens(src);
        let (stmts, parse_errors) = Parser::new(&tokens).parse();
        assert!(parse_errors.is_empty(), "{:?}", parse_errors);

        let mut interpreter = Interpreter::with_output(Box::new(std::io::sink()));
        let errors = Resolver::new(&mut interpreter).resolve(&stmts);

        (interpreter, stmts, errors)
    }

    fn print_target(stmt: &Stmt) -> ExprId {
        match stmt {
            Stmt::Print(Expr::Variable { id, .. }) => *id,
            other => panic!("expected print of a variable, got {:?}", other),
        }
    }

    #[test]
    fn globals_stay_unresolved() {
        let (interpreter, stmts, errors) = resolve_source("var a = 1; print a;");

        assert!(errors.is_empty());
        assert_eq!(interpreter.resolved_depth(print_target(&stmts[1])), None);
    }

    #[test]
    fn shadowing_local_resolves_to_nearest_scope() {
        let (interpreter, stmts, errors) =
            resolve_source("var a = 1; { var a = 2; { print a; } }");

        assert!(errors.is_empty());

        let Stmt::Block(outer) = &stmts[1] else {
            panic!("expected block");
        };
        let Stmt::Block(inner) = &outer[1] else {
            panic!("expected nested block");
        };

        assert_eq!(interpreter.resolved_depth(print_target(&inner[0])), Some(1));
    }

    #[test]
    fn self_reference_at_top_level_is_an_error() {
        let (_, _, errors) = resolve_source("var a = a;");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at 'a': Cannot use variable name in its own initializer."
        );
    }

    #[test]
    fn self_reference_in_block_reads_outer_binding() {
        let (interpreter, stmts, errors) =
            resolve_source("{ var a = 1; { var a = a + 1; } }");

        assert!(errors.is_empty());

        let Stmt::Block(outer) = &stmts[0] else {
            panic!("expected block");
        };
        let Stmt::Block(inner) = &outer[1] else {
            panic!("expected nested block");
        };
        let Stmt::Var {
            initializer: Some(Expr::Binary { left, .. }),
            ..
        } = &inner[0]
        else {
            panic!("expected var with binary initializer");
        };
        let Expr::Variable { id, .. } = left.as_ref() else {
            panic!("expected variable operand");
        };

        assert_eq!(interpreter.resolved_depth(*id), Some(1));
    }

    #[test]
    fn self_reference_in_block_without_outer_binding_is_an_error() {
        let (_, _, errors) = resolve_source("{ var b = b; }");

        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn redeclared_global_may_read_previous_value() {
        let (_, _, errors) = resolve_source("var a = 1; var a = a;");

        assert!(errors.is_empty());
    }

    #[test]
    fn redeclared_parameter_read_in_initializer_is_an_error() {
        for src in [
            "fun f(a) { var a = a; }",
            "var a = \"global\"; fun f(a) { var a = a; }",
        ] {
            let (_, _, errors) = resolve_source(src);

            assert_eq!(errors.len(), 1, "{}", src);
            assert!(errors[0].to_string().contains("own initializer"), "{}", src);
        }
    }

    #[test]
    fn redeclared_block_local_read_in_initializer_is_an_error() {
        for src in [
            "{ var a = 1; var a = a; }",
            "var a = 0; { var a = 1; var a = a; }",
            "{ var a = 0; { var a = 1; var a = a; } }",
        ] {
            let (_, _, errors) = resolve_source(src);

            assert_eq!(errors.len(), 1, "{}", src);
        }
    }

    #[test]
    fn redeclared_block_local_without_self_read_is_fine() {
        let (_, _, errors) = resolve_source("{ var a = 1; var a = 2; print a; }");

        assert!(errors.is_empty());
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let (_, _, errors) = resolve_source("return 1;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("top-level"));
    }

    #[test]
    fn recursive_anonymous_function_in_block_is_allowed() {
        let (_, _, errors) =
            resolve_source("{ var f = fun (n) { if (n > 0) return f(n - 1); return n; }; }");

        assert!(errors.is_empty());
    }

    #[test]
    fn parameters_resolve_at_depth_zero() {
        let (interpreter, stmts, errors) = resolve_source("fun f(x) { print x; }");

        assert!(errors.is_empty());

        let Stmt::Function(decl) = &stmts[0] else {
            panic!("expected function");
        };
        assert_eq!(interpreter.resolved_depth(print_target(&decl.body[0])), Some(0));
    }
}
