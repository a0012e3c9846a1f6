use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};

/// Debug printer rendering the tree in parenthesised prefix form, e.g.
/// `(+ 1.0 (group (* 2.0 3.0)))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print(left),
                self.print(right)
            ),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print(right))
            }

            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                LiteralValue::Str(s) => s.to_string(),

                LiteralValue::True => "true".to_string(),

                LiteralValue::False => "false".to_string(),

                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Grouping(expr) => format!("(group {})", self.print(expr)),

            Expr::Variable { name, .. } => name.lexeme.to_string(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out: String = format!("(call {}", self.print(callee));
                for arg in arguments {
                    out.push(' ');
                    out.push_str(&self.print(arg));
                }
                out.push(')');
                out
            }

            Expr::AnonymousFunction(decl) => self.function("fun", decl),
        }
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", self.print(expr)),

            Stmt::Print(expr) => format!("(print {})", self.print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, self.print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => format!("(block{})", self.stmts(statements)),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch),
                    self.print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                self.print(condition),
                self.print_stmt(body)
            ),

            Stmt::Function(decl) => self.function("fun", decl),

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", self.print(value)),
                None => "(return)".to_string(),
            },
        }
    }

    fn function(&self, head: &str, decl: &FunctionDecl) -> String {
        let params: Vec<&str> = decl.params.iter().map(|p| p.lexeme.as_str()).collect();

        let name: String = decl
            .name
            .as_ref()
            .map(|n| format!(" {}", n.lexeme))
            .unwrap_or_default();

        format!(
            "({}{} ({}){})",
            head,
            name,
            params.join(" "),
            self.stmts(&decl.body)
        )
    }

    fn stmts(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|s| format!(" {}", self.print_stmt(s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::scan_tokens;

    fn print_program(src: &str) -> Vec<String> {
        let (tokens, _) = scan_tokens(src);
        let (stmts, errors) = Parser::new(&tokens).parse();
        assert!(errors.is_empty());

        stmts.iter().map(|s| AstPrinter.print_stmt(s)).collect()
    }

    #[test]
    fn prints_nested_arithmetic() {
        assert_eq!(
            print_program("-123 * (45.67);"),
            vec!["(; (* (- 123.0) (group 45.67)))"]
        );
    }

    #[test]
    fn prints_desugared_for() {
        assert_eq!(
            print_program("for (var i = 0; i < 2; i = i + 1) print i;"),
            vec!["(block (var i 0.0) (while (< i 2.0) (block (print i) (; (= i (+ i 1.0))))))"]
        );
    }

    #[test]
    fn prints_functions() {
        assert_eq!(
            print_program("fun add(a, b) { return a + b; }"),
            vec!["(fun add (a b) (return (+ a b)))"]
        );
    }
}
