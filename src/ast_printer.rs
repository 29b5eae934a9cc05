use crate::ast::{Expr, Literal, Script, Stmt};

/// Renders AST nodes in parenthesised prefix form.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Literal(lit) => Self::literal(lit),

            Expr::Variable(name) => name.clone(),

            Expr::Unary { op, operand } => format!("({} {})", op, Self::print(operand)),

            Expr::Binary { op, left, right } => format!(
                "({} {} {})",
                op,
                Self::print(left),
                Self::print(right)
            ),

            Expr::Index { target, index } => {
                format!("(index {} {})", Self::print(target), Self::print(index))
            }

            Expr::Call { name, args } => {
                let mut s = format!("(call {}", name);
                for arg in args {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }
        }
    }

    pub fn literal(lit: &Literal) -> String {
        match lit {
            Literal::Bool(true) => "$T".into(),

            Literal::Bool(false) => "$F".into(),

            Literal::Int(n) => {
                let mut buf = itoa::Buffer::new();
                buf.format(*n).to_string()
            }

            Literal::Real(n) => {
                if n.fract() == 0.0 {
                    format!("{:.1}", n)
                } else {
                    n.to_string()
                }
            }

            Literal::Str(s) => format!("\"{}\"", s),

            Literal::List(items) => {
                let inner: Vec<String> = items.iter().map(Self::literal).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }

    pub fn statement(stmt: &Stmt) -> String {
        match stmt {
            Stmt::ModuleDecl(name) => format!("(module \"{}\")", name),

            Stmt::ModuleUse(name) => format!("(use \"{}\")", name),

            Stmt::VarDecl {
                name,
                is_const,
                initializer,
            } => format!(
                "({} {} {})",
                if *is_const { "const" } else { "let" },
                name,
                Self::print(initializer)
            ),

            Stmt::VarAssign { name, value } => format!("(= {} {})", name, Self::print(value)),

            Stmt::FuncDecl { name, params, body } => format!(
                "(proc {} ({}) {})",
                name,
                params.join(" "),
                Self::block(body)
            ),

            Stmt::Block(stmts) => Self::block(stmts),

            Stmt::If {
                condition,
                then_block,
                otherwise,
            } => match otherwise {
                Some(otherwise) => format!(
                    "(if {} {} {})",
                    Self::print(condition),
                    Self::block(then_block),
                    Self::block(otherwise)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print(condition),
                    Self::block(then_block)
                ),
            },

            Stmt::While { condition, body } => {
                format!("(while {} {})", Self::print(condition), Self::block(body))
            }

            Stmt::Break => "(break)".into(),

            Stmt::Return(expr) => format!("(return {})", Self::print(expr)),

            Stmt::Expression(expr) => Self::print(expr),
        }
    }

    fn block(stmts: &[Stmt]) -> String {
        let mut s = String::from("(block");
        for stmt in stmts {
            s.push(' ');
            s.push_str(&Self::statement(stmt));
        }
        s.push(')');
        s
    }

    /// One line per top-level statement.
    pub fn script(script: &Script) -> String {
        script
            .statements
            .iter()
            .map(Self::statement)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
