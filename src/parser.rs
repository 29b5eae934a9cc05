/*!
Recursive‑descent parser for Rubel.

Every token is consumed once, so parsing is Θ(n) in the number of tokens;
call‑stack depth grows with syntactic nesting only. The first syntax error
aborts the parse and is returned with its line number.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `statement`, `block`         | `debug`| High‑level descent into grammar branches. |
| Error paths (`consume`, etc.)| `debug`| Context before returning structured error.|

--------------------------------------------------------------------------------
Grammar
--------------------------------------------------------------------------------

```text
script     → statement* EOF ;
statement  → useStmt | moduleStmt | varDecl | procDecl | ifStmt
           | whileStmt | "break" | returnStmt | assignment | expression ;
useStmt    → "use" ( STRING | IDENT ) ;
moduleStmt → "module" ( STRING | IDENT ) ;
varDecl    → ( "let" | "const" ) IDENT "=" expression ;
procDecl   → "proc" IDENT "(" parameters? ")" block ;
ifStmt     → "if" expression block ( "otherwise" block )? ;
whileStmt  → "while" expression block ;
returnStmt → "return" expression ;
assignment → IDENT "=" expression ;
block      → statement* "end" ;
parameters → IDENT ( "," IDENT )* ;
expression → equality ;
equality   → comparison ( ( "!=" | "==" ) comparison )* ;
comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term       → factor ( ( "-" | "+" ) factor )* ;
factor     → unary ( ( "/" | "*" ) unary )* ;
unary      → "-" unary | postfix ;
postfix    → primary ( "[" expression "]" )* ;
primary    → BOOLEAN | INTEGER | REAL | STRING | list
           | IDENT ( "(" arguments? ")" )? | "(" expression ")" ;
arguments  → expression ( "," expression )* ;
list       → "[" ( element ( "," element )* )? "]" ;
element    → BOOLEAN | "-"? INTEGER | "-"? REAL | STRING | list ;
```

`break` is accepted only inside a `while` body and `return` only inside a
`proc` body.
*/

use crate::ast::{BinaryOp, Expr, Literal, Script, Stmt, UnaryOp};
use crate::error::{Result, RubelError};
use crate::scanner::Scanner;
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Maximum number of parameters or call arguments.
pub const MAX_ARITY: usize = 255;

/// Top‑level parser over an immutable slice of tokens.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
    loop_depth: usize,
    proc_depth: usize,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            loop_depth: 0,
            proc_depth: 0,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program into a [`Script`] called `name`.
    pub fn parse(&mut self, name: &str) -> Result<Script> {
        info!("Beginning parse phase");

        if self.tokens.is_empty() {
            return Err(RubelError::parse(0, "Empty token stream"));
        }

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            statements.push(self.statement()?);
        }

        info!("Parsed {} top-level statement(s)", statements.len());

        Ok(Script::new(name, statements))
    }

    /// Parse a single expression followed by EOF.
    pub fn parse_expression(&mut self) -> Result<Expr> {
        if self.tokens.is_empty() {
            return Err(RubelError::parse(0, "Empty token stream"));
        }

        let expr = self.expression()?;

        if !self.is_at_end() {
            return Err(RubelError::parse(
                self.peek().line,
                format!("Unexpected '{}' after expression", self.peek().lexeme),
            ));
        }

        Ok(expr)
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        debug!("Entering statement at line {}", self.peek().line);

        if self.matches(TokenType::USE) {
            Ok(Stmt::ModuleUse(self.module_name("use")?))
        } else if self.matches(TokenType::MODULE) {
            Ok(Stmt::ModuleDecl(self.module_name("module")?))
        } else if self.matches(TokenType::LET) {
            self.var_declaration(false)
        } else if self.matches(TokenType::CONST) {
            self.var_declaration(true)
        } else if self.matches(TokenType::PROC) {
            self.procedure()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::BREAK) {
            self.break_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.check(TokenType::IDENTIFIER) && self.check_next(TokenType::EQUAL) {
            self.assignment()
        } else {
            Ok(Stmt::Expression(self.expression()?))
        }
    }

    fn module_name(&mut self, keyword: &str) -> Result<String> {
        let token = self.advance();

        match &token.token_type {
            TokenType::STRING(s) => Ok(s.clone()),
            TokenType::IDENTIFIER => Ok(token.lexeme.to_string()),
            _ => {
                debug!("Bad module name token: {:?}", token.token_type);

                Err(RubelError::parse(
                    token.line,
                    format!("Expected module name after '{}'", keyword),
                ))
            }
        }
    }

    fn var_declaration(&mut self, is_const: bool) -> Result<Stmt> {
        let name: &Token<'_> = self.consume(TokenType::IDENTIFIER, "Expected variable name")?;

        self.consume(TokenType::EQUAL, "Expected '=' after variable name")?;

        let initializer: Expr = self.expression()?;

        Ok(Stmt::VarDecl {
            name: name.lexeme.to_string(),
            is_const,
            initializer,
        })
    }

    fn assignment(&mut self) -> Result<Stmt> {
        let name: &Token<'_> = self.advance();

        self.consume(TokenType::EQUAL, "Expected '=' in assignment")?;

        let value: Expr = self.expression()?;

        Ok(Stmt::VarAssign {
            name: name.lexeme.to_string(),
            value,
        })
    }

    fn procedure(&mut self) -> Result<Stmt> {
        let name: &Token<'_> = self.consume(TokenType::IDENTIFIER, "Expected procedure name")?;

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after procedure name")?;

        let mut params: Vec<String> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    return Err(RubelError::parse(
                        name.line,
                        "Cannot have more than 255 parameters",
                    ));
                }

                let param = self.consume(TokenType::IDENTIFIER, "Expected parameter name")?;

                if params.iter().any(|p| p == param.lexeme) {
                    return Err(RubelError::parse(
                        param.line,
                        format!("Duplicate parameter '{}'", param.lexeme),
                    ));
                }

                params.push(param.lexeme.to_string());

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters")?;

        // A procedure body starts outside of any loop.
        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.proc_depth += 1;

        let body = self.block();

        self.proc_depth -= 1;
        self.loop_depth = saved_loops;

        Ok(Stmt::FuncDecl {
            name: name.lexeme.to_string(),
            params,
            body: body?,
        })
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        let condition: Expr = self.expression()?;
        let then_block: Vec<Stmt> = self.block()?;

        let otherwise: Option<Vec<Stmt>> = if self.matches(TokenType::OTHERWISE) {
            Some(self.block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_block,
            otherwise,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        let condition: Expr = self.expression()?;

        self.loop_depth += 1;
        let body = self.block();
        self.loop_depth -= 1;

        Ok(Stmt::While {
            condition,
            body: body?,
        })
    }

    fn break_statement(&mut self) -> Result<Stmt> {
        if self.loop_depth == 0 {
            return Err(RubelError::parse(
                self.previous().line,
                "'break' outside of a loop",
            ));
        }

        Ok(Stmt::Break)
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword: &Token<'_> = self.previous();

        if self.proc_depth == 0 {
            return Err(RubelError::parse(keyword.line, "'return' outside of a proc"));
        }

        Ok(Stmt::Return(self.expression()?))
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        debug!("Entering block at line {}", self.peek().line);

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::END) && !self.is_at_end() {
            statements.push(self.statement()?);
        }

        self.consume(TokenType::END, "Expected 'end' after block")?;

        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Expr> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.comparison()?;

        loop {
            let op = if self.matches(TokenType::BANG_EQUAL) {
                BinaryOp::Neq
            } else if self.matches(TokenType::EQUAL_EQUAL) {
                BinaryOp::Eq
            } else {
                break;
            };

            let right: Expr = self.comparison()?;
            expr = binary(op, expr, right);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.term()?;

        loop {
            let op = if self.matches(TokenType::GREATER) {
                BinaryOp::Gt
            } else if self.matches(TokenType::GREATER_EQUAL) {
                BinaryOp::Gte
            } else if self.matches(TokenType::LESS) {
                BinaryOp::Lt
            } else if self.matches(TokenType::LESS_EQUAL) {
                BinaryOp::Lte
            } else {
                break;
            };

            let right: Expr = self.term()?;
            expr = binary(op, expr, right);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.factor()?;

        loop {
            let op = if self.matches(TokenType::MINUS) {
                BinaryOp::Sub
            } else if self.matches(TokenType::PLUS) {
                BinaryOp::Add
            } else {
                break;
            };

            let right: Expr = self.factor()?;
            expr = binary(op, expr, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.unary()?;

        loop {
            let op = if self.matches(TokenType::STAR) {
                BinaryOp::Mul
            } else if self.matches(TokenType::SLASH) {
                BinaryOp::Div
            } else {
                break;
            };

            let right: Expr = self.unary()?;
            expr = binary(op, expr, right);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.matches(TokenType::MINUS) {
            let operand: Expr = self.unary()?;

            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }

        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        while self.matches(TokenType::LEFT_BRACKET) {
            let index: Expr = self.expression()?;

            self.consume(TokenType::RIGHT_BRACKET, "Expected ']' after index")?;

            expr = Expr::Index {
                target: Box::new(expr),
                index: Box::new(index),
            };
        }

        Ok(expr)
    }

    fn finish_call(&mut self, name: &Token<'a>) -> Result<Expr> {
        let mut args: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if args.len() >= MAX_ARITY {
                    return Err(RubelError::parse(
                        self.peek().line,
                        "Cannot have more than 255 arguments",
                    ));
                }

                args.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments")?;

        Ok(Expr::Call {
            name: name.lexeme.to_string(),
            args,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.check(TokenType::LEFT_BRACKET) {
            return Ok(Expr::Literal(self.list_literal()?));
        }

        if self.matches(TokenType::IDENTIFIER) {
            let name: &Token<'a> = self.previous();

            if self.matches(TokenType::LEFT_PAREN) {
                return self.finish_call(name);
            }

            return Ok(Expr::Variable(name.lexeme.to_string()));
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr = self.expression()?;

            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression")?;

            return Ok(expr);
        }

        if let Some(literal) = self.scalar_literal() {
            self.advance();
            return Ok(Expr::Literal(literal));
        }

        debug!("No expression at token {:?}", self.peek().token_type);

        Err(RubelError::parse(
            self.peek().line,
            format!("Expected expression, found '{}'", self.peek().lexeme),
        ))
    }

    /// Literal carried by the current token, if it is a scalar literal.
    fn scalar_literal(&self) -> Option<Literal> {
        match &self.peek().token_type {
            TokenType::BOOLEAN(b) => Some(Literal::Bool(*b)),
            TokenType::INTEGER(n) => Some(Literal::Int(*n)),
            TokenType::REAL(n) => Some(Literal::Real(*n)),
            TokenType::STRING(s) => Some(Literal::Str(s.clone())),
            _ => None,
        }
    }

    fn list_literal(&mut self) -> Result<Literal> {
        self.consume(TokenType::LEFT_BRACKET, "Expected '['")?;

        let mut items: Vec<Literal> = Vec::new();

        if !self.check(TokenType::RIGHT_BRACKET) {
            loop {
                items.push(self.list_element()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_BRACKET, "Expected ']' after list items")?;

        Ok(Literal::List(items))
    }

    fn list_element(&mut self) -> Result<Literal> {
        if self.check(TokenType::LEFT_BRACKET) {
            return self.list_literal();
        }

        if self.matches(TokenType::MINUS) {
            let line = self.previous().line;

            return match self.scalar_literal() {
                Some(Literal::Int(n)) => {
                    self.advance();
                    n.checked_neg()
                        .map(Literal::Int)
                        .ok_or_else(|| RubelError::parse(line, "Integer literal out of range"))
                }
                Some(Literal::Real(n)) => {
                    self.advance();
                    Ok(Literal::Real(-n))
                }
                _ => Err(RubelError::parse(line, "Expected number after '-'")),
            };
        }

        match self.scalar_literal() {
            Some(literal) => {
                self.advance();
                Ok(literal)
            }
            None => Err(RubelError::parse(
                self.peek().line,
                format!("Expected literal list item, found '{}'", self.peek().lexeme),
            )),
        }
    }

    // ────────────────────── utility helpers ───────────────────────

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<&'a Token<'a>> {
        if self.check(ttype) {
            return Ok(self.advance());
        }

        debug!(
            "consume failed: {} (found {:?})",
            message,
            self.peek().token_type
        );

        Err(RubelError::parse(
            self.peek().line,
            format!("{}, found '{}'", message, self.peek().lexeme),
        ))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn check_next(&self, ttype: TokenType) -> bool {
        match self.tokens.get(self.current + 1) {
            Some(token) => token.token_type == ttype,
            None => false,
        }
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token<'a> {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token<'a> {
        let last = self.tokens.len() - 1;
        &self.tokens[self.current.min(last)]
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token<'a> {
        &self.tokens[self.current.saturating_sub(1)]
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Scan and parse `source` into a [`Script`] called `name`.
pub fn parse_source(name: &str, source: &str) -> Result<Script> {
    let tokens: Vec<Token<'_>> = Scanner::new(source).scan_all()?;

    Parser::new(&tokens).parse(name)
}
