//! Tree-walking evaluator for Rubel scripts.
//!
//! The interpreter borrows the [`Script`] for its whole life: procedure
//! objects point into the AST instead of copying it. Every statement returns
//! a [`Flow`] so `break` and `return` travel outward explicitly until a loop
//! or a call consumes them; failures travel as [`RuntimeError`] and abandon
//! the run at the top-level statement that raised them.

use log::{debug, info};

use crate::ast::{Expr, Literal, Script, Stmt};
use crate::environment::{Variable, VAR_ENV_SIZE};
use crate::error::{Result, RubelError, RunResult, RunStatus, RuntimeError};
use crate::function::{FuncArgs, FuncBody, FuncEnv, FuncGroup, FuncObj, FUNC_GROUP_SIZE};
use crate::natives;
use crate::scope::{ScopeStack, DEFAULT_SCOPE_DEPTH};
use crate::value::{ListObj, StringObj, Value};

/// Sizing knobs for one interpreter context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of simultaneously active scopes, global included.
    /// Every call and every `if`/`while` body occupies one slot.
    pub scope_depth: usize,

    /// Bucket count of each scope's environment.
    pub env_buckets: usize,

    /// Bucket count of each function group.
    pub group_buckets: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            scope_depth: DEFAULT_SCOPE_DEPTH,
            env_buckets: VAR_ENV_SIZE,
            group_buckets: FUNC_GROUP_SIZE,
        }
    }
}

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Continue with the next statement.
    Normal,

    /// Leave the innermost loop.
    Break,

    /// Leave the current procedure with a value.
    Return(Value),
}

/// Runtime context: scopes, function registry and last status.
pub struct Interpreter<'a> {
    script: &'a Script,
    config: RuntimeConfig,
    scopes: ScopeStack,
    funcs: FuncEnv<'a>,
    status: RunStatus,
}

impl<'a> Interpreter<'a> {
    pub fn new(script: &'a Script) -> Self {
        Self::with_config(script, RuntimeConfig::default())
    }

    pub fn with_config(script: &'a Script, config: RuntimeConfig) -> Self {
        info!(
            "Initializing interpreter for '{}' ({} statements, {:?})",
            script.name,
            script.len(),
            config
        );

        let script_group = FuncGroup::new(script.name.clone(), config.group_buckets);

        Interpreter {
            script,
            config,
            scopes: ScopeStack::with_global(config.scope_depth, config.env_buckets),
            funcs: FuncEnv::new(script_group),
            status: RunStatus::Idle,
        }
    }

    // ───────────────────────── accessors ──────────────────────────

    #[inline]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    #[inline]
    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    #[inline]
    pub fn script(&self) -> &'a Script {
        self.script
    }

    #[inline]
    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    #[inline]
    pub fn functions(&self) -> &FuncEnv<'a> {
        &self.funcs
    }

    /// Value currently bound to `name`, searched from the top scope.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.lookup(name).map(Variable::value)
    }

    // ───────────────────────── driver API ─────────────────────────

    /// Register a function group. It stays invisible until a script runs
    /// `use "<name>"`.
    pub fn load_native_group(&mut self, mut group: FuncGroup<'a>) -> RunResult<()> {
        info!("Loading function group '{}'", group.name());

        group.set_used(false);
        self.funcs.append(group)
    }

    /// Register `io`, `lists` and `strings`.
    pub fn load_standard_groups(&mut self) -> RunResult<()> {
        for group in natives::standard_groups(self.config.group_buckets)? {
            self.load_native_group(group)?;
        }

        Ok(())
    }

    /// Execute every top-level statement in order, stopping at the first
    /// failure.
    pub fn run(&mut self) -> Result<()> {
        let script: &'a Script = self.script;

        info!("Running '{}'", script.name);

        for (index, stmt) in script.statements.iter().enumerate() {
            debug!("Top-level statement {}", index);

            let escaped = match self.execute(stmt) {
                Ok(Flow::Normal) => continue,
                Ok(Flow::Break) => RuntimeError::general("'break' outside of a loop"),
                Ok(Flow::Return(_)) => RuntimeError::general("'return' outside of a procedure"),
                Err(e) => e,
            };

            self.status = escaped.status();

            return Err(RubelError::runtime(index, escaped));
        }

        self.status = RunStatus::Ended;

        info!("Run of '{}' completed", script.name);

        Ok(())
    }

    /// Release every scope. The context cannot run statements afterwards.
    pub fn dispose(&mut self) {
        debug!("Disposing interpreter for '{}'", self.script.name);

        self.scopes.destroy();
        self.status = RunStatus::Ended;
    }

    // ───────────────────────── statements ─────────────────────────

    /// Execute one statement and record its status.
    pub fn execute(&mut self, stmt: &'a Stmt) -> RunResult<Flow> {
        let outcome = self.exec_stmt(stmt);

        self.status = match &outcome {
            Ok(Flow::Normal) if matches!(stmt, Stmt::Expression(e) if !e.is_call()) => {
                RunStatus::UnusedValue
            }
            Ok(Flow::Normal) => RunStatus::RanCommand,
            Ok(Flow::Break) => RunStatus::Break,
            Ok(Flow::Return(_)) => RunStatus::Return,
            Err(e) => {
                debug!("Statement failed: {}", e);
                e.status()
            }
        };

        outcome
    }

    fn exec_stmt(&mut self, stmt: &'a Stmt) -> RunResult<Flow> {
        match stmt {
            Stmt::ModuleDecl(name) => {
                debug!("Module declaration '{}'", name);

                Err(RuntimeError::no_impl(format!(
                    "Module declarations are not supported ('{}')",
                    name
                )))
            }

            Stmt::ModuleUse(name) => {
                debug!("Using module '{}'", name);

                self.funcs.use_group(name)?;
                Ok(Flow::Normal)
            }

            Stmt::VarDecl {
                name,
                is_const,
                initializer,
            } => {
                debug!("Declaring '{}' (const={})", name, is_const);

                // Checked before the initializer runs.
                self.scopes.check_undeclared(name)?;

                let value = self.eval_value(initializer)?;

                self.scopes
                    .bind(Variable::new(name.as_str(), *is_const, value))?;

                Ok(Flow::Normal)
            }

            Stmt::VarAssign { name, value } => {
                debug!("Assigning '{}'", name);

                self.assign(name, value)?;
                Ok(Flow::Normal)
            }

            Stmt::FuncDecl { name, params, body } => {
                debug!("Declaring proc '{}'/{}", name, params.len());

                self.funcs
                    .script_group_mut()
                    .put(FuncObj::ast(name, params, body))?;

                Ok(Flow::Normal)
            }

            Stmt::Block(stmts) => self.exec_scoped(stmts),

            Stmt::If {
                condition,
                then_block,
                otherwise,
            } => {
                if self.condition(condition)? {
                    self.exec_scoped(then_block)
                } else if let Some(otherwise) = otherwise {
                    self.exec_scoped(otherwise)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.condition(condition)? {
                    match self.exec_scoped(body)? {
                        Flow::Normal => {}
                        Flow::Break => {
                            debug!("Loop broken");
                            break;
                        }
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Break => Ok(Flow::Break),

            Stmt::Return(expr) => {
                let value = self.eval_value(expr)?;

                debug!("Returning {}", value);

                Ok(Flow::Return(value))
            }

            Stmt::Expression(expr) if expr.is_call() => {
                // Result, if any, is dropped here.
                self.eval(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Expression(expr) => {
                info!("Skipping unused expression: {:?}", expr);

                Ok(Flow::Normal)
            }
        }
    }

    fn assign(&mut self, name: &str, expr: &'a Expr) -> RunResult<()> {
        match self.scopes.lookup(name) {
            None => {
                return Err(RuntimeError::no_impl(format!(
                    "Undefined variable '{}'",
                    name
                )))
            }
            Some(var) if var.is_const() => {
                return Err(RuntimeError::general(format!(
                    "Cannot assign to constant '{}'",
                    name
                )))
            }
            Some(_) => {}
        }

        let value = self.eval_value(expr)?;

        let var = self
            .scopes
            .lookup_mut(name)
            .ok_or_else(|| RuntimeError::no_impl(format!("Undefined variable '{}'", name)))?;

        if var.value().data_type() != value.data_type() {
            return Err(RuntimeError::type_error(format!(
                "Cannot assign a {} to '{}', which holds a {}",
                value.data_type(),
                name,
                var.value().data_type()
            )));
        }

        var.replace(value);

        Ok(())
    }

    /// Run `stmts` in order, stopping at the first `break` or `return`.
    fn exec_block(&mut self, stmts: &'a [Stmt]) -> RunResult<Flow> {
        for stmt in stmts {
            match self.execute(stmt)? {
                Flow::Normal => {}
                signal => return Ok(signal),
            }
        }

        Ok(Flow::Normal)
    }

    /// Run `stmts` inside a fresh child scope.
    fn exec_scoped(&mut self, stmts: &'a [Stmt]) -> RunResult<Flow> {
        self.scopes.enter()?;

        let flow = self.exec_block(stmts);

        self.scopes.pop()?;

        flow
    }

    fn condition(&mut self, expr: &'a Expr) -> RunResult<bool> {
        let value = self.eval_value(expr)?;

        value.as_bool().ok_or_else(|| {
            RuntimeError::type_error(format!(
                "Condition must be a boolean, found {}",
                value.data_type()
            ))
        })
    }

    // ───────────────────────── expressions ────────────────────────

    /// Evaluate `expr`. `Ok(None)` is "no result" from a call or an
    /// out-of-range index.
    pub fn evaluate(&mut self, expr: &'a Expr) -> RunResult<Option<Value>> {
        let outcome = self.eval(expr);

        if let Err(e) = &outcome {
            self.status = e.status();
        }

        outcome
    }

    fn eval(&mut self, expr: &'a Expr) -> RunResult<Option<Value>> {
        match expr {
            Expr::Literal(literal) => Ok(Some(literal_value(literal, true))),

            Expr::Variable(name) => {
                let var = self.scopes.lookup(name).ok_or_else(|| {
                    RuntimeError::no_impl(format!("Undefined variable '{}'", name))
                })?;

                Ok(Some(var.value().clone()))
            }

            Expr::Call { name, args } => self.call(name, args),

            Expr::Unary { op, operand } => {
                let operand = self.eval_value(operand)?;

                operand.unary(*op).map(Some)
            }

            Expr::Binary { op, left, right } => {
                let lhs = self.eval_value(left)?;
                let rhs = self.eval_value(right)?;

                debug!("Binary {} {} {}", lhs, op, rhs);

                lhs.binary(*op, &rhs).map(Some)
            }

            Expr::Index { target, index } => {
                let target = self.eval_value(target)?;
                let index = self.eval_value(index)?;

                target.index(&index)
            }
        }
    }

    /// Evaluate `expr`, treating "no result" as a failure.
    fn eval_value(&mut self, expr: &'a Expr) -> RunResult<Value> {
        self.eval(expr)?
            .ok_or_else(|| RuntimeError::null_value("Expression yielded no value"))
    }

    /// Resolve and invoke `name` with `args` evaluated in the caller's scope.
    fn call(&mut self, name: &str, args: &'a [Expr]) -> RunResult<Option<Value>> {
        let func = self
            .funcs
            .resolve(name)
            .ok_or_else(|| RuntimeError::no_impl(format!("Unknown function '{}'", name)))?;

        if args.len() != func.arity() {
            return Err(RuntimeError::no_impl(format!(
                "'{}' expects {} argument(s), got {}",
                name,
                func.arity(),
                args.len()
            )));
        }

        let mut values: Vec<Value> = Vec::with_capacity(args.len());

        for arg in args {
            let mut value = self.eval_value(arg)?;
            value.set_const(false);
            values.push(value);
        }

        debug!("Calling '{}' with {} argument(s)", name, values.len());

        match func.body() {
            FuncBody::Native(native) => Ok(native(&FuncArgs::new(values))),

            FuncBody::Ast { params, body } => {
                let mut frame = self.scopes.child();

                for (param, value) in params.iter().zip(values) {
                    frame.bind(Variable::new(param.as_str(), false, value));
                }

                self.scopes.push(frame)?;

                let flow = self.exec_block(body);

                self.scopes.pop()?;

                match flow? {
                    Flow::Normal => Ok(None),
                    Flow::Return(value) => Ok(Some(value)),
                    Flow::Break => Err(RuntimeError::general(format!(
                        "'break' escaped procedure '{}'",
                        name
                    ))),
                }
            }
        }
    }
}

impl Drop for Interpreter<'_> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Fresh value for a parsed literal.
pub fn literal_value(literal: &Literal, is_const: bool) -> Value {
    match literal {
        Literal::Bool(b) => Value::bool(is_const, *b),
        Literal::Int(n) => Value::int(is_const, *n),
        Literal::Real(n) => Value::real(is_const, *n),
        Literal::Str(s) => Value::str(is_const, StringObj::new(s.as_str())),
        Literal::List(items) => Value::list(
            is_const,
            items
                .iter()
                .map(|item| literal_value(item, is_const))
                .collect::<ListObj>(),
        ),
    }
}
