//! Lexical scopes and the bounded stack of active scopes.
//!
//! Scopes live in the stack itself; a scope's parent is the stack slot of
//! its enclosing frame, which is always below it. The bottom slot is the
//! global scope and has no parent.

use log::debug;

use crate::environment::{Environment, Variable};
use crate::error::{RunResult, RuntimeError};

/// Default capacity of the scope stack.
pub const DEFAULT_SCOPE_DEPTH: usize = 128;

/// One lexical frame.
#[derive(Debug, Clone)]
pub struct Scope {
    env: Environment,
    parent: Option<usize>,
}

impl Scope {
    pub fn new(parent: Option<usize>, buckets: usize) -> Self {
        Scope {
            env: Environment::with_buckets(buckets),
            parent,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Bind `var` here without a redeclaration check; see
    /// [`ScopeStack::define`] for the checked form.
    pub fn bind(&mut self, var: Variable) {
        self.env.put(var);
    }

    #[inline]
    pub fn contains_local(&self, name: &str) -> bool {
        self.env.contains(name)
    }

    /// Binding local to this frame.
    #[inline]
    pub fn get_local(&self, name: &str) -> Option<&Variable> {
        self.env.get(name)
    }
}

/// Bounded stack of active scopes.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    capacity: usize,
    env_buckets: usize,
}

impl ScopeStack {
    pub fn new(capacity: usize, env_buckets: usize) -> Self {
        ScopeStack {
            scopes: Vec::with_capacity(capacity),
            capacity,
            env_buckets,
        }
    }

    /// Stack holding only the global scope. `capacity` is raised to one if
    /// needed so the global scope always fits.
    pub fn with_global(capacity: usize, env_buckets: usize) -> Self {
        let mut stack = Self::new(capacity.max(1), env_buckets);

        stack.scopes.push(Scope::new(None, env_buckets));

        stack
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Stack slot of the current scope.
    #[inline]
    pub fn top_index(&self) -> Option<usize> {
        self.scopes.len().checked_sub(1)
    }

    pub fn top(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    /// Fresh, unpushed scope whose parent is the current top.
    pub fn child(&self) -> Scope {
        Scope::new(self.top_index(), self.env_buckets)
    }

    /// Push `scope`. Fails without growing once `capacity` scopes are active.
    pub fn push(&mut self, scope: Scope) -> RunResult<()> {
        if self.scopes.len() >= self.capacity {
            debug!("Scope stack overflow at depth {}", self.scopes.len());

            return Err(RuntimeError::general(format!(
                "Scope stack overflow (limit {})",
                self.capacity
            )));
        }

        if let Some(parent) = scope.parent {
            if parent >= self.scopes.len() {
                return Err(RuntimeError::memory(format!(
                    "Parent scope {} is not active",
                    parent
                )));
            }
        }

        self.scopes.push(scope);

        debug!("Pushed scope, depth={}", self.scopes.len());

        Ok(())
    }

    /// Push a fresh child of the current top.
    pub fn enter(&mut self) -> RunResult<()> {
        let scope = self.child();
        self.push(scope)
    }

    pub fn pop(&mut self) -> RunResult<Scope> {
        let scope = self
            .scopes
            .pop()
            .ok_or_else(|| RuntimeError::memory("Pop from an empty scope stack"))?;

        debug!("Popped scope, depth={}", self.scopes.len());

        Ok(scope)
    }

    /// Pop and drop every remaining scope.
    pub fn destroy(&mut self) {
        debug!("Destroying {} scope(s)", self.scopes.len());

        while self.scopes.pop().is_some() {}
    }

    /// Fails if `name` is already bound in the current scope.
    pub fn check_undeclared(&self, name: &str) -> RunResult<()> {
        let scope = self
            .top()
            .ok_or_else(|| RuntimeError::memory("No active scope"))?;

        if scope.contains_local(name) {
            return Err(RuntimeError::general(format!(
                "Variable '{}' is already declared in this scope",
                name
            )));
        }

        Ok(())
    }

    /// Bind `var` in the current scope, unchecked.
    pub fn bind(&mut self, var: Variable) -> RunResult<()> {
        self.top_mut()
            .ok_or_else(|| RuntimeError::memory("No active scope"))?
            .bind(var);

        Ok(())
    }

    /// Bind `var` in the current scope. Redeclaring a name in the same
    /// scope fails; shadowing an outer binding does not.
    pub fn define(&mut self, var: Variable) -> RunResult<()> {
        self.check_undeclared(var.name())?;
        self.bind(var)
    }

    /// Stack slot of the frame that binds `name`, searching from the top
    /// through parent links down to the global scope.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        let mut cursor = self.top_index();

        while let Some(slot) = cursor {
            let scope = &self.scopes[slot];

            if scope.env.contains(name) {
                return Some(slot);
            }

            cursor = scope.parent;
        }

        None
    }

    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        let slot = self.resolve(name)?;
        self.scopes[slot].env.get(name)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Variable> {
        let slot = self.resolve(name)?;
        self.scopes[slot].env.get_mut(name)
    }
}
