//! Function objects, function groups ("modules") and the function registry.
//!
//! Procedures declared by a script borrow their parameter list and body from
//! the AST; the registry never owns or copies them. Native functions are
//! plain function pointers.

use log::debug;

use crate::ast::Stmt;
use crate::error::{RunResult, RuntimeError};
use crate::hashing::bucket_of;
use crate::value::Value;

/// Default number of buckets in a function group.
pub const FUNC_GROUP_SIZE: usize = 16;

/// Positional arguments handed to a native function.
///
/// The count always equals the callee's arity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncArgs {
    values: Vec<Value>,
}

impl FuncArgs {
    pub fn new(values: Vec<Value>) -> Self {
        FuncArgs { values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Signature of a native function. `None` means "no result".
pub type NativeFn = fn(&FuncArgs) -> Option<Value>;

/// What a [`FuncObj`] runs when called.
#[derive(Debug, Clone, Copy)]
pub enum FuncBody<'a> {
    Native(NativeFn),
    Ast {
        params: &'a [String],
        body: &'a [Stmt],
    },
}

/// A callable unit.
#[derive(Debug, Clone, Copy)]
pub struct FuncObj<'a> {
    name: &'a str,
    arity: usize,
    body: FuncBody<'a>,
}

impl<'a> FuncObj<'a> {
    pub fn native(name: &'a str, arity: usize, func: NativeFn) -> Self {
        FuncObj {
            name,
            arity,
            body: FuncBody::Native(func),
        }
    }

    /// Procedure backed by AST nodes; arity is the parameter count.
    pub fn ast(name: &'a str, params: &'a [String], body: &'a [Stmt]) -> Self {
        FuncObj {
            name,
            arity: params.len(),
            body: FuncBody::Ast { params, body },
        }
    }

    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    #[inline]
    pub fn body(&self) -> FuncBody<'a> {
        self.body
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self.body, FuncBody::Native(_))
    }
}

/// A named set of functions with a visibility flag.
///
/// Functions are chained in a fixed number of buckets. A name may appear
/// only once per group; [`FuncGroup::put`] rejects duplicates.
#[derive(Debug, Clone)]
pub struct FuncGroup<'a> {
    name: String,
    used: bool,
    buckets: Vec<Vec<FuncObj<'a>>>,
}

impl<'a> FuncGroup<'a> {
    /// Empty, unused group with `buckets` slots (at least one).
    pub fn new<S: Into<String>>(name: S, buckets: usize) -> Self {
        FuncGroup {
            name: name.into(),
            used: false,
            buckets: vec![Vec::new(); buckets.max(1)],
        }
    }

    /// Unused group pre-filled with `funcs`.
    pub fn with_functions<S, I>(name: S, buckets: usize, funcs: I) -> RunResult<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = FuncObj<'a>>,
    {
        let mut group = Self::new(name, buckets);

        for func in funcs {
            group.put(func)?;
        }

        Ok(group)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        self.used
    }

    #[inline]
    pub fn set_used(&mut self, used: bool) {
        self.used = used;
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Insert `func`. Fails if the group already holds that name.
    pub fn put(&mut self, func: FuncObj<'a>) -> RunResult<()> {
        let slot = bucket_of(func.name(), self.buckets.len());

        if self.buckets[slot].iter().any(|f| f.name() == func.name()) {
            return Err(RuntimeError::general(format!(
                "Function '{}' is already defined in group '{}'",
                func.name(),
                self.name
            )));
        }

        debug!(
            "Registering '{}'/{} in group '{}' bucket {}",
            func.name(),
            func.arity(),
            self.name,
            slot
        );

        self.buckets[slot].push(func);

        Ok(())
    }

    /// Function named `name`, visible only while the group is used.
    pub fn get(&self, name: &str) -> Option<&FuncObj<'a>> {
        if !self.used {
            return None;
        }

        self.find(name)
    }

    /// Function named `name`, regardless of visibility.
    pub fn find(&self, name: &str) -> Option<&FuncObj<'a>> {
        let slot = bucket_of(name, self.buckets.len());

        self.buckets[slot].iter().find(|f| f.name() == name)
    }
}

/// Ordered collection of function groups.
///
/// Slot 0 holds the script's own procedures and is always used. Its name is
/// only a label: lookups by name never see it, so it neither collides with
/// a loaded group nor answers `use`.
#[derive(Debug, Clone)]
pub struct FuncEnv<'a> {
    groups: Vec<FuncGroup<'a>>,
}

impl<'a> FuncEnv<'a> {
    pub fn new(mut script_group: FuncGroup<'a>) -> Self {
        script_group.set_used(true);

        FuncEnv {
            groups: vec![script_group],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Register another group. Group names must be unique.
    pub fn append(&mut self, group: FuncGroup<'a>) -> RunResult<()> {
        if self.fetch(group.name()).is_some() {
            return Err(RuntimeError::general(format!(
                "Function group '{}' is already loaded",
                group.name()
            )));
        }

        debug!(
            "Appending group '{}' with {} function(s)",
            group.name(),
            group.len()
        );

        self.groups.push(group);

        Ok(())
    }

    /// Loaded group by name, linear scan past slot 0.
    pub fn fetch(&self, name: &str) -> Option<&FuncGroup<'a>> {
        self.groups.iter().skip(1).find(|g| g.name() == name)
    }

    pub fn fetch_mut(&mut self, name: &str) -> Option<&mut FuncGroup<'a>> {
        self.groups.iter_mut().skip(1).find(|g| g.name() == name)
    }

    pub fn script_group(&self) -> &FuncGroup<'a> {
        &self.groups[0]
    }

    pub fn script_group_mut(&mut self) -> &mut FuncGroup<'a> {
        &mut self.groups[0]
    }

    /// Mark the group `name` used.
    pub fn use_group(&mut self, name: &str) -> RunResult<()> {
        let group = self
            .fetch_mut(name)
            .ok_or_else(|| RuntimeError::no_impl(format!("Unknown module '{}'", name)))?;

        group.set_used(true);

        Ok(())
    }

    /// Resolve a call target: the first used group, in registration order,
    /// that defines `name`.
    pub fn resolve(&self, name: &str) -> Option<FuncObj<'a>> {
        self.groups.iter().find_map(|g| g.get(name)).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FuncGroup<'a>> {
        self.groups.iter()
    }
}
