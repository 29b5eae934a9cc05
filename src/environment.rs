//! Name bindings of a single lexical scope.

use log::debug;

use crate::hashing::bucket_of;
use crate::value::Value;

/// Default number of buckets in a scope's environment.
pub const VAR_ENV_SIZE: usize = 8;

/// A named binding owning its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    is_const: bool,
    value: Value,
}

impl Variable {
    /// Bind `value` to `name`. The value's const flag is forced to match the
    /// binding's.
    pub fn new<S: Into<String>>(name: S, is_const: bool, mut value: Value) -> Self {
        value.set_const(is_const);

        Variable {
            name: name.into(),
            is_const,
            value,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.is_const
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Install `value`, dropping the previous one. Kind and const checks
    /// belong to the caller.
    pub fn replace(&mut self, mut value: Value) -> Value {
        value.set_const(self.is_const);
        std::mem::replace(&mut self.value, value)
    }
}

/// Fixed-bucket hash table of [`Variable`]s.
///
/// Each bucket is a chain; insertion appends to its end and lookup returns
/// the first name match. Duplicate names are not detected here, and entries
/// are never removed: everything is dropped together with the table.
#[derive(Debug, Clone)]
pub struct Environment {
    buckets: Vec<Vec<Variable>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::with_buckets(VAR_ENV_SIZE)
    }

    /// Table with `count` buckets (at least one).
    pub fn with_buckets(count: usize) -> Self {
        Environment {
            buckets: vec![Vec::new(); count.max(1)],
        }
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of bindings.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Append `var` to the chain selected by its name.
    pub fn put(&mut self, var: Variable) {
        let slot = bucket_of(var.name(), self.buckets.len());

        debug!("Binding '{}' in bucket {}", var.name(), slot);

        self.buckets[slot].push(var);
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        let slot = bucket_of(name, self.buckets.len());

        self.buckets[slot].iter().find(|v| v.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        let slot = bucket_of(name, self.buckets.len());

        self.buckets[slot].iter_mut().find(|v| v.name() == name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
