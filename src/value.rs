//! Runtime values of the Rubel interpreter.
//!
//! A [`Value`] is a tagged datum plus a const flag. String and list payloads
//! ([`StringObj`], [`ListObj`]) are owned by exactly one `Value`; handing a
//! value to someone else is a move, and a copy is an explicit deep `clone`.
//! Dropping a value releases its payload, recursively for lists.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::{RunResult, RuntimeError};

/// Discriminant of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    Bool,
    Int,
    Real,
    Str,
    List,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Bool => "boolean",
            DataType::Int => "int",
            DataType::Real => "real",
            DataType::Str => "string",
            DataType::List => "list",
        };

        f.write_str(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StringObj
// ─────────────────────────────────────────────────────────────────────────────

/// Owned, growable character buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringObj {
    buf: String,
}

impl StringObj {
    pub fn new<S: Into<String>>(source: S) -> Self {
        StringObj { buf: source.into() }
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// New single-character string holding the `index`-th character.
    pub fn char_at(&self, index: usize) -> Option<StringObj> {
        self.buf.chars().nth(index).map(|c| StringObj::new(c))
    }

    /// Append `other` in place.
    ///
    /// Appending an empty string is a no-op; otherwise the buffer grows only
    /// when the combined length exceeds the current capacity.
    pub fn append(&mut self, other: &StringObj) {
        if other.is_empty() {
            return;
        }

        let total = self.buf.len() + other.len();

        if total > self.buf.capacity() {
            debug!(
                "Growing string buffer from {} to {} bytes",
                self.buf.capacity(),
                total
            );
            self.buf.reserve(other.len());
        }

        self.buf.push_str(other.as_str());
    }
}

impl From<&str> for StringObj {
    fn from(s: &str) -> Self {
        StringObj::new(s)
    }
}

impl fmt::Display for StringObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ListObj
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct ListNode {
    value: Value,
    next: Option<usize>,
}

/// Singly linked sequence of values.
///
/// Nodes live in an arena owned by the list and are linked by index, so the
/// whole chain is released with the list. Appends are O(1) through the tail
/// link; positional access walks the chain from the head.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListObj {
    nodes: Vec<ListNode>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl ListObj {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements.
    #[inline]
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Take ownership of `value` and link it after the current tail.
    pub fn append(&mut self, value: Value) {
        let slot = self.nodes.len();

        self.nodes.push(ListNode { value, next: None });

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(slot),
            None => self.head = Some(slot),
        }

        self.tail = Some(slot);
    }

    /// Borrow the `index`-th value (0-based) by walking the links.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.iter().nth(index)
    }

    pub fn iter(&self) -> ListIter<'_> {
        ListIter {
            list: self,
            cursor: self.head,
        }
    }
}

impl FromIterator<Value> for ListObj {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut list = ListObj::new();

        for value in iter {
            list.append(value);
        }

        list
    }
}

/// Walks a [`ListObj`] from head to tail.
pub struct ListIter<'a> {
    list: &'a ListObj,
    cursor: Option<usize>,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.list.nodes[self.cursor?];
        self.cursor = node.next;
        Some(&node.value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Value
// ─────────────────────────────────────────────────────────────────────────────

/// Payload of a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(StringObj),
    List(ListObj),
}

/// A runtime datum.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    data: Data,
    is_const: bool,
}

impl Value {
    pub fn new(is_const: bool, data: Data) -> Self {
        Value { data, is_const }
    }

    pub fn bool(is_const: bool, flag: bool) -> Self {
        Self::new(is_const, Data::Bool(flag))
    }

    pub fn int(is_const: bool, value: i64) -> Self {
        Self::new(is_const, Data::Int(value))
    }

    pub fn real(is_const: bool, value: f64) -> Self {
        Self::new(is_const, Data::Real(value))
    }

    pub fn str(is_const: bool, value: StringObj) -> Self {
        Self::new(is_const, Data::Str(value))
    }

    pub fn list(is_const: bool, value: ListObj) -> Self {
        Self::new(is_const, Data::List(value))
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        match self.data {
            Data::Bool(_) => DataType::Bool,
            Data::Int(_) => DataType::Int,
            Data::Real(_) => DataType::Real,
            Data::Str(_) => DataType::Str,
            Data::List(_) => DataType::List,
        }
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.is_const
    }

    #[inline]
    pub fn set_const(&mut self, is_const: bool) {
        self.is_const = is_const;
    }

    #[inline]
    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn into_data(self) -> Data {
        self.data
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Data::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.data {
            Data::Int(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self.data {
            Data::Real(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&StringObj> {
        match &self.data {
            Data::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListObj> {
        match &self.data {
            Data::List(l) => Some(l),
            _ => None,
        }
    }

    /// Apply a unary operator. Only numeric negation exists.
    pub fn unary(&self, op: UnaryOp) -> RunResult<Value> {
        match (op, &self.data) {
            (UnaryOp::Neg, Data::Int(n)) => n
                .checked_neg()
                .map(|n| Value::int(false, n))
                .ok_or_else(|| RuntimeError::null_value("Integer overflow in negation")),
            (UnaryOp::Neg, Data::Real(n)) => Ok(Value::real(false, -n)),
            (UnaryOp::Neg, _) => Err(RuntimeError::type_error(format!(
                "Cannot negate a {}",
                self.data_type()
            ))),
        }
    }

    /// Apply a binary operator to two values of the same kind.
    pub fn binary(&self, op: BinaryOp, rhs: &Value) -> RunResult<Value> {
        if self.data_type() != rhs.data_type() {
            return Err(RuntimeError::type_error(format!(
                "Operands of '{}' differ in type: {} and {}",
                op,
                self.data_type(),
                rhs.data_type()
            )));
        }

        if op.is_comparison() {
            self.compare(op, rhs).map(|flag| Value::bool(false, flag))
        } else {
            self.arithmetic(op, rhs)
        }
    }

    fn compare(&self, op: BinaryOp, rhs: &Value) -> RunResult<bool> {
        let ordering = match (&self.data, &rhs.data) {
            (Data::Bool(a), Data::Bool(b)) => a.partial_cmp(b),
            (Data::Int(a), Data::Int(b)) => a.partial_cmp(b),
            (Data::Real(a), Data::Real(b)) => a.partial_cmp(b),
            _ => {
                return Err(RuntimeError::type_error(format!(
                    "Cannot compare {} values",
                    self.data_type()
                )));
            }
        };

        use std::cmp::Ordering::{Equal, Greater, Less};

        // NaN compares unequal to everything.
        let flag = match (op, ordering) {
            (BinaryOp::Eq, o) => o == Some(Equal),
            (BinaryOp::Neq, o) => o != Some(Equal),
            (BinaryOp::Gt, o) => o == Some(Greater),
            (BinaryOp::Gte, o) => matches!(o, Some(Greater | Equal)),
            (BinaryOp::Lt, o) => o == Some(Less),
            (BinaryOp::Lte, o) => matches!(o, Some(Less | Equal)),
            _ => {
                return Err(RuntimeError::general(format!(
                    "'{}' is not a comparison",
                    op
                )));
            }
        };

        Ok(flag)
    }

    fn arithmetic(&self, op: BinaryOp, rhs: &Value) -> RunResult<Value> {
        match (&self.data, &rhs.data) {
            (Data::Int(a), Data::Int(b)) => {
                let result = match op {
                    BinaryOp::Add => a.checked_add(*b),
                    BinaryOp::Sub => a.checked_sub(*b),
                    BinaryOp::Mul => a.checked_mul(*b),
                    BinaryOp::Div => {
                        if *b == 0 {
                            return Err(RuntimeError::null_value("Division by zero"));
                        }
                        a.checked_div(*b)
                    }
                    _ => {
                        return Err(RuntimeError::general(format!(
                            "'{}' is not arithmetic",
                            op
                        )));
                    }
                };

                result
                    .map(|n| Value::int(false, n))
                    .ok_or_else(|| RuntimeError::null_value("Integer overflow"))
            }

            (Data::Real(a), Data::Real(b)) => {
                let n = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => {
                        if *b == 0.0 {
                            return Err(RuntimeError::null_value("Division by zero"));
                        }
                        a / b
                    }
                    _ => {
                        return Err(RuntimeError::general(format!(
                            "'{}' is not arithmetic",
                            op
                        )));
                    }
                };

                Ok(Value::real(false, n))
            }

            _ => Err(RuntimeError::type_error(format!(
                "Arithmetic is not defined for {} values",
                self.data_type()
            ))),
        }
    }

    /// Positional access into a list or string.
    ///
    /// Returns `Ok(None)` ("no result") when `index` is out of range.
    pub fn index(&self, index: &Value) -> RunResult<Option<Value>> {
        let Some(position) = index.as_int() else {
            return Err(RuntimeError::type_error(format!(
                "Index must be an int, found {}",
                index.data_type()
            )));
        };

        let Ok(position) = usize::try_from(position) else {
            return Ok(None);
        };

        match &self.data {
            Data::List(list) => Ok(list.get(position).map(|v| {
                let mut copy = v.clone();
                copy.set_const(false);
                copy
            })),
            Data::Str(s) => Ok(s.char_at(position).map(|c| Value::str(false, c))),
            _ => Err(RuntimeError::type_error(format!(
                "Cannot index into a {}",
                self.data_type()
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Data::Bool(true) => write!(f, "$T"),

            Data::Bool(false) => write!(f, "$F"),

            Data::Int(n) => {
                let mut buf = itoa::Buffer::new();
                f.write_str(buf.format(*n))
            }

            Data::Real(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Data::Str(s) => write!(f, "{}", s),

            Data::List(list) => {
                write!(f, "[")?;

                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item.data() {
                        Data::Str(s) => write!(f, "\"{}\"", s)?,
                        _ => write!(f, "{}", item)?,
                    }
                }

                write!(f, "]")
            }
        }
    }
}
