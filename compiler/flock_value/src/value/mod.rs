//! Runtime values for the flock interpreter.
//!
//! `Value` is a closed enum: every dispatch site matches it exhaustively, so
//! adding a variant forces every operator to decide how it handles it.
//!
//! Heap-backed variants go through factory methods (`Value::string`,
//! `Value::tuple`, `Value::closure`); `Heap<T>` has a crate-private
//! constructor.

mod heap;

use std::fmt;

use flock_ir::{DeviceId, FunctionId, Name};
use serde::{Deserialize, Serialize};

pub use heap::Heap;

use crate::field::Field;

/// A closure: a function-table entry plus the bindings captured at creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClosureValue {
    pub function: FunctionId,
    pub captures: Heap<Vec<(Name, Value)>>,
}

/// Runtime value.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Numbers are IEEE doubles.
    Number(f64),
    Bool(bool),
    Str(Heap<String>),
    Tuple(Heap<Vec<Value>>),
    Closure(ClosureValue),
    /// Per-neighbor value; never contains another field.
    Field(Field),
}

impl Value {
    #[inline]
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    pub fn tuple(elements: Vec<Value>) -> Self {
        Value::Tuple(Heap::new(elements))
    }

    pub fn closure(function: FunctionId, captures: Vec<(Name, Value)>) -> Self {
        Value::Closure(ClosureValue {
            function,
            captures: Heap::new(captures),
        })
    }

    /// Device identity as a number; ids above 2^53 lose precision.
    #[expect(
        clippy::cast_precision_loss,
        reason = "device ids are exposed to programs as numbers"
    )]
    pub fn device(id: DeviceId) -> Self {
        Value::Number(id.raw() as f64)
    }

    /// Runtime type name, used in diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Tuple(_) => "tuple",
            Value::Closure(_) => "closure",
            Value::Field(_) => "field",
        }
    }

    #[inline]
    pub fn is_field(&self) -> bool {
        matches!(self, Value::Field(_))
    }

    /// Whether a field appears anywhere inside this value, including
    /// through tuple elements and closure captures.
    pub fn contains_field(&self) -> bool {
        match self {
            Value::Field(_) => true,
            Value::Tuple(items) => items.iter().any(Value::contains_field),
            Value::Closure(closure) => closure
                .captures
                .iter()
                .any(|(_, value)| value.contains_field()),
            Value::Number(_) | Value::Bool(_) | Value::Str(_) => false,
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Value::Field(f) => Some(f),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Field> for Value {
    fn from(f: Field) -> Self {
        Value::Field(f)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::Tuple(items) => f.debug_tuple("Tuple").field(&**items).finish(),
            Value::Closure(c) => write!(f, "Closure({:?})", c.function),
            Value::Field(field) => write!(f, "Field({field:?})"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{:?}", &**s),
            Value::Tuple(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Closure(c) => write!(f, "<closure {}>", c.function.raw()),
            Value::Field(field) => write!(f, "{field}"),
        }
    }
}

#[cfg(test)]
mod tests;
