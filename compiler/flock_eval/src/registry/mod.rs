//! Operator registry and field lifting.
//!
//! Operators are looked up by name in a registry built once and shared
//! read-only between devices. Each entry pairs a scalar body with the operand
//! positions eligible for lifting: when any eligible operand is a `Field`,
//! the body runs once per device in the intersection of the field operands'
//! domains (the local device is always included) and the results form a new
//! field. Scalar operands are broadcast to every device.

use std::fmt;

use flock_ir::DeviceId;
use flock_value::{
    nested_field, unknown_operator, unsupported_operator, EvalResult, Field, FieldBuilder, Value,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::operators::{evaluate_binary, evaluate_mux, BinaryOp};
use crate::unary_operators::{evaluate_unary, UnaryOp};

/// Scalar body of an operator. Receives exactly `arity` operands.
pub type OperatorFn = fn(&[Value]) -> EvalResult;

/// Operand positions that are lifted over fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifting {
    /// Every position.
    All,
    /// No position; fields reach the body unchanged (e.g. reductions).
    Never,
    /// Only the listed positions.
    Positions(&'static [usize]),
}

impl Lifting {
    #[inline]
    pub fn is_eligible(self, position: usize) -> bool {
        match self {
            Lifting::All => true,
            Lifting::Never => false,
            Lifting::Positions(positions) => positions.contains(&position),
        }
    }
}

/// A named operator.
#[derive(Copy, Clone)]
pub struct Operator {
    pub name: &'static str,
    pub arity: usize,
    pub lifting: Lifting,
    pub body: OperatorFn,
}

impl Operator {
    pub const fn new(name: &'static str, arity: usize, lifting: Lifting, body: OperatorFn) -> Self {
        Operator {
            name,
            arity,
            lifting,
            body,
        }
    }

    /// An operator lifted over every operand position.
    pub const fn lifted(name: &'static str, arity: usize, body: OperatorFn) -> Self {
        Self::new(name, arity, Lifting::All, body)
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("lifting", &self.lifting)
            .finish_non_exhaustive()
    }
}

/// Name-to-operator mapping.
///
/// A name may be registered once per arity, so unary and binary minus
/// coexist. Lookup depends only on name and operand count, never on
/// registration order.
#[derive(Clone, Debug, Default)]
pub struct OperatorRegistry {
    operators: FxHashMap<&'static str, SmallVec<[Operator; 2]>>,
}

impl OperatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in scalar operators.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let builtins: [Operator; 19] = [
            Operator::lifted("!", 1, |args| evaluate_unary(UnaryOp::Not, args)),
            Operator::lifted("-", 1, |args| evaluate_unary(UnaryOp::Neg, args)),
            Operator::lifted("+", 2, |args| evaluate_binary(BinaryOp::Add, args)),
            Operator::lifted("-", 2, |args| evaluate_binary(BinaryOp::Sub, args)),
            Operator::lifted("*", 2, |args| evaluate_binary(BinaryOp::Mul, args)),
            Operator::lifted("/", 2, |args| evaluate_binary(BinaryOp::Div, args)),
            Operator::lifted("%", 2, |args| evaluate_binary(BinaryOp::Mod, args)),
            Operator::lifted("pow", 2, |args| evaluate_binary(BinaryOp::Pow, args)),
            Operator::lifted("min", 2, |args| evaluate_binary(BinaryOp::Min, args)),
            Operator::lifted("max", 2, |args| evaluate_binary(BinaryOp::Max, args)),
            Operator::lifted("==", 2, |args| evaluate_binary(BinaryOp::Eq, args)),
            Operator::lifted("!=", 2, |args| evaluate_binary(BinaryOp::NotEq, args)),
            Operator::lifted("<", 2, |args| evaluate_binary(BinaryOp::Lt, args)),
            Operator::lifted("<=", 2, |args| evaluate_binary(BinaryOp::LtEq, args)),
            Operator::lifted(">", 2, |args| evaluate_binary(BinaryOp::Gt, args)),
            Operator::lifted(">=", 2, |args| evaluate_binary(BinaryOp::GtEq, args)),
            Operator::lifted("&&", 2, |args| evaluate_binary(BinaryOp::And, args)),
            Operator::lifted("||", 2, |args| evaluate_binary(BinaryOp::Or, args)),
            Operator::lifted("mux", 3, evaluate_mux),
        ];
        for op in builtins {
            registry.register(op);
        }
        registry
    }

    /// Add an operator, returning the entry with the same name and arity it
    /// replaced.
    pub fn register(&mut self, op: Operator) -> Option<Operator> {
        let overloads = self.operators.entry(op.name).or_default();
        match overloads.iter_mut().find(|existing| existing.arity == op.arity) {
            Some(existing) => Some(std::mem::replace(existing, op)),
            None => {
                overloads.push(op);
                None
            }
        }
    }

    /// The operator registered as `name` taking `arity` operands.
    #[inline]
    pub fn get(&self, name: &str, arity: usize) -> Option<&Operator> {
        self.operators
            .get(name)?
            .iter()
            .find(|op| op.arity == arity)
    }

    /// Whether any arity of `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operators.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered (name, arity) pairs.
    pub fn len(&self) -> usize {
        self.operators.values().map(SmallVec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Apply the operator registered as `name`, lifting over field operands.
    ///
    /// An unregistered name fails with `UnknownOperator`; a registered name
    /// without an overload for this many operands fails with
    /// `UnsupportedOperator`.
    pub fn apply(&self, name: &str, operands: &[Value]) -> EvalResult {
        let Some(overloads) = self.operators.get(name) else {
            return Err(unknown_operator(name));
        };
        match overloads.iter().find(|op| op.arity == operands.len()) {
            Some(op) => apply_lifted(op, operands),
            None => Err(unsupported_operator(name, operands)),
        }
    }
}

/// Run `op`, pointwise if any eligible operand is a field.
fn apply_lifted(op: &Operator, operands: &[Value]) -> EvalResult {
    let lifted: SmallVec<[(usize, &Field); 4]> = operands
        .iter()
        .enumerate()
        .filter(|(position, _)| op.lifting.is_eligible(*position))
        .filter_map(|(position, value)| value.as_field().map(|field| (position, field)))
        .collect();

    let Some(&(_, first)) = lifted.first() else {
        return (op.body)(operands);
    };

    // Fields built on different devices share no self key.
    let local = first.local();
    if lifted.iter().any(|(_, field)| field.local() != local) {
        return Err(unsupported_operator(op.name, operands));
    }

    let mut builder = FieldBuilder::new(local, apply_at(op, operands, &lifted, local)?)?;
    for (id, _) in first.neighbors() {
        if lifted[1..].iter().all(|(_, field)| field.contains(id)) {
            let value = apply_at(op, operands, &lifted, id)?;
            if value.contains_field() {
                return Err(nested_field());
            }
            builder.neighbor(id, value)?;
        }
    }
    Ok(Value::Field(builder.build()))
}

/// Run the scalar body with every lifted operand replaced by its entry for `id`.
fn apply_at(op: &Operator, operands: &[Value], lifted: &[(usize, &Field)], id: DeviceId) -> EvalResult {
    let mut args: SmallVec<[Value; 4]> = operands.iter().cloned().collect();
    for &(position, field) in lifted {
        if let Some(value) = field.get(id) {
            args[position] = value.clone();
        }
    }
    (op.body)(&args)
}
