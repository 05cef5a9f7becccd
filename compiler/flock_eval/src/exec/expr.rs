//! Leaf expression evaluation.

use flock_ir::{Literal, StringInterner};
use flock_value::Value;

/// Convert a literal to its runtime value.
pub fn eval_literal(literal: Literal, interner: &StringInterner) -> Value {
    match literal {
        Literal::Number(n) => Value::Number(n),
        Literal::Bool(b) => Value::Bool(b),
        Literal::Str(name) => Value::string(interner.lookup(name)),
    }
}

/// Value of an empty block.
pub fn unit() -> Value {
    Value::tuple(Vec::new())
}
