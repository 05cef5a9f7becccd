//! Unary scalar operator bodies.

use flock_value::{unsupported_operator, EvalResult, Value};

/// Built-in unary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Logical not; booleans only.
    Not,
    /// Numeric negation.
    Neg,
}

impl UnaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Neg => "-",
        }
    }
}

/// Evaluate a unary operation on a scalar.
pub fn evaluate_unary(op: UnaryOp, operands: &[Value]) -> EvalResult {
    match (operands, op) {
        ([Value::Bool(b)], UnaryOp::Not) => Ok(Value::Bool(!b)),
        ([Value::Number(n)], UnaryOp::Neg) => Ok(Value::Number(-n)),
        _ => Err(unsupported_operator(op.symbol(), operands)),
    }
}
