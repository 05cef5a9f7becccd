//! Binary and n-ary scalar operator bodies.
//!
//! Direct enum-based dispatch: the operand type set is closed, so pattern
//! matching is preferred over trait objects. These functions only ever see
//! scalars; lifting over fields happens in the registry before they run.

use flock_value::{division_by_zero, unsupported_operator, EvalResult, Value};

/// Built-in binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Min,
    Max,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// Registry name of the operator.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "pow",
            Self::Min => "min",
            Self::Max => "max",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Evaluate a binary operation on two scalars.
///
/// `==` and `!=` accept any pair of values; everything else requires both
/// operands to have a type the operator is defined on. There is no coercion.
pub fn evaluate_binary(op: BinaryOp, operands: &[Value]) -> EvalResult {
    let [left, right] = operands else {
        return Err(unsupported_operator(op.symbol(), operands));
    };
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => return Ok(Value::Bool(left != right)),
        _ => {}
    }
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => eval_number_binary(*a, *b, op, operands),
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(*a, *b, op, operands),
        (Value::Str(a), Value::Str(b)) => eval_string_binary(a, b, op, operands),
        _ => Err(unsupported_operator(op.symbol(), operands)),
    }
}

fn eval_number_binary(a: f64, b: f64, op: BinaryOp, operands: &[Value]) -> EvalResult {
    let value = match op {
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => return Err(division_by_zero()),
        BinaryOp::Div => Value::Number(a / b),
        BinaryOp::Mod => Value::Number(a % b),
        BinaryOp::Pow => Value::Number(a.powf(b)),
        BinaryOp::Min => Value::Number(a.min(b)),
        BinaryOp::Max => Value::Number(a.max(b)),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        _ => return Err(unsupported_operator(op.symbol(), operands)),
    };
    Ok(value)
}

fn eval_bool_binary(a: bool, b: bool, op: BinaryOp, operands: &[Value]) -> EvalResult {
    match op {
        BinaryOp::And => Ok(Value::Bool(a && b)),
        BinaryOp::Or => Ok(Value::Bool(a || b)),
        _ => Err(unsupported_operator(op.symbol(), operands)),
    }
}

fn eval_string_binary(a: &str, b: &str, op: BinaryOp, operands: &[Value]) -> EvalResult {
    match op {
        BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::string(joined))
        }
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
        _ => Err(unsupported_operator(op.symbol(), operands)),
    }
}

/// `mux(cond, then, else)`: selects without branching, so both sides are
/// evaluated and aligned. Lifted over fields, it selects per device.
pub fn evaluate_mux(operands: &[Value]) -> EvalResult {
    match operands {
        [Value::Bool(cond), then_value, else_value] => Ok(if *cond {
            then_value.clone()
        } else {
            else_value.clone()
        }),
        _ => Err(unsupported_operator("mux", operands)),
    }
}
