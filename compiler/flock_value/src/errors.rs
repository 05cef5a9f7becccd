//! Error types for round evaluation.
//!
//! `EvalErrorKind` provides typed error categories; factory functions (e.g.
//! `unbound_variable()`) are the public construction API and populate both
//! `kind` and `message`.
//!
//! Every error aborts the round it was raised in, except `MisalignedNeighbor`,
//! which the `nbr` construct catches to exclude the offending neighbor.

use std::fmt;

use flock_ir::{CodePath, DeviceId};

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Which evaluation stack hit its configured bound.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepthKind {
    /// Alignment path entries.
    Path,
    /// Scope frames.
    Scope,
}

impl fmt::Display for DepthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => f.write_str("alignment path"),
            Self::Scope => f.write_str("scope"),
        }
    }
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Lookup
    UnboundVariable {
        name: String,
    },
    UnknownFunction {
        name: String,
    },
    UndefinedSensor {
        name: String,
    },

    // Operators
    UnsupportedOperator {
        op: String,
        operands: Vec<String>,
    },
    UnknownOperator {
        op: String,
    },
    DivisionByZero,

    // Alignment
    DuplicateExport {
        path: String,
    },
    MisalignedNeighbor {
        neighbor: DeviceId,
        found: String,
    },
    NestedField,
    DuplicateFieldEntry {
        device: DeviceId,
    },

    // Resources
    DepthExceeded {
        kind: DepthKind,
        limit: usize,
    },
    LoopBoundExceeded {
        count: String,
        limit: usize,
    },

    // Values
    TypeMismatch {
        context: String,
        expected: String,
        got: String,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    NotCallable {
        type_name: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundVariable { name } => write!(f, "unbound variable: {name}"),
            Self::UnknownFunction { name } => write!(f, "unknown function: {name}"),
            Self::UndefinedSensor { name } => write!(f, "sensor `{name}` has no value"),

            Self::UnsupportedOperator { op, operands } => {
                if operands.is_empty() {
                    write!(f, "operator `{op}` cannot be applied without operands")
                } else {
                    write!(
                        f,
                        "operator `{op}` cannot be applied to ({})",
                        operands.join(", ")
                    )
                }
            }
            Self::UnknownOperator { op } => write!(f, "unknown operator `{op}`"),
            Self::DivisionByZero => write!(f, "division by zero"),

            Self::DuplicateExport { path } => {
                write!(f, "alignment path {path} was exported twice in one round")
            }
            Self::MisalignedNeighbor { neighbor, found } => {
                write!(f, "neighbor {neighbor} exported a {found} where a scalar was expected")
            }
            Self::NestedField => write!(f, "a field cannot contain another field"),
            Self::DuplicateFieldEntry { device } => {
                write!(f, "field holds more than one entry for device {device}")
            }

            Self::DepthExceeded { kind, limit } => {
                write!(f, "maximum {kind} depth exceeded (limit: {limit})")
            }
            Self::LoopBoundExceeded { count, limit } => {
                write!(f, "loop count {count} exceeds the iteration limit {limit}")
            }

            Self::TypeMismatch {
                context,
                expected,
                got,
            } => write!(f, "{context}: expected {expected}, got {got}"),
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{name} expects {expected} {arg_word}, got {got}")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable error message, equal to `kind.to_string()`.
    pub message: String,
    /// Alignment path at which the error was raised, when known.
    pub path: Option<CodePath>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            path: None,
        }
    }

    /// Attach the alignment path of the failure site.
    ///
    /// The innermost site wins: a path already recorded is kept.
    #[must_use]
    pub fn at_path(mut self, path: &CodePath) -> Self {
        if self.path.is_none() {
            self.path = Some(path.clone());
        }
        self
    }
}

impl PartialEq for EvalError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(path) = &self.path {
            write!(f, " (at {path})")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Factory functions

#[cold]
pub fn unbound_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundVariable {
        name: name.to_owned(),
    })
}

#[cold]
pub fn unknown_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownFunction {
        name: name.to_owned(),
    })
}

#[cold]
pub fn undefined_sensor(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedSensor {
        name: name.to_owned(),
    })
}

/// Operator applied to operand types (or a count of operands) it does not support.
#[cold]
pub fn unsupported_operator(op: &str, operands: &[Value]) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedOperator {
        op: op.to_owned(),
        operands: operands.iter().map(|v| v.type_name().to_owned()).collect(),
    })
}

#[cold]
pub fn unknown_operator(op: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownOperator { op: op.to_owned() })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn duplicate_export(path: &CodePath) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateExport {
        path: path.to_string(),
    })
    .at_path(path)
}

#[cold]
pub fn misaligned_neighbor(neighbor: DeviceId, found: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MisalignedNeighbor {
        neighbor,
        found: found.type_name().to_owned(),
    })
}

#[cold]
pub fn nested_field() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NestedField)
}

#[cold]
pub fn duplicate_field_entry(device: DeviceId) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateFieldEntry { device })
}

#[cold]
pub fn depth_exceeded(kind: DepthKind, limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DepthExceeded { kind, limit })
}

#[cold]
pub fn loop_bound_exceeded(count: f64, limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::LoopBoundExceeded {
        count: count.to_string(),
        limit,
    })
}

#[cold]
pub fn type_mismatch(context: &str, expected: &str, got: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        context: context.to_owned(),
        expected: expected.to_owned(),
        got: got.type_name().to_owned(),
    })
}

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_owned(),
        expected,
        got,
    })
}

#[cold]
pub fn not_callable(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: value.type_name().to_owned(),
    })
}
