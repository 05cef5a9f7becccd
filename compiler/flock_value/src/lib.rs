//! Flock values - runtime data for the flock field-calculus interpreter.
//!
//! - `Value`: closed tagged union of scalars and fields
//! - `Field`: per-device value, always holding the local entry
//! - `ExportTree` / `NeighborHistory`: state published by devices between rounds
//! - `EvalError`: structured evaluation errors and their factory functions

mod errors;
mod export;
mod field;
mod value;

pub use errors::{
    arity_mismatch, depth_exceeded, division_by_zero, duplicate_export,
    duplicate_field_entry, loop_bound_exceeded,
    misaligned_neighbor, nested_field, not_callable, type_mismatch, unbound_variable,
    undefined_sensor, unknown_function, unknown_operator, unsupported_operator, DepthKind,
    EvalError, EvalErrorKind, EvalResult,
};
pub use export::{ExportTree, NeighborHistory, SharedExport};
pub use field::{Field, FieldBuilder};
pub use value::{ClosureValue, Heap, Value};
