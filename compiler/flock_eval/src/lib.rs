//! Flock Eval - round-based evaluator for flock aggregate programs.
//!
//! A round evaluates a `Program` for one device against that device's prior
//! export and its neighbors' exports, producing a new `ExportTree`.
//!
//! # Architecture
//!
//! - `ExecutionContext`: scopes, alignment path and export tree of a round
//! - `Environment`: variable scoping with a scope stack
//! - `OperatorRegistry`: named scalar operators, lifted over fields
//! - `run_round` / `Device`: the round driver and per-device state
//!
//! # Re-exports
//!
//! Value and error types from `flock_value` are re-exported for convenience.

mod context;
mod driver;
mod environment;
pub mod exec;
mod limits;
mod operators;
mod registry;
mod shared;
mod tracing_setup;
mod unary_operators;

pub use flock_value::{
    ClosureValue, EvalError, EvalErrorKind, EvalResult, ExportTree, Field, FieldBuilder, Heap,
    NeighborHistory, SharedExport, Value,
};

pub use context::{AlignedContext, ExecutionContext, ScopedContext};
pub use driver::{run_round, run_rounds_parallel, Device, DeviceState};
pub use environment::{Environment, Scope};
pub use limits::EvalLimits;
pub use operators::{evaluate_binary, evaluate_mux, BinaryOp};
pub use registry::{Lifting, Operator, OperatorFn, OperatorRegistry};
pub use shared::SharedRegistry;
pub use tracing_setup::init_tracing;
pub use unary_operators::{evaluate_unary, UnaryOp};

#[cfg(test)]
mod tests;
