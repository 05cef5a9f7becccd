//! Construct-specific helpers used by the evaluator.
//!
//! Functions here hold the per-construct rules that do not need the whole
//! execution context: literal conversion, branch arm selection, loop trip
//! counts, call arity and neighbor field assembly.

pub mod call;
pub mod control;
pub mod expr;
pub mod field;
