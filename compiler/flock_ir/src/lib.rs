//! Flock IR - program representation for the flock field-calculus interpreter.
//!
//! This crate holds everything a front end hands to the evaluator:
//! - `Name` / `StringInterner`: interned identifiers
//! - `ExprArena` / `ExprKind`: flat program nodes addressed by `ExprId`
//! - `Program` / `ProgramBuilder`: root expression plus function table
//! - `CodePath` / `PathEntry`: alignment paths keyed by node sites
//! - `DeviceId`: opaque identity of a device in the swarm

pub mod ast;
mod device;
mod expr_id;
mod interner;
mod name;
mod path;
mod program;

pub use ast::{Callee, ExprArena, ExprKind, Literal};
pub use device::DeviceId;
pub use expr_id::{ExprId, ExprRange, FunctionId};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use path::{CodePath, Construct, PathEntry, PathTag};
pub use program::{FunctionDef, Program, ProgramBuilder, ProgramError};
