//! Execution context for one round on one device.
//!
//! The context owns everything that changes while a round evaluates (the
//! scope stack, the alignment path and the export tree being built) and
//! borrows everything that must not: the program, the operator registry,
//! the device's prior export and its neighbor history.
//!
//! Scope and path pushes are paired through RAII guards (see
//! `scope_guard`), so a node that fails halfway still unwinds what it
//! pushed.

mod eval;
mod function_call;
mod scope_guard;

use flock_ir::{CodePath, DeviceId, Name, PathEntry, PathTag, Program};
use flock_value::{
    depth_exceeded, unbound_variable, undefined_sensor, DepthKind, EvalError, EvalResult,
    ExportTree, Value,
};

pub use scope_guard::{AlignedContext, ScopedContext};

use crate::driver::DeviceState;
use crate::environment::Environment;
use crate::limits::EvalLimits;
use crate::registry::OperatorRegistry;

/// Mutable state of a round in progress.
pub struct ExecutionContext<'a> {
    program: &'a Program,
    registry: &'a OperatorRegistry,
    limits: EvalLimits,
    state: &'a DeviceState,
    env: Environment,
    path: CodePath,
    exports: ExportTree,
}

impl<'a> ExecutionContext<'a> {
    /// A fresh context: empty path, empty export tree, one top-level frame.
    pub fn new(
        program: &'a Program,
        registry: &'a OperatorRegistry,
        limits: EvalLimits,
        state: &'a DeviceState,
    ) -> Self {
        ExecutionContext {
            program,
            registry,
            limits,
            state,
            env: Environment::new(),
            path: CodePath::root(),
            exports: ExportTree::new(),
        }
    }

    #[inline]
    pub fn device(&self) -> DeviceId {
        self.state.id
    }

    #[inline]
    pub fn program(&self) -> &'a Program {
        self.program
    }

    #[inline]
    pub fn registry(&self) -> &'a OperatorRegistry {
        self.registry
    }

    #[inline]
    pub fn limits(&self) -> EvalLimits {
        self.limits
    }

    /// Current alignment path.
    #[inline]
    pub fn path(&self) -> &CodePath {
        &self.path
    }

    /// Number of scope frames currently pushed, the top-level frame included.
    pub fn scope_depth(&self) -> usize {
        self.env.depth()
    }

    /// Push a lexical block frame.
    pub fn enter_scope(&mut self) -> Result<(), EvalError> {
        self.check_scope_depth()?;
        self.env.push_scope();
        Ok(())
    }

    /// Push a function frame that hides the caller's bindings.
    pub fn enter_function_scope(&mut self) -> Result<(), EvalError> {
        self.check_scope_depth()?;
        self.env.push_function_scope();
        Ok(())
    }

    pub fn exit_scope(&mut self) {
        self.env.pop_scope();
    }

    fn check_scope_depth(&self) -> Result<(), EvalError> {
        let limit = self.limits.max_scope_depth;
        if self.env.depth() >= limit {
            return Err(depth_exceeded(DepthKind::Scope, limit));
        }
        Ok(())
    }

    /// Push one alignment path entry.
    pub fn enter_path(&mut self, tag: PathTag, index: u32) -> Result<(), EvalError> {
        let limit = self.limits.max_path_depth;
        if self.path.depth() >= limit {
            return Err(depth_exceeded(DepthKind::Path, limit));
        }
        self.path.push(PathEntry::new(tag, index));
        Ok(())
    }

    pub fn exit_path(&mut self) {
        self.path.pop();
    }

    /// Bind `name` in the innermost frame.
    #[inline]
    pub fn bind(&mut self, name: Name, value: Value) {
        self.env.define(name, value);
    }

    /// Nearest-frame-wins lookup.
    pub fn resolve(&self, name: Name) -> EvalResult {
        self.env
            .lookup(name)
            .ok_or_else(|| unbound_variable(self.program.interner().lookup(name)))
    }

    /// Snapshot the visible bindings for a closure.
    pub fn capture(&self) -> Vec<(Name, Value)> {
        self.env.capture()
    }

    /// Record `value` at the current path.
    ///
    /// Fails with `DuplicateExport` if the path was already written this round.
    pub fn export(&mut self, value: &Value) -> Result<(), EvalError> {
        self.exports.insert(&self.path, value.clone())
    }

    /// This device's own value at `path` from its last completed round.
    pub fn read_prior_self(&self, path: &[PathEntry]) -> Option<&'a Value> {
        self.state.prior.get(path)
    }

    /// Every neighbor's value at `path`, in device order.
    ///
    /// Neighbors that did not reach `path` are absent. The device's own id
    /// is skipped even if it appears in the history.
    pub fn read_neighbors(&self, path: &[PathEntry]) -> Vec<(DeviceId, &'a Value)> {
        let device = self.state.id;
        self.state
            .neighbors
            .iter()
            .filter(|(id, _)| *id != device)
            .filter_map(|(id, export)| export.get(path).map(|value| (id, value)))
            .collect()
    }

    /// The current value of sensor `name`.
    pub fn sense(&self, name: Name) -> EvalResult {
        let key = self.program.interner().lookup(name);
        self.state
            .sensors
            .get(key)
            .cloned()
            .ok_or_else(|| undefined_sensor(key))
    }

    /// Consume the context, yielding the export tree built so far.
    pub fn finish(self) -> ExportTree {
        self.exports
    }
}
