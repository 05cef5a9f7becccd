//! RAII guards for scope frames and alignment path entries.
//!
//! Each guard holds `&mut ExecutionContext` and implements `Deref`/`DerefMut`,
//! so evaluation continues through the guard. Dropping the guard pops what
//! was pushed, including when a `?` returns early or evaluation panics.
//!
//! ```text
//! ctx.with_path(tag, index, |aligned| {
//!     aligned.with_scope(|scoped| {
//!         scoped.bind(var, value);
//!         scoped.eval(body)
//!     })
//! })
//! ```

use std::ops::{Deref, DerefMut};

use flock_ir::{Name, PathTag};
use flock_value::{EvalError, Value};

use super::ExecutionContext;

/// Pops one scope frame on drop.
pub struct ScopedContext<'guard, 'a> {
    context: &'guard mut ExecutionContext<'a>,
}

impl Drop for ScopedContext<'_, '_> {
    fn drop(&mut self) {
        self.context.exit_scope();
    }
}

impl<'a> Deref for ScopedContext<'_, 'a> {
    type Target = ExecutionContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopedContext<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

/// Pops one alignment path entry on drop.
pub struct AlignedContext<'guard, 'a> {
    context: &'guard mut ExecutionContext<'a>,
}

impl Drop for AlignedContext<'_, '_> {
    fn drop(&mut self) {
        self.context.exit_path();
    }
}

impl<'a> Deref for AlignedContext<'_, 'a> {
    type Target = ExecutionContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for AlignedContext<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl<'a> ExecutionContext<'a> {
    /// Push a block frame, returning the guard that pops it.
    pub fn scoped(&mut self) -> Result<ScopedContext<'_, 'a>, EvalError> {
        self.enter_scope()?;
        Ok(ScopedContext { context: self })
    }

    /// Push a function frame, returning the guard that pops it.
    pub fn function_scoped(&mut self) -> Result<ScopedContext<'_, 'a>, EvalError> {
        self.enter_function_scope()?;
        Ok(ScopedContext { context: self })
    }

    /// Push a path entry, returning the guard that pops it.
    pub fn aligned(&mut self, tag: PathTag, index: u32) -> Result<AlignedContext<'_, 'a>, EvalError> {
        self.enter_path(tag, index)?;
        Ok(AlignedContext { context: self })
    }

    /// Run `f` inside a new block frame.
    pub fn with_scope<T, F>(&mut self, f: F) -> Result<T, EvalError>
    where
        F: FnOnce(&mut ScopedContext<'_, 'a>) -> Result<T, EvalError>,
    {
        let mut scoped = self.scoped()?;
        f(&mut scoped)
    }

    /// Run `f` inside a new block frame holding one binding.
    pub fn with_binding<T, F>(&mut self, name: Name, value: Value, f: F) -> Result<T, EvalError>
    where
        F: FnOnce(&mut ScopedContext<'_, 'a>) -> Result<T, EvalError>,
    {
        self.with_scope(|scoped| {
            scoped.bind(name, value);
            f(scoped)
        })
    }

    /// Run `f` inside a function frame pre-populated with `bindings`.
    pub fn with_function_scope<T, F, I>(&mut self, bindings: I, f: F) -> Result<T, EvalError>
    where
        F: FnOnce(&mut ScopedContext<'_, 'a>) -> Result<T, EvalError>,
        I: IntoIterator<Item = (Name, Value)>,
    {
        let mut scoped = self.function_scoped()?;
        for (name, value) in bindings {
            scoped.bind(name, value);
        }
        f(&mut scoped)
    }

    /// Run `f` with one more alignment path entry.
    pub fn with_path<T, F>(&mut self, tag: PathTag, index: u32, f: F) -> Result<T, EvalError>
    where
        F: FnOnce(&mut AlignedContext<'_, 'a>) -> Result<T, EvalError>,
    {
        let mut aligned = self.aligned(tag, index)?;
        f(&mut aligned)
    }
}
