//! Variable scoping for round evaluation.
//!
//! Frames live in one stack owned by the round. Each frame records the index
//! of the frame it chains to: a block frame chains to the frame that was
//! current when it was pushed, a function frame chains to nothing, so a
//! callee sees only its parameters and captured bindings. Popping a frame
//! drops its bindings; nothing outlives the round except the values handed
//! out by `lookup` and `capture`.

use flock_ir::Name;
use flock_value::Value;
use rustc_hash::FxHashMap;

/// A single scope frame.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    /// Stack index of the enclosing frame, if lookups continue there.
    parent: Option<usize>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    fn chained_to(parent: usize) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Bind `name` in this frame, shadowing any outer binding.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Lookup in this frame only.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.bindings.get(&name).cloned()
    }
}

/// Scope stack for one round.
#[derive(Debug)]
pub struct Environment {
    /// Current frame last. Never empty: index 0 is the round's top-level frame.
    frames: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            frames: vec![Scope::new()],
        }
    }

    /// Number of frames, the top-level frame included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a lexical block frame.
    #[inline]
    pub fn push_scope(&mut self) {
        let parent = self.current();
        self.frames.push(Scope::chained_to(parent));
    }

    /// Push a function frame that does not see the caller's bindings.
    #[inline]
    pub fn push_function_scope(&mut self) {
        self.frames.push(Scope::new());
    }

    /// Pop the current frame. The top-level frame is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    #[inline]
    fn current(&self) -> usize {
        self.frames.len() - 1
    }

    /// Bind `name` in the current frame.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.define(name, value);
        }
    }

    /// Frames visible from the current one, innermost first.
    fn visible(&self) -> impl Iterator<Item = &Scope> {
        std::iter::successors(self.frames.last(), |frame| {
            frame.parent.and_then(|index| self.frames.get(index))
        })
    }

    /// Nearest-frame-wins lookup.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.visible().find_map(|frame| frame.lookup(name))
    }

    /// Snapshot every visible binding for a closure, innermost first wins.
    ///
    /// Sorted by name so that closures built from the same bindings are
    /// identical, including when serialized.
    pub fn capture(&self) -> Vec<(Name, Value)> {
        let mut captures: FxHashMap<Name, Value> = FxHashMap::default();
        for frame in self.visible() {
            for (name, value) in &frame.bindings {
                captures.entry(*name).or_insert_with(|| value.clone());
            }
        }
        let mut captures: Vec<_> = captures.into_iter().collect();
        captures.sort_unstable_by_key(|(name, _)| *name);
        captures
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
