//! Thread-safe shared registry wrapper.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Immutable registry shared between devices.
///
/// Uses `Arc` internally; devices running on different threads read the
/// same registry without locking.
pub struct SharedRegistry<T>(Arc<T>);

impl<T> SharedRegistry<T> {
    pub fn new(registry: T) -> Self {
        SharedRegistry(Arc::new(registry))
    }
}

impl<T> Clone for SharedRegistry<T> {
    fn clone(&self) -> Self {
        SharedRegistry(Arc::clone(&self.0))
    }
}

impl<T> Deref for SharedRegistry<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedRegistry({:?})", &*self.0)
    }
}

impl<T: Default> Default for SharedRegistry<T> {
    fn default() -> Self {
        SharedRegistry::new(T::default())
    }
}
