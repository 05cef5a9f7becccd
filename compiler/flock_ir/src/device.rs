//! Device identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a device in the swarm.
///
/// Used as the key of `Field` entries and of Neighbor History. The evaluator
/// only compares and orders ids; it never interprets them.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DeviceId(u64);

impl DeviceId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        DeviceId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for DeviceId {
    fn from(raw: u64) -> Self {
        DeviceId(raw)
    }
}
