//! Fields: values indexed by device identity.
//!
//! A field always carries the local device's own entry exactly once and never
//! holds another field, not even inside a tuple or a closure capture. Both
//! invariants are enforced at construction, deserialization included; once
//! built a field is immutable and shared by reference count.

use std::collections::BTreeMap;
use std::fmt;

use flock_ir::DeviceId;
use serde::{Deserialize, Serialize};

use crate::errors::{duplicate_field_entry, misaligned_neighbor, nested_field, EvalError};
use crate::value::{Heap, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct FieldInner {
    local: DeviceId,
    local_value: Value,
    neighbors: BTreeMap<DeviceId, Value>,
}

/// A per-device value: the local entry plus zero or more neighbor entries.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldInner")]
pub struct Field(Heap<FieldInner>);

impl TryFrom<FieldInner> for Field {
    type Error = EvalError;

    /// Rebuild a field received from elsewhere through the checked builder.
    fn try_from(inner: FieldInner) -> Result<Self, EvalError> {
        let mut builder = FieldBuilder::new(inner.local, inner.local_value)?;
        for (id, value) in inner.neighbors {
            if id == inner.local {
                return Err(duplicate_field_entry(id));
            }
            if value.contains_field() {
                return Err(nested_field());
            }
            builder.neighbor(id, value)?;
        }
        Ok(builder.build())
    }
}

impl Field {
    /// A field holding only the local device's value.
    pub fn new(local: DeviceId, value: Value) -> Result<Self, EvalError> {
        Ok(FieldBuilder::new(local, value)?.build())
    }

    /// Start building a field around the local device's value.
    pub fn builder(local: DeviceId, value: Value) -> Result<FieldBuilder, EvalError> {
        FieldBuilder::new(local, value)
    }

    /// Identity of the device this field was built on.
    #[inline]
    pub fn local(&self) -> DeviceId {
        self.0.local
    }

    #[inline]
    pub fn local_value(&self) -> &Value {
        &self.0.local_value
    }

    pub fn get(&self, id: DeviceId) -> Option<&Value> {
        if id == self.0.local {
            Some(&self.0.local_value)
        } else {
            self.0.neighbors.get(&id)
        }
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        id == self.0.local || self.0.neighbors.contains_key(&id)
    }

    /// Neighbor entries in device order, excluding the local entry.
    pub fn neighbors(&self) -> impl Iterator<Item = (DeviceId, &Value)> {
        self.0.neighbors.iter().map(|(id, v)| (*id, v))
    }

    /// All entries, local first, then neighbors in device order.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &Value)> {
        std::iter::once((self.0.local, &self.0.local_value)).chain(self.neighbors())
    }

    /// Domain of the field, local first.
    pub fn keys(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Number of entries, the local one included. Never zero.
    pub fn len(&self) -> usize {
        self.0.neighbors.len() + 1
    }

    /// Always false; a field has at least the local entry.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (id, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Incremental construction of a `Field`.
#[derive(Debug)]
pub struct FieldBuilder {
    local: DeviceId,
    local_value: Value,
    neighbors: BTreeMap<DeviceId, Value>,
}

impl FieldBuilder {
    /// Fails with `NestedField` if `value` is or contains a field.
    pub fn new(local: DeviceId, value: Value) -> Result<Self, EvalError> {
        if value.contains_field() {
            return Err(nested_field());
        }
        Ok(FieldBuilder {
            local,
            local_value: value,
            neighbors: BTreeMap::new(),
        })
    }

    /// Add a neighbor entry.
    ///
    /// An entry that is or contains a field fails with `MisalignedNeighbor`.
    /// An entry for the local device is ignored: the local value is fixed at
    /// construction.
    pub fn neighbor(&mut self, id: DeviceId, value: Value) -> Result<&mut Self, EvalError> {
        if value.contains_field() {
            return Err(misaligned_neighbor(id, &value));
        }
        if id != self.local {
            self.neighbors.insert(id, value);
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.neighbors.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn build(self) -> Field {
        Field(Heap::new(FieldInner {
            local: self.local,
            local_value: self.local_value,
            neighbors: self.neighbors,
        }))
    }
}
