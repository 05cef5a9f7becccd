//! Export trees and neighbor history.
//!
//! An `ExportTree` is what a device publishes after a round: one value per
//! alignment path the round reached. Published trees are immutable and
//! shared (`SharedExport`); a device's view of its neighbors is a
//! `NeighborHistory` snapshot that is swapped wholesale between rounds.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use flock_ir::{CodePath, DeviceId, PathEntry};
use serde::{Deserialize, Serialize};

use crate::errors::{duplicate_export, EvalError};
use crate::value::Value;

/// Mapping from alignment path to the value exported there.
///
/// Keys are ordered, so two trees with the same entries serialize to the
/// same bytes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportTree {
    entries: BTreeMap<CodePath, Value>,
}

impl ExportTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` at `path`.
    ///
    /// Fails with `DuplicateExport` if the path was already written; the
    /// existing entry is kept.
    pub fn insert(&mut self, path: &CodePath, value: Value) -> Result<(), EvalError> {
        if self.entries.contains_key(path) {
            return Err(duplicate_export(path));
        }
        self.entries.insert(path.clone(), value);
        Ok(())
    }

    #[inline]
    pub fn get(&self, path: &[PathEntry]) -> Option<&Value> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &[PathEntry]) -> bool {
        self.entries.contains_key(path)
    }

    /// Value the round evaluated to, exported at the empty path.
    pub fn root_value(&self) -> Option<&Value> {
        let root: &[PathEntry] = &[];
        self.entries.get(root)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CodePath, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A published, immutable export tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SharedExport(Arc<ExportTree>);

impl SharedExport {
    pub fn new(tree: ExportTree) -> Self {
        SharedExport(Arc::new(tree))
    }
}

impl From<ExportTree> for SharedExport {
    fn from(tree: ExportTree) -> Self {
        SharedExport::new(tree)
    }
}

impl Deref for SharedExport {
    type Target = ExportTree;

    fn deref(&self) -> &ExportTree {
        &self.0
    }
}

/// The latest export tree received from each neighbor.
///
/// Cloning is cheap. Updates build a new snapshot and leave every existing
/// clone untouched, so a round in progress never observes a change.
#[derive(Clone, Debug, Default)]
pub struct NeighborHistory(Arc<BTreeMap<DeviceId, SharedExport>>);

impl NeighborHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot in which `neighbor`'s tree is replaced by `export`.
    #[must_use]
    pub fn with_neighbor(&self, neighbor: DeviceId, export: SharedExport) -> Self {
        let mut map = (*self.0).clone();
        map.insert(neighbor, export);
        NeighborHistory(Arc::new(map))
    }

    /// A snapshot without `neighbor`.
    #[must_use]
    pub fn without_neighbor(&self, neighbor: DeviceId) -> Self {
        let mut map = (*self.0).clone();
        map.remove(&neighbor);
        NeighborHistory(Arc::new(map))
    }

    pub fn get(&self, neighbor: DeviceId) -> Option<&SharedExport> {
        self.0.get(&neighbor)
    }

    /// Neighbors in device order.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &SharedExport)> {
        self.0.iter().map(|(id, export)| (*id, export))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(DeviceId, SharedExport)> for NeighborHistory {
    fn from_iter<I: IntoIterator<Item = (DeviceId, SharedExport)>>(iter: I) -> Self {
        NeighborHistory(Arc::new(iter.into_iter().collect()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use flock_ir::{Construct, ExprId, PathTag};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::errors::EvalErrorKind;

    fn path(site: u32) -> CodePath {
        [PathEntry::new(
            PathTag::new(Construct::Rep, ExprId::new(site)),
            0,
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_insert_and_get() {
        let mut tree = ExportTree::new();
        tree.insert(&path(1), Value::Number(1.0)).unwrap();
        tree.insert(&CodePath::root(), Value::Bool(true)).unwrap();
        assert_eq!(tree.get(path(1).entries()), Some(&Value::Number(1.0)));
        assert_eq!(tree.root_value(), Some(&Value::Bool(true)));
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(path(2).entries()));
    }

    #[test]
    fn test_duplicate_path_is_rejected() {
        let mut tree = ExportTree::new();
        tree.insert(&path(4), Value::Number(1.0)).unwrap();
        let err = tree.insert(&path(4), Value::Number(2.0)).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::DuplicateExport {
                path: "/rep@4[0]".to_owned()
            }
        );
        assert_eq!(err.path, Some(path(4)));
        assert_eq!(tree.get(path(4).entries()), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_insertion_order_does_not_change_bytes() {
        let mut a = ExportTree::new();
        a.insert(&path(1), Value::Number(1.0)).unwrap();
        a.insert(&path(2), Value::Number(2.0)).unwrap();
        let mut b = ExportTree::new();
        b.insert(&path(2), Value::Number(2.0)).unwrap();
        b.insert(&path(1), Value::Number(1.0)).unwrap();
        assert_eq!(
            bincode::serialize(&a).unwrap(),
            bincode::serialize(&b).unwrap()
        );
    }

    #[test]
    fn test_history_snapshots_are_isolated() {
        let before = NeighborHistory::new();
        let after = before.with_neighbor(DeviceId::new(2), SharedExport::default());
        assert!(before.is_empty());
        assert_eq!(after.len(), 1);
        assert!(after.get(DeviceId::new(2)).is_some());
        assert!(after.without_neighbor(DeviceId::new(2)).is_empty());
    }
}
