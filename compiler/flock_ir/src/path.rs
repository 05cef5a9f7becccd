//! Alignment paths.
//!
//! An alignment path is the sequence of structural markers pushed while a
//! round evaluates: one entry per branch arm taken, function entered, loop
//! iteration, `nbr` and `rep`. Two evaluations reach the same path only when
//! they are at the structurally equivalent program point, which makes the path
//! the join key between this round and the state a device (or its neighbors)
//! exported the round before.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ExprId;

/// Construct tag of a program node.
///
/// Exposed for diagnostics and as the first half of a `PathTag`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Construct {
    Literal,
    Tuple,
    Ident,
    Let,
    Block,
    Operator,
    Call,
    Lambda,
    Branch,
    Loop,
    Nbr,
    Rep,
    SelfId,
    Sense,
}

impl Construct {
    /// Source-level keyword for this construct.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Tuple => "tuple",
            Self::Ident => "ident",
            Self::Let => "let",
            Self::Block => "block",
            Self::Operator => "op",
            Self::Call => "call",
            Self::Lambda => "fn",
            Self::Branch => "if",
            Self::Loop => "repeat",
            Self::Nbr => "nbr",
            Self::Rep => "rep",
            Self::SelfId => "self",
            Self::Sense => "env",
        }
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Stable structural tag of one program node: what it is and where it sits.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct PathTag {
    pub construct: Construct,
    pub site: ExprId,
}

impl PathTag {
    #[inline]
    pub const fn new(construct: Construct, site: ExprId) -> Self {
        PathTag { construct, site }
    }
}

/// One alignment path entry: a node tag plus a disambiguation index.
///
/// The index separates repeated visits of the same node at one depth: the
/// arm a branch took, the callee a call site entered, the iteration a loop
/// is in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct PathEntry {
    pub tag: PathTag,
    pub index: u32,
}

impl PathEntry {
    #[inline]
    pub const fn new(tag: PathTag, index: u32) -> Self {
        PathEntry { tag, index }
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}[{}]",
            self.tag.construct,
            self.tag.site.raw(),
            self.index
        )
    }
}

/// Full alignment path from the root to the current node.
///
/// Ordering and hashing are those of the entry slice, so export trees keyed
/// by `CodePath` can be probed with a borrowed `&[PathEntry]`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CodePath(SmallVec<[PathEntry; 8]>);

impl CodePath {
    /// The empty path, where a round's own result is exported.
    pub fn root() -> Self {
        CodePath(SmallVec::new())
    }

    #[inline]
    pub fn push(&mut self, entry: PathEntry) {
        self.0.push(entry);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<PathEntry> {
        self.0.pop()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[PathEntry] {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Borrow<[PathEntry]> for CodePath {
    fn borrow(&self) -> &[PathEntry] {
        &self.0
    }
}

impl From<&[PathEntry]> for CodePath {
    fn from(entries: &[PathEntry]) -> Self {
        CodePath(SmallVec::from_slice(entries))
    }
}

impl FromIterator<PathEntry> for CodePath {
    fn from_iter<I: IntoIterator<Item = PathEntry>>(iter: I) -> Self {
        CodePath(iter.into_iter().collect())
    }
}

impl fmt::Display for CodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for entry in &self.0 {
            write!(f, "/{entry}")?;
        }
        Ok(())
    }
}
