//! Program nodes.
//!
//! Nodes are stored flat in an `ExprArena` and refer to each other by
//! `ExprId`. A node's id is also its site in alignment paths, so two distinct
//! nodes never alias each other's neighbor state.
//!
//! The arena is produced by an external front end (or by `ProgramBuilder` in
//! tests) and is immutable once a `Program` is finished.

use crate::{Construct, ExprId, ExprRange, FunctionId, Name, PathTag};

/// Literal constant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    Bool(bool),
    /// Interned string contents.
    Str(Name),
}

/// Target of a function application.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Callee {
    /// A function from the program's function table.
    Function(FunctionId),
    /// An expression that must evaluate to a closure.
    Expr(ExprId),
}

/// Expression variants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    /// Tuple construction from element expressions.
    Tuple(ExprRange),
    /// Variable reference.
    Ident(Name),
    /// `let name = value`: binds into the innermost scope frame.
    Let { name: Name, value: ExprId },
    /// Lexical block: new scope frame, evaluates in order, yields the last value.
    Block(ExprRange),
    /// Operator application, dispatched by name through the operator registry.
    Operator { op: Name, args: ExprRange },
    /// Function application.
    Call { callee: Callee, args: ExprRange },
    /// Closure creation over the current lexical bindings.
    Lambda(FunctionId),
    /// `if cond { then_branch } else { else_branch }`.
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    /// `repeat var <- init, count { body }`: runs `body` `count` times,
    /// each iteration rebinding `var` to the previous iteration's result.
    Repeat {
        var: Name,
        init: ExprId,
        count: ExprId,
        body: ExprId,
    },
    /// `nbr(body)`: the field of aligned neighbor values of `body`.
    Nbr(ExprId),
    /// `rep (var <- init) { body }`: state carried from round to round.
    Rep { var: Name, init: ExprId, body: ExprId },
    /// The local device identity.
    SelfId,
    /// Reads a named sensor from the device environment.
    Sense(Name),
}

impl ExprKind {
    /// Construct tag of this node.
    pub const fn construct(&self) -> Construct {
        match self {
            Self::Literal(_) => Construct::Literal,
            Self::Tuple(_) => Construct::Tuple,
            Self::Ident(_) => Construct::Ident,
            Self::Let { .. } => Construct::Let,
            Self::Block(_) => Construct::Block,
            Self::Operator { .. } => Construct::Operator,
            Self::Call { .. } => Construct::Call,
            Self::Lambda(_) => Construct::Lambda,
            Self::If { .. } => Construct::Branch,
            Self::Repeat { .. } => Construct::Loop,
            Self::Nbr(_) => Construct::Nbr,
            Self::Rep { .. } => Construct::Rep,
            Self::SelfId => Construct::SelfId,
            Self::Sense(_) => Construct::Sense,
        }
    }

    /// Construct keyword, for diagnostics.
    pub const fn name(&self) -> &'static str {
        self.construct().keyword()
    }
}

/// Flat storage for program nodes.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<ExprKind>,
    expr_lists: Vec<ExprId>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its id.
    ///
    /// # Panics
    /// Panics if the arena grows beyond `u32::MAX - 1` nodes.
    pub fn alloc(&mut self, kind: ExprKind) -> ExprId {
        let index = u32::try_from(self.exprs.len())
            .ok()
            .filter(|&index| index != u32::MAX)
            .unwrap_or_else(|| panic!("expression arena overflow"));
        self.exprs.push(kind);
        ExprId::new(index)
    }

    /// Allocate a list of node ids, returning its range.
    ///
    /// # Panics
    /// Panics if list storage grows beyond `u32::MAX` entries.
    pub fn alloc_list(&mut self, ids: &[ExprId]) -> ExprRange {
        let start = u32::try_from(self.expr_lists.len())
            .unwrap_or_else(|_| panic!("expression list storage overflow"));
        let len = u32::try_from(ids.len()).unwrap_or_else(|_| panic!("expression list too long"));
        self.expr_lists.extend_from_slice(ids);
        ExprRange::new(start, len)
    }

    /// Get a node.
    ///
    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn get(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()]
    }

    /// Get a node, or `None` if `id` is outside the arena.
    #[inline]
    pub fn try_get(&self, id: ExprId) -> Option<&ExprKind> {
        self.exprs.get(id.index())
    }

    #[inline]
    pub fn contains(&self, id: ExprId) -> bool {
        id.index() < self.exprs.len()
    }

    /// Get the ids in a list range, or `None` if it reaches past list storage.
    pub fn try_list(&self, range: ExprRange) -> Option<&[ExprId]> {
        let start = range.start as usize;
        let end = start.checked_add(range.len())?;
        self.expr_lists.get(start..end)
    }

    /// Every node with its id, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &ExprKind)> {
        (0u32..).map(ExprId::new).zip(self.exprs.iter())
    }

    /// Get the ids in a list range.
    ///
    /// # Panics
    /// Panics if `range` was not allocated by this arena.
    #[inline]
    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    /// Stable structural tag of a node, used to extend alignment paths.
    #[inline]
    pub fn path_tag(&self, id: ExprId) -> PathTag {
        PathTag::new(self.get(id).construct(), id)
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_get() {
        let mut arena = ExprArena::new();
        let one = arena.alloc(ExprKind::Literal(Literal::Number(1.0)));
        let nbr = arena.alloc(ExprKind::Nbr(one));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(nbr), &ExprKind::Nbr(one));
        assert_eq!(arena.get(nbr).name(), "nbr");
    }

    #[test]
    fn test_lists() {
        let mut arena = ExprArena::new();
        let a = arena.alloc(ExprKind::SelfId);
        let b = arena.alloc(ExprKind::Literal(Literal::Bool(true)));
        let range = arena.alloc_list(&[a, b, a]);
        assert_eq!(arena.list(range), &[a, b, a]);
        assert_eq!(arena.list(ExprRange::EMPTY), &[] as &[ExprId]);
    }

    #[test]
    fn test_checked_access() {
        let mut arena = ExprArena::new();
        let a = arena.alloc(ExprKind::SelfId);
        let range = arena.alloc_list(&[a, a]);
        assert!(arena.contains(a));
        assert!(!arena.contains(ExprId::new(5)));
        assert_eq!(arena.try_get(ExprId::new(5)), None);
        assert_eq!(arena.try_list(range), Some(&[a, a][..]));
        assert_eq!(arena.try_list(ExprRange::new(1, 4)), None);
        assert_eq!(arena.try_list(ExprRange::new(u32::MAX, u32::MAX)), None);
        assert_eq!(arena.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_path_tag_uses_site() {
        let mut arena = ExprArena::new();
        let body = arena.alloc(ExprKind::SelfId);
        let first = arena.alloc(ExprKind::Nbr(body));
        let second = arena.alloc(ExprKind::Nbr(body));
        assert_eq!(arena.path_tag(first).construct, Construct::Nbr);
        assert_ne!(arena.path_tag(first), arena.path_tag(second));
    }
}
