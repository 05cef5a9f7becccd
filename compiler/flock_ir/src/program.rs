//! Programs and the construction surface used by front ends.

use std::fmt;

use crate::ast::{Callee, ExprArena, ExprKind, Literal};
use crate::{ExprId, ExprRange, FunctionId, Name, SharedInterner};

/// A function in the program's function table.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Name,
    pub params: Vec<Name>,
    pub body: ExprId,
}

/// A fully built aggregate program.
///
/// Immutable; every device in a swarm evaluates the same `Program`.
#[derive(Clone, Debug)]
pub struct Program {
    arena: ExprArena,
    functions: Vec<FunctionDef>,
    root: ExprId,
    interner: SharedInterner,
}

impl Program {
    #[inline]
    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    #[inline]
    pub fn root(&self) -> ExprId {
        self.root
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> Option<&FunctionDef> {
        self.functions.get(id.index())
    }

    pub fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }
}

/// Error raised when a program cannot be finished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramError {
    /// A function was declared but never given a body.
    MissingBody { function: String },
    /// A node id that the arena never allocated.
    UnknownExpr { id: u32 },
    /// A node list reaching past the arena's list storage.
    InvalidList { start: u32, len: u32 },
    /// A function id outside the function table.
    UnknownFunction { id: u32 },
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::MissingBody { function } => {
                write!(f, "function `{function}` was declared without a body")
            }
            ProgramError::UnknownExpr { id } => write!(f, "reference to unknown node #{id}"),
            ProgramError::InvalidList { start, len } => {
                write!(f, "node list {start}..+{len} is out of bounds")
            }
            ProgramError::UnknownFunction { id } => {
                write!(f, "reference to unknown function #{id}")
            }
        }
    }
}

impl std::error::Error for ProgramError {}

struct PendingFunction {
    name: Name,
    params: Vec<Name>,
    body: Option<ExprId>,
}

/// Incremental builder for `Program`s.
///
/// Functions may be declared before their bodies exist so that recursive and
/// mutually recursive calls can refer to them.
///
/// ```text
/// let mut b = ProgramBuilder::new();
/// let zero = b.number(0.0);
/// let one = b.number(1.0);
/// let counter = b.ident("counter");
/// let next = b.op("+", &[counter, one]);
/// let root = b.rep("counter", zero, next);
/// let program = b.finish(root)?;
/// ```
pub struct ProgramBuilder {
    arena: ExprArena,
    functions: Vec<PendingFunction>,
    interner: SharedInterner,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    pub fn with_interner(interner: SharedInterner) -> Self {
        ProgramBuilder {
            arena: ExprArena::new(),
            functions: Vec::new(),
            interner,
        }
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Allocate an arbitrary node.
    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc(kind)
    }

    pub fn number(&mut self, n: f64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Number(n)))
    }

    pub fn boolean(&mut self, b: bool) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Bool(b)))
    }

    pub fn string(&mut self, s: &str) -> ExprId {
        let name = self.intern(s);
        self.expr(ExprKind::Literal(Literal::Str(name)))
    }

    pub fn tuple(&mut self, elements: &[ExprId]) -> ExprId {
        let range = self.arena.alloc_list(elements);
        self.expr(ExprKind::Tuple(range))
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let name = self.intern(name);
        self.expr(ExprKind::Ident(name))
    }

    pub fn let_(&mut self, name: &str, value: ExprId) -> ExprId {
        let name = self.intern(name);
        self.expr(ExprKind::Let { name, value })
    }

    pub fn block(&mut self, exprs: &[ExprId]) -> ExprId {
        let range = self.arena.alloc_list(exprs);
        self.expr(ExprKind::Block(range))
    }

    pub fn op(&mut self, op: &str, args: &[ExprId]) -> ExprId {
        let op = self.intern(op);
        let args = self.arena.alloc_list(args);
        self.expr(ExprKind::Operator { op, args })
    }

    pub fn call(&mut self, function: FunctionId, args: &[ExprId]) -> ExprId {
        let args = self.arena.alloc_list(args);
        self.expr(ExprKind::Call {
            callee: Callee::Function(function),
            args,
        })
    }

    /// Apply the closure `callee` evaluates to.
    pub fn call_value(&mut self, callee: ExprId, args: &[ExprId]) -> ExprId {
        let args = self.arena.alloc_list(args);
        self.expr(ExprKind::Call {
            callee: Callee::Expr(callee),
            args,
        })
    }

    /// Anonymous function; evaluates to a closure over the current bindings.
    pub fn lambda(&mut self, params: &[&str], body: ExprId) -> ExprId {
        let name = self.intern("<lambda>");
        let params = params.iter().map(|p| self.intern(p)).collect();
        let id = self.push_function(name, params, Some(body));
        self.expr(ExprKind::Lambda(id))
    }

    pub fn if_(&mut self, cond: ExprId, then_branch: ExprId, else_branch: ExprId) -> ExprId {
        self.expr(ExprKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn repeat(&mut self, var: &str, init: ExprId, count: ExprId, body: ExprId) -> ExprId {
        let var = self.intern(var);
        self.expr(ExprKind::Repeat {
            var,
            init,
            count,
            body,
        })
    }

    pub fn nbr(&mut self, body: ExprId) -> ExprId {
        self.expr(ExprKind::Nbr(body))
    }

    pub fn rep(&mut self, var: &str, init: ExprId, body: ExprId) -> ExprId {
        let var = self.intern(var);
        self.expr(ExprKind::Rep { var, init, body })
    }

    pub fn self_id(&mut self) -> ExprId {
        self.expr(ExprKind::SelfId)
    }

    pub fn sense(&mut self, sensor: &str) -> ExprId {
        let sensor = self.intern(sensor);
        self.expr(ExprKind::Sense(sensor))
    }

    /// Declare a function whose body is supplied later with `define`.
    pub fn declare(&mut self, name: &str, params: &[&str]) -> FunctionId {
        let name = self.intern(name);
        let params = params.iter().map(|p| self.intern(p)).collect();
        self.push_function(name, params, None)
    }

    /// Supply the body of a declared function.
    ///
    /// # Panics
    /// Panics if `id` was not returned by this builder.
    pub fn define(&mut self, id: FunctionId, body: ExprId) {
        self.functions[id.index()].body = Some(body);
    }

    /// Declare and define a function in one step.
    pub fn function(&mut self, name: &str, params: &[&str], body: ExprId) -> FunctionId {
        let id = self.declare(name, params);
        self.define(id, body);
        id
    }

    fn push_function(&mut self, name: Name, params: Vec<Name>, body: Option<ExprId>) -> FunctionId {
        let index = u32::try_from(self.functions.len())
            .unwrap_or_else(|_| panic!("function table overflow"));
        self.functions.push(PendingFunction { name, params, body });
        FunctionId::new(index)
    }

    /// Finish the program with `root` as the expression evaluated each round.
    ///
    /// Every node, node list and function referenced from the arena, the
    /// function bodies or `root` must exist; nodes allocated through `expr`
    /// are not checked until here.
    pub fn finish(self, root: ExprId) -> Result<Program, ProgramError> {
        let interner = self.interner;
        let functions = self
            .functions
            .into_iter()
            .map(|f| match f.body {
                Some(body) => Ok(FunctionDef {
                    name: f.name,
                    params: f.params,
                    body,
                }),
                None => Err(ProgramError::MissingBody {
                    function: interner.lookup(f.name).to_owned(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let check = ReferenceCheck {
            arena: &self.arena,
            functions: functions.len(),
        };
        check.expr(root)?;
        for def in &functions {
            check.expr(def.body)?;
        }
        for (_, kind) in self.arena.iter() {
            check.node(kind)?;
        }

        Ok(Program {
            arena: self.arena,
            functions,
            root,
            interner,
        })
    }
}

/// Bounds checks for the references a finished program may follow.
struct ReferenceCheck<'a> {
    arena: &'a ExprArena,
    functions: usize,
}

impl ReferenceCheck<'_> {
    fn expr(&self, id: ExprId) -> Result<(), ProgramError> {
        if self.arena.contains(id) {
            Ok(())
        } else {
            Err(ProgramError::UnknownExpr { id: id.raw() })
        }
    }

    fn list(&self, range: ExprRange) -> Result<(), ProgramError> {
        let ids = self.arena.try_list(range).ok_or(ProgramError::InvalidList {
            start: range.start,
            len: range.len,
        })?;
        ids.iter().try_for_each(|&id| self.expr(id))
    }

    fn function(&self, id: FunctionId) -> Result<(), ProgramError> {
        if id.index() < self.functions {
            Ok(())
        } else {
            Err(ProgramError::UnknownFunction { id: id.raw() })
        }
    }

    fn node(&self, kind: &ExprKind) -> Result<(), ProgramError> {
        match *kind {
            ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::SelfId | ExprKind::Sense(_) => {
                Ok(())
            }
            ExprKind::Tuple(range) | ExprKind::Block(range) => self.list(range),
            ExprKind::Let { value, .. } | ExprKind::Nbr(value) => self.expr(value),
            ExprKind::Operator { args, .. } => self.list(args),
            ExprKind::Call { callee, args } => {
                match callee {
                    Callee::Function(function) => self.function(function)?,
                    Callee::Expr(expr) => self.expr(expr)?,
                }
                self.list(args)
            }
            ExprKind::Lambda(function) => self.function(function),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr(cond)?;
                self.expr(then_branch)?;
                self.expr(else_branch)
            }
            ExprKind::Repeat {
                init, count, body, ..
            } => {
                self.expr(init)?;
                self.expr(count)?;
                self.expr(body)
            }
            ExprKind::Rep { init, body, .. } => {
                self.expr(init)?;
                self.expr(body)
            }
        }
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn test_finish_resolves_functions() {
        let mut b = ProgramBuilder::new();
        let x = b.ident("x");
        let double = b.function("double", &["x"], x);
        let two = b.number(2.0);
        let root = b.call(double, &[two]);
        let program = b.finish(root).unwrap();

        let def = program.function(double).unwrap();
        assert_eq!(program.interner().lookup(def.name), "double");
        assert_eq!(def.params.len(), 1);
        assert_eq!(program.root(), root);
    }

    #[test]
    fn test_missing_body_is_reported() {
        let mut b = ProgramBuilder::new();
        let f = b.declare("loop_forever", &[]);
        let root = b.call(f, &[]);
        let err = b.finish(root).unwrap_err();
        assert_eq!(
            err,
            ProgramError::MissingBody {
                function: "loop_forever".to_owned()
            }
        );
    }

    #[test]
    fn test_dangling_node_is_rejected() {
        let mut b = ProgramBuilder::new();
        let root = b.expr(ExprKind::Nbr(ExprId::new(99)));
        assert_eq!(
            b.finish(root).unwrap_err(),
            ProgramError::UnknownExpr { id: 99 }
        );
    }

    #[test]
    fn test_dangling_root_and_body_are_rejected() {
        let b = ProgramBuilder::new();
        assert_eq!(
            b.finish(ExprId::new(0)).unwrap_err(),
            ProgramError::UnknownExpr { id: 0 }
        );

        let mut b = ProgramBuilder::new();
        let f = b.declare("f", &[]);
        b.define(f, ExprId::new(40));
        let root = b.call(f, &[]);
        assert_eq!(
            b.finish(root).unwrap_err(),
            ProgramError::UnknownExpr { id: 40 }
        );
    }

    #[test]
    fn test_out_of_bounds_list_is_rejected() {
        let mut b = ProgramBuilder::new();
        let root = b.expr(ExprKind::Tuple(ExprRange::new(3, 2)));
        assert_eq!(
            b.finish(root).unwrap_err(),
            ProgramError::InvalidList { start: 3, len: 2 }
        );
    }

    #[test]
    fn test_list_entries_are_checked() {
        let mut b = ProgramBuilder::new();
        let one = b.number(1.0);
        let root = b.tuple(&[one, ExprId::new(12)]);
        assert_eq!(
            b.finish(root).unwrap_err(),
            ProgramError::UnknownExpr { id: 12 }
        );
    }

    #[test]
    fn test_unknown_function_is_rejected() {
        let mut b = ProgramBuilder::new();
        let root = b.expr(ExprKind::Lambda(FunctionId::new(7)));
        let err = b.finish(root).unwrap_err();
        assert_eq!(err, ProgramError::UnknownFunction { id: 7 });
        assert_eq!(err.to_string(), "reference to unknown function #7");

        let mut b = ProgramBuilder::new();
        let unit = b.tuple(&[]);
        let call = b.expr(ExprKind::Call {
            callee: Callee::Function(FunctionId::new(0)),
            args: ExprRange::EMPTY,
        });
        let root = b.block(&[unit, call]);
        assert_eq!(
            b.finish(root).unwrap_err(),
            ProgramError::UnknownFunction { id: 0 }
        );
    }

    #[test]
    fn test_lambda_registers_anonymous_function() {
        let mut b = ProgramBuilder::new();
        let y = b.ident("y");
        let lambda = b.lambda(&["y"], y);
        let program = b.finish(lambda).unwrap();
        assert_eq!(program.functions().len(), 1);
        assert!(matches!(program.arena().get(lambda), ExprKind::Lambda(_)));
    }
}
