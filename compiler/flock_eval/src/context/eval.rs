//! Node evaluation.
//!
//! `eval` is the single entry point: it copies the node kind out of the
//! arena and dispatches on it exhaustively. Nodes that separate neighbor
//! state (branches, calls, loop iterations, `nbr` and `rep`) extend the
//! alignment path with the tag `ExprArena::path_tag` gives their site; every
//! other node is transparent.

use flock_ir::{ExprId, ExprKind, ExprRange, Name};
use flock_stack::ensure_sufficient_stack;
use flock_value::{nested_field, EvalError, EvalResult, Field, Value};
use smallvec::SmallVec;

use super::ExecutionContext;
use crate::exec::{control, expr, field};

impl ExecutionContext<'_> {
    /// Evaluate a node for the local device.
    ///
    /// Errors leave with the alignment path at which they were raised.
    pub fn eval(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| {
            self.eval_inner(id)
                .map_err(|err| err.at_path(&self.path))
        })
    }

    fn eval_inner(&mut self, id: ExprId) -> EvalResult {
        let program = self.program;
        match *program.arena().get(id) {
            ExprKind::Literal(literal) => Ok(expr::eval_literal(literal, program.interner())),
            ExprKind::Tuple(range) => Ok(Value::tuple(self.eval_list(range)?)),
            ExprKind::Ident(name) => self.resolve(name),
            ExprKind::Let { name, value } => {
                let value = self.eval(value)?;
                self.bind(name, value.clone());
                Ok(value)
            }
            ExprKind::Block(range) => self.eval_block(range),
            ExprKind::Operator { op, args } => {
                let operands = self.eval_list(args)?;
                self.registry
                    .apply(program.interner().lookup(op), &operands)
            }
            ExprKind::Call { callee, args } => self.eval_call(id, callee, args),
            ExprKind::Lambda(function) => Ok(Value::closure(function, self.capture())),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.eval_if(id, cond, then_branch, else_branch),
            ExprKind::Repeat {
                var,
                init,
                count,
                body,
            } => self.eval_repeat(id, var, init, count, body),
            ExprKind::Nbr(body) => self.eval_nbr(id, body),
            ExprKind::Rep { var, init, body } => self.eval_rep(id, var, init, body),
            ExprKind::SelfId => Ok(Value::device(self.device())),
            ExprKind::Sense(sensor) => self.sense(sensor),
        }
    }

    /// Evaluate a list of nodes left to right.
    pub(super) fn eval_list(&mut self, range: ExprRange) -> Result<Vec<Value>, EvalError> {
        let ids: SmallVec<[ExprId; 8]> = SmallVec::from_slice(self.program.arena().list(range));
        ids.into_iter().map(|id| self.eval(id)).collect()
    }

    fn eval_block(&mut self, range: ExprRange) -> EvalResult {
        let program = self.program;
        self.with_scope(|scoped| {
            let mut last = expr::unit();
            for &id in program.arena().list(range) {
                last = scoped.eval(id)?;
            }
            Ok(last)
        })
    }

    /// Evaluate exactly one arm, under a path entry naming that arm.
    fn eval_if(&mut self, site: ExprId, cond: ExprId, then_branch: ExprId, else_branch: ExprId) -> EvalResult {
        let cond = self.eval(cond)?;
        let arm = control::branch_arm(&cond)?;
        let body = if arm == control::THEN_ARM {
            then_branch
        } else {
            else_branch
        };
        self.with_path(self.program.arena().path_tag(site), arm, |aligned| {
            aligned.with_scope(|scoped| scoped.eval(body))
        })
    }

    /// Run `body` `count` times; iteration `i` is aligned under index `i`.
    fn eval_repeat(
        &mut self,
        site: ExprId,
        var: Name,
        init: ExprId,
        count: ExprId,
        body: ExprId,
    ) -> EvalResult {
        let mut acc = self.eval(init)?;
        let count = self.eval(count)?;
        let trips = control::loop_count(&count, self.limits.max_loop_iterations)?;
        let tag = self.program.arena().path_tag(site);
        for iteration in 0..trips {
            acc = self.with_path(tag, iteration, |aligned| {
                aligned.with_binding(var, acc, |scoped| scoped.eval(body))
            })?;
        }
        Ok(acc)
    }

    /// Build the field of aligned neighbor values of `body`.
    ///
    /// The local value is exported at this path so that neighbors find it
    /// next round.
    fn eval_nbr(&mut self, site: ExprId, body: ExprId) -> EvalResult {
        self.with_path(self.program.arena().path_tag(site), 0, |aligned| {
            let local = aligned.eval(body)?;
            if local.contains_field() {
                return Err(nested_field());
            }
            aligned.export(&local)?;
            let builder = Field::builder(aligned.device(), local)?;
            let neighbors = aligned.read_neighbors(aligned.path().entries());
            let field = field::neighbor_field(builder, neighbors, aligned.path());
            Ok(Value::Field(field))
        })
    }

    /// Carry state from round to round.
    ///
    /// The first round (no prior value at this path) yields `init`; every
    /// later round evaluates `body` with `var` bound to the previous value.
    fn eval_rep(&mut self, site: ExprId, var: Name, init: ExprId, body: ExprId) -> EvalResult {
        self.with_path(self.program.arena().path_tag(site), 0, |aligned| {
            let next = match aligned.read_prior_self(aligned.path().entries()) {
                Some(previous) => {
                    aligned.with_binding(var, previous.clone(), |scoped| scoped.eval(body))?
                }
                None => aligned.eval(init)?,
            };
            aligned.export(&next)?;
            Ok(next)
        })
    }
}
