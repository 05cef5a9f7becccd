//! Function application.

use flock_ir::{Callee, ExprId, ExprRange, FunctionId};
use flock_value::{not_callable, unknown_function, EvalResult, Value};

use super::ExecutionContext;
use crate::exec::call::{check_arg_count, parameter_bindings};

impl ExecutionContext<'_> {
    /// Apply a function or closure.
    ///
    /// The callee body runs in a function frame (parameters plus captures
    /// only) under a path entry keyed by the call site and the callee, so
    /// two different functions reached from one site never share neighbor
    /// state. The result is exported at the call entry.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(node = self.program.arena().get(site).name(), site = site.raw())
    )]
    pub(super) fn eval_call(&mut self, site: ExprId, callee: Callee, args: ExprRange) -> EvalResult {
        let (function, captures) = match callee {
            Callee::Function(function) => (function, None),
            Callee::Expr(expr) => match self.eval(expr)? {
                Value::Closure(closure) => (closure.function, Some(closure.captures)),
                other => return Err(not_callable(&other)),
            },
        };
        let program = self.program;
        let def = program
            .function(function)
            .ok_or_else(|| unknown_function(&function_label(function)))?;

        let values = self.eval_list(args)?;
        check_arg_count(def, &values, program.interner())?;

        let captured = captures
            .as_deref()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .cloned();
        let bindings = captured.chain(parameter_bindings(def, values));

        let tag = program.arena().path_tag(site);
        self.with_path(tag, function.raw(), |aligned| {
            let result = aligned.with_function_scope(bindings, |scoped| scoped.eval(def.body))?;
            aligned.export(&result)?;
            Ok(result)
        })
    }
}

fn function_label(function: FunctionId) -> String {
    format!("#{}", function.raw())
}
