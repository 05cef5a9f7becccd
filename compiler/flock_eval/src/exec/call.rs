//! Function application rules.

use flock_ir::{FunctionDef, Name, StringInterner};
use flock_value::{arity_mismatch, EvalError, Value};

/// Check that a call supplies exactly one argument per parameter.
pub fn check_arg_count(
    def: &FunctionDef,
    args: &[Value],
    interner: &StringInterner,
) -> Result<(), EvalError> {
    if def.params.len() != args.len() {
        return Err(arity_mismatch(
            interner.lookup(def.name),
            def.params.len(),
            args.len(),
        ));
    }
    Ok(())
}

/// Pair parameters with argument values, in declaration order.
pub fn parameter_bindings(def: &FunctionDef, args: Vec<Value>) -> impl Iterator<Item = (Name, Value)> + '_ {
    def.params.iter().copied().zip(args)
}
