//! Branch and loop rules.

use flock_value::{loop_bound_exceeded, type_mismatch, EvalError, Value};

/// Path index of the `then` arm.
pub const THEN_ARM: u32 = 0;
/// Path index of the `else` arm.
pub const ELSE_ARM: u32 = 1;

/// Select the arm a branch condition takes.
///
/// Conditions must be booleans; fields are rejected like any other value.
pub fn branch_arm(cond: &Value) -> Result<u32, EvalError> {
    match cond {
        Value::Bool(true) => Ok(THEN_ARM),
        Value::Bool(false) => Ok(ELSE_ARM),
        other => Err(type_mismatch("if condition", "bool", other)),
    }
}

/// Trip count of a `repeat`.
///
/// The count must be a non-negative integral number no larger than `limit`.
pub fn loop_count(count: &Value, limit: usize) -> Result<u32, EvalError> {
    let Value::Number(n) = count else {
        return Err(type_mismatch("repeat count", "number", count));
    };
    let n = *n;
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
        return Err(type_mismatch(
            "repeat count",
            "non-negative integer",
            count,
        ));
    }
    #[expect(
        clippy::cast_precision_loss,
        reason = "limits are far below 2^53"
    )]
    let max = limit as f64;
    if n > max {
        return Err(loop_bound_exceeded(n, limit));
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "checked integral, non-negative and within limit above"
    )]
    let trips = n as u64;
    u32::try_from(trips).map_err(|_| loop_bound_exceeded(n, limit))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use flock_value::EvalErrorKind;

    use super::*;

    #[test]
    fn test_branch_arms() {
        assert_eq!(branch_arm(&Value::Bool(true)).unwrap(), THEN_ARM);
        assert_eq!(branch_arm(&Value::Bool(false)).unwrap(), ELSE_ARM);
    }

    #[test]
    fn test_branch_condition_is_not_coerced() {
        let err = branch_arm(&Value::Number(1.0)).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::TypeMismatch {
                context: "if condition".to_owned(),
                expected: "bool".to_owned(),
                got: "number".to_owned(),
            }
        );
    }

    #[test]
    fn test_loop_count() {
        assert_eq!(loop_count(&Value::Number(0.0), 10).unwrap(), 0);
        assert_eq!(loop_count(&Value::Number(10.0), 10).unwrap(), 10);
    }

    #[test]
    fn test_loop_count_rejects_fractions_and_negatives() {
        for bad in [-1.0, 2.5, f64::NAN, f64::INFINITY] {
            let err = loop_count(&Value::Number(bad), 10).unwrap_err();
            assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
        }
        assert!(loop_count(&Value::Bool(true), 10).is_err());
    }

    #[test]
    fn test_loop_count_over_limit() {
        let err = loop_count(&Value::Number(11.0), 10).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::LoopBoundExceeded {
                count: "11".to_owned(),
                limit: 10,
            }
        );
    }
}
