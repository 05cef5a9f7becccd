//! Evaluation limits.
//!
//! Deep recursion through function calls, branches and loops is bounded by
//! configuration rather than by the host stack: exceeding a limit fails the
//! round with `DepthExceeded` or `LoopBoundExceeded`.

/// Bounds applied to every round.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum number of alignment path entries.
    pub max_path_depth: usize,
    /// Maximum number of scope frames, the top-level frame included.
    pub max_scope_depth: usize,
    /// Maximum trip count of a single `repeat`.
    pub max_loop_iterations: usize,
}

impl EvalLimits {
    pub const DEFAULT_MAX_PATH_DEPTH: usize = 512;
    pub const DEFAULT_MAX_SCOPE_DEPTH: usize = 512;
    pub const DEFAULT_MAX_LOOP_ITERATIONS: usize = 10_000;

    pub const fn new() -> Self {
        EvalLimits {
            max_path_depth: Self::DEFAULT_MAX_PATH_DEPTH,
            max_scope_depth: Self::DEFAULT_MAX_SCOPE_DEPTH,
            max_loop_iterations: Self::DEFAULT_MAX_LOOP_ITERATIONS,
        }
    }

    #[must_use]
    pub const fn with_max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    #[must_use]
    pub const fn with_max_scope_depth(mut self, depth: usize) -> Self {
        self.max_scope_depth = depth;
        self
    }

    #[must_use]
    pub const fn with_max_loop_iterations(mut self, iterations: usize) -> Self {
        self.max_loop_iterations = iterations;
        self
    }
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = EvalLimits::default();
        assert_eq!(limits.max_path_depth, 512);
        assert_eq!(limits.max_scope_depth, 512);
        assert_eq!(limits.max_loop_iterations, 10_000);
    }

    #[test]
    fn test_builder_setters() {
        let limits = EvalLimits::new()
            .with_max_path_depth(8)
            .with_max_scope_depth(4)
            .with_max_loop_iterations(2);
        assert_eq!(
            limits,
            EvalLimits {
                max_path_depth: 8,
                max_scope_depth: 4,
                max_loop_iterations: 2,
            }
        );
    }
}
