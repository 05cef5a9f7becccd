//! Host-stack safety for the recursive flock evaluator.
//!
//! Evaluation of a round is a recursive walk over the program tree. Nesting
//! depth is bounded by the evaluator's configured path and scope limits, but
//! those limits can sit well above what a default thread stack survives. This
//! crate grows the stack on demand so that the configured limits, not a host
//! stack overflow, decide when evaluation stops.
//!
//! # Platform Support
//!
//! - **Native targets**: Uses the `stacker` crate to grow the stack on demand.
//! - **WASM targets**: No-op passthrough (WASM has its own stack management).
//!
//! # Configuration
//!
//! - **Red zone**: 128KB - If less than this remains, we grow the stack
//! - **Growth size**: 2MB - Each growth allocates this much additional space

/// Minimum stack space to keep available (128KB red zone).
const RED_ZONE: usize = 128 * 1024;

/// Stack space to allocate when growing (2MB).
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone threshold, additional stack
/// space is allocated before calling `f`.
///
/// ```text
/// fn eval(&mut self, id: ExprId) -> EvalResult {
///     ensure_sufficient_stack(|| self.eval_inner(id))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
