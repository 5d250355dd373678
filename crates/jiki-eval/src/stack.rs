//! Stack growth for deep recursion.
//!
//! User recursion, nested expressions and deeply nested lists all recurse
//! on the host stack. Evaluation entry points go through
//! [`ensure_sufficient_stack`] so `maxCallDepth` is reached before the host
//! stack runs out.

/// Run `f`, first moving to a fresh stack segment if less than the red
/// zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 128 * 1024;
    const STACK_PER_SEGMENT: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
