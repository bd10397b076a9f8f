//! Suppressed-persistence scope and association nesting depth.
//!
//! Both are thread-local counters guarded by drop guards: entering a scope
//! increments, leaving (normally, by `?`, or by unwinding) decrements. A
//! nested scope therefore never ends an outer one early, and a finished
//! scope never leaks into the next construction on the same thread.

use std::cell::Cell;

use crate::error::{BuildError, BuildResult};

thread_local! {
	static SUPPRESSION_DEPTH: Cell<usize> = const { Cell::new(0) };
	static BUILD_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Returns true while persistence is suppressed on this thread.
pub fn is_persistence_suppressed() -> bool {
	SUPPRESSION_DEPTH.with(|depth| depth.get() > 0)
}

/// Runs `f` with persistence suppressed for everything it constructs.
///
/// # Example
///
/// ```
/// use fabrik_core::scope::{is_persistence_suppressed, with_persistence_suppressed};
///
/// assert!(!is_persistence_suppressed());
/// with_persistence_suppressed(|| {
///     with_persistence_suppressed(|| assert!(is_persistence_suppressed()));
///     assert!(is_persistence_suppressed());
/// });
/// assert!(!is_persistence_suppressed());
/// ```
pub fn with_persistence_suppressed<T>(f: impl FnOnce() -> T) -> T {
	let _guard = SuppressionGuard::enter();
	f()
}

struct SuppressionGuard;

impl SuppressionGuard {
	fn enter() -> Self {
		SUPPRESSION_DEPTH.with(|depth| depth.set(depth.get() + 1));
		Self
	}
}

impl Drop for SuppressionGuard {
	fn drop(&mut self) {
		SUPPRESSION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
	}
}

/// Tracks one level of construction nesting while alive.
pub(crate) struct DepthGuard;

impl DepthGuard {
	/// Enters one nesting level for `model`, failing past `limit`.
	pub(crate) fn enter(model: &str, limit: usize) -> BuildResult<Self> {
		BUILD_DEPTH.with(|depth| {
			let current = depth.get();
			if current >= limit {
				return Err(BuildError::RecursionLimit {
					model: model.to_string(),
					limit,
				});
			}
			depth.set(current + 1);
			Ok(Self)
		})
	}
}

impl Drop for DepthGuard {
	fn drop(&mut self) {
		BUILD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
	}
}
