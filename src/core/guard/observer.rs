/*!
 * Failure Observers
 *
 * Answer "did a failure start during this guard's lifetime" for the
 * conditional exit policies. A snapshot is taken at construction and
 * another at disposal; the observer compares the two.
 */

use std::cell::Cell;
use std::rc::Rc;

/// Source of failure-state snapshots
pub trait FailureObserver {
    /// Opaque failure state at one instant
    type Snapshot: Copy;

    /// Capture the current failure state
    fn snapshot(&self) -> Self::Snapshot;

    /// True iff `at_destruction` shows a failure absent at `at_construction`
    fn has_new_failure(&self, at_construction: Self::Snapshot, at_destruction: Self::Snapshot)
        -> bool;
}

/// Observes the current thread's unwind state
///
/// The snapshot is a single bool, not a count of panics in flight. A guard
/// created while the thread was already panicking (e.g. inside another
/// guard's cleanup) reads `true` at both ends of its life, so it never
/// reports a new failure, even when a nested panic starts and is caught
/// inside its scope. Use [`FailureCounter`] for guards that live inside
/// cleanup code and need to see such nested failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicObserver;

impl FailureObserver for PanicObserver {
    type Snapshot = bool;

    #[inline]
    fn snapshot(&self) -> bool {
        std::thread::panicking()
    }

    #[inline]
    fn has_new_failure(&self, at_construction: bool, at_destruction: bool) -> bool {
        !at_construction && at_destruction
    }
}

/// Explicit failure flag threaded through the call site
///
/// For code that reports failure through `Result` instead of unwinding.
/// Clones share one counter; it is not `Send`.
///
/// # Example
///
/// ```rust
/// use atlas_scope::{ExitGuard, FailureCounter, ScopeFail};
///
/// let failures = FailureCounter::new();
/// let _rollback: ScopeFail<_, FailureCounter> =
///     ExitGuard::with_observer(|| println!("rollback"), failures.clone());
/// failures.fail();
/// ```
#[derive(Debug, Clone, Default)]
pub struct FailureCounter {
    count: Rc<Cell<u64>>,
}

impl FailureCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure
    pub fn fail(&self) {
        self.count.set(self.count.get() + 1);
    }

    /// Record a failure if `result` is an error, passing it through
    pub fn observe<T, E>(&self, result: Result<T, E>) -> Result<T, E> {
        if result.is_err() {
            self.fail();
        }
        result
    }

    /// Failures recorded so far
    pub fn count(&self) -> u64 {
        self.count.get()
    }
}

impl FailureObserver for FailureCounter {
    type Snapshot = u64;

    fn snapshot(&self) -> u64 {
        self.count.get()
    }

    fn has_new_failure(&self, at_construction: u64, at_destruction: u64) -> bool {
        at_destruction > at_construction
    }
}
