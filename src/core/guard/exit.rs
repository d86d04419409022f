/*!
 * Exit Guards
 *
 * Run a bound action when the enclosing scope ends
 */

use super::observer::{FailureObserver, PanicObserver};
use super::policy::{Always, ExitPolicy, OnFailure, OnSuccess};
use super::traits::{Guard, Observable};
use super::{report_disposal_error, run_contained, GuardError, GuardMetadata, GuardResult, GuardState};
use crate::core::config;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Runs its action on every scope exit
pub type ScopeExit<F, O = PanicObserver> = ExitGuard<F, Always, O>;

/// Runs its action only when a failure began during its lifetime
pub type ScopeFail<F, O = PanicObserver> = ExitGuard<F, OnFailure, O>;

/// Runs its action only when no failure began during its lifetime
pub type ScopeSuccess<F, O = PanicObserver> = ExitGuard<F, OnSuccess, O>;

/// Scope guard with a pluggable exit policy
///
/// The action runs at most once, on drop, if the guard is still armed and
/// the policy `P` agrees given what observer `O` saw. Guards cannot be
/// cloned; moving one moves the single right to run the action.
///
/// # Example
///
/// ```rust
/// use atlas_scope::{scope_exit, scope_success};
/// use std::cell::RefCell;
///
/// let log = RefCell::new(Vec::new());
/// {
///     let _a = scope_exit(|| log.borrow_mut().push("A"));
///     let _b = scope_success(|| log.borrow_mut().push("B"));
/// }
/// assert_eq!(*log.borrow(), ["B", "A"]);
/// ```
#[must_use = "a guard dropped immediately runs its action immediately"]
pub struct ExitGuard<F, P = Always, O = PanicObserver>
where
    F: FnOnce(),
    P: ExitPolicy,
    O: FailureObserver,
{
    action: Option<F>,
    armed: bool,
    observer: O,
    snapshot: O::Snapshot,
    metadata: GuardMetadata,
    _policy: PhantomData<fn() -> P>,
}

impl<F, P, O> ExitGuard<F, P, O>
where
    F: FnOnce(),
    P: ExitPolicy,
    O: FailureObserver,
{
    /// Create an armed guard with the default observer
    pub fn new(action: F) -> Self
    where
        O: Default,
    {
        Self::with_observer(action, O::default())
    }

    /// Create an armed guard consulting `observer` at drop time
    pub fn with_observer(action: F, observer: O) -> Self {
        let snapshot = observer.snapshot();
        let guard = Self {
            action: Some(action),
            armed: true,
            observer,
            snapshot,
            metadata: GuardMetadata::new(P::NAME),
            _policy: PhantomData,
        };

        guard.emit_created();
        guard
    }

    /// Cancel the action
    ///
    /// Idempotent. After this, drop runs nothing.
    pub fn release(&mut self) {
        if self.armed {
            self.armed = false;
            self.emit_released();
        }
    }

    /// Whether drop may still run the action
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Current lifecycle state
    pub fn state(&self) -> GuardState {
        if self.armed {
            GuardState::Armed
        } else {
            GuardState::Disarmed
        }
    }

    /// Move the guard out from behind a mutable reference
    ///
    /// The returned guard takes over the action and the armed flag, and
    /// keeps the snapshot taken at construction. `self` is left disarmed.
    pub fn transfer(&mut self) -> Self
    where
        O: Clone,
    {
        let armed = std::mem::replace(&mut self.armed, false);
        trace!(resource = P::NAME, armed, "Guard transferred");

        Self {
            action: self.action.take(),
            armed,
            observer: self.observer.clone(),
            snapshot: self.snapshot,
            metadata: self.metadata.clone(),
            _policy: PhantomData,
        }
    }

    fn should_run(&self) -> bool {
        let new_failure = self
            .observer
            .has_new_failure(self.snapshot, self.observer.snapshot());
        P::should_run(new_failure)
    }
}

/// Guard that always runs `action` on scope exit
pub fn scope_exit<F: FnOnce()>(action: F) -> ScopeExit<F> {
    ExitGuard::new(action)
}

/// Guard that runs `action` only if the scope is left by panicking
pub fn scope_fail<F: FnOnce()>(action: F) -> ScopeFail<F> {
    ExitGuard::new(action)
}

/// Guard that runs `action` only if the scope is left without panicking
pub fn scope_success<F: FnOnce()>(action: F) -> ScopeSuccess<F> {
    ExitGuard::new(action)
}

impl<F, P, O> Guard for ExitGuard<F, P, O>
where
    F: FnOnce(),
    P: ExitPolicy,
    O: FailureObserver,
{
    fn resource_type(&self) -> &'static str {
        P::NAME
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.armed
    }

    fn try_release(&mut self) -> GuardResult<()> {
        if !self.armed {
            return Err(GuardError::AlreadyReleased);
        }
        self.release();
        Ok(())
    }
}

impl<F, P, O> Observable for ExitGuard<F, P, O>
where
    F: FnOnce(),
    P: ExitPolicy,
    O: FailureObserver,
{
    fn emit_created(&self) {
        if config::current().trace_lifecycle {
            trace!(resource = P::NAME, "Guard armed");
        }
    }

    fn emit_released(&self) {
        if config::current().trace_lifecycle {
            debug!(
                resource = P::NAME,
                lifetime_micros = self.metadata.lifetime_micros(),
                "Guard released"
            );
        }
    }

    fn emit_disposed(&self, ran: bool) {
        if config::current().trace_lifecycle {
            debug!(
                resource = P::NAME,
                ran,
                lifetime_micros = self.metadata.lifetime_micros(),
                "Guard disposed"
            );
        }
    }

    fn emit_error(&self, error: &GuardError) {
        report_disposal_error(error);
    }
}

impl<F, P, O> Drop for ExitGuard<F, P, O>
where
    F: FnOnce(),
    P: ExitPolicy,
    O: FailureObserver,
{
    fn drop(&mut self) {
        let action = self.action.take();
        if !std::mem::replace(&mut self.armed, false) {
            return;
        }
        let Some(action) = action else {
            return;
        };

        if !self.should_run() {
            self.emit_disposed(false);
            return;
        }

        if let Err(e) = run_contained(P::NAME, action) {
            self.emit_error(&e);
        }
        self.emit_disposed(true);
    }
}

impl<F, P, O> fmt::Debug for ExitGuard<F, P, O>
where
    F: FnOnce(),
    P: ExitPolicy,
    O: FailureObserver,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitGuard")
            .field("policy", &P::NAME)
            .field("armed", &self.armed)
            .finish()
    }
}
