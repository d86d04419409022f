/*!
 * Scope Guards
 *
 * Exactly-once cleanup bound to the lifetime of a scope.
 *
 * ## Design Principles
 *
 * 1. **Single Owner**: Guards are move-only, never `Clone`
 * 2. **Exactly Once**: An armed guard runs its action at most one time
 * 3. **Contained**: A panicking action never escapes `Drop`
 * 4. **Observable**: Guards emit lifecycle events through `tracing`
 *
 * ## Guard Types
 *
 * - **ExitGuard**: Runs an action on scope exit under a policy
 *   (`Always`, `OnFailure`, `OnSuccess`)
 * - **OwnedResource**: Handle + deleter + invalid sentinel
 * - **FdGuard**: OwnedResource closing a raw file descriptor
 * - **CompositeGuard**: Several guards torn down in LIFO order
 *
 * ## Example
 *
 * ```rust
 * use atlas_scope::{scope_exit, make_owned_resource_checked};
 *
 * let mut rollback = scope_exit(|| println!("rolling back"));
 * let conn = make_owned_resource_checked(7, -1, |fd: i32| println!("close({fd})"));
 * // ... work succeeded
 * rollback.release();
 * // conn closed on drop
 * # drop(conn);
 * ```
 */

mod composite;
mod exit;
#[cfg(unix)]
mod fd;
mod macros;
mod observer;
mod policy;
mod resource;
mod traits;

pub use composite::{CompositeGuard, CompositeGuardBuilder};
pub use exit::{scope_exit, scope_fail, scope_success, ExitGuard, ScopeExit, ScopeFail, ScopeSuccess};
#[cfg(unix)]
pub use fd::{fd_guard, FdGuard, INVALID_FD};
pub use observer::{FailureCounter, FailureObserver, PanicObserver};
pub use policy::{Always, ExitPolicy, OnFailure, OnSuccess};
pub use resource::{make_owned_resource_checked, try_make_owned_resource_checked, OwnedResource};
pub use traits::{Guard, Observable};

use crate::core::config::{self, ActionPanicPolicy};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Result type for guard operations
pub type GuardResult<T> = Result<T, GuardError>;

/// Errors that can occur during guard operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Resource already released")]
    AlreadyReleased,

    #[error("Failed to construct {resource} guard: {reason}")]
    Construction {
        resource: &'static str,
        reason: String,
    },

    #[error("Cleanup for {resource} guard panicked: {message}")]
    ActionPanicked {
        resource: &'static str,
        message: String,
    },
}

/// Observable lifecycle state of a guard
///
/// Disposal consumes the guard, so it has no variant here. It is reported
/// through [`Observable::emit_disposed`](crate::Observable::emit_disposed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Drop will run the action if the policy agrees
    Armed,
    /// Released or transferred away; drop runs nothing
    Disarmed,
}

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub creation_time: std::time::Instant,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            creation_time: std::time::Instant::now(),
        }
    }

    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.creation_time.elapsed().as_micros() as u64
    }
}

/// Run cleanup behind a panic boundary
///
/// The panic payload is turned into `GuardError::ActionPanicked`.
pub(crate) fn run_contained<F>(resource: &'static str, cleanup: F) -> GuardResult<()>
where
    F: FnOnce(),
{
    panic::catch_unwind(AssertUnwindSafe(cleanup)).map_err(|payload| {
        GuardError::ActionPanicked {
            resource,
            message: panic_message(payload.as_ref()),
        }
    })
}

/// Apply the configured panic policy to a contained disposal error
pub(crate) fn report_disposal_error(error: &GuardError) {
    tracing::error!(error = %error, "Guard cleanup failed");
    if config::current().action_panic == ActionPanicPolicy::Abort {
        std::process::abort();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
