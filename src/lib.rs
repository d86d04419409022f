/*!
 * Atlas Scope
 * Scope guards and owned resources with exactly-once cleanup
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::config::{ActionPanicPolicy, GuardConfig};
pub use crate::core::guard::{
    make_owned_resource_checked, scope_exit, scope_fail, scope_success,
    try_make_owned_resource_checked, Always, CompositeGuard, CompositeGuardBuilder, ExitGuard,
    ExitPolicy, FailureCounter, FailureObserver, Guard, GuardError, GuardMetadata, GuardResult,
    GuardState, Observable, OnFailure, OnSuccess, OwnedResource, PanicObserver, ScopeExit,
    ScopeFail, ScopeSuccess,
};
#[cfg(unix)]
pub use crate::core::guard::{fd_guard, FdGuard, INVALID_FD};
pub use monitoring::init_tracing;
