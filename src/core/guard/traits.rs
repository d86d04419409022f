/*!
 * Guard Traits
 *
 * Core abstractions shared by exit guards and owned resources
 */

use super::{GuardError, GuardMetadata, GuardResult};

/// Core guard trait
///
/// All guards implement this to provide:
/// - Resource type identification
/// - Metadata access
/// - Disarming through a trait object
///
/// # Type Safety
///
/// Guards are move-only. Copying a guard or touching a disposed one is a
/// compile error, not a runtime error.
pub trait Guard {
    /// Resource type name for logging/debugging
    fn resource_type(&self) -> &'static str;

    /// Get guard metadata
    fn metadata(&self) -> &GuardMetadata;

    /// Check if the guard will still clean up on drop
    fn is_active(&self) -> bool;

    /// Disarm the guard so that drop does nothing
    ///
    /// Returns `Err(AlreadyReleased)` if the guard was not active.
    fn try_release(&mut self) -> GuardResult<()>;
}

/// Guards with observable lifecycle
///
/// Lifecycle events honour `GuardConfig::trace_lifecycle`; errors are always reported.
pub trait Observable: Guard {
    /// Emit creation event
    fn emit_created(&self);

    /// Emit disarm event
    fn emit_released(&self);

    /// Emit cleanup event, `ran` tells whether cleanup actually executed
    fn emit_disposed(&self, ran: bool);

    /// Emit error event
    fn emit_error(&self, error: &GuardError);
}
