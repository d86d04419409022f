/*!
 * Core Module
 * Guard types and their process-wide configuration
 */

pub mod config;
pub mod guard;

// Re-export for convenience
pub use config::{ActionPanicPolicy, GuardConfig};
pub use guard::{
    CompositeGuard, ExitGuard, Guard, GuardError, GuardResult, Observable, OwnedResource,
};
