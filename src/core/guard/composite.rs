/*!
 * Composite Guards
 *
 * Several guards owned as one, torn down in reverse insertion order
 */

use super::traits::Guard;
use super::{GuardError, GuardMetadata, GuardResult};
use tracing::debug;

/// Composite guard that manages multiple guards as one
///
/// Members are dropped last-in first-out, the same order locals of a
/// scope are dropped, so a composite can stand in for a block of guards
/// assembled at runtime.
///
/// # Example
///
/// ```rust
/// use atlas_scope::{scope_exit, make_owned_resource_checked, CompositeGuard};
///
/// let composite = CompositeGuard::new()
///     .add(make_owned_resource_checked(3, -1, |fd: i32| println!("close({fd})")))
///     .add(scope_exit(|| println!("unlock")));
///
/// // "unlock" then "close(3)" on drop
/// # drop(composite);
/// ```
pub struct CompositeGuard {
    guards: Vec<Box<dyn Guard>>,
    metadata: GuardMetadata,
}

impl CompositeGuard {
    /// Create a new empty composite guard
    pub fn new() -> Self {
        Self {
            guards: Vec::new(),
            metadata: GuardMetadata::new("composite"),
        }
    }

    /// Add a guard to the composite
    pub fn add<G: Guard + 'static>(mut self, guard: G) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    /// Add a boxed guard to the composite
    pub fn add_boxed(mut self, guard: Box<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Add a guard in place
    pub fn push<G: Guard + 'static>(&mut self, guard: G) {
        self.guards.push(Box::new(guard));
    }

    /// Get number of guards in the composite
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Check if composite is empty
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Get all guard resource types, in insertion order
    pub fn guard_types(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.resource_type()).collect()
    }

    /// Check if all guards are active
    pub fn all_active(&self) -> bool {
        self.guards.iter().all(|g| g.is_active())
    }

    /// Disarm every member
    ///
    /// Continues past members that were already inactive, returning the
    /// errors they reported.
    pub fn release_all(&mut self) -> Vec<GuardError> {
        self.guards
            .iter_mut()
            .rev()
            .filter_map(|guard| guard.try_release().err())
            .collect()
    }
}

impl Default for CompositeGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Guard for CompositeGuard {
    fn resource_type(&self) -> &'static str {
        "composite"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.guards.iter().any(|g| g.is_active())
    }

    fn try_release(&mut self) -> GuardResult<()> {
        if !self.is_active() {
            return Err(GuardError::AlreadyReleased);
        }
        let errors = self.release_all();
        if !errors.is_empty() {
            debug!(skipped = errors.len(), "Composite release skipped inactive members");
        }
        Ok(())
    }
}

impl Drop for CompositeGuard {
    fn drop(&mut self) {
        // Each member contains its own cleanup panics
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

/// Assembles a [`CompositeGuard`] from labelled members
///
/// Labels only appear in the log line written by [`build`](Self::build).
#[derive(Default)]
pub struct CompositeGuardBuilder {
    composite: CompositeGuard,
    labels: Vec<String>,
}

impl CompositeGuardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `guard` under `label`
    pub fn with<G: Guard + 'static>(mut self, label: impl Into<String>, guard: G) -> Self {
        self.composite.push(guard);
        self.labels.push(label.into());
        self
    }

    /// Labels in teardown order
    pub fn teardown_order(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().rev().map(String::as_str)
    }

    pub fn build(self) -> CompositeGuard {
        debug!(members = ?self.labels, "Composite guard assembled");
        self.composite
    }
}
