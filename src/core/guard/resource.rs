/*!
 * Owned Resources
 *
 * A handle paired with its deleter, released exactly once
 */

use super::traits::{Guard, Observable};
use super::{report_disposal_error, run_contained, GuardError, GuardMetadata, GuardResult};
use crate::core::config;
use std::fmt;
use tracing::{debug, trace};

const RESOURCE_TYPE: &str = "owned_resource";

/// Handle with automatic release
///
/// The deleter runs once for every handle that was active when the
/// resource was dropped or reset. Handles equal to the invalid sentinel
/// recorded by checked construction are never passed to the deleter.
///
/// # Example
///
/// ```rust
/// use atlas_scope::make_owned_resource_checked;
/// use std::cell::RefCell;
///
/// let closed = RefCell::new(Vec::new());
/// {
///     let _missing = make_owned_resource_checked(-1, -1, |fd| closed.borrow_mut().push(fd));
///     let _open = make_owned_resource_checked(7, -1, |fd| closed.borrow_mut().push(fd));
/// }
/// assert_eq!(*closed.borrow(), [7]);
/// ```
#[must_use = "a resource dropped immediately is released immediately"]
pub struct OwnedResource<R, D>
where
    D: FnMut(R),
{
    handle: Option<R>,
    invalid: Option<R>,
    deleter: D,
    active: bool,
    metadata: GuardMetadata,
}

impl<R, D> OwnedResource<R, D>
where
    D: FnMut(R),
{
    /// Take ownership of `handle` unconditionally
    pub fn new(handle: R, deleter: D) -> Self {
        Self::assemble(handle, None, deleter, true)
    }

    /// Take ownership of `handle` unless it equals `invalid`
    ///
    /// The sentinel is remembered and consulted again by `reset`.
    pub fn new_checked(handle: R, invalid: R, deleter: D) -> Self
    where
        R: PartialEq,
    {
        let active = handle != invalid;
        Self::assemble(handle, Some(invalid), deleter, active)
    }

    /// Checked construction followed by a fallible initialization step
    ///
    /// `init` only sees active handles. If it fails, the handle is deleted
    /// before the error is returned, so nothing leaks.
    pub fn try_new_checked<I, E>(handle: R, invalid: R, deleter: D, init: I) -> GuardResult<Self>
    where
        R: PartialEq,
        I: FnOnce(&R) -> Result<(), E>,
        E: fmt::Display,
    {
        let resource = Self::new_checked(handle, invalid, deleter);
        if !resource.active {
            return Ok(resource);
        }

        let outcome = match resource.handle.as_ref() {
            Some(handle) => init(handle),
            None => Ok(()),
        };

        match outcome {
            Ok(()) => Ok(resource),
            Err(e) => {
                let reason = e.to_string();
                debug!(resource = RESOURCE_TYPE, %reason, "Initialization failed, releasing handle");
                drop(resource);
                Err(GuardError::Construction {
                    resource: RESOURCE_TYPE,
                    reason,
                })
            }
        }
    }

    fn assemble(handle: R, invalid: Option<R>, deleter: D, active: bool) -> Self {
        let resource = Self {
            handle: Some(handle),
            invalid,
            deleter,
            active,
            metadata: GuardMetadata::new(RESOURCE_TYPE),
        };

        resource.emit_created();
        resource
    }

    /// The held handle, if it has not been released
    ///
    /// An inactive sentinel handle is still returned here.
    #[inline]
    pub fn get(&self) -> Option<&R> {
        self.handle.as_ref()
    }

    /// Whether drop will run the deleter
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The deleter that will release the handle
    pub fn deleter(&self) -> &D {
        &self.deleter
    }

    /// Replace the handle, releasing the current one first if active
    ///
    /// The new handle is compared against the sentinel, if one was given at
    /// construction; resetting to the sentinel just deactivates.
    pub fn reset(&mut self, new_handle: R)
    where
        R: PartialEq,
    {
        self.dispose();
        self.active = match self.invalid.as_ref() {
            Some(invalid) => new_handle != *invalid,
            None => true,
        };
        self.handle = Some(new_handle);
        trace!(resource = RESOURCE_TYPE, active = self.active, "Handle reset");
    }

    /// Give the handle back to the caller without deleting it
    ///
    /// The caller becomes responsible for releasing it.
    pub fn release(&mut self) -> Option<R> {
        let was_active = std::mem::replace(&mut self.active, false);
        if was_active {
            self.emit_released();
        }
        self.handle.take()
    }

    /// Run the deleter on the current handle if active
    fn dispose(&mut self) {
        if !std::mem::replace(&mut self.active, false) {
            return;
        }
        let Some(handle) = self.handle.take() else {
            return;
        };

        let deleter = &mut self.deleter;
        if let Err(e) = run_contained(RESOURCE_TYPE, || deleter(handle)) {
            self.emit_error(&e);
        }
        self.emit_disposed(true);
    }
}

impl<R, D> OwnedResource<R, D>
where
    R: Copy,
    D: FnMut(R),
{
    /// Copy of the held handle
    #[inline]
    pub fn handle(&self) -> Option<R> {
        self.handle
    }
}

/// Checked construction: `handle == invalid` yields an inactive resource
pub fn make_owned_resource_checked<R, D>(handle: R, invalid: R, deleter: D) -> OwnedResource<R, D>
where
    R: PartialEq,
    D: FnMut(R),
{
    OwnedResource::new_checked(handle, invalid, deleter)
}

/// Checked construction with a fallible initialization step
///
/// See [`OwnedResource::try_new_checked`].
pub fn try_make_owned_resource_checked<R, D, I, E>(
    handle: R,
    invalid: R,
    deleter: D,
    init: I,
) -> GuardResult<OwnedResource<R, D>>
where
    R: PartialEq,
    D: FnMut(R),
    I: FnOnce(&R) -> Result<(), E>,
    E: fmt::Display,
{
    OwnedResource::try_new_checked(handle, invalid, deleter, init)
}

impl<R, D> Guard for OwnedResource<R, D>
where
    D: FnMut(R),
{
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.active
    }

    /// Disarm without returning the handle; it is leaked to the caller's care
    fn try_release(&mut self) -> GuardResult<()> {
        if !self.active {
            return Err(GuardError::AlreadyReleased);
        }
        self.active = false;
        self.emit_released();
        Ok(())
    }
}

impl<R, D> Observable for OwnedResource<R, D>
where
    D: FnMut(R),
{
    fn emit_created(&self) {
        if config::current().trace_lifecycle {
            trace!(resource = RESOURCE_TYPE, active = self.active, "Resource acquired");
        }
    }

    fn emit_released(&self) {
        if config::current().trace_lifecycle {
            debug!(
                resource = RESOURCE_TYPE,
                lifetime_micros = self.metadata.lifetime_micros(),
                "Resource released to caller"
            );
        }
    }

    fn emit_disposed(&self, ran: bool) {
        if config::current().trace_lifecycle {
            debug!(
                resource = RESOURCE_TYPE,
                ran,
                lifetime_micros = self.metadata.lifetime_micros(),
                "Resource deleted"
            );
        }
    }

    fn emit_error(&self, error: &GuardError) {
        report_disposal_error(error);
    }
}

impl<R, D> Drop for OwnedResource<R, D>
where
    D: FnMut(R),
{
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<R, D> fmt::Debug for OwnedResource<R, D>
where
    R: fmt::Debug,
    D: FnMut(R),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedResource")
            .field("handle", &self.handle)
            .field("invalid", &self.invalid)
            .field("active", &self.active)
            .finish()
    }
}
