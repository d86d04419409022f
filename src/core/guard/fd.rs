/*!
 * File Descriptor Guards
 *
 * Owned raw file descriptors closed on drop
 */

use super::resource::{make_owned_resource_checked, OwnedResource};
use std::os::unix::io::RawFd;
use tracing::warn;

/// Conventional "no descriptor" value returned by failed `open(2)` and friends
pub const INVALID_FD: RawFd = -1;

/// Raw file descriptor with automatic close
pub type FdGuard = OwnedResource<RawFd, fn(RawFd)>;

/// Wrap a descriptor returned by a libc-style call
///
/// `-1` yields an inactive guard that never calls `close`.
///
/// # Example
///
/// ```rust
/// use atlas_scope::fd_guard;
/// use std::os::unix::io::IntoRawFd;
///
/// let file = tempfile::tempfile().unwrap();
/// let fd = fd_guard(file.into_raw_fd());
/// assert!(fd.is_active());
/// // closed on drop
/// ```
pub fn fd_guard(fd: RawFd) -> FdGuard {
    make_owned_resource_checked(fd, INVALID_FD, close_fd as fn(RawFd))
}

fn close_fd(fd: RawFd) {
    if let Err(errno) = nix::unistd::close(fd) {
        warn!(fd, error = %errno, "Failed to close file descriptor");
    }
}
