/*!
 * Defer Macros
 *
 * Bind an anonymous guard to the rest of the current scope
 */

/// Run the given statements when the current scope exits
///
/// ```rust
/// use atlas_scope::defer;
/// use std::cell::Cell;
///
/// let closed = Cell::new(false);
/// {
///     defer!(closed.set(true));
///     assert!(!closed.get());
/// }
/// assert!(closed.get());
/// ```
#[macro_export]
macro_rules! defer {
    ($($t:tt)*) => {
        let _guard = $crate::scope_exit(|| { $($t)*; });
    };
}

/// Run the given statements only if the scope is left by panicking
#[macro_export]
macro_rules! defer_on_failure {
    ($($t:tt)*) => {
        let _guard = $crate::scope_fail(|| { $($t)*; });
    };
}

/// Run the given statements only if the scope is left without panicking
#[macro_export]
macro_rules! defer_on_success {
    ($($t:tt)*) => {
        let _guard = $crate::scope_success(|| { $($t)*; });
    };
}
