/*!
 * Exit Policies
 *
 * Decide at disposal time whether an armed guard runs its action
 */

/// Controls when an armed guard's action runs
///
/// `new_failure` is the observer's verdict: did a failure begin while the
/// guard was alive.
pub trait ExitPolicy {
    /// Policy name, used as the guard's resource type
    const NAME: &'static str;

    /// Return `true` if the action should run
    fn should_run(new_failure: bool) -> bool;
}

/// Run on every scope exit, normal or failing
#[derive(Debug)]
pub enum Always {}

/// Run only when the scope exits because of a new failure
#[derive(Debug)]
pub enum OnFailure {}

/// Run only when the scope exits without a new failure
#[derive(Debug)]
pub enum OnSuccess {}

impl ExitPolicy for Always {
    const NAME: &'static str = "scope_exit";

    #[inline(always)]
    fn should_run(_new_failure: bool) -> bool {
        true
    }
}

impl ExitPolicy for OnFailure {
    const NAME: &'static str = "scope_fail";

    #[inline]
    fn should_run(new_failure: bool) -> bool {
        new_failure
    }
}

impl ExitPolicy for OnSuccess {
    const NAME: &'static str = "scope_success";

    #[inline]
    fn should_run(new_failure: bool) -> bool {
        !new_failure
    }
}
