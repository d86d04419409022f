/*!
 * Exit Guard Tests
 */

use atlas_scope::core::guard::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + 'static) {
    let runs = Arc::new(AtomicUsize::new(0));
    let runs_clone = runs.clone();
    (runs, move || {
        runs_clone.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_always_runs_on_normal_exit() {
    let (runs, action) = counter();
    {
        let _guard = scope_exit(action);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_always_runs_on_panic() {
    let (runs, action) = counter();

    let result = panic::catch_unwind(AssertUnwindSafe(move || {
        let _guard = scope_exit(action);
        panic!("operation failed");
    }));

    assert!(result.is_err());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_always_runs_on_early_return() {
    let (runs, action) = counter();

    fn work(fail_early: bool, action: impl FnOnce()) -> Result<(), &'static str> {
        let _guard = scope_exit(action);
        if fail_early {
            return Err("early");
        }
        Ok(())
    }

    assert_eq!(work(true, action), Err("early"));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_release_prevents_run() {
    let (runs, action) = counter();
    {
        let mut guard = scope_exit(action);
        guard.release();
        assert!(!guard.is_armed());
        assert_eq!(guard.state(), GuardState::Disarmed);
    }
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_release_also_cancels_on_success() {
    let (runs, action) = counter();
    {
        let mut guard = scope_success(action);
        guard.release();
    }
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_move_into_function_runs_once() {
    let (runs, action) = counter();

    fn keep(guard: ScopeExit<impl FnOnce()>) {
        assert!(guard.is_armed());
    }

    let guard = scope_exit(action);
    keep(guard);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_transfer_out_of_struct_field() {
    let (runs, action) = counter();

    struct Holder<F: FnOnce()> {
        guard: ScopeExit<F>,
    }

    let mut holder = Holder {
        guard: scope_exit(action),
    };
    let taken = holder.guard.transfer();

    assert!(!holder.guard.is_armed());
    assert!(taken.is_armed());

    drop(holder);
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    drop(taken);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_chained_transfers_single_armed() {
    let (runs, action) = counter();

    let mut a = scope_exit(action);
    let mut b = a.transfer();
    let c = b.transfer();

    let armed = [a.is_armed(), b.is_armed(), c.is_armed()];
    assert_eq!(armed.iter().filter(|&&x| x).count(), 1);

    drop(c);
    drop(b);
    drop(a);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scope_fail_only_on_panic() {
    let (runs, action) = counter();
    {
        let _guard = scope_fail(action);
    }
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    let (runs, action) = counter();
    let _ = panic::catch_unwind(AssertUnwindSafe(move || {
        let _guard = scope_fail(action);
        panic!("failure");
    }));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scope_success_skipped_on_panic() {
    let (runs, action) = counter();
    let _ = panic::catch_unwind(AssertUnwindSafe(move || {
        let _guard = scope_success(action);
        panic!("failure");
    }));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_guard_created_during_unwind_sees_no_new_failure() {
    let inner_fail = Arc::new(AtomicUsize::new(0));
    let inner_success = Arc::new(AtomicUsize::new(0));
    let (fail, success) = (inner_fail.clone(), inner_success.clone());

    let _ = panic::catch_unwind(AssertUnwindSafe(move || {
        let _outer = scope_exit(move || {
            // Runs while the thread is already unwinding
            let _f = scope_fail(move || {
                fail.fetch_add(1, Ordering::SeqCst);
            });
            let _s = scope_success(move || {
                success.fetch_add(1, Ordering::SeqCst);
            });
        });
        panic!("outer failure");
    }));

    assert_eq!(inner_fail.load(Ordering::SeqCst), 0);
    assert_eq!(inner_success.load(Ordering::SeqCst), 1);
}

#[test]
fn test_explicit_outcome_flag() {
    let failures = FailureCounter::new();
    let (rollbacks, rollback) = counter();
    let (commits, commit) = counter();

    let run = |fail: bool| -> Result<(), String> {
        let _rollback: ScopeFail<_, FailureCounter> =
            ExitGuard::with_observer(rollback, failures.clone());
        let _commit: ScopeSuccess<_, FailureCounter> =
            ExitGuard::with_observer(commit, failures.clone());
        failures.observe(if fail { Err("write rejected".to_string()) } else { Ok(()) })
    };

    assert!(run(true).is_err());
    assert_eq!(rollbacks.load(Ordering::SeqCst), 1);
    assert_eq!(commits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panicking_action_does_not_escape() {
    let (runs, action) = counter();

    let result = panic::catch_unwind(AssertUnwindSafe(move || {
        let _sibling = scope_exit(action);
        let _bad = scope_exit(|| panic!("cleanup exploded"));
    }));

    assert!(result.is_ok());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_nested_failure_during_unwind() {
    let by_panic = Arc::new(AtomicUsize::new(0));
    let by_counter = Arc::new(AtomicUsize::new(0));
    let (panic_runs, counter_runs) = (by_panic.clone(), by_counter.clone());

    let _ = panic::catch_unwind(AssertUnwindSafe(move || {
        let _outer = scope_exit(move || {
            let failures = FailureCounter::new();
            let _by_panic = scope_fail(move || {
                panic_runs.fetch_add(1, Ordering::SeqCst);
            });
            let _by_counter: ScopeFail<_, FailureCounter> = ExitGuard::with_observer(
                move || {
                    counter_runs.fetch_add(1, Ordering::SeqCst);
                },
                failures.clone(),
            );

            // A second failure begins and is handled inside the cleanup
            let nested: std::thread::Result<()> =
                panic::catch_unwind(|| panic!("nested failure"));
            let _ = failures.observe(nested);
        });
        panic!("outer failure");
    }));

    // Unwinding was already in flight at construction, so the panic
    // observer cannot tell the nested failure apart from it
    assert_eq!(by_panic.load(Ordering::SeqCst), 0);
    assert_eq!(by_counter.load(Ordering::SeqCst), 1);
}
