/*!
 * Composite Guard Tests
 */

use atlas_scope::core::guard::*;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

fn push(log: &Log, entry: &str) -> impl FnOnce() + 'static {
    let log = log.clone();
    let entry = entry.to_string();
    move || log.borrow_mut().push(entry)
}

#[test]
fn test_composite_guard_basic() {
    let log: Log = Rc::default();

    {
        let composite = CompositeGuard::new()
            .add(scope_exit(push(&log, "one")))
            .add(scope_exit(push(&log, "two")))
            .add(scope_exit(push(&log, "three")));

        assert_eq!(composite.len(), 3);
        assert!(composite.all_active());
        assert!(log.borrow().is_empty());
    }

    assert_eq!(*log.borrow(), vec!["three", "two", "one"]);
}

#[test]
fn test_composite_guard_builder() {
    let log: Log = Rc::default();
    let close_log = log.clone();

    {
        let _composite = CompositeGuardBuilder::new()
            .with(
                "socket",
                make_owned_resource_checked(12, -1, move |fd: i32| {
                    close_log.borrow_mut().push(format!("close({})", fd))
                }),
            )
            .with("metrics", scope_exit(push(&log, "flush")))
            .build();
    }

    assert_eq!(*log.borrow(), vec!["flush", "close(12)"]);
}

#[test]
fn test_composite_partial_release() {
    let log: Log = Rc::default();

    let mut first = scope_exit(push(&log, "first"));
    first.release();

    let mut composite = CompositeGuard::new()
        .add(first)
        .add(scope_exit(push(&log, "second")));

    assert!(!composite.all_active());
    assert!(composite.is_active());

    let errors = composite.release_all();
    assert_eq!(errors, vec![GuardError::AlreadyReleased]);

    drop(composite);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_composite_push_in_loop() {
    let log: Log = Rc::default();

    {
        let mut composite = CompositeGuard::default();
        for name in ["a", "b", "c"] {
            composite.push(scope_exit(push(&log, name)));
        }
        assert_eq!(composite.guard_types(), vec!["scope_exit"; 3]);
    }

    assert_eq!(*log.borrow(), vec!["c", "b", "a"]);
}

#[test]
fn test_nested_composites() {
    let log: Log = Rc::default();

    {
        let inner = CompositeGuard::new()
            .add(scope_exit(push(&log, "inner-1")))
            .add(scope_exit(push(&log, "inner-2")));

        let _outer = CompositeGuard::new()
            .add(scope_exit(push(&log, "outer-1")))
            .add(inner)
            .add(scope_exit(push(&log, "outer-2")));
    }

    assert_eq!(
        *log.borrow(),
        vec!["outer-2", "inner-2", "inner-1", "outer-1"]
    );
}
