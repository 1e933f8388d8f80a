use pledge::{Promise, Status, Subscriber};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};

/// Builds a promise whose subscriber is handed back to the test once the
/// task starts, after registering a hook that counts invocations.
fn pending_with_hook() -> (
    Promise<u32, String>,
    Arc<AtomicUsize>,
    mpsc::Receiver<Subscriber<u32, String>>,
) {
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let (transmitter, receiver) = mpsc::channel();

    let hook_calls_clone = hook_calls.clone();
    let promise = Promise::new(move |subscriber: Subscriber<u32, String>| {
        let hook_calls = hook_calls_clone.clone();
        subscriber.on_cancel(move || {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        });
        transmitter.send(subscriber).unwrap();
    });

    (promise, hook_calls, receiver)
}

#[test]
fn test_cancel_runs_hook_once() {
    let (promise, hook_calls, _receiver) = pending_with_hook();

    promise.when_complete(|_| panic!("cancelled promise must not deliver"));
    promise.cancel();

    assert_eq!(promise.status(), Status::Cancelled);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancel_is_idempotent() {
    let (promise, hook_calls, _receiver) = pending_with_hook();

    promise.when_complete(|_| {});

    for _ in 0..10 {
        promise.cancel();
    }

    assert!(promise.is_cancelled());
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancel_idle_never_runs_task() {
    let runs = Arc::new(AtomicUsize::new(0));
    let runs_clone = runs.clone();

    let promise: Promise<u32, ()> = Promise::new(move |subscriber| {
        runs_clone.fetch_add(1, Ordering::SeqCst);
        subscriber.resolve(1);
    });

    promise.cancel();
    promise.when_complete(|_| panic!("cancelled promise must not deliver"));

    assert_eq!(promise.status(), Status::Cancelled);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancel_complete_is_noop() {
    let promise: Promise<u32, ()> = Promise::resolved(7);

    promise.cancel();

    assert!(promise.is_complete());

    let seen = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();
    promise.when_complete(move |result| *seen_clone.lock().unwrap() = Some(result.clone()));
    assert_eq!(*seen.lock().unwrap(), Some(Ok(7)));
}

#[test]
fn test_late_resolve_after_cancel_is_discarded() {
    let (promise, hook_calls, receiver) = pending_with_hook();

    let delivered = Arc::new(AtomicBool::new(false));
    let delivered_clone = delivered.clone();
    promise.when_complete(move |_| delivered_clone.store(true, Ordering::SeqCst));

    let subscriber = receiver.recv().unwrap();
    promise.cancel();
    subscriber.resolve(1);

    assert!(!delivered.load(Ordering::SeqCst));
    assert_eq!(promise.status(), Status::Cancelled);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_late_reject_after_cancel_is_discarded() {
    let (promise, _hook_calls, receiver) = pending_with_hook();

    promise.when_complete(|_| panic!("cancelled promise must not deliver"));

    let subscriber = receiver.recv().unwrap();
    promise.cancel();
    subscriber.reject("too late".to_string());

    assert!(promise.is_cancelled());
}

#[test]
fn test_hook_not_run_after_completion() {
    let (promise, hook_calls, receiver) = pending_with_hook();

    promise.when_complete(|_| {});
    receiver.recv().unwrap().resolve(2);
    promise.cancel();

    assert!(promise.is_complete());
    assert_eq!(hook_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_last_registered_hook_wins() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let (f, s) = (first.clone(), second.clone());
    let (transmitter, receiver) = mpsc::channel();

    let promise: Promise<u32, ()> = Promise::new(move |subscriber| {
        subscriber.on_cancel(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        subscriber.on_cancel(move || {
            s.fetch_add(1, Ordering::SeqCst);
        });
        transmitter.send(subscriber).unwrap();
    });

    promise.when_complete(|_| {});
    promise.cancel();

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    drop(receiver);
}

#[test]
fn test_hook_registered_after_cancel_runs_immediately() {
    let (transmitter, receiver) = mpsc::channel();

    let promise: Promise<u32, ()> = Promise::new(move |subscriber| {
        transmitter.send(subscriber).unwrap();
    });

    promise.when_complete(|_| {});
    let subscriber = receiver.recv().unwrap();

    promise.cancel();
    assert!(subscriber.is_cancelled());

    let ran = Arc::new(AtomicBool::new(false));
    let ran_clone = ran.clone();
    subscriber.on_cancel(move || ran_clone.store(true, Ordering::SeqCst));

    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn test_observer_registered_after_cancel_is_dropped_without_call() {
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    let (promise, _hook_calls, _receiver) = pending_with_hook();
    promise.when_complete(|_| {});
    promise.cancel();

    let dropped = Arc::new(AtomicBool::new(false));
    let flag = DropFlag(dropped.clone());
    promise.when_complete(move |_| {
        let _flag = &flag;
        panic!("cancelled promise must not deliver");
    });

    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn test_task_can_poll_cancellation() {
    let (transmitter, receiver) = mpsc::channel();

    let promise: Promise<u32, ()> = Promise::new(move |subscriber| {
        transmitter.send(subscriber).unwrap();
    });
    promise.when_complete(|_| {});

    let subscriber = receiver.recv().unwrap();
    assert!(!subscriber.is_cancelled());

    promise.cancel();
    assert!(subscriber.is_cancelled());
}
