use super::subscriber::Subscriber;
use crate::utils::TakeCell;

use std::sync::Arc;

/// The single result of a completed promise, shared with every observer.
pub(crate) type Outcome<T, E> = Arc<Result<T, E>>;

/// An observer waiting for the outcome.
pub(crate) type Callback<T, E> = Box<dyn FnOnce(&Outcome<T, E>) + Send>;

/// The deferred computation that eventually settles the promise.
pub(crate) type Task<T, E> = Box<dyn FnOnce(Subscriber<T, E>) + Send>;

/// A hook run when an in-progress promise is cancelled.
pub(crate) type CancelHook = Box<dyn FnOnce() + Send>;

/// A registered observer. The cell is allocated once per registration so
/// that a CAS retry can rebuild the pending list without losing it.
pub(crate) type Pending<T, E> = Arc<TakeCell<Callback<T, E>>>;

/// Observable lifecycle of a promise.
///
/// This is a snapshot: by the time the caller inspects it, another thread
/// may already have moved the promise forward. `Complete` and `Cancelled`
/// are terminal and therefore stable once observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Created but nobody has asked for the result yet; the task has not run.
    Idle,

    /// The task was started and has not settled the promise.
    InProgress,

    /// The promise holds its final result.
    Complete,

    /// The promise was cancelled; no result will ever be delivered.
    Cancelled,
}

impl Status {
    /// Returns `true` for `Complete` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Complete | Status::Cancelled)
    }
}

/// Immutable state record held by the promise's state cell.
///
/// Every transition builds a fresh record and publishes it with a single
/// compare-and-swap; records are never mutated in place. The `FnOnce`
/// payloads live in [`TakeCell`]s so that whichever thread wins the
/// transition can move them out of a shared record.
pub(crate) enum State<T, E> {
    /// Waiting for the first observer. Registering one moves straight to
    /// `InProgress`, so no observers are ever parked here.
    Idle { task: Arc<TakeCell<Task<T, E>>> },

    /// The task is running.
    InProgress {
        callbacks: Callbacks<T, E>,
        on_cancel: Option<Arc<TakeCell<CancelHook>>>,
    },

    /// Terminal: the one and only result.
    Complete { outcome: Outcome<T, E> },

    /// Terminal: cancelled from `Idle` or `InProgress`.
    Cancelled,
}

impl<T, E> State<T, E> {
    pub(crate) fn status(&self) -> Status {
        match self {
            State::Idle { .. } => Status::Idle,
            State::InProgress { .. } => Status::InProgress,
            State::Complete { .. } => Status::Complete,
            State::Cancelled => Status::Cancelled,
        }
    }
}

/// Persistent list of pending observers.
///
/// Appending shares the existing tail, so a CAS retry only allocates the
/// new head node. Order carries no meaning for callers.
pub(crate) struct Callbacks<T, E> {
    head: Option<Arc<Node<T, E>>>,
    len: usize,
}

struct Node<T, E> {
    callback: Pending<T, E>,
    next: Option<Arc<Node<T, E>>>,
}

impl<T, E> Callbacks<T, E> {
    pub(crate) fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Returns a list with `callback` added in front of `self`.
    pub(crate) fn with(&self, callback: Pending<T, E>) -> Self {
        let node = Node {
            callback,
            next: self.head.clone(),
        };

        Self {
            head: Some(Arc::new(node)),
            len: self.len + 1,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Moves every callback that has not been taken yet out of the list.
    ///
    /// Only the thread that won the transition out of `InProgress` calls
    /// this, so in practice every callback is still present. The result is
    /// in registration order.
    pub(crate) fn drain(&self) -> Vec<Callback<T, E>> {
        let mut drained = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_ref();

        while let Some(node) = cursor {
            if let Some(callback) = node.callback.take() {
                drained.push(callback);
            }
            cursor = node.next.as_ref();
        }

        drained.reverse();
        drained
    }
}

impl<T, E> Clone for Callbacks<T, E> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

impl<T, E> Drop for Callbacks<T, E> {
    /// Unlinks uniquely owned nodes iteratively so that long lists do not
    /// recurse once per node on drop.
    fn drop(&mut self) {
        let mut next = self.head.take();

        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Callback, Callbacks, Outcome};
    use crate::utils::TakeCell;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pending(
        log: &Arc<parking_lot::Mutex<Vec<usize>>>,
        id: usize,
    ) -> Arc<TakeCell<Callback<usize, ()>>> {
        let log = log.clone();
        let callback: Callback<usize, ()> = Box::new(move |_: &Outcome<usize, ()>| {
            log.lock().push(id);
        });
        Arc::new(TakeCell::new(callback))
    }

    #[test]
    fn appending_keeps_the_base_list_intact() {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let base = Callbacks::new().with(pending(&log, 1));
        let extended = base.with(pending(&log, 2));

        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
    }

    #[test]
    fn drain_returns_registration_order_once() {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let outcome: Outcome<usize, ()> = Arc::new(Ok(0));

        let list = (1..=3).fold(Callbacks::new(), |list, id| list.with(pending(&log, id)));

        for callback in list.drain() {
            callback(&outcome);
        }
        assert!(list.drain().is_empty());

        assert_eq!(*log.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn dropping_a_long_list_does_not_overflow() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut list: Callbacks<(), ()> = Callbacks::new();

        for _ in 0..200_000 {
            let calls = calls.clone();
            let callback: Callback<(), ()> = Box::new(move |_| {
                calls.fetch_add(1, Ordering::Relaxed);
            });
            list = list.with(Arc::new(TakeCell::new(callback)));
        }

        drop(list);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }
}
