use super::core::Core;
use super::state::{Outcome, Status};

use tracing::debug;

use std::fmt;
use std::sync::Arc;

/// The capability handed to a promise's task.
///
/// A task settles its promise by calling exactly one of
/// [`resolve`](Self::resolve), [`reject`](Self::reject) or
/// [`settle`](Self::settle). Each consumes the subscriber, so a task
/// cannot settle twice through the same handle.
///
/// Settling a promise that was cancelled in the meantime is a silent
/// no-op: cancellation wins any race against completion.
///
/// Dropping a subscriber without settling leaves the promise in progress
/// forever. Nothing is cancelled on drop.
pub struct Subscriber<T, E> {
    core: Arc<Core<T, E>>,
    settled: bool,
}

impl<T, E> Subscriber<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub(crate) fn new(core: Arc<Core<T, E>>) -> Self {
        Self {
            core,
            settled: false,
        }
    }

    /// Completes the promise with a success value.
    pub fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    /// Completes the promise with an error.
    pub fn reject(self, error: E) {
        self.settle(Err(error));
    }

    /// Completes the promise with `result`.
    pub fn settle(self, result: Result<T, E>) {
        self.settle_shared(Arc::new(result));
    }

    /// Completes the promise with an outcome already shared with another
    /// promise, avoiding a clone of the values.
    pub(crate) fn settle_shared(mut self, outcome: Outcome<T, E>) {
        self.settled = true;
        self.core.complete(outcome);
    }

    /// Registers the hook to run if the promise is cancelled.
    ///
    /// A later registration replaces an earlier one, so a task can refine
    /// its cancellation strategy as it progresses. Only the hook in place
    /// when the cancellation lands is run, and it runs once.
    ///
    /// If the promise is already cancelled, `hook` runs immediately on the
    /// calling thread. If it is already complete, `hook` is dropped.
    pub fn on_cancel<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.core.set_cancel_hook(Box::new(hook));
    }

    /// Returns `true` if the promise has been cancelled.
    ///
    /// Long-running tasks can poll this between units of work instead of,
    /// or in addition to, registering a hook.
    pub fn is_cancelled(&self) -> bool {
        self.core.status() == Status::Cancelled
    }
}

impl<T, E> Drop for Subscriber<T, E> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("subscriber dropped without settling its promise");
        }
    }
}

impl<T, E> fmt::Debug for Subscriber<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("status", &self.core.status())
            .field("settled", &self.settled)
            .finish()
    }
}
