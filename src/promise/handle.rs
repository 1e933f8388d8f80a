use super::bind::{Cancel, Canceller};
use super::core::Core;
use super::state::{Outcome, Status};
use super::subscriber::Subscriber;

use std::fmt;
use std::sync::Arc;

/// A single-assignment, cancellable eventual result.
///
/// A `Promise` eventually holds either a success value `T` or an error
/// `E`, delivered to every callback registered through
/// [`when_complete`](Self::when_complete), whether it was registered
/// before or after completion.
///
/// The task passed to [`new`](Self::new) does not run until the first
/// callback is registered. It receives a [`Subscriber`] which it uses to
/// settle the promise, possibly from another thread, and to register a
/// cancellation hook.
///
/// `Promise` is a handle: cloning it is cheap and every clone observes and
/// controls the same underlying promise.
///
/// # Examples
///
/// ```rust,ignore
/// use pledge::Promise;
///
/// let promise: Promise<u32, String> = Promise::new(|subscriber| {
///     std::thread::spawn(move || subscriber.resolve(42));
/// });
///
/// promise.when_complete(|result| {
///     assert_eq!(result, &Ok(42));
/// });
/// ```
pub struct Promise<T, E> {
    pub(crate) core: Arc<Core<T, E>>,
}

impl<T, E> Promise<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Creates a promise backed by `task`.
    ///
    /// The task runs on the thread that registers the first callback, and
    /// must eventually settle the subscriber exactly once or leave the
    /// promise pending.
    pub fn new<F>(task: F) -> Self
    where
        F: FnOnce(Subscriber<T, E>) + Send + 'static,
    {
        Self {
            core: Arc::new(Core::idle(Box::new(task))),
        }
    }

    /// Creates a promise that is already complete with `result`.
    pub fn settled(result: Result<T, E>) -> Self {
        Self {
            core: Arc::new(Core::complete_with(Arc::new(result))),
        }
    }

    /// Creates a promise that is already complete with a success value.
    pub fn resolved(value: T) -> Self {
        Self::settled(Ok(value))
    }

    /// Creates a promise that is already complete with an error.
    pub fn rejected(error: E) -> Self {
        Self::settled(Err(error))
    }

    /// Registers `callback` to receive the result.
    ///
    /// - On a complete promise, `callback` runs immediately on the calling
    ///   thread.
    /// - On an idle promise, the task is started and `callback` runs when
    ///   it settles.
    /// - On a running promise, `callback` runs when it settles, on the
    ///   thread that settles it.
    /// - On a cancelled promise, `callback` is dropped and never runs.
    ///
    /// Every callback observes the same result. No order is guaranteed
    /// between callbacks registered on the same promise.
    pub fn when_complete<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&Result<T, E>) + Send + 'static,
    {
        self.when_complete_shared(move |outcome| callback(&**outcome));
        self
    }

    /// Registers separate callbacks for success and error.
    pub fn when_complete_with<S, F>(&self, on_success: S, on_error: F) -> &Self
    where
        S: FnOnce(&T) + Send + 'static,
        F: FnOnce(&E) + Send + 'static,
    {
        self.when_complete(move |result| match result {
            Ok(value) => on_success(value),
            Err(error) => on_error(error),
        })
    }

    /// Registers a callback receiving the shared outcome itself.
    pub(crate) fn when_complete_shared<F>(&self, callback: F)
    where
        F: FnOnce(&Outcome<T, E>) + Send + 'static,
    {
        self.core.subscribe(Box::new(callback));
    }

    /// Requests cancellation.
    ///
    /// An idle or running promise becomes cancelled: its cancellation hook,
    /// if any, runs once on the calling thread, and no callback will ever
    /// receive a result. Cancelling a complete or already cancelled
    /// promise does nothing.
    ///
    /// This never waits for the task to stop; cancellation is cooperative.
    pub fn cancel(&self) {
        self.core.cancel();
    }

    /// Returns a snapshot of the promise's lifecycle state.
    pub fn status(&self) -> Status {
        self.core.status()
    }

    /// Returns `true` if the promise holds its result.
    pub fn is_complete(&self) -> bool {
        self.status() == Status::Complete
    }

    /// Returns `true` if the promise was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status() == Status::Cancelled
    }

    /// Weak, type-erased handle used to cancel this promise from a context
    /// that does not know `T` and `E`.
    pub(crate) fn canceller(&self) -> Canceller {
        let core: Arc<dyn Cancel> = self.core.clone();
        Canceller::new(&core)
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("status", &self.status())
            .finish()
    }
}
