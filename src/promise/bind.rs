use super::core::Core;
use super::handle::Promise;
use super::subscriber::Subscriber;

use arc_swap::ArcSwap;
use tracing::{debug, trace};

use std::sync::{Arc, Weak};

/// Something that can be cancelled without knowing its result types.
///
/// `bind` links promises of unrelated types; this trait lets one
/// cancellation target stand for either side of the link.
pub(crate) trait Cancel: Send + Sync {
    /// Requests cancellation. Must be idempotent.
    fn cancel(&self);
}

impl<T, E> Cancel for Core<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn cancel(&self) {
        Core::cancel(self);
    }
}

/// Weak, type-erased handle that cancels a promise if it still exists.
///
/// A promise that can still settle is kept alive by its own handles or by
/// its subscriber. Once both are gone nobody can complete it, so there is
/// nothing left to cancel and the handle becomes a no-op. Holding it never
/// keeps a promise alive.
#[derive(Clone)]
pub(crate) struct Canceller {
    target: Weak<dyn Cancel>,
}

impl Canceller {
    pub(crate) fn new(target: &Arc<dyn Cancel>) -> Self {
        Self {
            target: Arc::downgrade(target),
        }
    }

    /// Cancels the promise if it is still alive.
    pub(crate) fn cancel(&self) {
        match self.target.upgrade() {
            Some(target) => target.cancel(),
            None => trace!("cancellation target already dropped, nothing to cancel"),
        }
    }
}

/// What a bound promise cancels when it is itself cancelled.
enum Target {
    /// The computation currently producing the result.
    Live(Canceller),

    /// Cancellation was requested; nothing may be retargeted any more.
    Cancelled,
}

/// Atomically swappable cancellation target of a bound promise.
///
/// Starts out pointing at the upstream promise and is moved to the
/// downstream promise once the transform has produced it. Both moves race
/// with `cancel`, and the compare-and-swap in [`retarget`](Self::retarget)
/// guarantees that exactly one of them observes the other:
///
/// - `cancel` lands first: `retarget` sees `Cancelled`, refuses, and the
///   caller cancels the downstream promise itself.
/// - `retarget` lands first: `cancel` finds the downstream promise and
///   cancels it.
pub(crate) struct CancelTarget {
    current: ArcSwap<Target>,
}

impl CancelTarget {
    pub(crate) fn new(initial: Canceller) -> Self {
        Self {
            current: ArcSwap::from_pointee(Target::Live(initial)),
        }
    }

    /// Marks the target cancelled and cancels whatever was live.
    pub(crate) fn cancel(&self) {
        let previous = self.current.swap(Arc::new(Target::Cancelled));

        if let Target::Live(target) = &*previous {
            target.cancel();
        }
    }

    /// Points the target at `next`.
    ///
    /// Returns `false` if cancellation was already requested, in which
    /// case `next` was not installed.
    pub(crate) fn retarget(&self, next: Canceller) -> bool {
        loop {
            let current = self.current.load_full();

            if let Target::Cancelled = &*current {
                return false;
            }

            let previous = self
                .current
                .compare_and_swap(&current, Arc::new(Target::Live(next.clone())));

            if Arc::ptr_eq(&*previous, &current) {
                return true;
            }
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Chains a promise produced from this one's result.
    ///
    /// Returns a new promise which, once observed, observes `self`, passes
    /// its result to `transform` and settles with the result of the
    /// promise `transform` returns.
    ///
    /// Cancelling the returned promise cancels whichever computation is
    /// live at that moment:
    ///
    /// - before `self` completes, `self` is cancelled;
    /// - after `self` completes but before the downstream promise does,
    ///   the downstream promise is cancelled, even if the cancellation
    ///   arrives while `transform` is still running;
    /// - after the downstream promise completes, nothing happens.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let doubled = Promise::<u32, String>::resolved(21)
    ///     .bind(|result| match result {
    ///         Ok(value) => Promise::resolved(value * 2),
    ///         Err(error) => Promise::rejected(error.clone()),
    ///     });
    /// ```
    pub fn bind<U, F, G>(&self, transform: G) -> Promise<U, F>
    where
        U: Send + Sync + 'static,
        F: Send + Sync + 'static,
        G: FnOnce(&Result<T, E>) -> Promise<U, F> + Send + 'static,
    {
        let upstream = self.clone();

        Promise::new(move |subscriber: Subscriber<U, F>| {
            let target = Arc::new(CancelTarget::new(upstream.canceller()));

            let hook = target.clone();
            subscriber.on_cancel(move || hook.cancel());

            upstream.when_complete(move |result| {
                let downstream = transform(result);

                if !target.retarget(downstream.canceller()) {
                    debug!("bound promise cancelled during transform, cancelling downstream");
                    downstream.cancel();
                    return;
                }

                downstream.when_complete_shared(move |outcome| {
                    subscriber.settle_shared(outcome.clone());
                });
            });
        })
    }
}
